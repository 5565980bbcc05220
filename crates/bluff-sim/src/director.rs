//! The coordinator that owns one game end to end: the table, the trackers'
//! beliefs, the peek cooldowns, and the timers. Replaces the scene-global
//! singletons of a front end with one explicitly constructed object.

use bluff_bot::bot::{BeliefModel, PeekLedger, PlayPlanner, call_probability, decide_call};
use bluff_core::game::clock::TurnClock;
use bluff_core::game::event::GameEvent;
use bluff_core::game::table::{
    CallOutcome, EngineError, GameState, PlayVerdict, TableState, TurnAdvance, TurnToken,
};
use bluff_core::model::card::Card;
use bluff_core::model::deck::Deck;
use bluff_core::model::hand::Hand;
use bluff_core::model::player::PlayerId;
use bluff_core::model::rank::Rank;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::time::Duration;
use tracing::{debug, info};

/// A deflected peek feeds this many fabricated ranks.
const FABRICATED_RANKS: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct DirectorSettings {
    pub turn_timer: Duration,
    pub peek_interval_min: Duration,
    pub peek_interval_max: Duration,
    /// Chance the human wins the deflect challenge when a peek lands.
    pub deflect_chance: f32,
    pub seat_cooldown_turns: u32,
    pub global_cooldown_turns: u32,
}

impl Default for DirectorSettings {
    fn default() -> Self {
        Self {
            turn_timer: Duration::from_secs(5),
            peek_interval_min: Duration::from_secs(10),
            peek_interval_max: Duration::from_secs(15),
            deflect_chance: 0.5,
            seat_cooldown_turns: PeekLedger::DEFAULT_SEAT_COOLDOWN,
            global_cooldown_turns: PeekLedger::DEFAULT_GLOBAL_COOLDOWN,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PeekStats {
    pub attempts: u32,
    pub truthful: u32,
    pub deflected: u32,
}

pub struct GameDirector {
    table: TableState,
    beliefs: BeliefModel,
    peeks: PeekLedger,
    clock: TurnClock,
    next_peek_at: Option<Duration>,
    settings: DirectorSettings,
    stats: PeekStats,
    rng: StdRng,
    now: Duration,
}

impl GameDirector {
    pub fn new(seed: u64, settings: DirectorSettings) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let table = TableState::with_seed(rng.next_u64());
        Self {
            table,
            beliefs: BeliefModel::new(0),
            peeks: PeekLedger::new(0),
            clock: TurnClock::new(),
            next_peek_at: None,
            settings,
            stats: PeekStats::default(),
            rng,
            now: Duration::ZERO,
        }
    }

    pub fn start(&mut self, num_players: usize) -> Result<(), EngineError> {
        self.table.start(num_players)?;
        self.on_game_started();
        Ok(())
    }

    pub fn start_with_deck(&mut self, deck: &Deck, num_players: usize) -> Result<(), EngineError> {
        self.table.start_with_deck(deck, num_players)?;
        self.on_game_started();
        Ok(())
    }

    fn on_game_started(&mut self) {
        self.beliefs.reset(self.table.hands());
        self.peeks = PeekLedger::with_cooldowns(
            self.table.player_count(),
            self.settings.seat_cooldown_turns,
            self.settings.global_cooldown_turns,
        );
        self.stats = PeekStats::default();
        self.clock.cancel();
        self.schedule_peek();
        info!(
            target: "bluff_sim::director",
            players = self.table.player_count(),
            seed = self.table.seed(),
            "game started"
        );
    }

    /// Plays for whichever seat currently holds the turn, then arms the
    /// auto-continue deadline for the judging window.
    pub fn submit_play(&mut self, cards: &[Card]) -> Result<PlayVerdict, EngineError> {
        let player = self.table.current_player();
        let verdict = self.table.play_cards(cards)?;
        self.beliefs.on_cards_played(player, cards);
        self.peeks.note_turn();
        self.clock
            .schedule(self.table.turn_token(), self.now, self.settings.turn_timer);
        debug!(
            target: "bluff_sim::director",
            player = %player,
            count = cards.len(),
            verdict = ?verdict,
            "play submitted"
        );
        Ok(verdict)
    }

    /// Resolves an accusation immediately; no other seat gets a chance to
    /// call this turn.
    pub fn call(&mut self, caller: PlayerId) -> Result<CallOutcome, EngineError> {
        self.clock.cancel();
        let outcome = self.table.call(caller)?;
        self.beliefs.on_pile_pickup(
            outcome.loser,
            &outcome.picked_up,
            self.table.hand(outcome.loser),
        );
        info!(
            target: "bluff_sim::director",
            caller = %outcome.caller,
            accused = %outcome.accused,
            success = outcome.success,
            picked_up = outcome.picked_up.len(),
            "bluff call resolved"
        );
        self.play_ai_turn_if_due(outcome.advance)?;
        Ok(outcome)
    }

    /// Lets the last play stand, after offering every other AI seat one
    /// chance to call instead. Seats are polled in ascending index order and
    /// the first caller pre-empts the advance.
    pub fn continue_turn(&mut self) -> Result<TurnAdvance, EngineError> {
        if !matches!(
            self.table.state(),
            GameState::TruthTold | GameState::LieTold
        ) {
            return Err(EngineError::NoPlayToJudge(self.table.state()));
        }

        self.clock.cancel();
        let accused = self.table.current_player();
        for seat in PlayerId::seats(self.table.player_count()) {
            if seat == accused || seat.is_human() {
                continue;
            }
            let probability = self.suspicion_of(seat, accused);
            if decide_call(&mut self.rng, probability) {
                info!(
                    target: "bluff_sim::director",
                    caller = %seat,
                    accused = %accused,
                    probability,
                    "tracker calls the bluff"
                );
                let outcome = self.call(seat)?;
                return Ok(outcome.advance);
            }
        }

        let advance = self.table.continue_turn()?;
        self.play_ai_turn_if_due(advance)?;
        Ok(advance)
    }

    /// Feeds one peek observation to a tracker and records the attempt
    /// against both cooldowns, whatever the deflect outcome was.
    pub fn notify_peek(&mut self, observer: PlayerId, ranks: &[Rank], truthful: bool) {
        let observer_hand = self.table.hand(observer).clone();
        self.beliefs
            .on_peek(observer, ranks, truthful, &observer_hand, &mut self.rng);
        self.peeks.note_used(observer);
        debug!(
            target: "bluff_sim::director",
            observer = %observer,
            ranks = ranks.len(),
            truthful,
            "peek observation recorded"
        );
    }

    pub fn can_attempt_peek(&self, seat: PlayerId) -> bool {
        self.peeks.can_attempt(seat)
    }

    /// Advances simulated time: fires the auto-continue once its deadline
    /// passes (stale deadlines are dropped by the token check) and runs any
    /// due peek attempt.
    pub fn tick(&mut self, now: Duration) -> Result<(), EngineError> {
        self.now = now;
        if self.clock.poll(now, self.table.turn_token()) {
            self.continue_turn()?;
        }
        self.poll_peek();
        Ok(())
    }

    /// Suspicion one seat holds toward the seat that just played.
    pub fn suspicion(&self, observer: PlayerId) -> f32 {
        self.suspicion_of(observer, self.table.current_player())
    }

    fn suspicion_of(&self, observer: PlayerId, target: PlayerId) -> f32 {
        let (claimed, count) = match self.table.last_play() {
            Some(play) => (play.claimed, play.count),
            None => (self.table.expected_rank(), 1),
        };
        let believed = self.beliefs.believed(observer, target, claimed);
        call_probability(believed, self.table.hand(target).len(), count)
    }

    fn play_ai_turn_if_due(&mut self, advance: TurnAdvance) -> Result<(), EngineError> {
        if let TurnAdvance::NextTurn { player, expected } = advance {
            if !player.is_human() {
                let cards = PlayPlanner::choose(self.table.hand(player), expected);
                self.submit_play(&cards)?;
            }
        }
        Ok(())
    }

    fn poll_peek(&mut self) {
        if self.table.state() == GameState::Inactive {
            self.next_peek_at = None;
            return;
        }
        let Some(due) = self.next_peek_at else {
            return;
        };
        if self.now < due {
            return;
        }
        self.attempt_peek();
        self.schedule_peek();
    }

    fn attempt_peek(&mut self) {
        let seat = PlayerId::new(self.rng.gen_range(1..self.table.player_count()));
        if !self.peeks.can_attempt(seat) {
            debug!(
                target: "bluff_sim::director",
                seat = %seat,
                "peek attempt skipped by cooldown"
            );
            return;
        }

        self.stats.attempts += 1;
        let deflected = self.rng.r#gen::<f32>() < self.settings.deflect_chance;
        if deflected {
            self.stats.deflected += 1;
            let ranks: Vec<Rank> = (0..FABRICATED_RANKS)
                .map(|_| Rank::ORDERED[self.rng.gen_range(0..Rank::ORDERED.len())])
                .collect();
            self.notify_peek(seat, &ranks, false);
        } else {
            self.stats.truthful += 1;
            let ranks: Vec<Rank> = self
                .table
                .hand(PlayerId::HUMAN)
                .iter()
                .map(|card| card.rank)
                .collect();
            self.notify_peek(seat, &ranks, true);
        }
    }

    fn schedule_peek(&mut self) {
        let min = self.settings.peek_interval_min.as_secs_f32();
        let max = self.settings.peek_interval_max.as_secs_f32();
        let wait = if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        };
        self.next_peek_at = Some(self.now + Duration::from_secs_f32(wait));
    }

    pub fn abort(&mut self) {
        self.clock.cancel();
        self.next_peek_at = None;
        self.table.abort();
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.table.drain_events()
    }

    pub fn table(&self) -> &TableState {
        &self.table
    }

    pub fn state(&self) -> GameState {
        self.table.state()
    }

    pub fn is_human_turn(&self) -> bool {
        self.table.is_human_turn()
    }

    pub fn current_player(&self) -> PlayerId {
        self.table.current_player()
    }

    pub fn expected_rank(&self) -> Rank {
        self.table.expected_rank()
    }

    pub fn hand(&self, player: PlayerId) -> &Hand {
        self.table.hand(player)
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.table.winner()
    }

    pub fn turn_token(&self) -> TurnToken {
        self.table.turn_token()
    }

    pub fn peek_stats(&self) -> PeekStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::{DirectorSettings, GameDirector};
    use bluff_bot::bot::call_probability;
    use bluff_core::game::event::GameEvent;
    use bluff_core::model::card::Card;
    use bluff_core::model::deck::Deck;
    use bluff_core::model::player::PlayerId;
    use bluff_core::model::rank::Rank;
    use bluff_core::model::suit::Suit;
    use rand::rngs::StdRng;
    use rand::{Rng, RngCore, SeedableRng};
    use std::time::Duration;

    fn secs(value: f32) -> Duration {
        Duration::from_secs_f32(value)
    }

    fn started_director(seed: u64) -> GameDirector {
        let mut director = GameDirector::new(seed, DirectorSettings::default());
        director.start_with_deck(&Deck::standard(), 4).unwrap();
        director.drain_events();
        director
    }

    #[test]
    fn ai_call_checks_run_ascending_and_stop_at_the_first_caller() {
        for seed in 0..24u64 {
            let mut director = started_director(seed);
            director
                .submit_play(&[Card::new(Rank::Ace, Suit::Clubs)])
                .unwrap();
            director.drain_events();
            director.continue_turn().unwrap();
            let events = director.drain_events();

            // replay the director's private dice to predict which seat, if
            // any, should have called: one draw per eligible seat, ascending
            let mut mirror = StdRng::seed_from_u64(seed);
            let _table_seed: u64 = mirror.next_u64();
            let _peek_interval: f32 = mirror.gen_range(10.0f32..15.0f32);
            let probability = call_probability(0, 12, 1);
            let mut predicted = None;
            for seat in [1usize, 2, 3] {
                if mirror.r#gen::<f32>() < probability {
                    predicted = Some(PlayerId::new(seat));
                    break;
                }
            }

            let calls: Vec<_> = events
                .iter()
                .filter_map(|event| match event {
                    GameEvent::CallResolved {
                        caller,
                        accused,
                        success,
                    } => Some((*caller, *accused, *success)),
                    _ => None,
                })
                .collect();

            match predicted {
                Some(caller) => {
                    assert_eq!(calls, vec![(caller, PlayerId::HUMAN, false)], "seed {seed}");
                }
                None => assert!(calls.is_empty(), "seed {seed}"),
            }
        }
    }

    #[test]
    fn auto_continue_fires_only_after_the_deadline() {
        let mut director = started_director(3);
        director
            .submit_play(&[Card::new(Rank::Ace, Suit::Clubs)])
            .unwrap();

        director.tick(secs(4.9)).unwrap();
        assert_eq!(director.expected_rank(), Rank::Ace);

        director.tick(secs(6.0)).unwrap();
        assert_eq!(director.expected_rank(), Rank::Two);
        assert_ne!(director.current_player(), PlayerId::HUMAN);
    }

    #[test]
    fn a_call_cancels_the_pending_auto_continue() {
        let mut director = started_director(5);
        director
            .submit_play(&[Card::new(Rank::Ace, Suit::Clubs)])
            .unwrap();
        director.tick(secs(1.0)).unwrap();

        // wrong call by seat 2; the turn is consumed and seat 1 auto-plays,
        // arming a fresh deadline at 1.0 + 5.0
        let outcome = director.call(PlayerId::new(2)).unwrap();
        assert!(!outcome.success);
        assert_eq!(director.expected_rank(), Rank::Two);

        // the original deadline at 5.0 must not fire against the new turn
        director.tick(secs(5.2)).unwrap();
        assert_eq!(director.expected_rank(), Rank::Two);

        director.tick(secs(6.5)).unwrap();
        assert_eq!(director.expected_rank(), Rank::Three);
    }

    #[test]
    fn peeks_feed_beliefs_and_respect_cooldowns() {
        let mut director = started_director(9);
        let monkey = PlayerId::new(1);
        assert!(director.can_attempt_peek(monkey));

        director.notify_peek(monkey, &[Rank::Ace], true);
        assert_eq!(
            director.beliefs.believed(monkey, PlayerId::HUMAN, Rank::Ace),
            1
        );
        assert!(!director.can_attempt_peek(monkey));
        assert!(!director.can_attempt_peek(PlayerId::new(2)));

        // one resolved play lifts the global cooldown but not the seat's own
        director
            .submit_play(&[Card::new(Rank::Ace, Suit::Clubs)])
            .unwrap();
        assert!(!director.can_attempt_peek(monkey));
        assert!(director.can_attempt_peek(PlayerId::new(2)));
    }

    #[test]
    fn deflected_peeks_cost_the_cooldown_but_teach_nothing() {
        let mut director = started_director(13);
        let monkey = PlayerId::new(3);
        director.notify_peek(monkey, &[Rank::King, Rank::Queen, Rank::Jack], false);

        for rank in Rank::ORDERED {
            assert_eq!(
                director.beliefs.believed(monkey, PlayerId::HUMAN, rank),
                0
            );
        }
        assert!(!director.can_attempt_peek(monkey));
    }

    #[test]
    fn scheduled_peek_attempts_update_the_stats() {
        let mut director = started_director(21);
        director
            .submit_play(&[Card::new(Rank::Ace, Suit::Clubs)])
            .unwrap();

        // walk simulated time well past the first peek window
        let mut now = Duration::ZERO;
        for _ in 0..200 {
            now += Duration::from_millis(500);
            director.tick(now).unwrap();
            if director.state() == bluff_core::game::table::GameState::Inactive {
                break;
            }
        }
        let stats = director.peek_stats();
        assert!(stats.attempts >= 1);
        assert_eq!(stats.attempts, stats.truthful + stats.deflected);
    }
}
