use crate::game::event::GameEvent;
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::pile::Pile;
use crate::model::player::PlayerId;
use crate::model::rank::Rank;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Inactive,
    WaitingForPlay,
    TruthTold,
    LieTold,
}

/// Monotonic counter bumped on every state transition. Pending timers carry
/// the token they were scheduled under so stale callbacks can be detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TurnToken(u64);

impl TurnToken {
    pub const fn bumped(self) -> TurnToken {
        TurnToken(self.0 + 1)
    }
}

/// Record of the most recent play: who discarded, how many cards, and the
/// rank they were obliged to claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastPlay {
    pub player: PlayerId,
    pub count: usize,
    pub claimed: Rank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayVerdict {
    Truth,
    Lie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnAdvance {
    NextTurn { player: PlayerId, expected: Rank },
    GameOver { winner: PlayerId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    pub caller: PlayerId,
    pub accused: PlayerId,
    pub success: bool,
    pub loser: PlayerId,
    pub picked_up: Vec<Card>,
    pub advance: TurnAdvance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    GameInProgress,
    NotEnoughPlayers(usize),
    NotWaitingForPlay(GameState),
    NoPlayToJudge(GameState),
    EmptyPlay,
    CardNotHeld(Card),
    SelfCall(PlayerId),
    UnknownPlayer(PlayerId),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::GameInProgress => {
                write!(f, "cannot start a game while one is active")
            }
            EngineError::NotEnoughPlayers(count) => {
                write!(f, "a game needs at least two players, got {count}")
            }
            EngineError::NotWaitingForPlay(state) => {
                write!(f, "cannot play cards in state {state:?}")
            }
            EngineError::NoPlayToJudge(state) => {
                write!(f, "no play to judge in state {state:?}")
            }
            EngineError::EmptyPlay => write!(f, "a play must contain at least one card"),
            EngineError::CardNotHeld(card) => {
                write!(f, "current player does not hold {card}")
            }
            EngineError::SelfCall(player) => {
                write!(f, "{player} cannot call a bluff on their own play")
            }
            EngineError::UnknownPlayer(player) => {
                write!(f, "no seat {} at this table", player.index())
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Canonical state for one game: every hand, the pile, whose turn it is,
/// the rank the current play must claim, and the truth of the last play.
#[derive(Debug, Clone)]
pub struct TableState {
    hands: Vec<Hand>,
    pile: Pile,
    current_player: PlayerId,
    expected_rank: Rank,
    state: GameState,
    last_play: Option<LastPlay>,
    winner: Option<PlayerId>,
    token: TurnToken,
    events: VecDeque<GameEvent>,
    rng: StdRng,
    seed: u64,
}

impl TableState {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            hands: Vec::new(),
            pile: Pile::new(),
            current_player: PlayerId::HUMAN,
            expected_rank: Rank::Ace,
            state: GameState::Inactive,
            last_play: None,
            winner: None,
            token: TurnToken::default(),
            events: VecDeque::new(),
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Shuffles a fresh deck and deals it round-robin across `num_players`
    /// seats, seat 0 (the human) first.
    pub fn start(&mut self, num_players: usize) -> Result<(), EngineError> {
        if self.state != GameState::Inactive {
            return Err(EngineError::GameInProgress);
        }
        let deck = Deck::shuffled(&mut self.rng);
        self.start_with_deck(&deck, num_players)
    }

    /// Starts a game from an explicit deck ordering.
    pub fn start_with_deck(&mut self, deck: &Deck, num_players: usize) -> Result<(), EngineError> {
        if self.state != GameState::Inactive {
            return Err(EngineError::GameInProgress);
        }
        if num_players < 2 {
            return Err(EngineError::NotEnoughPlayers(num_players));
        }

        self.hands = (0..num_players).map(|_| Hand::new()).collect();
        for (index, card) in deck.cards().iter().enumerate() {
            self.hands[index % num_players].add(*card);
        }

        self.pile = Pile::new();
        self.current_player = PlayerId::HUMAN;
        self.expected_rank = Rank::Ace;
        self.last_play = None;
        self.winner = None;
        self.state = GameState::WaitingForPlay;
        self.token = self.token.bumped();

        self.emit(GameEvent::Message {
            text: format!("Dealt {} cards across {num_players} seats", deck.len()),
        });
        for seat in PlayerId::seats(num_players) {
            self.emit_hand_updated(seat);
        }
        self.emit(GameEvent::TurnChanged {
            player: self.current_player,
        });

        Ok(())
    }

    /// Moves the given cards from the current player's hand onto the pile and
    /// records whether the implied claim was truthful. Every card must be in
    /// the current player's hand; nothing is mutated when any is not.
    pub fn play_cards(&mut self, cards: &[Card]) -> Result<PlayVerdict, EngineError> {
        if self.state != GameState::WaitingForPlay {
            return Err(EngineError::NotWaitingForPlay(self.state));
        }
        if cards.is_empty() {
            return Err(EngineError::EmptyPlay);
        }

        let player = self.current_player;
        let mut probe = self.hands[player.index()].clone();
        for card in cards {
            if !probe.remove(*card) {
                return Err(EngineError::CardNotHeld(*card));
            }
        }
        self.hands[player.index()] = probe;
        self.pile.push_all(cards);

        let truthful = cards.iter().all(|card| card.matches(self.expected_rank));
        self.state = if truthful {
            GameState::TruthTold
        } else {
            GameState::LieTold
        };
        self.last_play = Some(LastPlay {
            player,
            count: cards.len(),
            claimed: self.expected_rank,
        });
        self.token = self.token.bumped();

        self.emit(GameEvent::CardsPlayed {
            player,
            count: cards.len(),
            claimed: self.expected_rank,
        });
        self.emit_hand_updated(player);
        self.emit(GameEvent::Message {
            text: format!(
                "{player} played {} {}, claiming {}",
                cards.len(),
                if cards.len() == 1 { "card" } else { "cards" },
                self.expected_rank,
            ),
        });

        Ok(if truthful {
            PlayVerdict::Truth
        } else {
            PlayVerdict::Lie
        })
    }

    /// Resolves a bluff accusation against the most recent play. The call
    /// succeeds exactly when the play was a lie; the loser absorbs the pile.
    /// A call, right or wrong, consumes the turn.
    pub fn call(&mut self, caller: PlayerId) -> Result<CallOutcome, EngineError> {
        if !matches!(self.state, GameState::TruthTold | GameState::LieTold) {
            return Err(EngineError::NoPlayToJudge(self.state));
        }
        if caller.index() >= self.hands.len() {
            return Err(EngineError::UnknownPlayer(caller));
        }
        let accused = self.current_player;
        if caller == accused {
            return Err(EngineError::SelfCall(caller));
        }

        let success = self.state == GameState::LieTold;
        let loser = if success { accused } else { caller };
        let picked_up = self.pile.take_all();
        self.hands[loser.index()].add_all(&picked_up);

        self.emit(GameEvent::CallResolved {
            caller,
            accused,
            success,
        });
        self.emit(GameEvent::PilePickedUp {
            player: loser,
            count: picked_up.len(),
        });
        self.emit_hand_updated(loser);
        self.emit(GameEvent::Message {
            text: if success {
                format!("{caller} caught {accused} bluffing; {loser} picks up the pile")
            } else {
                format!("{caller} called wrong; {loser} picks up the pile")
            },
        });

        let advance = self.advance();
        Ok(CallOutcome {
            caller,
            accused,
            success,
            loser,
            picked_up,
            advance,
        })
    }

    /// Lets the last play stand and moves on to the next seat and rank.
    pub fn continue_turn(&mut self) -> Result<TurnAdvance, EngineError> {
        if !matches!(self.state, GameState::TruthTold | GameState::LieTold) {
            return Err(EngineError::NoPlayToJudge(self.state));
        }
        Ok(self.advance())
    }

    /// Ends the game without declaring a winner.
    pub fn abort(&mut self) {
        self.state = GameState::Inactive;
        self.token = self.token.bumped();
        self.emit(GameEvent::Message {
            text: "Game ended early".to_string(),
        });
    }

    fn advance(&mut self) -> TurnAdvance {
        self.current_player = self.current_player.next(self.hands.len());
        self.expected_rank = self.expected_rank.next();
        self.token = self.token.bumped();

        if let Some(winner) = self.empty_handed_player() {
            self.state = GameState::Inactive;
            self.winner = Some(winner);
            self.emit(GameEvent::GameEnded { winner });
            self.emit(GameEvent::Message {
                text: format!("{winner} shed every card and wins"),
            });
            return TurnAdvance::GameOver { winner };
        }

        self.state = GameState::WaitingForPlay;
        self.emit(GameEvent::TurnChanged {
            player: self.current_player,
        });
        TurnAdvance::NextTurn {
            player: self.current_player,
            expected: self.expected_rank,
        }
    }

    fn empty_handed_player(&self) -> Option<PlayerId> {
        self.hands
            .iter()
            .position(Hand::is_empty)
            .map(PlayerId::new)
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push_back(event);
    }

    fn emit_hand_updated(&mut self, player: PlayerId) {
        let hand = self.hands[player.index()].cards().to_vec();
        self.events.push_back(GameEvent::HandUpdated { player, hand });
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    pub fn expected_rank(&self) -> Rank {
        self.expected_rank
    }

    pub fn hand(&self, player: PlayerId) -> &Hand {
        &self.hands[player.index()]
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub fn player_count(&self) -> usize {
        self.hands.len()
    }

    pub fn pile_len(&self) -> usize {
        self.pile.len()
    }

    pub fn is_human_turn(&self) -> bool {
        self.current_player.is_human() && self.state == GameState::WaitingForPlay
    }

    pub fn last_play(&self) -> Option<&LastPlay> {
        self.last_play.as_ref()
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn turn_token(&self) -> TurnToken {
        self.token
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for TableState {
    fn default() -> Self {
        Self::new()
    }
}
