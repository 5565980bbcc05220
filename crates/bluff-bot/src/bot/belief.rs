//! Rank-count belief tracking over opponents' hands.
//!
//! Each observer seat keeps one table per target seat estimating how many
//! cards of each rank the target holds. The engine deals openly, so tables
//! about AI seats start as ground truth; the table about the human starts
//! empty and only fills through peeks and observed pile pickups.

use bluff_core::model::card::Card;
use bluff_core::model::hand::Hand;
use bluff_core::model::player::PlayerId;
use bluff_core::model::rank::Rank;
use rand::Rng;
use tracing::debug;

/// A standard deck holds four copies of every rank.
pub const MAX_RANK_COPIES: u8 = 4;

/// Believed number of copies held per rank, each entry in `0..=4`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankCounts {
    counts: [u8; 13],
}

impl RankCounts {
    pub fn from_cards<'a, I>(cards: I) -> Self
    where
        I: IntoIterator<Item = &'a Card>,
    {
        let mut counts = Self::default();
        for card in cards {
            counts.record(card.rank);
        }
        counts
    }

    pub fn get(&self, rank: Rank) -> u8 {
        self.counts[Self::slot(rank)]
    }

    /// Adds one believed copy, saturating at the deck maximum.
    pub fn record(&mut self, rank: Rank) {
        let slot = Self::slot(rank);
        self.counts[slot] = (self.counts[slot] + 1).min(MAX_RANK_COPIES);
    }

    /// Removes one believed copy, floored at zero.
    pub fn forget(&mut self, rank: Rank) {
        let slot = Self::slot(rank);
        self.counts[slot] = self.counts[slot].saturating_sub(1);
    }

    pub fn clear(&mut self) {
        self.counts = [0; 13];
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|&c| c as usize).sum()
    }

    fn slot(rank: Rank) -> usize {
        rank.value() as usize - 1
    }
}

/// The full observer-by-target belief grid for one game.
#[derive(Debug, Clone)]
pub struct BeliefModel {
    tables: Vec<Vec<RankCounts>>,
}

impl BeliefModel {
    pub fn new(player_count: usize) -> Self {
        Self {
            tables: vec![vec![RankCounts::default(); player_count]; player_count],
        }
    }

    /// Reseeds the grid from a fresh deal. AI hands are known to every
    /// tracker; the human's table starts empty.
    pub fn reset(&mut self, hands: &[Hand]) {
        let player_count = hands.len();
        self.tables = vec![vec![RankCounts::default(); player_count]; player_count];

        for target in PlayerId::seats(player_count) {
            if target.is_human() {
                continue;
            }
            let truth = RankCounts::from_cards(hands[target.index()].iter());
            for observer in 0..player_count {
                self.tables[observer][target.index()] = truth;
            }
        }
    }

    pub fn player_count(&self) -> usize {
        self.tables.len()
    }

    pub fn believed(&self, observer: PlayerId, target: PlayerId, rank: Rank) -> u8 {
        self.tables[observer.index()][target.index()].get(rank)
    }

    /// A play is public: every tracker sees those copies leave the hand.
    pub fn on_cards_played(&mut self, player: PlayerId, cards: &[Card]) {
        for observer in 0..self.tables.len() {
            for card in cards {
                self.tables[observer][player.index()].forget(card.rank);
            }
        }
    }

    /// A pickup makes the absorbing hand knowable again. An AI's refilled
    /// hand is open to the engine; for the human only the absorbed pile
    /// cards are public, so the rebuilt table covers just those.
    pub fn on_pile_pickup(&mut self, player: PlayerId, picked_up: &[Card], hand_after: &Hand) {
        let rebuilt = if player.is_human() {
            RankCounts::from_cards(picked_up.iter())
        } else {
            RankCounts::from_cards(hand_after.iter())
        };

        for observer in 0..self.tables.len() {
            self.tables[observer][player.index()] = rebuilt;
        }

        debug!(
            target: "bluff_bot::belief",
            player = %player,
            known = rebuilt.total(),
            "rebuilt belief after pickup"
        );
    }

    /// Integrates one peek at the human's hand. Fabricated observations are
    /// discarded; truthful ones use a decaying-confirmation rule: the more
    /// the observer already believes, the less one more sighting moves it.
    pub fn on_peek<R: Rng + ?Sized>(
        &mut self,
        observer: PlayerId,
        ranks: &[Rank],
        truthful: bool,
        observer_hand: &Hand,
        rng: &mut R,
    ) {
        if observer.is_human() {
            return;
        }
        if !truthful {
            debug!(
                target: "bluff_bot::peek",
                observer = %observer,
                "deflected peek discarded"
            );
            return;
        }

        let table = &mut self.tables[observer.index()][PlayerId::HUMAN.index()];
        for &rank in ranks {
            let current = table.get(rank);
            if current == 0 {
                table.record(rank);
                continue;
            }

            let verified = observer_hand.count_rank(rank) as u8;
            let remaining =
                MAX_RANK_COPIES as i16 - verified as i16 - current as i16;
            if remaining <= 0 {
                continue;
            }

            if rng.r#gen::<f32>() < 1.0 / (current as f32 + 1.0) {
                table.record(rank);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BeliefModel, MAX_RANK_COPIES, RankCounts};
    use bluff_core::model::card::Card;
    use bluff_core::model::hand::Hand;
    use bluff_core::model::player::PlayerId;
    use bluff_core::model::rank::Rank;
    use bluff_core::model::suit::Suit;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn hand(cards: &[(Rank, Suit)]) -> Hand {
        Hand::with_cards(cards.iter().map(|&(r, s)| Card::new(r, s)).collect())
    }

    fn dealt_model() -> BeliefModel {
        let hands = vec![
            hand(&[(Rank::Ace, Suit::Clubs), (Rank::Two, Suit::Clubs)]),
            hand(&[(Rank::Five, Suit::Hearts), (Rank::Five, Suit::Spades)]),
            hand(&[(Rank::King, Suit::Diamonds), (Rank::Nine, Suit::Clubs)]),
        ];
        let mut model = BeliefModel::new(hands.len());
        model.reset(&hands);
        model
    }

    #[test]
    fn reset_seeds_ai_truth_and_leaves_human_unknown() {
        let model = dealt_model();
        let observer = PlayerId::new(2);
        assert_eq!(model.believed(observer, PlayerId::new(1), Rank::Five), 2);
        assert_eq!(model.believed(observer, PlayerId::new(1), Rank::King), 0);
        assert_eq!(model.believed(observer, PlayerId::HUMAN, Rank::Ace), 0);
    }

    #[test]
    fn plays_decrement_for_every_tracker_and_floor_at_zero() {
        let mut model = dealt_model();
        let fives = [
            Card::new(Rank::Five, Suit::Hearts),
            Card::new(Rank::Five, Suit::Spades),
        ];
        model.on_cards_played(PlayerId::new(1), &fives);
        assert_eq!(
            model.believed(PlayerId::new(2), PlayerId::new(1), Rank::Five),
            0
        );

        // already at zero; further plays of the rank must not underflow
        model.on_cards_played(PlayerId::new(1), &fives[..1]);
        assert_eq!(
            model.believed(PlayerId::HUMAN, PlayerId::new(1), Rank::Five),
            0
        );
    }

    #[test]
    fn ai_pickup_rebuilds_from_the_full_hand() {
        let mut model = dealt_model();
        let picked_up = [Card::new(Rank::Queen, Suit::Clubs)];
        let after = hand(&[
            (Rank::Five, Suit::Hearts),
            (Rank::Five, Suit::Spades),
            (Rank::Queen, Suit::Clubs),
        ]);
        model.on_pile_pickup(PlayerId::new(1), &picked_up, &after);

        let observer = PlayerId::new(2);
        assert_eq!(model.believed(observer, PlayerId::new(1), Rank::Queen), 1);
        assert_eq!(model.believed(observer, PlayerId::new(1), Rank::Five), 2);
    }

    #[test]
    fn human_pickup_rebuilds_from_the_pile_only() {
        let mut model = dealt_model();
        let mut rng = StdRng::seed_from_u64(3);
        let empty = Hand::new();
        model.on_peek(
            PlayerId::new(1),
            &[Rank::Ace, Rank::Two],
            true,
            &empty,
            &mut rng,
        );
        assert_eq!(model.believed(PlayerId::new(1), PlayerId::HUMAN, Rank::Ace), 1);

        let picked_up = [Card::new(Rank::Seven, Suit::Hearts)];
        let after = hand(&[
            (Rank::Ace, Suit::Clubs),
            (Rank::Two, Suit::Clubs),
            (Rank::Seven, Suit::Hearts),
        ]);
        model.on_pile_pickup(PlayerId::HUMAN, &picked_up, &after);

        // stale peek knowledge is gone; only the observed pile remains
        assert_eq!(model.believed(PlayerId::new(1), PlayerId::HUMAN, Rank::Ace), 0);
        assert_eq!(
            model.believed(PlayerId::new(1), PlayerId::HUMAN, Rank::Seven),
            1
        );
    }

    #[test]
    fn deflected_peek_changes_nothing() {
        let mut model = dealt_model();
        let mut rng = StdRng::seed_from_u64(11);
        let empty = Hand::new();
        model.on_peek(
            PlayerId::new(1),
            &[Rank::Jack, Rank::Queen, Rank::King],
            false,
            &empty,
            &mut rng,
        );
        for rank in Rank::ORDERED {
            assert_eq!(model.believed(PlayerId::new(1), PlayerId::HUMAN, rank), 0);
        }
    }

    #[test]
    fn first_truthful_sighting_sets_belief_to_one() {
        let mut model = dealt_model();
        let mut rng = StdRng::seed_from_u64(5);
        let empty = Hand::new();
        model.on_peek(PlayerId::new(2), &[Rank::Jack], true, &empty, &mut rng);
        assert_eq!(model.believed(PlayerId::new(2), PlayerId::HUMAN, Rank::Jack), 1);
    }

    #[test]
    fn confirmation_stops_at_the_plausible_ceiling() {
        let mut model = dealt_model();
        let mut rng = StdRng::seed_from_u64(17);
        // observer holds three jacks, so at most one can be with the human
        let own = hand(&[
            (Rank::Jack, Suit::Clubs),
            (Rank::Jack, Suit::Hearts),
            (Rank::Jack, Suit::Spades),
        ]);

        for _ in 0..50 {
            model.on_peek(PlayerId::new(1), &[Rank::Jack], true, &own, &mut rng);
        }
        assert_eq!(model.believed(PlayerId::new(1), PlayerId::HUMAN, Rank::Jack), 1);
    }

    #[test]
    fn repeated_sightings_never_exceed_the_deck_maximum() {
        let mut model = dealt_model();
        let mut rng = StdRng::seed_from_u64(23);
        let empty = Hand::new();

        let mut previous = 0;
        for _ in 0..60 {
            model.on_peek(PlayerId::new(1), &[Rank::Three], true, &empty, &mut rng);
            let current = model.believed(PlayerId::new(1), PlayerId::HUMAN, Rank::Three);
            assert!(current >= previous);
            assert!(current <= MAX_RANK_COPIES);
            previous = current;
        }
        assert!(previous >= 1);
    }

    #[test]
    fn rank_counts_saturate_in_both_directions() {
        let mut counts = RankCounts::default();
        for _ in 0..10 {
            counts.record(Rank::Nine);
        }
        assert_eq!(counts.get(Rank::Nine), MAX_RANK_COPIES);
        for _ in 0..10 {
            counts.forget(Rank::Nine);
        }
        assert_eq!(counts.get(Rank::Nine), 0);
    }
}
