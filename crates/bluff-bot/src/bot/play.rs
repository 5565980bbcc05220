use bluff_core::model::card::Card;
use bluff_core::model::hand::Hand;
use bluff_core::model::rank::Rank;

/// Chooses the cards an AI seat discards on its turn: every card of the
/// claimed rank when any are held, otherwise a single card as a forced
/// bluff, since passing is not permitted.
pub struct PlayPlanner;

impl PlayPlanner {
    pub fn choose(hand: &Hand, expected: Rank) -> Vec<Card> {
        let matching: Vec<Card> = hand
            .iter()
            .copied()
            .filter(|card| card.matches(expected))
            .collect();

        if !matching.is_empty() {
            return matching;
        }

        hand.cards().first().copied().into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::PlayPlanner;
    use bluff_core::model::card::Card;
    use bluff_core::model::hand::Hand;
    use bluff_core::model::rank::Rank;
    use bluff_core::model::suit::Suit;

    #[test]
    fn plays_every_card_of_the_claimed_rank() {
        let hand = Hand::with_cards(vec![
            Card::new(Rank::Seven, Suit::Clubs),
            Card::new(Rank::Seven, Suit::Hearts),
            Card::new(Rank::Two, Suit::Spades),
        ]);
        let chosen = PlayPlanner::choose(&hand, Rank::Seven);
        assert_eq!(chosen.len(), 2);
        assert!(chosen.iter().all(|card| card.rank == Rank::Seven));
    }

    #[test]
    fn bluffs_with_one_card_when_none_match() {
        let hand = Hand::with_cards(vec![
            Card::new(Rank::Two, Suit::Spades),
            Card::new(Rank::Nine, Suit::Diamonds),
        ]);
        let chosen = PlayPlanner::choose(&hand, Rank::King);
        assert_eq!(chosen.len(), 1);
        assert!(hand.contains(chosen[0]));
    }

    #[test]
    fn empty_hand_yields_no_play() {
        let hand = Hand::new();
        assert!(PlayPlanner::choose(&hand, Rank::Ace).is_empty());
    }
}
