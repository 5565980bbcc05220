use crate::model::card::Card;
use crate::model::player::PlayerId;
use crate::model::rank::Rank;
use serde::Serialize;

/// Notifications queued by the engine for whatever layer is presenting the
/// game. Drained with [`TableState::drain_events`].
///
/// [`TableState::drain_events`]: crate::game::table::TableState::drain_events
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    Message { text: String },
    HandUpdated { player: PlayerId, hand: Vec<Card> },
    TurnChanged { player: PlayerId },
    CardsPlayed { player: PlayerId, count: usize, claimed: Rank },
    CallResolved { caller: PlayerId, accused: PlayerId, success: bool },
    PilePickedUp { player: PlayerId, count: usize },
    GameEnded { winner: PlayerId },
}
