use core::fmt;
use serde::{Deserialize, Serialize};

/// Seat identifier at the table. Seat 0 is always the human.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(usize);

impl PlayerId {
    pub const HUMAN: PlayerId = PlayerId(0);

    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }

    pub const fn is_human(self) -> bool {
        self.0 == 0
    }

    pub fn next(self, player_count: usize) -> PlayerId {
        PlayerId((self.0 + 1) % player_count)
    }

    /// All seats at a table of the given size, in turn order.
    pub fn seats(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count).map(PlayerId)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_human() {
            f.write_str("You")
        } else {
            write!(f, "Monkey {}", self.0)
        }
    }
}
