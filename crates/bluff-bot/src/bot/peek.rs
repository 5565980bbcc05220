//! Turn-counted cooldowns for peek attempts.
//!
//! Cooldowns are measured in game turns, not wall-clock time, and apply to
//! every resolved peek attempt regardless of whether it was deflected.

use bluff_core::model::player::PlayerId;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PeekLedger {
    seat_cooldown: u32,
    global_cooldown: u32,
    last_seat_peek: Vec<Option<u32>>,
    last_any_peek: Option<u32>,
    turn: u32,
}

impl PeekLedger {
    pub const DEFAULT_SEAT_COOLDOWN: u32 = 2;
    pub const DEFAULT_GLOBAL_COOLDOWN: u32 = 1;

    pub fn new(player_count: usize) -> Self {
        Self::with_cooldowns(
            player_count,
            Self::DEFAULT_SEAT_COOLDOWN,
            Self::DEFAULT_GLOBAL_COOLDOWN,
        )
    }

    pub fn with_cooldowns(player_count: usize, seat_cooldown: u32, global_cooldown: u32) -> Self {
        Self {
            seat_cooldown,
            global_cooldown,
            last_seat_peek: vec![None; player_count],
            last_any_peek: None,
            turn: 0,
        }
    }

    pub fn reset(&mut self, player_count: usize) {
        self.last_seat_peek = vec![None; player_count];
        self.last_any_peek = None;
        self.turn = 0;
    }

    /// Advances the turn counter; called once per resolved play.
    pub fn note_turn(&mut self) {
        self.turn += 1;
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn can_attempt(&self, seat: PlayerId) -> bool {
        if let Some(last) = self.last_seat_peek.get(seat.index()).copied().flatten() {
            let since = self.turn - last;
            if since < self.seat_cooldown {
                debug!(
                    target: "bluff_bot::peek",
                    seat = %seat,
                    since,
                    cooldown = self.seat_cooldown,
                    "seat peek cooldown active"
                );
                return false;
            }
        }

        if let Some(last) = self.last_any_peek {
            let since = self.turn - last;
            if since < self.global_cooldown {
                debug!(
                    target: "bluff_bot::peek",
                    seat = %seat,
                    since,
                    cooldown = self.global_cooldown,
                    "global peek cooldown active"
                );
                return false;
            }
        }

        true
    }

    pub fn note_used(&mut self, seat: PlayerId) {
        if let Some(slot) = self.last_seat_peek.get_mut(seat.index()) {
            *slot = Some(self.turn);
        }
        self.last_any_peek = Some(self.turn);
    }
}
