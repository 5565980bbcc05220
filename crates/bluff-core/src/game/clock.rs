use crate::game::table::TurnToken;
use std::time::Duration;

/// A single cancellable deadline guarded by the turn token that was current
/// when it was scheduled. If the engine has moved on by the time the deadline
/// is polled, the pending callback is discarded instead of firing.
#[derive(Debug, Default)]
pub struct TurnClock {
    pending: Option<Pending>,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    token: TurnToken,
    deadline: Duration,
}

impl TurnClock {
    pub fn new() -> Self {
        Self { pending: None }
    }

    pub fn schedule(&mut self, token: TurnToken, now: Duration, delay: Duration) {
        self.pending = Some(Pending {
            token,
            deadline: now + delay,
        });
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns true exactly once, when the deadline has passed and the engine
    /// is still on the turn the deadline was scheduled for. A deadline whose
    /// token no longer matches is dropped without firing.
    pub fn poll(&mut self, now: Duration, current: TurnToken) -> bool {
        let Some(pending) = self.pending else {
            return false;
        };

        if pending.token != current {
            self.pending = None;
            return false;
        }

        if now >= pending.deadline {
            self.pending = None;
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::TurnClock;
    use crate::game::table::TurnToken;
    use std::time::Duration;

    fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    #[test]
    fn fires_once_after_the_deadline() {
        let token = TurnToken::default();
        let mut clock = TurnClock::new();
        clock.schedule(token, secs(0), secs(5));

        assert!(!clock.poll(secs(4), token));
        assert!(clock.poll(secs(5), token));
        assert!(!clock.poll(secs(6), token));
    }

    #[test]
    fn stale_token_is_dropped_without_firing() {
        let token = TurnToken::default();
        let mut clock = TurnClock::new();
        clock.schedule(token, secs(0), secs(5));

        let advanced = token.bumped();
        assert!(!clock.poll(secs(10), advanced));
        assert!(!clock.is_armed());
    }

    #[test]
    fn cancel_disarms_the_pending_deadline() {
        let token = TurnToken::default();
        let mut clock = TurnClock::new();
        clock.schedule(token, secs(0), secs(1));
        clock.cancel();
        assert!(!clock.poll(secs(2), token));
    }
}
