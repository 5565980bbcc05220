mod belief;
mod peek;
mod play;
mod suspicion;

pub use belief::{BeliefModel, MAX_RANK_COPIES, RankCounts};
pub use peek::PeekLedger;
pub use play::PlayPlanner;
pub use suspicion::{LARGE_PLAY_MULTIPLIER, LARGE_PLAY_THRESHOLD, call_probability, decide_call};
