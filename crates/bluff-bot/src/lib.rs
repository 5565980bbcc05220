pub mod bot;

pub use bot::{
    BeliefModel, MAX_RANK_COPIES, PeekLedger, PlayPlanner, RankCounts, call_probability,
    decide_call,
};
