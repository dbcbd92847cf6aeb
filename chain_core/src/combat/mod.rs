//! Combat - timed fight simulation and its result record

mod compare;
mod fight;
mod fingerprint;
mod result;

pub use compare::{compare_builds, BuildComparison, Side};
pub use fight::{
    base_mitigation, simulate_fight, BurstConfig, EnemyProfile, Fight, FightConfig, FightState,
    FightStatus, MAX_INCOMING_MULT, MIN_BASE_MITIGATION, MIN_INCOMING_MULT,
};
pub use fingerprint::{fingerprint, verify};
pub use result::{FightResult, FightSummary, Outcome, TerminationReason, TickSample};
