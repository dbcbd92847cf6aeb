//! Trigger-chain propagator
//!
//! A build is a [`SkillTree`]: the main skill at the root, each node carrying
//! its own modifiers and trigger edges. [`propagate`] converts the discrete
//! trigger conditions into expected proc rates and sums the damage of every
//! reachable node, along with the expected healing and mitigation.

mod condition;
mod profile;
mod propagate;
mod tree;

pub use condition::TriggerCondition;
pub use profile::{
    blended_multiplier, uptime, SideEffectProfile, MAX_DAMAGE_TAKEN_MULT, MIN_DAMAGE_TAKEN_MULT,
};
pub use propagate::{
    propagate, ChainEvaluation, ChainLimits, EvalContext, EvalError, NodeLog, NodeRole,
};
pub use tree::{SkillNode, SkillTree, TriggerEdge};
