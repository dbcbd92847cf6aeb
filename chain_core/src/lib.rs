//! chain_core - Expected-value build evaluator
//!
//! This library provides:
//! - StatModel: Resolved stat tables from a character, talent and modifiers
//! - Damage pipeline: Expected hit and DPS of a single skill
//! - Trigger-chain propagation: Proc rates, total DPS and survival effects of a skill tree
//! - Fight simulation: Deterministic hero vs enemy loop with a fingerprinted result

pub mod chain;
pub mod combat;
pub mod config;
pub mod damage;
pub mod prelude;
pub mod source;
pub mod stat_block;
pub mod types;

// Re-export core types for convenience
pub use chain::{
    propagate, ChainEvaluation, ChainLimits, EvalContext, EvalError, NodeLog, SideEffectProfile,
    SkillNode, SkillTree, TriggerCondition,
};
pub use combat::{
    compare_builds, simulate_fight, BuildComparison, EnemyProfile, Fight, FightConfig, FightResult,
    Outcome,
};
pub use config::{default_catalog, BuildSpec, ContentCatalog, Rules, Scenario};
pub use damage::{evaluate, DamageComponent, Skill, SkillEffects, SkillEvaluation};
pub use source::{CharacterModel, Modifier, StatSource, Talent};
pub use stat_block::{resolve, DynamicStat, StatModel, StatTable};
pub use types::{DamageType, NodeId};
