//! Prelude module for convenient imports
//!
//! ```rust
//! use chain_core::prelude::*;
//! ```

// Core types
pub use crate::stat_block::{StatModel, StatTable};
pub use crate::types::{DamageType, NodeId};

// Damage pipeline
pub use crate::damage::{evaluate, DamageComponent, Skill, SkillEffects};

// Trigger chain
pub use crate::chain::{propagate, ChainLimits, EvalContext, SkillNode, SkillTree, TriggerCondition};

// Combat
pub use crate::combat::{simulate_fight, EnemyProfile, Fight, FightConfig, FightResult, Outcome};

// Sources
pub use crate::source::{CharacterModel, Modifier, Talent};

// Config
pub use crate::config::{default_catalog, BuildSpec, ContentCatalog, Scenario, TriggerSpec};
