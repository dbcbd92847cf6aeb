//! Damage pipeline - Skill content and expected-hit evaluation

mod calculation;
mod conversion;
mod skill;

pub use calculation::{evaluate, expected_hit, SkillEvaluation, FALLBACK_ATTACK_RATE};
pub use conversion::{apply_conversions, conversions_from_stats, DamageConversion};
pub use skill::{DamageComponent, Skill, SkillEffects};
