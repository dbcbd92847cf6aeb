//! StatSource - Trait and content types that contribute stats

mod model;
mod modifier;
mod talent;

pub use model::CharacterModel;
pub use modifier::Modifier;
pub use talent::Talent;

use crate::stat_block::StatAccumulator;

/// Trait for anything that contributes stats to a StatModel
pub trait StatSource: Send + Sync {
    /// Unique identifier for this source
    fn id(&self) -> &str;

    /// Priority for application order (higher = applied later)
    /// Default priority is 0.
    /// Priorities in use:
    /// - Rule defaults: -200
    /// - Character model: -100
    /// - Talent: 0
    /// - Modifiers: 200
    fn priority(&self) -> i32 {
        0
    }

    /// Apply this source's stats to the accumulator
    fn apply(&self, stats: &mut StatAccumulator);
}
