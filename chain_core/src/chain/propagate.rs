//! Trigger-chain propagation - expected DPS and survival effects of a tree

use super::{SideEffectProfile, SkillTree, TriggerCondition};
use crate::damage::evaluate;
use crate::stat_block::StatModel;
use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Recursion bounds for one propagation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainLimits {
    /// Deepest trigger level walked; the root is depth 0
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Edges followed per node, in declaration order
    #[serde(default)]
    pub max_triggers: Option<usize>,
}

fn default_max_depth() -> usize {
    3
}

impl Default for ChainLimits {
    fn default() -> Self {
        ChainLimits {
            max_depth: default_max_depth(),
            max_triggers: None,
        }
    }
}

impl ChainLimits {
    pub fn new(max_depth: usize) -> Self {
        ChainLimits {
            max_depth,
            max_triggers: None,
        }
    }

    pub fn with_max_triggers(mut self, max_triggers: usize) -> Self {
        self.max_triggers = Some(max_triggers);
        self
    }
}

/// Per-evaluation state read by trigger conditions and dynamic stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalContext {
    /// Hero current / max health, in [0, 1]
    pub hero_health_fraction: f64,
}

impl Default for EvalContext {
    fn default() -> Self {
        EvalContext {
            hero_health_fraction: 1.0,
        }
    }
}

impl EvalContext {
    /// Context at the given health fraction, clamped to [0, 1]
    pub fn at_health(fraction: f64) -> Self {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        EvalContext {
            hero_health_fraction: fraction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Main,
    Trigger,
}

/// Contribution of one visited node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLog {
    pub node: NodeId,
    pub skill_id: String,
    pub skill_name: String,
    pub role: NodeRole,
    pub depth: usize,
    /// Condition of the edge that reached this node; `None` for the root
    pub via: Option<TriggerCondition>,
    /// Firing rate used: native attack rate for the root, proc rate otherwise
    pub rate: f64,
    pub average_hit: f64,
    pub dps: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainEvaluation {
    /// Sum of every logged node's dps
    pub total_dps: f64,
    pub node_log: Vec<NodeLog>,
    pub profile: SideEffectProfile,
}

/// Conditions under which a build cannot be evaluated at all
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("skill tree has no nodes")]
    EmptyTree,
    #[error("skill tree has no root node")]
    MissingRoot,
    #[error("node {0} is not in the skill tree")]
    UnknownNode(NodeId),
    #[error("hero max health must be positive, got {0}")]
    NonPositiveMaxHealth(f64),
}

/// Walk the tree from its root, turning trigger conditions into proc rates
///
/// A triggered node keeps its own average hit; only its firing rate is
/// replaced by the proc rate. Nodes already on the current path are not
/// re-entered, and `max_depth` is never exceeded.
pub fn propagate(
    tree: &SkillTree,
    model: &StatModel,
    ctx: &EvalContext,
    limits: &ChainLimits,
) -> Result<ChainEvaluation, EvalError> {
    let root = tree.checked_root()?;
    let hero_max_health = model.hero_max_health();
    if !(hero_max_health.is_finite() && hero_max_health > 0.0) {
        return Err(EvalError::NonPositiveMaxHealth(hero_max_health));
    }

    let mut walker = Walker {
        tree,
        model,
        ctx,
        limits,
        hero_max_health,
        path: Vec::new(),
        log: Vec::new(),
        profile: SideEffectProfile::new(),
    };
    walker.walk(root, None, 0, None);

    let total_dps = walker.log.iter().map(|entry| entry.dps).sum();
    Ok(ChainEvaluation {
        total_dps,
        node_log: walker.log,
        profile: walker.profile.clamped(),
    })
}

struct Walker<'a> {
    tree: &'a SkillTree,
    model: &'a StatModel,
    ctx: &'a EvalContext,
    limits: &'a ChainLimits,
    hero_max_health: f64,
    path: Vec<NodeId>,
    log: Vec<NodeLog>,
    profile: SideEffectProfile,
}

impl Walker<'_> {
    fn walk(
        &mut self,
        id: NodeId,
        proc_rate: Option<f64>,
        depth: usize,
        via: Option<&TriggerCondition>,
    ) {
        let tree = self.tree;
        // Callers only pass ids that are in the arena
        let Some(node) = tree.node(id) else {
            return;
        };
        let health = self.ctx.hero_health_fraction;

        let stats = self.model.resolve(&node.modifiers, health);
        let eval = evaluate(&node.skill, &stats);
        let rate = proc_rate.unwrap_or(eval.attack_rate).max(0.0);

        self.log.push(NodeLog {
            node: id,
            skill_id: node.skill.id.clone(),
            skill_name: node.skill.name.clone(),
            role: if depth == 0 {
                NodeRole::Main
            } else {
                NodeRole::Trigger
            },
            depth,
            via: via.cloned(),
            rate,
            average_hit: eval.average_hit,
            dps: eval.average_hit * rate,
        });

        if let Some(effects) = &node.skill.effects {
            self.profile.record(effects, rate, self.hero_max_health);
        }

        if depth >= self.limits.max_depth {
            return;
        }

        let followed = self.limits.max_triggers.unwrap_or(usize::MAX);
        self.path.push(id);
        for edge in node.triggers.iter().take(followed) {
            if tree.node(edge.target).is_none() {
                warn!(from = %id, target = %edge.target, "trigger edge points outside the tree");
                continue;
            }
            if !edge.condition.is_known() {
                warn!(skill = %node.skill.id, condition = %edge.condition, "unknown trigger condition");
                continue;
            }

            let child_rate = edge.condition.proc_rate(rate, eval.crit_rate, health);
            if child_rate <= 0.0 {
                continue;
            }
            if self.path.contains(&edge.target) {
                warn!(
                    from = %id,
                    target = %edge.target,
                    condition = %edge.condition,
                    "trigger cycle refused"
                );
                continue;
            }

            self.walk(edge.target, Some(child_rate), depth + 1, Some(&edge.condition));
        }
        self.path.pop();
    }
}
