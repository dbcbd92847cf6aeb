//! Build specs - player-authored builds resolved against a catalog

use super::ContentCatalog;
use crate::chain::{ChainLimits, EvalError, SkillNode, SkillTree, TriggerCondition};
use crate::combat::{simulate_fight, EnemyProfile, FightConfig, FightResult};
use crate::source::Modifier;
use crate::stat_block::StatModel;
use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Build assembly error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Unknown character model: {0}")]
    UnknownModel(String),
    #[error("Unknown talent: {0}")]
    UnknownTalent(String),
    #[error("Unknown skill: {0}")]
    UnknownSkill(String),
    #[error("Unknown modifier: {0}")]
    UnknownModifier(String),
    #[error("Unknown enemy preset: {0}")]
    UnknownEnemyPreset(String),
    #[error("Cannot evaluate build: {0}")]
    Eval(#[from] EvalError),
}

/// A build as the player writes it: catalog ids only
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub model: String,
    #[serde(default)]
    pub talent: Option<String>,
    pub main_skill: String,
    #[serde(default)]
    pub main_modifiers: Vec<String>,
    #[serde(default)]
    pub triggers: Vec<TriggerSpec>,
}

/// One trigger edge and the subtree it leads to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerSpec {
    pub condition: TriggerCondition,
    pub skill: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub triggers: Vec<TriggerSpec>,
}

impl TriggerSpec {
    pub fn new(condition: impl Into<TriggerCondition>, skill: &str) -> Self {
        TriggerSpec {
            condition: condition.into(),
            skill: skill.to_string(),
            modifiers: Vec::new(),
            triggers: Vec::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: &str) -> Self {
        self.modifiers.push(modifier.to_string());
        self
    }

    pub fn with_trigger(mut self, trigger: TriggerSpec) -> Self {
        self.triggers.push(trigger);
        self
    }
}

/// A build ready for evaluation
#[derive(Debug, Clone)]
pub struct AssembledBuild {
    pub name: String,
    pub stats: StatModel,
    pub tree: SkillTree,
}

impl BuildSpec {
    pub fn new(model: &str, main_skill: &str) -> Self {
        BuildSpec {
            model: model.to_string(),
            main_skill: main_skill.to_string(),
            ..Default::default()
        }
    }

    pub fn with_talent(mut self, talent: &str) -> Self {
        self.talent = Some(talent.to_string());
        self
    }

    pub fn with_modifier(mut self, modifier: &str) -> Self {
        self.main_modifiers.push(modifier.to_string());
        self
    }

    pub fn with_trigger(mut self, trigger: TriggerSpec) -> Self {
        self.triggers.push(trigger);
        self
    }

    /// Resolve every id against the catalog
    pub fn assemble(&self, catalog: &ContentCatalog) -> Result<AssembledBuild, BuildError> {
        let model = catalog
            .model(&self.model)
            .ok_or_else(|| BuildError::UnknownModel(self.model.clone()))?;
        let talent = match &self.talent {
            Some(id) => Some(
                catalog
                    .talent(id)
                    .ok_or_else(|| BuildError::UnknownTalent(id.clone()))?,
            ),
            None => None,
        };
        let stats = StatModel::new(&catalog.rules, model, talent);

        let mut tree = SkillTree::new();
        let root = tree.add_node(node(catalog, &self.main_skill, &self.main_modifiers)?);
        add_triggers(catalog, &mut tree, root, &self.triggers)?;

        let name = self
            .name
            .clone()
            .unwrap_or_else(|| format!("{} / {}", model.name, self.main_skill));
        Ok(AssembledBuild { name, stats, tree })
    }
}

fn node(catalog: &ContentCatalog, skill: &str, modifiers: &[String]) -> Result<SkillNode, BuildError> {
    let skill = catalog
        .skill(skill)
        .ok_or_else(|| BuildError::UnknownSkill(skill.to_string()))?;
    let modifiers = modifiers
        .iter()
        .map(|id| {
            catalog
                .modifier(id)
                .cloned()
                .ok_or_else(|| BuildError::UnknownModifier(id.clone()))
        })
        .collect::<Result<Vec<Modifier>, _>>()?;

    Ok(SkillNode {
        skill: skill.clone(),
        modifiers,
        triggers: Vec::new(),
    })
}

fn add_triggers(
    catalog: &ContentCatalog,
    tree: &mut SkillTree,
    parent: NodeId,
    triggers: &[TriggerSpec],
) -> Result<(), BuildError> {
    for trigger in triggers {
        let child = tree.add_node(node(catalog, &trigger.skill, &trigger.modifiers)?);
        tree.link(parent, trigger.condition.clone(), child)?;
        add_triggers(catalog, tree, child, &trigger.triggers)?;
    }
    Ok(())
}

/// A build plus the fight it should be run in
///
/// Unset fight fields come from the named enemy preset, then from the
/// catalog rules, then from the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub build: BuildSpec,
    #[serde(default)]
    pub enemy_preset: Option<String>,
    #[serde(default)]
    pub enemy: Option<EnemyProfile>,
    #[serde(default)]
    pub time_step: Option<f64>,
    #[serde(default)]
    pub max_time: Option<f64>,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub limits: Option<ChainLimits>,
}

impl Scenario {
    pub fn new(build: BuildSpec) -> Self {
        Scenario {
            build,
            ..Default::default()
        }
    }

    pub fn with_preset(mut self, preset: &str) -> Self {
        self.enemy_preset = Some(preset.to_string());
        self
    }

    pub fn with_enemy(mut self, enemy: EnemyProfile) -> Self {
        self.enemy = Some(enemy);
        self
    }

    /// Fight parameters after preset and rule fallbacks
    pub fn fight_config(&self, catalog: &ContentCatalog) -> Result<FightConfig, BuildError> {
        let mut config = FightConfig {
            seed: self.seed,
            limits: self.limits.unwrap_or_else(|| catalog.rules.limits()),
            ..Default::default()
        };

        if let Some(id) = &self.enemy_preset {
            let preset = catalog
                .rules
                .enemy_preset(id)
                .ok_or_else(|| BuildError::UnknownEnemyPreset(id.clone()))?;
            config.enemy = preset.enemy.clone();
            if let Some(max_time) = preset.max_time {
                config.max_time = max_time;
            }
        }
        if let Some(enemy) = &self.enemy {
            config.enemy = enemy.clone();
        }
        if let Some(time_step) = self.time_step {
            config.time_step = time_step;
        }
        if let Some(max_time) = self.max_time {
            config.max_time = max_time;
        }
        Ok(config)
    }

    /// Assemble the build and fight it out
    pub fn run(&self, catalog: &ContentCatalog) -> Result<FightResult, BuildError> {
        let build = self.build.assemble(catalog)?;
        let config = self.fight_config(catalog)?;
        Ok(simulate_fight(&build.tree, &build.stats, config)?)
    }
}
