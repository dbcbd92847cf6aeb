//! Content catalog - models, talents, skills and modifiers

use super::{ConfigError, Rules};
use crate::damage::Skill;
use crate::source::{CharacterModel, Modifier, Talent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::warn;

/// Read-only content shared by every evaluation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentCatalog {
    #[serde(default)]
    pub rules: Rules,
    #[serde(default)]
    pub models: Vec<CharacterModel>,
    #[serde(default)]
    pub talents: Vec<Talent>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

impl ContentCatalog {
    pub fn model(&self, id: &str) -> Option<&CharacterModel> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn talent(&self, id: &str) -> Option<&Talent> {
        self.talents.iter().find(|t| t.id == id)
    }

    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.id == id)
    }

    pub fn modifier(&self, id: &str) -> Option<&Modifier> {
        self.modifiers.iter().find(|m| m.id == id)
    }

    /// Reject empty or duplicate ids within each kind
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_ids("model", self.models.iter().map(|m| m.id.as_str()))?;
        check_ids("talent", self.talents.iter().map(|t| t.id.as_str()))?;
        check_ids("skill", self.skills.iter().map(|s| s.id.as_str()))?;
        check_ids("modifier", self.modifiers.iter().map(|m| m.id.as_str()))?;
        check_ids(
            "enemy preset",
            self.rules.enemy_presets.iter().map(|p| p.id.as_str()),
        )?;
        Ok(())
    }
}

fn check_ids<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if id.is_empty() {
            return Err(ConfigError::Validation(format!("{} with empty id", kind)));
        }
        if !seen.insert(id) {
            return Err(ConfigError::Validation(format!(
                "duplicate {} id '{}'",
                kind, id
            )));
        }
    }
    Ok(())
}

/// Load and validate a catalog from a TOML file
pub fn load_catalog(path: &Path) -> Result<ContentCatalog, ConfigError> {
    let catalog: ContentCatalog = super::load_toml(path)?;
    catalog.validate()?;
    Ok(catalog)
}

/// Parse and validate a catalog from a TOML string
pub fn parse_catalog(content: &str) -> Result<ContentCatalog, ConfigError> {
    let catalog: ContentCatalog = super::parse_toml(content)?;
    catalog.validate()?;
    Ok(catalog)
}

/// Get the built-in catalog
pub fn default_catalog() -> ContentCatalog {
    let toml = include_str!("../../content/default.toml");
    parse_catalog(toml).unwrap_or_else(|err| {
        warn!(error = %err, "built-in catalog failed to load");
        ContentCatalog::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_loads() {
        let toml = include_str!("../../content/default.toml");
        let catalog = parse_catalog(toml).unwrap();
        assert!(!catalog.models.is_empty());
        assert!(!catalog.skills.is_empty());
        assert!(catalog.skills.iter().any(|s| s.damage_components.is_empty()));
        assert!(!catalog.rules.enemy_presets.is_empty());
    }

    #[test]
    fn test_lookups() {
        let catalog = default_catalog();
        assert!(catalog.model("warrior").is_some());
        assert!(catalog.skill("heavy_strike").is_some());
        assert!(catalog.modifier("no_such_modifier").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let toml = r#"
[[skills]]
id = "slash"
name = "Slash"

[[skills]]
id = "slash"
name = "Slash Again"
"#;
        let err = parse_catalog(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("slash")));
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            parse_catalog("[[models]]\nid = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_catalog(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
