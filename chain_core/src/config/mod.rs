//! Configuration loading from TOML files

mod build;
mod catalog;
mod rules;

pub use build::{AssembledBuild, BuildError, BuildSpec, Scenario, TriggerSpec};
pub use catalog::{default_catalog, load_catalog, parse_catalog, ContentCatalog};
pub use rules::{AttributeConversion, EnemyPreset, Rules};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Content loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid content: {0}")]
    Validation(String),
}

/// Read a TOML file into any serde type (catalogs, scenarios, rule overrides)
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = content.len(), "read content file");
    parse_toml(&content)
}

pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    Ok(toml::from_str(content)?)
}
