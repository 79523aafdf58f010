//! Source specifications and the sources configuration file.
//!
//! A source specification is the minimal configuration record needed to
//! instantiate a simple-index repository: a `url` and a `name`.

use anyhow::Context;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PoolError, Result};

/// Environment variable overriding the sources file location.
pub const CONFIG_ENV: &str = "PKGPOOL_CONFIG";

/// A repository source as found in configuration.
///
/// Keys other than `name` and `url` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SourceSpec {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            url: Some(url.into()),
        }
    }

    /// Interpret an arbitrary configuration value as a source specification.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(PoolError::Configuration(format!(
                "Unsupported source specified: expected a mapping, got {}",
                value
            )));
        }
        serde_json::from_value(value)
            .map_err(|e| PoolError::Configuration(format!("Invalid source specification: {}", e)))
    }

    /// Check the specification and return its `(name, url)` pair.
    ///
    /// A source without `url` is an unsupported shape; a `url` without a
    /// `name` cannot be registered.
    pub fn validate(&self) -> Result<(&str, &str)> {
        let Some(url) = self.url.as_deref() else {
            return Err(PoolError::Configuration(
                "Unsupported source specified".to_string(),
            ));
        };
        let Some(name) = self.name.as_deref() else {
            return Err(PoolError::Configuration(
                "Missing [name] in source.".to_string(),
            ));
        };
        Ok((name, url))
    }
}

/// A local JSON index to load as an index repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub name: String,
    pub path: PathBuf,
}

/// Contents of the sources configuration file.
///
/// ```json
/// {
///   "indexes": [{"name": "local", "path": "index.json"}],
///   "sources": [{"name": "private", "url": "https://example.test/simple"}]
/// }
/// ```
///
/// Relative index paths are resolved against the file's directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesFile {
    #[serde(default)]
    pub indexes: Vec<IndexSpec>,
    #[serde(default)]
    pub sources: Vec<serde_json::Value>,
}

impl SourcesFile {
    /// Load a sources file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sources file {:?}", path))?;
        let mut file: SourcesFile = serde_json::from_str(&content).map_err(|e| {
            PoolError::Configuration(format!("Invalid sources file {:?}: {}", path, e))
        })?;

        if let Some(base) = path.parent() {
            for index in &mut file.indexes {
                if index.path.is_relative() {
                    index.path = base.join(&index.path);
                }
            }
        }

        debug!(
            "Loaded {} index(es) and {} source(s) from {:?}",
            file.indexes.len(),
            file.sources.len(),
            path
        );
        Ok(file)
    }

    /// Load a sources file if it exists; a missing file is an empty config.
    pub fn load_optional(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No sources file at {:?}", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse the `sources` entries into specifications.
    pub fn source_specs(&self) -> Result<Vec<SourceSpec>> {
        self.sources
            .iter()
            .cloned()
            .map(SourceSpec::from_value)
            .collect()
    }
}

/// Default sources file: `<config_dir>/pkgpool/sources.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pkgpool").join("sources.json"))
}

/// Parse a `NAME=VALUE` command-line pair.
pub fn parse_named(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() && !value.is_empty() => {
            Ok((name.to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}
