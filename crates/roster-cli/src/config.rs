//! Import settings loaded from an optional TOML file.
//!
//! ```toml
//! [mapping]
//! min_confidence = 0.6
//! profile = "web"
//!
//! [ingest]
//! max_upload_bytes = 10485760
//!
//! [commit]
//! create_classes = true
//! database = "district.sqlite3"
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use roster_commit::CommitOptions;
use roster_ingest::ReadOptions;
use roster_map::MapperOptions;

/// Database file used when neither the settings file nor `--database` names one.
pub const DEFAULT_DATABASE: &str = "roster.sqlite3";

/// Accepted values of `mapping.min_confidence` and `--min-confidence`.
pub const MIN_CONFIDENCE_RANGE: RangeInclusive<f32> = 0.0..=1.0;

/// Parses a minimum confidence, rejecting values outside [`MIN_CONFIDENCE_RANGE`].
pub fn parse_min_confidence(raw: &str) -> std::result::Result<f32, String> {
    let value: f32 = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if MIN_CONFIDENCE_RANGE.contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not between 0 and 1"))
    }
}

/// All tunables of an import run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    pub mapping: MapperOptions,
    pub ingest: ReadOptions,
    pub commit: CommitSettings,
}

/// `[commit]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitSettings {
    pub create_classes: bool,
    pub database: PathBuf,
}

impl Default for CommitSettings {
    fn default() -> Self {
        Self {
            create_classes: false,
            database: PathBuf::from(DEFAULT_DATABASE),
        }
    }
}

impl CommitSettings {
    pub fn options(&self) -> CommitOptions {
        CommitOptions {
            create_classes: self.create_classes,
        }
    }
}

impl ImportSettings {
    /// Reads settings from `path`. A missing or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read settings {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parse settings {}", path.display()))
    }

    /// Settings from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)?;
        anyhow::ensure!(
            MIN_CONFIDENCE_RANGE.contains(&settings.mapping.min_confidence),
            "mapping.min_confidence must be between 0 and 1, got {}",
            settings.mapping.min_confidence
        );
        Ok(settings)
    }
}
