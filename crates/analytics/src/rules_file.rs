//! Rule definitions authored as files.
//!
//! TOML files hold one `[[rule]]` table per definition; JSON files hold a
//! top-level array. The format is picked from the file extension.

use serde::Deserialize;
use std::path::Path;
use tally_core::RuleDefinition;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RulesFileError {
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported rules file extension: '{0}'")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulesFormat {
    Toml,
    Json,
}

impl RulesFormat {
    pub fn from_path(path: &Path) -> Result<Self, RulesFileError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();
        match ext.as_str() {
            "toml" => Ok(RulesFormat::Toml),
            "json" => Ok(RulesFormat::Json),
            other => Err(RulesFileError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[derive(Deserialize)]
struct TomlRules {
    #[serde(default)]
    rule: Vec<RuleDefinition>,
}

pub fn from_toml(content: &str) -> Result<Vec<RuleDefinition>, RulesFileError> {
    let file: TomlRules = toml::from_str(content)?;
    Ok(file.rule)
}

pub fn from_json(content: &str) -> Result<Vec<RuleDefinition>, RulesFileError> {
    Ok(serde_json::from_str(content)?)
}

pub fn parse(content: &str, format: RulesFormat) -> Result<Vec<RuleDefinition>, RulesFileError> {
    match format {
        RulesFormat::Toml => from_toml(content),
        RulesFormat::Json => from_json(content),
    }
}
