use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV: &str = "TALLY_CONFIG";
pub const RULES_ENV: &str = "TALLY_RULES";
pub const LOG_ENV: &str = "TALLY_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("No rules file given: pass --rules, set TALLY_RULES, or set rules_path in tally.toml")]
    NoRulesPath,
}

/// Settings from `tally.toml`, then `TALLY_*` variables, then command-line flags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub rules_path: Option<PathBuf>,
    pub log_level: String,
    pub pretty: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            rules_path: None,
            log_level: "info".to_string(),
            pretty: false,
        }
    }
}

impl CliConfig {
    /// An explicit path (flag or `TALLY_CONFIG`) must exist; the per-user
    /// default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(rules) = lookup(RULES_ENV).filter(|v| !v.is_empty()) {
            self.rules_path = Some(PathBuf::from(rules));
        }
        if let Some(level) = lookup(LOG_ENV).filter(|v| !v.is_empty()) {
            self.log_level = level;
        }
    }

    pub fn rules_path(&self, flag: Option<&Path>) -> Result<PathBuf, ConfigError> {
        flag.map(Path::to_path_buf)
            .or_else(|| self.rules_path.clone())
            .ok_or(ConfigError::NoRulesPath)
    }
}

fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "tally", "Tally")
        .map(|dirs| dirs.config_dir().join("tally.toml"))
}
