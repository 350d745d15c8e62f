use async_trait::async_trait;
use std::future::Future;
use std::path::{Path, PathBuf};
use tally_core::{Rule, RuleDefinition};
use thiserror::Error;

use crate::rules_file::{self, RulesFileError, RulesFormat};
use crate::validate::{build_rule, validate_rules, RuleReport};

#[derive(Debug, Error)]
pub enum RuleFetchError {
    #[error("Rule store unavailable: {0}")]
    Unavailable(String),
    #[error("Failed to read rules file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid rules file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: RulesFileError,
    },
    #[error("Rules file {path} has {count} invalid definition(s)")]
    InvalidDefinitions { path: PathBuf, count: usize },
}

/// Source of the current rule set. Called once per classification; the engine
/// filters by state itself and never caches what it receives.
#[async_trait]
pub trait RuleProvider: Send + Sync {
    async fn fetch_rules(&self) -> Result<Vec<Rule>, RuleFetchError>;
}

/// An in-memory snapshot.
#[async_trait]
impl RuleProvider for [Rule] {
    async fn fetch_rules(&self) -> Result<Vec<Rule>, RuleFetchError> {
        Ok(self.to_vec())
    }
}

#[async_trait]
impl RuleProvider for Vec<Rule> {
    async fn fetch_rules(&self) -> Result<Vec<Rule>, RuleFetchError> {
        self.as_slice().fetch_rules().await
    }
}

/// Adapter for caller-supplied async closures. See [`provider_fn`].
pub struct FnProvider<F> {
    fetch: F,
}

pub fn provider_fn<F, Fut>(fetch: F) -> FnProvider<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<Rule>, RuleFetchError>> + Send + 'static,
{
    FnProvider { fetch }
}

#[async_trait]
impl<F, Fut> RuleProvider for FnProvider<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<Rule>, RuleFetchError>> + Send + 'static,
{
    async fn fetch_rules(&self) -> Result<Vec<Rule>, RuleFetchError> {
        (self.fetch)().await
    }
}

/// Reads a TOML or JSON rules file on every fetch. Any invalid definition
/// fails the whole fetch.
#[derive(Debug, Clone)]
pub struct FileRuleProvider {
    path: PathBuf,
}

impl FileRuleProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw definitions, unvalidated.
    pub async fn definitions(&self) -> Result<Vec<RuleDefinition>, RuleFetchError> {
        let format = RulesFormat::from_path(&self.path).map_err(|source| RuleFetchError::File {
            path: self.path.clone(),
            source,
        })?;
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| RuleFetchError::Io {
                path: self.path.clone(),
                source,
            })?;
        rules_file::parse(&content, format).map_err(|source| RuleFetchError::File {
            path: self.path.clone(),
            source,
        })
    }
}

#[async_trait]
impl RuleProvider for FileRuleProvider {
    async fn fetch_rules(&self) -> Result<Vec<Rule>, RuleFetchError> {
        let definitions = self.definitions().await?;
        let reports = validate_rules(&definitions);
        let mut rules = Vec::with_capacity(definitions.len());
        let mut invalid = 0;

        // File-level reports also catch duplicate ids.
        for (definition, RuleReport { rule_id, report }) in definitions.into_iter().zip(reports) {
            let built = if report.valid {
                build_rule(definition)
            } else {
                Err(report)
            };
            match built {
                Ok(rule) => rules.push(rule),
                Err(report) => {
                    invalid += 1;
                    tracing::warn!(
                        rule_id = %rule_id,
                        path = %self.path.display(),
                        errors = ?report.errors,
                        "invalid rule definition"
                    );
                }
            }
        }

        if invalid > 0 {
            return Err(RuleFetchError::InvalidDefinitions {
                path: self.path.clone(),
                count: invalid,
            });
        }

        tracing::debug!(path = %self.path.display(), count = rules.len(), "loaded rules file");
        Ok(rules)
    }
}
