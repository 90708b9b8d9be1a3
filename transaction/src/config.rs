//! Store configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// How many constraints of one property are evaluated at commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Evaluate every constraint and report every failure.
    #[default]
    All,
    /// Stop at the first failing constraint of each property.
    FirstPerProperty,
}

/// Commit-time behaviour of a [`Database`](crate::Database).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Constraint evaluation policy
    pub validation: ValidationPolicy,

    /// Reject commits leaving a required link (`One`, `OneOrMore`) empty
    pub enforce_link_cardinality: bool,

    /// Keep at most this many violations in a rejected commit
    pub max_reported_violations: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            validation: ValidationPolicy::All,
            enforce_link_cardinality: true,
            max_reported_violations: None,
        }
    }
}

impl StoreConfig {
    pub fn with_validation(mut self, policy: ValidationPolicy) -> Self {
        self.validation = policy;
        self
    }

    pub fn with_link_cardinality(mut self, enforce: bool) -> Self {
        self.enforce_link_cardinality = enforce;
        self
    }

    pub fn with_max_reported_violations(mut self, max: usize) -> Self {
        self.max_reported_violations = Some(max);
        self
    }

    /// Parse configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from file, or the defaults if it does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::from_toml_str(&contents)
        } else {
            Ok(Self::default())
        }
    }
}
