//! Tunables for the checker and the session driver.
//!
//! Both configs deserialize from JSON with every field optional.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),
}

/// Options for transcript matching.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Cache results per (node, position). Never changes the outcome.
    pub memoize: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { memoize: true }
    }
}

/// Options for a [`Session`](crate::session::Session).
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Keep a `StepRecord` for every external step.
    pub record_history: bool,
    /// Refuse external steps beyond this many.
    pub step_limit: Option<usize>,
}

impl SessionConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::DeserializationFailed(e.to_string()))
    }

    pub fn record_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }

    pub fn step_limit(mut self, limit: usize) -> Self {
        self.step_limit = Some(limit);
        self
    }
}

impl MatchConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::DeserializationFailed(e.to_string()))
    }
}
