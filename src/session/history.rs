//! Step history of a driven session.
//!
//! History is immutable: `record` returns a new history with the step
//! appended.

use crate::core::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One external step: what went in, what came out, and the state names
/// on either side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// 1-based index of the step within its session
    pub step: usize,
    pub from: String,
    pub to: String,
    pub input: Message,
    pub output: Message,
    pub timestamp: DateTime<Utc>,
}

/// Ordered record of a session's steps.
///
/// # Example
///
/// ```rust
/// use chanalg::core::Message;
/// use chanalg::session::{StepHistory, StepRecord};
/// use chrono::Utc;
/// use serde_json::json;
///
/// let history = StepHistory::new();
/// let history = history.record(StepRecord {
///     step: 1,
///     from: "a".to_string(),
///     to: "b".to_string(),
///     input: Message::result(json!(1)),
///     output: Message::new("continue/result", json!(1)),
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.path(), vec!["a", "b"]);
/// assert_eq!(history.transcript(), vec!["continue/result"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StepHistory {
    records: Vec<StepRecord>,
}

impl StepHistory {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Record a step, returning a new history.
    pub fn record(&self, record: StepRecord) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    /// State names visited: the first step's `from`, then every `to`.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.records.first() {
            path.push(first.from.as_str());
        }
        for record in &self.records {
            path.push(record.to.as_str());
        }
        path
    }

    /// Time between the first and last recorded step.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.first(), self.records.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Output channels in order, ready to be checked against a protocol.
    pub fn transcript(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| record.output.channel.to_string())
            .collect()
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }
}
