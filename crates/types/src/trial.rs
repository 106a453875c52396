use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One uploaded capture, as enumerated by the status provider.
///
/// Trials are immutable from the viewer's perspective; only the provider
/// creates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trial {
    /// Unique identifier, typically the storage path of the trial.
    pub key: String,
    pub last_modified: DateTime<Utc>,
    /// Total byte length of the uploaded files.
    pub size: u64,
}

impl Trial {
    pub fn new(key: impl Into<String>, last_modified: DateTime<Utc>, size: u64) -> Self {
        Self {
            key: key.into(),
            last_modified,
            size,
        }
    }
}
