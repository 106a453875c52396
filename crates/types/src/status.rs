use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Lifecycle stage of a trial as reported by the status provider.
///
/// The set of tags is closed; the string forms match the tags used by the
/// processing backend (`empty`, `could-process`, `waiting`, `processing`,
/// `done`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrialStatus {
    /// Nothing has been uploaded for the trial yet.
    #[default]
    Empty,
    /// Capture files are present and the trial can be queued.
    CouldProcess,
    /// Queued and waiting for a processing server.
    Waiting,
    /// A processing server is working on the trial.
    Processing,
    /// Processing finished; log and results are available.
    Done,
}

impl TrialStatus {
    pub const ALL: [TrialStatus; 5] = [
        TrialStatus::Empty,
        TrialStatus::CouldProcess,
        TrialStatus::Waiting,
        TrialStatus::Processing,
        TrialStatus::Done,
    ];

    /// Wire tag for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrialStatus::Empty => "empty",
            TrialStatus::CouldProcess => "could-process",
            TrialStatus::Waiting => "waiting",
            TrialStatus::Processing => "processing",
            TrialStatus::Done => "done",
        }
    }

    /// Returns `true` for the terminal state whose artifacts can be fetched.
    pub fn is_done(&self) -> bool {
        matches!(self, TrialStatus::Done)
    }
}

impl fmt::Display for TrialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when a status tag is not one of the known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trial status tag: {0}")]
pub struct UnknownStatusTag(pub String);

impl FromStr for TrialStatus {
    type Err = UnknownStatusTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrialStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| UnknownStatusTag(s.to_string()))
    }
}
