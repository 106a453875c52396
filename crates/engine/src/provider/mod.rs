//! Status provider seam and its implementations.
//!
//! Modules:
//! - `null`: No-op provider for tests and disabled scenarios
//! - `memory`: In-memory provider for tests and demos
//! - `fs`: Directory-backed provider deriving status from marker files

mod fs;
mod memory;
mod null;

pub use fs::{FsStatusProvider, LOG_FILE, PROCESSING_MARKER, READY_MARKER, RESULTS_FILE};
pub use memory::MemoryProvider;
pub use null::NullProvider;

use trialview_types::{ArtifactError, Trial, TrialStatus};

/// Capability set the trial view consumes from the component that owns trial
/// storage, status computation, and job submission.
///
/// `list_trials` and `get_status` read the provider's current snapshot and
/// never fail. Artifact fetches and the processing command are asynchronous.
#[async_trait::async_trait]
pub trait StatusProvider: Send + Sync {
    /// Ordered trial listing; empty when there are none.
    fn list_trials(&self) -> Vec<Trial>;

    /// Status for `key`. Unknown keys report [`TrialStatus::Empty`].
    fn get_status(&self, key: &str) -> TrialStatus;

    /// Raw processing log for a trial.
    async fn get_log_text(&self, key: &str) -> Result<String, ArtifactError>;

    /// Raw results text, expected to parse as a results record.
    async fn get_results_text(&self, key: &str) -> Result<String, ArtifactError>;

    /// Queue the trial for processing.
    async fn mark_ready_for_processing(&self, key: &str) -> Result<(), ArtifactError>;

    /// Positional lookup into [`StatusProvider::list_trials`].
    fn trial_at(&self, index: usize) -> Option<Trial> {
        self.list_trials().into_iter().nth(index)
    }
}
