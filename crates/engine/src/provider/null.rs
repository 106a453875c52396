use trialview_types::{ArtifactError, Trial, TrialStatus};

use super::StatusProvider;

/// Provider with no trials. Every fetch reports `NotFound`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProvider;

#[async_trait::async_trait]
impl StatusProvider for NullProvider {
    fn list_trials(&self) -> Vec<Trial> {
        Vec::new()
    }

    fn get_status(&self, _key: &str) -> TrialStatus {
        TrialStatus::Empty
    }

    async fn get_log_text(&self, key: &str) -> Result<String, ArtifactError> {
        Err(ArtifactError::not_found(key))
    }

    async fn get_results_text(&self, key: &str) -> Result<String, ArtifactError> {
        Err(ArtifactError::not_found(key))
    }

    async fn mark_ready_for_processing(&self, key: &str) -> Result<(), ArtifactError> {
        Err(ArtifactError::not_found(key))
    }
}
