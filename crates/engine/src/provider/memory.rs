use std::{collections::HashMap, sync::Mutex};

use trialview_types::{ArtifactError, Trial, TrialStatus};

use super::StatusProvider;

#[derive(Debug, Default)]
struct MemoryState {
    trials: Vec<Trial>,
    statuses: HashMap<String, TrialStatus>,
    logs: HashMap<String, Result<String, ArtifactError>>,
    results: HashMap<String, Result<String, ArtifactError>>,
    log_requests: Vec<String>,
    results_requests: Vec<String>,
    mark_requests: Vec<String>,
}

/// In-memory provider.
///
/// Keeps trials, statuses, and artifacts behind a mutex and records every
/// request it receives so callers can assert on fetch and command traffic.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    state: Mutex<MemoryState>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`MemoryProvider::push_trial`].
    pub fn with_trial(self, trial: Trial, status: TrialStatus) -> Self {
        self.push_trial(trial, status);
        self
    }

    /// Append a trial to the ordered listing.
    pub fn push_trial(&self, trial: Trial, status: TrialStatus) {
        let mut state = self.state.lock().expect("memory provider lock");
        state.statuses.insert(trial.key.clone(), status);
        state.trials.push(trial);
    }

    pub fn remove_trial(&self, key: &str) {
        let mut state = self.state.lock().expect("memory provider lock");
        state.trials.retain(|trial| trial.key != key);
        state.statuses.remove(key);
    }

    pub fn set_status(&self, key: &str, status: TrialStatus) {
        self.state
            .lock()
            .expect("memory provider lock")
            .statuses
            .insert(key.to_string(), status);
    }

    pub fn set_log_text(&self, key: &str, text: impl Into<String>) {
        self.state
            .lock()
            .expect("memory provider lock")
            .logs
            .insert(key.to_string(), Ok(text.into()));
    }

    pub fn set_results_text(&self, key: &str, text: impl Into<String>) {
        self.state
            .lock()
            .expect("memory provider lock")
            .results
            .insert(key.to_string(), Ok(text.into()));
    }

    /// Make subsequent log fetches for `key` fail with `error`.
    pub fn fail_log(&self, key: &str, error: ArtifactError) {
        self.state
            .lock()
            .expect("memory provider lock")
            .logs
            .insert(key.to_string(), Err(error));
    }

    /// Make subsequent results fetches for `key` fail with `error`.
    pub fn fail_results(&self, key: &str, error: ArtifactError) {
        self.state
            .lock()
            .expect("memory provider lock")
            .results
            .insert(key.to_string(), Err(error));
    }

    /// Keys passed to `get_log_text`, in call order.
    pub fn log_requests(&self) -> Vec<String> {
        self.state.lock().expect("memory provider lock").log_requests.clone()
    }

    /// Keys passed to `get_results_text`, in call order.
    pub fn results_requests(&self) -> Vec<String> {
        self.state.lock().expect("memory provider lock").results_requests.clone()
    }

    /// Keys passed to `mark_ready_for_processing`, in call order.
    pub fn mark_requests(&self) -> Vec<String> {
        self.state.lock().expect("memory provider lock").mark_requests.clone()
    }
}

#[async_trait::async_trait]
impl StatusProvider for MemoryProvider {
    fn list_trials(&self) -> Vec<Trial> {
        self.state.lock().expect("memory provider lock").trials.clone()
    }

    fn get_status(&self, key: &str) -> TrialStatus {
        self.state
            .lock()
            .expect("memory provider lock")
            .statuses
            .get(key)
            .copied()
            .unwrap_or_default()
    }

    async fn get_log_text(&self, key: &str) -> Result<String, ArtifactError> {
        let mut state = self.state.lock().expect("memory provider lock");
        state.log_requests.push(key.to_string());
        state.logs.get(key).cloned().unwrap_or_else(|| Err(ArtifactError::not_found(key)))
    }

    async fn get_results_text(&self, key: &str) -> Result<String, ArtifactError> {
        let mut state = self.state.lock().expect("memory provider lock");
        state.results_requests.push(key.to_string());
        state
            .results
            .get(key)
            .cloned()
            .unwrap_or_else(|| Err(ArtifactError::not_found(key)))
    }

    /// Moves a `could-process` trial to `waiting`, the way the backend queues it.
    async fn mark_ready_for_processing(&self, key: &str) -> Result<(), ArtifactError> {
        let mut state = self.state.lock().expect("memory provider lock");
        state.mark_requests.push(key.to_string());
        match state.statuses.get_mut(key) {
            Some(status) => {
                if *status == TrialStatus::CouldProcess {
                    *status = TrialStatus::Waiting;
                }
                Ok(())
            }
            None => Err(ArtifactError::not_found(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn provider() -> MemoryProvider {
        MemoryProvider::new()
            .with_trial(Trial::new("a", Utc::now(), 1), TrialStatus::CouldProcess)
            .with_trial(Trial::new("b", Utc::now(), 2), TrialStatus::Done)
    }

    #[test]
    fn lists_trials_in_insertion_order() {
        let provider = provider();
        let keys: Vec<String> = provider.list_trials().into_iter().map(|trial| trial.key).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(provider.trial_at(1).map(|trial| trial.key), Some("b".to_string()));
        assert!(provider.trial_at(2).is_none());
    }

    #[test]
    fn unknown_key_reports_empty() {
        assert_eq!(provider().get_status("missing"), TrialStatus::Empty);
    }

    #[tokio::test]
    async fn mark_ready_moves_could_process_to_waiting() {
        let provider = provider();
        provider.mark_ready_for_processing("a").await.unwrap();
        assert_eq!(provider.get_status("a"), TrialStatus::Waiting);
        assert_eq!(provider.mark_requests(), vec!["a"]);
    }

    #[tokio::test]
    async fn missing_artifacts_are_not_found() {
        let provider = provider();
        let error = provider.get_log_text("b").await.unwrap_err();
        assert_eq!(error, ArtifactError::not_found("b"));
        assert_eq!(provider.log_requests(), vec!["b"]);
    }
}
