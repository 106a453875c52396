//! Trial status controller.
//!
//! [`resolve_state`] is a pure function of the selection and the provider's
//! current snapshot. [`TrialStatusController`] adds the refresh protocol on
//! top: it remembers the last refresh trigger, issues artifact fetches when
//! the trigger changes on a finished trial, and applies fetch completions only
//! when they still belong to the current selection.

use tracing::{debug, info, warn};
use trialview_types::{DisplayState, ResultsRecord, Selection, TrialStatus};

use crate::{
    artifacts::ArtifactStore,
    effect::{ArtifactOutcome, Effect, FetchCompletion, FetchTicket},
    provider::StatusProvider,
};

/// Resolve which display state applies to `selection`.
///
/// Hidden when the selection is not visible, carries no index, or the index
/// falls outside the provider's trial listing.
pub fn resolve_state(selection: &Selection, provider: &dyn StatusProvider) -> DisplayState {
    if !selection.visible {
        return DisplayState::Hidden;
    }
    let Some(trial) = selection.trial_index.and_then(|index| provider.trial_at(index)) else {
        return DisplayState::Hidden;
    };
    let status = provider.get_status(&trial.key);
    DisplayState::for_status(trial, status)
}

/// Inputs whose change re-runs the refresh protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RefreshTrigger {
    trial_index: Option<usize>,
    visible: bool,
    status: Option<TrialStatus>,
    key: Option<String>,
}

impl RefreshTrigger {
    fn capture(selection: &Selection, state: &DisplayState) -> Self {
        Self {
            trial_index: selection.trial_index,
            visible: selection.visible,
            status: state.status(),
            key: state.trial().map(|trial| trial.key.clone()),
        }
    }
}

/// Result of one evaluation: the state to display and the effects to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub state: DisplayState,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Default)]
pub struct TrialStatusController {
    last_trigger: Option<RefreshTrigger>,
    active_key: Option<String>,
    generation: u64,
    artifacts: ArtifactStore,
}

impl TrialStatusController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn log_text(&self) -> &str {
        self.artifacts.log_text()
    }

    pub fn results(&self) -> &ResultsRecord {
        self.artifacts.results()
    }

    /// Key of the trial the artifact store currently belongs to.
    pub fn active_key(&self) -> Option<&str> {
        self.active_key.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Evaluate the selection and return any fetches the change requires.
    ///
    /// Calling this repeatedly with an unchanged selection and provider state
    /// yields the same state and no effects.
    pub fn observe(&mut self, selection: &Selection, provider: &dyn StatusProvider) -> Observation {
        let state = resolve_state(selection, provider);
        let trigger = RefreshTrigger::capture(selection, &state);
        if self.last_trigger.as_ref() == Some(&trigger) {
            return Observation {
                state,
                effects: Vec::new(),
            };
        }

        debug!(
            trial_index = ?trigger.trial_index,
            visible = trigger.visible,
            status = ?trigger.status,
            "refresh trigger changed"
        );
        let key = trigger.key.clone();
        self.last_trigger = Some(trigger);
        let selection_changed = key != self.active_key;

        let effects = match state.trial() {
            Some(trial) if state.status().is_some_and(|status| status.is_done()) => {
                self.refresh_artifacts(&trial.key, selection_changed)
            }
            _ => {
                self.invalidate(key, selection_changed);
                Vec::new()
            }
        };
        Observation { state, effects }
    }

    /// Start a new refresh generation for `trial_key` and return both fetches.
    ///
    /// When the selection changed the store is reset first, so artifacts of a
    /// previously selected trial are never shown for this one.
    pub fn refresh_artifacts(&mut self, trial_key: &str, selection_changed: bool) -> Vec<Effect> {
        self.invalidate(Some(trial_key.to_string()), selection_changed);
        self.artifacts.begin_refresh();

        let ticket = FetchTicket {
            key: trial_key.to_string(),
            generation: self.generation,
        };
        debug!(trial = %trial_key, generation = self.generation, "issuing artifact fetches");
        vec![Effect::FetchLog(ticket.clone()), Effect::FetchResults(ticket)]
    }

    /// The process action, available only for trials that could be processed.
    ///
    /// Produces the command without touching the displayed state; the status
    /// only changes on a later provider read.
    pub fn process_action(&self, state: &DisplayState) -> Option<Effect> {
        match state {
            DisplayState::CouldProcess(trial) => Some(Effect::MarkReadyForProcessing { key: trial.key.clone() }),
            _ => None,
        }
    }

    /// Apply a fetch outcome. Returns `false` when the completion is stale.
    pub fn apply(&mut self, completion: FetchCompletion) -> bool {
        let FetchCompletion { ticket, outcome } = completion;
        if !self.is_current(&ticket) {
            debug!(
                trial = %ticket.key,
                generation = ticket.generation,
                current_generation = self.generation,
                "discarding stale artifact fetch"
            );
            return false;
        }

        match outcome {
            ArtifactOutcome::Log(Ok(text)) => {
                info!(trial = %ticket.key, bytes = text.len(), "log fetch completed");
                self.artifacts.log.store(text);
            }
            ArtifactOutcome::Log(Err(error)) => {
                warn!(
                    trial = %ticket.key,
                    kind = ?error.kind(),
                    error = %error,
                    "log fetch failed; keeping previous log text"
                );
                self.artifacts.log.fail(error);
            }
            ArtifactOutcome::Results(Ok(text)) => match ResultsRecord::parse(&text) {
                Ok(record) => {
                    info!(trial = %ticket.key, "results fetch completed");
                    self.artifacts.results.store(record);
                }
                Err(error) => {
                    warn!(
                        trial = %ticket.key,
                        kind = ?error.kind(),
                        error = %error,
                        "results unparsable; keeping previous results"
                    );
                    self.artifacts.results.fail(error);
                }
            },
            ArtifactOutcome::Results(Err(error)) => {
                warn!(
                    trial = %ticket.key,
                    kind = ?error.kind(),
                    error = %error,
                    "results fetch failed; keeping previous results"
                );
                self.artifacts.results.fail(error);
            }
        }
        true
    }

    fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation && self.active_key.as_deref() == Some(ticket.key.as_str())
    }

    /// Bump the generation so in-flight fetches become stale.
    fn invalidate(&mut self, key: Option<String>, selection_changed: bool) {
        if selection_changed {
            self.artifacts.reset();
        } else {
            self.artifacts.abandon_pending();
        }
        self.active_key = key;
        self.generation += 1;
    }
}
