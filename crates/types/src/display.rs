use serde::Serialize;

use crate::{Trial, TrialStatus};

/// What the trial view should show for the current selection.
///
/// Recomputed from scratch on every evaluation; it never stores history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "trial", rename_all = "kebab-case")]
pub enum DisplayState {
    /// Nothing is rendered.
    Hidden,
    Empty(Trial),
    CouldProcess(Trial),
    Waiting(Trial),
    Processing(Trial),
    Done(Trial),
}

impl DisplayState {
    /// Map a provider status onto the display state for `trial`.
    pub fn for_status(trial: Trial, status: TrialStatus) -> Self {
        match status {
            TrialStatus::Empty => DisplayState::Empty(trial),
            TrialStatus::CouldProcess => DisplayState::CouldProcess(trial),
            TrialStatus::Waiting => DisplayState::Waiting(trial),
            TrialStatus::Processing => DisplayState::Processing(trial),
            TrialStatus::Done => DisplayState::Done(trial),
        }
    }

    pub fn trial(&self) -> Option<&Trial> {
        match self {
            DisplayState::Hidden => None,
            DisplayState::Empty(trial)
            | DisplayState::CouldProcess(trial)
            | DisplayState::Waiting(trial)
            | DisplayState::Processing(trial)
            | DisplayState::Done(trial) => Some(trial),
        }
    }

    /// Status shown by this state, `None` when hidden.
    pub fn status(&self) -> Option<TrialStatus> {
        match self {
            DisplayState::Hidden => None,
            DisplayState::Empty(_) => Some(TrialStatus::Empty),
            DisplayState::CouldProcess(_) => Some(TrialStatus::CouldProcess),
            DisplayState::Waiting(_) => Some(TrialStatus::Waiting),
            DisplayState::Processing(_) => Some(TrialStatus::Processing),
            DisplayState::Done(_) => Some(TrialStatus::Done),
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, DisplayState::Hidden)
    }
}
