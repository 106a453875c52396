//! Side effects requested by the controller.
//!
//! The controller never performs I/O itself. It returns [`Effect`]s that the
//! dispatcher turns into provider calls, and it receives the outcome of each
//! fetch back as a [`FetchCompletion`].

use trialview_types::ArtifactError;

/// Tag attached to every fetch: the trial it was issued for and the refresh
/// generation that issued it. Completions whose ticket is no longer current
/// are discarded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    pub key: String,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the processing log for the ticket's trial.
    FetchLog(FetchTicket),
    /// Fetch the results text for the ticket's trial.
    FetchResults(FetchTicket),
    /// Queue a trial for processing. Fire-and-forget.
    MarkReadyForProcessing { key: String },
}

/// Raw outcome of one artifact fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactOutcome {
    Log(Result<String, ArtifactError>),
    Results(Result<String, ArtifactError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCompletion {
    pub ticket: FetchTicket,
    pub outcome: ArtifactOutcome,
}

impl FetchCompletion {
    pub fn new(ticket: FetchTicket, outcome: ArtifactOutcome) -> Self {
        Self { ticket, outcome }
    }
}
