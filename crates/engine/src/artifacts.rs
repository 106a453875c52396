//! Storage for the two auxiliary artifacts of a finished trial.

use trialview_types::{ArtifactError, ResultsRecord};

/// One artifact value plus its fetch bookkeeping.
///
/// A failed fetch never clears `value`; it only records `last_error`, which
/// callers may surface as a fetch-failed indicator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArtifactSlot<T> {
    value: T,
    pending: bool,
    last_error: Option<ArtifactError>,
}

impl<T: Default> ArtifactSlot<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    /// A fetch for the current selection is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Error from the most recent fetch, cleared by the next success.
    pub fn last_error(&self) -> Option<&ArtifactError> {
        self.last_error.as_ref()
    }

    pub(crate) fn begin(&mut self) {
        self.pending = true;
    }

    pub(crate) fn store(&mut self, value: T) {
        self.value = value;
        self.pending = false;
        self.last_error = None;
    }

    pub(crate) fn fail(&mut self, error: ArtifactError) {
        self.pending = false;
        self.last_error = Some(error);
    }

    pub(crate) fn abandon(&mut self) {
        self.pending = false;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Log text and results record for the currently selected trial.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArtifactStore {
    pub(crate) log: ArtifactSlot<String>,
    pub(crate) results: ArtifactSlot<ResultsRecord>,
}

impl ArtifactStore {
    /// Current log text; empty when nothing has loaded.
    pub fn log_text(&self) -> &str {
        self.log.value()
    }

    /// Current results; all-zero when nothing has loaded.
    pub fn results(&self) -> &ResultsRecord {
        self.results.value()
    }

    pub fn log_slot(&self) -> &ArtifactSlot<String> {
        &self.log
    }

    pub fn results_slot(&self) -> &ArtifactSlot<ResultsRecord> {
        &self.results
    }

    /// Either fetch is still outstanding.
    pub fn is_pending(&self) -> bool {
        self.log.is_pending() || self.results.is_pending()
    }

    /// Either slot's last fetch failed.
    pub fn fetch_failed(&self) -> bool {
        self.log.last_error().is_some() || self.results.last_error().is_some()
    }

    pub(crate) fn begin_refresh(&mut self) {
        self.log.begin();
        self.results.begin();
    }

    pub(crate) fn abandon_pending(&mut self) {
        self.log.abandon();
        self.results.abandon();
    }

    pub(crate) fn reset(&mut self) {
        self.log.reset();
        self.results.reset();
    }
}
