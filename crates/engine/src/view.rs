//! Plain-data rendering of the trial view.
//!
//! The engine does not draw anything; it derives what a front end would show
//! for each state. [`TrialView`] also implements `Display` for terminal output.

use std::fmt;

use serde::Serialize;
use trialview_types::{DisplayState, ResultsRecord, TrialStatus};

use crate::artifacts::ArtifactStore;

pub const DISTANCE_UNIT: &str = "cm";

const WAITING_DESCRIPTION: &str = "We have a number of servers that process uploaded tasks one at a time. \
It shouldn't take long to get assigned a server, but when we get lots of uploads at once, \
the servers may be busy for a while.";

const LOG_HEADING: &str = "Processing (Autoscale & Autoregister) Log";

/// Format a distance with two decimals and the unit suffix.
pub fn format_distance(value: f64) -> String {
    format!("{value:.2} {DISTANCE_UNIT}")
}

/// One row of the results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsRow {
    pub label: &'static str,
    pub avg_rmse: String,
    pub avg_max: String,
}

/// Manual (gold-standard) and automatic rows, in display order.
pub fn results_rows(results: &ResultsRecord) -> Vec<ResultsRow> {
    vec![
        ResultsRow {
            label: "Manual",
            avg_rmse: format_distance(results.gold_avg_rmse),
            avg_max: format_distance(results.gold_avg_max),
        },
        ResultsRow {
            label: "Automatic",
            avg_rmse: format_distance(results.auto_avg_rmse),
            avg_max: format_distance(results.auto_avg_max),
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialView {
    pub title: String,
    pub status: TrialStatus,
    pub headline: Option<&'static str>,
    pub description: Option<&'static str>,
    /// The process action is offered.
    pub can_process: bool,
    pub results: Option<Vec<ResultsRow>>,
    pub log_text: Option<String>,
    /// Set when the most recent artifact fetch failed. Rendering ignores it.
    pub fetch_failed: bool,
}

impl TrialView {
    /// Derive the view for `state`; `None` when hidden.
    pub fn from_state(state: &DisplayState, artifacts: &ArtifactStore) -> Option<Self> {
        let trial = state.trial()?;
        let status = state.status()?;
        let mut view = TrialView {
            title: format!("Trial: {}", trial.key),
            status,
            headline: None,
            description: None,
            can_process: false,
            results: None,
            log_text: None,
            fetch_failed: false,
        };

        match status {
            TrialStatus::Empty => {}
            TrialStatus::CouldProcess => {
                view.headline = Some("Status: Ready to process");
                view.can_process = true;
            }
            TrialStatus::Waiting => {
                view.headline = Some("Waiting to be assigned a processing server...");
                view.description = Some(WAITING_DESCRIPTION);
            }
            TrialStatus::Processing => view.headline = Some("Status: Processing"),
            TrialStatus::Done => {
                view.headline = Some("Results:");
                view.results = Some(results_rows(artifacts.results()));
                view.log_text = Some(artifacts.log_text().to_string());
                view.fetch_failed = artifacts.fetch_failed();
            }
        }
        Some(view)
    }
}

impl fmt::Display for TrialView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if let Some(headline) = self.headline {
            writeln!(f)?;
            writeln!(f, "{headline}")?;
        }
        if let Some(description) = self.description {
            writeln!(f, "{description}")?;
        }
        if self.can_process {
            writeln!(f, "[Process]")?;
        }
        if let Some(rows) = &self.results {
            writeln!(f)?;
            writeln!(f, "{:<12}{:>12}{:>12}", "", "Avg. RMSE", "Avg. Max")?;
            for row in rows {
                writeln!(f, "{:<12}{:>12}{:>12}", format!("{}:", row.label), row.avg_rmse, row.avg_max)?;
            }
        }
        if let Some(log_text) = &self.log_text {
            writeln!(f)?;
            writeln!(f, "{LOG_HEADING}")?;
            write!(f, "{log_text}")?;
            if !log_text.is_empty() && !log_text.ends_with('\n') {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
