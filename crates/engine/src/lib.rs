//! # Trialview Engine
//!
//! Resolves what the trial view should display for a selection and keeps the
//! two artifacts of a finished trial (processing log and results summary) in
//! sync with that selection.
//!
//! ## Architecture
//!
//! - **`provider`**: The [`StatusProvider`] seam plus null, in-memory, and
//!   directory-backed implementations
//! - **`controller`**: [`resolve_state`] and the refresh protocol in
//!   [`TrialStatusController`]
//! - **`effect`**: Effects the controller requests and the completions it
//!   receives
//! - **`dispatch`**: Runs effects on Tokio tasks
//! - **`session`**: Owns a controller, a provider, and the completion channel
//! - **`view`**: Derives display text for each state
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use chrono::Utc;
//! use trialview_engine::{MemoryProvider, SessionConfig, TrialSession, TrialView};
//! use trialview_types::{Selection, Trial, TrialStatus};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let provider = MemoryProvider::new().with_trial(Trial::new("walk_01", Utc::now(), 2048), TrialStatus::Done);
//! provider.set_results_text("walk_01", r#"{"autoAvgRMSE": 1.5}"#);
//!
//! let mut session = TrialSession::new(Arc::new(provider), SessionConfig::default());
//! let state = session.observe(&Selection::from_query("?show-trial=0"));
//! session.settle().await;
//!
//! let view = TrialView::from_state(&state, session.artifacts()).expect("visible");
//! assert!(view.to_string().contains("1.50 cm"));
//! # }
//! ```

pub mod artifacts;
pub mod controller;
pub mod dispatch;
pub mod effect;
pub mod provider;
pub mod session;
pub mod view;

pub use artifacts::{ArtifactSlot, ArtifactStore};
pub use controller::{Observation, TrialStatusController, resolve_state};
pub use dispatch::run_effects;
pub use effect::{ArtifactOutcome, Effect, FetchCompletion, FetchTicket};
pub use provider::{FsStatusProvider, MemoryProvider, NullProvider, StatusProvider};
pub use session::{SessionConfig, TrialSession};
pub use view::{ResultsRow, TrialView, format_distance};
