//! # Trialview Types
//!
//! Shared data model for the trial viewer: trials and their status tags,
//! the results summary produced by a processing run, the selection that picks
//! a trial, and the display state derived from both.

mod display;
mod error;
mod results;
pub mod selection;
mod status;
mod trial;

pub use display::DisplayState;
pub use error::{ArtifactError, ArtifactErrorKind};
pub use results::ResultsRecord;
pub use selection::Selection;
pub use status::{TrialStatus, UnknownStatusTag};
pub use trial::Trial;
