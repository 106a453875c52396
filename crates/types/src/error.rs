use thiserror::Error;

/// Failure while retrieving or interpreting a trial artifact.
///
/// None of these are fatal to the viewer: the artifact slot keeps its prior
/// value and records the error for callers that want to surface it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtifactError {
    /// The trial or the requested artifact does not exist.
    #[error("artifact not found for trial {key}")]
    NotFound { key: String },
    /// Transport or storage failure.
    #[error("artifact I/O error: {0}")]
    Io(String),
    /// The results text is not a valid results record.
    #[error("artifact parse error: {0}")]
    Parse(String),
    /// The fetch did not complete within the configured bound.
    #[error("artifact fetch timed out after {millis} ms")]
    Timeout { millis: u64 },
}

/// Coarse classification of [`ArtifactError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactErrorKind {
    NotFound,
    IoError,
    ParseError,
    TimedOut,
}

impl ArtifactError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn kind(&self) -> ArtifactErrorKind {
        match self {
            ArtifactError::NotFound { .. } => ArtifactErrorKind::NotFound,
            ArtifactError::Io(_) => ArtifactErrorKind::IoError,
            ArtifactError::Parse(_) => ArtifactErrorKind::ParseError,
            ArtifactError::Timeout { .. } => ArtifactErrorKind::TimedOut,
        }
    }
}

impl From<std::io::Error> for ArtifactError {
    fn from(error: std::io::Error) -> Self {
        ArtifactError::Io(error.to_string())
    }
}

impl From<serde_json::Error> for ArtifactError {
    fn from(error: serde_json::Error) -> Self {
        ArtifactError::Parse(error.to_string())
    }
}
