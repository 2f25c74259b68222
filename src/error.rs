use std::path::PathBuf;

/// Every failure a user action can end in. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum LooperError {
    #[error("could not open {source_path}: {reason}")]
    PlayerBind { source_path: PathBuf, reason: String },

    #[error("recorder could not prepare {destination}: {reason}")]
    RecorderPrepare { destination: PathBuf, reason: String },

    #[error("a recording is already in progress")]
    SessionAlreadyActive,

    #[error("no recording in progress")]
    NoActiveSession,

    #[error("copy to {destination} failed: {source}")]
    Copy {
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not create {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("track {index} does not exist ({len} tracks)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("saved state: {0}")]
    State(String),

    #[error("mix into {destination} failed: {reason}")]
    Mix { destination: PathBuf, reason: String },

    #[error("a mix is already running")]
    MixAlreadyRunning,
}

impl LooperError {
    pub fn bind(source_path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        LooperError::PlayerBind {
            source_path: source_path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn prepare(destination: impl Into<PathBuf>, reason: impl ToString) -> Self {
        LooperError::RecorderPrepare {
            destination: destination.into(),
            reason: reason.to_string(),
        }
    }

    pub fn mix(destination: impl Into<PathBuf>, reason: impl ToString) -> Self {
        LooperError::Mix {
            destination: destination.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LooperError>;
