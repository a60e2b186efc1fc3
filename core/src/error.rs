use crate::store::RecordKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record '{0}' not found")]
    NotFound(RecordKey),

    #[error("Record '{0}' already exists")]
    AlreadyExists(RecordKey),

    #[error("Decode error: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Encode error: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SaveError {
    /// True for the failures the engine recovers from by treating the
    /// record as absent: a missing record and undecodable bytes. Everything
    /// else is a real fault the caller may want to surface.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Decode(_))
    }
}

pub type SaveResult<T> = Result<T, SaveError>;
