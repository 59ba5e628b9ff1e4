use thiserror::Error;

use crate::error::MatchError;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),

    #[error("Decompression error")]
    Decompression,

    #[error("Corrupted data")]
    Corrupted,

    #[error("Version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Team tag '{tag}' cannot be resolved")]
    UnresolvedTeam { tag: String },

    #[error("Invalid snapshot: {0}")]
    Invalid(String),

    #[error(transparent)]
    Engine(#[from] MatchError),
}

impl SaveError {
    /// Resource failures that may succeed on retry, as opposed to a snapshot
    /// that can never be resumed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SaveError::Io(_) => true,
            SaveError::FileNotFound { .. } => true,
            SaveError::VersionMismatch { .. } => true,
            SaveError::Corrupted => false,
            SaveError::ChecksumMismatch => false,
            SaveError::UnresolvedTeam { .. } => false,
            _ => false,
        }
    }
}
