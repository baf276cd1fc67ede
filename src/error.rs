//! Run-level errors.
//!
//! Per-item problems never show up here: they are absorbed into record
//! fields (unknown date, media `not_found`). An `ExtractError` means the run
//! as a whole could not produce an archive.

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::host::HostError;

/// Errors that abort an extraction run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("An extraction session is already in progress")]
    SessionInProgress,

    #[error("Conversation has no title")]
    MissingTitle,

    #[error("Failed to snapshot conversation items: {0}")]
    Snapshot(#[from] HostError),

    #[error("Extraction cancelled before the history was loaded")]
    Cancelled,

    #[error("Failed to build archive: {0}")]
    Archive(#[from] ArchiveError),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
