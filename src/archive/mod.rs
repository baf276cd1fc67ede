//! Archive packaging.
//!
//! - [`builder`] - zip layout with the manifest and media entries
//! - [`reader`] - decoding an archive back into records
//! - [`naming`] - title sanitization and non-overwriting delivery

pub mod builder;
pub mod naming;
pub mod reader;

use thiserror::Error;

pub use builder::{build_archive, MANIFEST_NAME};
pub use naming::{deliver, sanitize_title, FALLBACK_TITLE};
pub use reader::{open_archive, read_archive, ArchiveContents};

/// Errors from building or reading archives.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Archive has no {} manifest", MANIFEST_NAME)]
    MissingManifest,

    #[error("Manifest references missing entry: {0}")]
    MissingEntry(String),

    #[error("Two media entries share the name: {0}")]
    DuplicateEntry(String),
}
