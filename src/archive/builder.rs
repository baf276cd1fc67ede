//! Packaging records into a zip archive.
//!
//! Layout:
//!
//! ```text
//! <title>/
//! <title>/conversation.json   pretty JSON array of records, no payloads
//! <title>/wae_3.jpeg          one entry per record with a path and bytes
//! <title>/wae_7.mp4
//! ```

use std::collections::HashSet;
use std::io::{Cursor, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::naming::sanitize_title;
use super::ArchiveError;
use crate::extract::ConversationRecord;

/// Name of the manifest entry inside the archive folder.
pub const MANIFEST_NAME: &str = "conversation.json";

/// Build the archive for `records` under a folder named after `title`.
///
/// Records whose media has no path or no payload contribute only their
/// manifest entry.
pub fn build_archive(title: &str, records: &[ConversationRecord]) -> Result<Vec<u8>, ArchiveError> {
    let folder = sanitize_title(title);
    let manifest = serde_json::to_vec_pretty(records)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    // jpeg and mp4 are already compressed
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.add_directory(format!("{}/", folder), deflated)?;
    zip.start_file(format!("{}/{}", folder, MANIFEST_NAME), deflated)?;
    zip.write_all(&manifest)?;

    let mut written = HashSet::new();
    for record in records.iter().filter(|r| r.media.is_archivable()) {
        let path = record.media.path.as_str();
        if path == MANIFEST_NAME || !written.insert(path) {
            return Err(ArchiveError::DuplicateEntry(path.to_string()));
        }

        zip.start_file(format!("{}/{}", folder, path), stored)?;
        zip.write_all(&record.media.payload)?;
        debug!(
            id = record.id,
            path,
            bytes = record.media.payload.len(),
            "added media entry"
        );
    }

    let bytes = zip.finish()?.into_inner();
    debug!(
        folder = %folder,
        records = records.len(),
        media = written.len(),
        bytes = bytes.len(),
        "archive built"
    );
    Ok(bytes)
}
