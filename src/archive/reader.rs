//! Reading archives back.
//!
//! Decodes the manifest and re-attaches each record's payload from its media
//! entry, so records come back exactly as they were packaged.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use super::builder::MANIFEST_NAME;
use super::ArchiveError;
use crate::extract::{ConversationRecord, MediaStatus};

/// Contents of an archive.
#[derive(Debug, Clone)]
pub struct ArchiveContents {
    /// Folder holding the manifest (the sanitized title)
    pub folder: String,
    pub records: Vec<ConversationRecord>,
}

impl ArchiveContents {
    /// Records carrying a media payload.
    pub fn media_records(&self) -> impl Iterator<Item = &ConversationRecord> {
        self.records.iter().filter(|r| r.media.has_payload())
    }

    /// Total size of all media payloads.
    pub fn media_bytes(&self) -> u64 {
        self.media_records()
            .map(|r| r.media.payload.len() as u64)
            .sum()
    }
}

/// Open and decode the archive at `path`.
pub fn open_archive(path: &Path) -> Result<ArchiveContents, ArchiveError> {
    let file = File::open(path)?;
    read_archive(BufReader::new(file))
}

/// Decode an archive from any seekable reader.
pub fn read_archive<R: Read + Seek>(reader: R) -> Result<ArchiveContents, ArchiveError> {
    let mut zip = ZipArchive::new(reader)?;

    let manifest_name = zip
        .file_names()
        .find(|name| is_manifest(name))
        .map(String::from)
        .ok_or(ArchiveError::MissingManifest)?;
    let folder = manifest_name
        .split_once('/')
        .map(|(folder, _)| folder.to_string())
        .unwrap_or_default();

    let mut manifest = Vec::new();
    zip.by_name(&manifest_name)?.read_to_end(&mut manifest)?;
    let mut records: Vec<ConversationRecord> = serde_json::from_slice(&manifest)?;

    for record in records.iter_mut() {
        if record.media.path.is_empty() || record.media.status == MediaStatus::NotFound {
            continue;
        }
        let entry_name = format!("{}/{}", folder, record.media.path);
        let mut entry = match zip.by_name(&entry_name) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(ArchiveError::MissingEntry(record.media.path.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        entry.read_to_end(&mut record.media.payload)?;
    }

    Ok(ArchiveContents { folder, records })
}

/// `<folder>/conversation.json`, exactly one level deep.
fn is_manifest(name: &str) -> bool {
    match name.split_once('/') {
        Some((folder, rest)) => !folder.is_empty() && rest == MANIFEST_NAME,
        None => false,
    }
}
