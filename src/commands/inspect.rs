//! Inspect command handler

use anyhow::{Context, Result};
use std::path::Path;

use wae::archive::{open_archive, ArchiveContents};
use wae::extract::{ConversationRecord, MediaKind};

use super::truncate_string;

/// Longest text excerpt shown per record.
const EXCERPT_LENGTH: usize = 48;

/// List the records stored in an archive.
#[cfg(not(tarpaulin_include))]
pub fn handle(archive: &Path) -> Result<()> {
    let contents = open_archive(archive)
        .with_context(|| format!("Failed to read archive: {}", archive.display()))?;
    println!("{}", format_contents(&contents));
    Ok(())
}

/// Render the listing of an archive.
pub fn format_contents(contents: &ArchiveContents) -> String {
    let mut lines = vec![format!(
        "{} - {} record{}, {} media file{} ({})",
        contents.folder,
        contents.records.len(),
        if contents.records.len() == 1 { "" } else { "s" },
        contents.media_records().count(),
        if contents.media_records().count() == 1 { "" } else { "s" },
        humansize::format_size(contents.media_bytes(), humansize::DECIMAL)
    )];
    lines.extend(contents.records.iter().map(format_record));
    lines.join("\n")
}

fn format_record(record: &ConversationRecord) -> String {
    let text = truncate_string(&record.text.replace('\n', " "), EXCERPT_LENGTH);
    let mut line = format!(
        "{:>5}  {} {:<5}  {}: {}",
        record.id, record.date, record.time, record.author, text
    );
    if record.media.kind != MediaKind::None {
        let path = if record.media.path.is_empty() {
            "-"
        } else {
            record.media.path.as_str()
        };
        line.push_str(&format!(
            "  [{} {} {}]",
            record.media.kind, record.media.status, path
        ));
    }
    line
}
