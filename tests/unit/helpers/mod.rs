//! Test helper utilities

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use wae::extract::{ConversationRecord, MediaKind, MediaResult, MediaStatus};
use wae::host::replay::{ItemCapture, PageCapture};
use wae::host::{ItemClass, ReplayHost};
use wae::pagination::PaginationOptions;
use wae::poll::PollPolicy;
use wae::RunOptions;

/// Get the path to the fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Run options with every wait disabled
pub fn fast_options(attempts: u32) -> RunOptions {
    RunOptions::default()
        .pagination(PaginationOptions::default().with_tick_interval(Duration::ZERO))
        .poll(PollPolicy::new(Duration::ZERO, attempts))
}

/// An attributed text message
pub fn message(author: &str, time: &str, date: &str, text: &str) -> ItemCapture {
    ItemCapture {
        class: ItemClass::Incoming,
        attribution: Some(format!("[{}, {}] {}: ", time, date, author)),
        text: Some(text.to_string()),
        ..Default::default()
    }
}

/// A date divider
pub fn divider(label: &str) -> ItemCapture {
    ItemCapture {
        class: ItemClass::DateDivider,
        label: Some(label.to_string()),
        ..Default::default()
    }
}

/// A host over `items` titled "Test"
pub fn host_with(items: Vec<ItemCapture>) -> ReplayHost {
    ReplayHost::new(PageCapture {
        title: Some("Test".to_string()),
        items,
        ..Default::default()
    })
}

/// A record with no media
pub fn text_record(id: u64, author: &str, text: &str) -> ConversationRecord {
    ConversationRecord {
        id,
        author: author.to_string(),
        date: "3/4/2021".to_string(),
        time: "14:32".to_string(),
        text: text.to_string(),
        emojis: Vec::new(),
        media: MediaResult::none(),
    }
}

/// A record with retrieved media
pub fn media_record(id: u64, kind: MediaKind, payload: &[u8]) -> ConversationRecord {
    let path = format!(
        "wae_{}.{}",
        id,
        kind.extension().unwrap_or("bin")
    );
    ConversationRecord {
        media: MediaResult::retrieved(kind, path, MediaStatus::Ok, payload.to_vec()),
        ..text_record(id, "Alice", "")
    }
}
