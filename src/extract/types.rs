//! Record types produced by extraction and stored in the manifest.
//!
//! The manifest layout is stable:
//!
//! ```text
//! [
//!   {"id":1,"author":"Alice","date":"3/4/2021","time":"14:32","text":"hi","emojis":[],
//!    "media":{"type":"none","path":"","status":"not_found"}}
//! ]
//! ```
//!
//! Media payloads never appear in the manifest; they travel as separate archive
//! entries named by `media.path`.

use serde::{Deserialize, Serialize};

/// Author used when no attribution or author label is present.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Date used when no date divider precedes an attribution-less item.
pub const UNKNOWN_DATE: &str = "Unknown date";

/// Kind of media attached to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    #[default]
    None,
    Image,
    Video,
    Animation,
}

impl MediaKind {
    /// File extension used for payload entries of this kind.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            MediaKind::None => None,
            MediaKind::Image => Some("jpeg"),
            MediaKind::Video | MediaKind::Animation => Some("mp4"),
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::None => write!(f, "none"),
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Animation => write!(f, "animation"),
        }
    }
}

/// How far media resolution got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MediaStatus {
    /// Nothing retrievable
    #[default]
    NotFound,
    /// Bytes retrieved from a finalized reference
    Ok,
    /// Only the low-resolution inline placeholder was retrievable
    Preview,
}

impl std::fmt::Display for MediaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaStatus::NotFound => write!(f, "not_found"),
            MediaStatus::Ok => write!(f, "ok"),
            MediaStatus::Preview => write!(f, "preview"),
        }
    }
}

/// Media attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MediaResult {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub path: String,
    pub status: MediaStatus,
    /// Retrieved bytes; carried as a separate archive entry.
    #[serde(skip)]
    pub payload: Vec<u8>,
}

impl MediaResult {
    /// Record without media.
    pub fn none() -> Self {
        Self::default()
    }

    /// Media of `kind` whose bytes could not be retrieved.
    ///
    /// The proposed path is kept so the manifest still names the slot.
    pub fn not_found(kind: MediaKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            status: MediaStatus::NotFound,
            payload: Vec::new(),
        }
    }

    /// Video whose player never produced a source.
    pub fn unresolved_video() -> Self {
        Self::not_found(MediaKind::Video, "")
    }

    /// Media retrieved with the given status.
    ///
    /// An empty payload degrades to `not_found`.
    pub fn retrieved(
        kind: MediaKind,
        path: impl Into<String>,
        status: MediaStatus,
        payload: Vec<u8>,
    ) -> Self {
        if payload.is_empty() {
            return Self::not_found(kind, path);
        }
        Self {
            kind,
            path: path.into(),
            status,
            payload,
        }
    }

    /// Whether any bytes were retrieved.
    pub fn has_payload(&self) -> bool {
        !self.payload.is_empty()
    }

    /// Whether the record should produce a binary archive entry.
    pub fn is_archivable(&self) -> bool {
        !self.path.is_empty() && self.has_payload()
    }
}

/// One normalized message of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Sequence number, gapless over emitted records
    pub id: u64,
    pub author: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub emojis: Vec<String>,
    #[serde(default)]
    pub media: MediaResult,
}

impl ConversationRecord {
    /// Copy of the record without its media payload, as stored in the manifest.
    pub fn without_payload(&self) -> Self {
        let mut record = self.clone();
        record.media.payload = Vec::new();
        record
    }
}

/// Proposed base name (without extension) for a record's media entry.
pub fn media_base_name(prefix: &str, id: u64) -> String {
    format!("{}_{}", prefix, id)
}
