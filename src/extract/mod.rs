//! Record extraction from visual items.
//!
//! - [`attribution`] - the `[time, date] author:` line grammar
//! - [`record`] - the per-item extractor with its fallback chain
//! - [`types`] - records and media results as stored in the manifest

pub mod attribution;
pub mod record;
pub mod types;

pub use attribution::{parse_attribution, Attribution};
pub use record::{find_last_known_date, ExtractOptions, RecordExtractor};
pub use types::{
    media_base_name, ConversationRecord, MediaKind, MediaResult, MediaStatus, UNKNOWN_AUTHOR,
    UNKNOWN_DATE,
};
