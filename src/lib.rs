//! wae - web archive extractor
//!
//! Extracts a complete, ordered transcript of a lazily rendered conversation
//! view, resolves its embedded media and packages everything as one zip
//! archive.
//!
//! The host page is reached only through the [`host::HostView`] and
//! [`host::VisualItem`] traits; [`host::ReplayHost`] plays back a captured
//! page behind them. [`service::ExtractorService`] wires the pipeline:
//!
//! ```text
//! pagination -> snapshot -> record extraction (+ media) -> archive
//! ```

pub mod archive;
pub mod cancel;
pub mod config;
pub mod error;
pub mod extract;
pub mod host;
pub mod media;
pub mod pagination;
pub mod poll;
pub mod progress;
pub mod service;
pub mod session;

pub use cancel::CancelToken;
pub use config::Config;
pub use error::ExtractError;
pub use extract::ConversationRecord;
pub use service::{ExtractionOutcome, ExtractionReport, ExtractorService, RunOptions};
pub use session::{ExtractionSession, SessionGate};
