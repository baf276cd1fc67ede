//! ExtractorService facade for running an extraction end to end.
//!
//! # Workflow
//!
//! 1. Take the session gate (one run at a time)
//! 2. Read the conversation title
//! 3. Materialize the full history and snapshot it
//! 4. Extract records in document order, resolving media one item at a time
//! 5. Dismiss any overlay left open by media activation
//! 6. Build the archive from the session's records

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::archive::build_archive;
use crate::cancel::CancelToken;
use crate::error::{ExtractError, Result};
use crate::extract::{ConversationRecord, ExtractOptions, MediaKind, MediaStatus, RecordExtractor};
use crate::host::HostView;
use crate::media::{Fetcher, ResourceResolver};
use crate::pagination::{materialize_full_history, PaginationOptions, StopReason};
use crate::poll::PollPolicy;
use crate::progress::{Phase, ProgressSink};
use crate::session::{ExtractionSession, SessionGate};

/// Configuration options for a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub pagination: PaginationOptions,
    /// Polling policy for lazily rendered media
    pub poll: PollPolicy,
    pub extract: ExtractOptions,
    /// Id of the first record
    pub sequence_base: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            pagination: PaginationOptions::default(),
            poll: PollPolicy::default(),
            extract: ExtractOptions::default(),
            sequence_base: 1,
        }
    }
}

impl RunOptions {
    /// Set pagination options.
    pub fn pagination(mut self, pagination: PaginationOptions) -> Self {
        self.pagination = pagination;
        self
    }

    /// Set the media polling policy.
    pub fn poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Set record extraction options.
    pub fn extract(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }

    /// Set the id of the first record.
    pub fn sequence_base(mut self, base: u64) -> Self {
        self.sequence_base = base;
        self
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub title: String,
    /// Items in the snapshot, messages or not
    pub items_seen: usize,
    pub records: usize,
    /// Records whose media bytes were retrieved
    pub media_found: usize,
    /// Records with media that could not be retrieved
    pub media_missing: usize,
    pub stop_reason: StopReason,
    /// Cancellation stopped the item loop early
    pub cancelled: bool,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl ExtractionReport {
    /// Wall-clock duration of the run.
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Whether the archive holds the whole conversation.
    pub fn is_complete(&self) -> bool {
        self.stop_reason.is_complete() && !self.cancelled
    }
}

/// Result of [`ExtractorService::run`].
#[derive(Debug)]
pub struct ExtractionOutcome {
    /// Zip archive bytes
    pub archive: Vec<u8>,
    pub records: Vec<ConversationRecord>,
    pub report: ExtractionReport,
}

/// Main service for extracting conversations.
///
/// Facade pattern - coordinates pagination, extraction and packaging.
pub struct ExtractorService {
    options: RunOptions,
    gate: SessionGate,
    cancel: CancelToken,
}

impl ExtractorService {
    /// Create a service with its own gate and cancel token.
    pub fn new(options: RunOptions) -> Self {
        Self {
            options,
            gate: SessionGate::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Share a session gate with other services.
    pub fn with_gate(mut self, gate: SessionGate) -> Self {
        self.gate = gate;
        self
    }

    /// Use an externally owned cancel token (e.g. one wired to signals).
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Token that cancels runs of this service.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Extract the conversation shown by `host` into an archive.
    ///
    /// Fails without touching the host when another session holds the gate
    /// or the conversation has no title. Cancellation before the history is
    /// loaded fails the run; cancellation afterwards packages the records
    /// gathered so far.
    pub fn run<H, F>(
        &self,
        host: &mut H,
        fetcher: F,
        progress: &dyn ProgressSink,
    ) -> Result<ExtractionOutcome>
    where
        H: HostView,
        F: Fetcher,
    {
        let _permit = self.gate.acquire()?;

        let title = host
            .title()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ExtractError::MissingTitle)?;
        let started_at = Local::now();
        info!(title = %title, "starting extraction");

        let history =
            materialize_full_history(host, &self.options.pagination, &self.cancel, progress)?;
        if !history.stop_reason.is_complete() {
            warn!(reason = %history.stop_reason, "history may be incomplete");
        }

        let resolver = ResourceResolver::new(self.options.poll, fetcher, self.cancel.clone());
        let extractor = RecordExtractor::new(self.options.extract.clone(), resolver);
        let mut session = ExtractionSession::new(title, self.options.sequence_base);

        let total = history.items.len();
        let mut cancelled = false;
        for (index, item) in history.items.iter().enumerate() {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            progress.report(&Phase::Parsing {
                index: index + 1,
                total,
            });

            if let Some(record) = extractor.extract(host, item, session.next_id()) {
                if record.media.kind != MediaKind::None
                    && record.media.status == MediaStatus::NotFound
                {
                    progress.report(&Phase::MediaNotFound {
                        id: record.id,
                        kind: record.media.kind,
                    });
                }
                session.append(record);
            }
        }
        // A cancel that landed during the last item still counts
        cancelled |= self.cancel.is_cancelled();

        host.dismiss_overlays();

        if cancelled {
            info!(records = session.len(), "extraction cancelled");
            progress.report(&Phase::Cancelled {
                records: session.len(),
            });
        }

        progress.report(&Phase::BuildingArchive {
            records: session.len(),
        });
        let (title, records) = session.finish();
        let archive = build_archive(&title, &records)?;

        let media_found = records.iter().filter(|r| r.media.has_payload()).count();
        let media_missing = records
            .iter()
            .filter(|r| r.media.kind != MediaKind::None && !r.media.has_payload())
            .count();

        let report = ExtractionReport {
            title,
            items_seen: total,
            records: records.len(),
            media_found,
            media_missing,
            stop_reason: history.stop_reason,
            cancelled,
            started_at,
            finished_at: Local::now(),
        };
        info!(
            records = report.records,
            media_found,
            media_missing,
            bytes = archive.len(),
            "extraction finished"
        );
        progress.report(&Phase::Finished {
            records: report.records,
        });

        Ok(ExtractionOutcome {
            archive,
            records,
            report,
        })
    }
}
