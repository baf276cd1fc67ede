//! Progress reporting for extraction runs.
//!
//! The pipeline reports every phase transition as a [`Phase`] to a
//! [`ProgressSink`]. `Phase` renders the human-readable status line, so any
//! sink can show the same text the CLI prints.

use std::cell::RefCell;
use std::io::{self, Write};

use crate::extract::MediaKind;
use crate::pagination::StopReason;

/// One observable step of an extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// A pagination tick sampled the materialized item count.
    Scrolling { materialized: usize },
    /// Pagination finished and the snapshot was taken.
    HistoryLoaded { items: usize, reason: StopReason },
    /// Item `index` (1-based) of `total` is being parsed.
    Parsing { index: usize, total: usize },
    /// A record's media could not be retrieved.
    MediaNotFound { id: u64, kind: MediaKind },
    /// Cancellation stopped the item loop early.
    Cancelled { records: usize },
    /// Records are being packaged.
    BuildingArchive { records: usize },
    /// The archive is ready.
    Finished { records: usize },
}

impl Phase {
    /// Whether the phase is a high-frequency update that overwrites the
    /// previous status line.
    pub fn is_transient(&self) -> bool {
        matches!(self, Phase::Scrolling { .. } | Phase::Parsing { .. })
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Scrolling { materialized } => write!(
                f,
                "scrolling to the beginning of the conversation. Amount of messages: {}",
                materialized
            ),
            Phase::HistoryLoaded { items, reason } => match reason {
                StopReason::TopReached => write!(
                    f,
                    "the top of the conversation has been reached, start parsing {} items",
                    items
                ),
                StopReason::CeilingReached { ceiling } => write!(
                    f,
                    "stopped scrolling at the {} message ceiling, start parsing {} items",
                    ceiling, items
                ),
                StopReason::TickBudgetExhausted { ticks } => write!(
                    f,
                    "history still growing after {} scroll ticks, start parsing {} items",
                    ticks, items
                ),
            },
            Phase::Parsing { index, total } => write!(f, "parsing item {} of {}", index, total),
            Phase::MediaNotFound { id, kind } => {
                write!(f, "media not found for message {} ({})", id, kind)
            }
            Phase::Cancelled { records } => write!(
                f,
                "extraction cancelled, packaging {} message{} gathered so far",
                records,
                if *records == 1 { "" } else { "s" }
            ),
            Phase::BuildingArchive { records } => write!(
                f,
                "building archive with {} message{}",
                records,
                if *records == 1 { "" } else { "s" }
            ),
            Phase::Finished { records } => write!(
                f,
                "done, exported {} message{}",
                records,
                if *records == 1 { "" } else { "s" }
            ),
        }
    }
}

/// Receiver of progress updates.
pub trait ProgressSink {
    /// Report a phase transition.
    fn report(&self, phase: &Phase);
}

/// Sink that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _phase: &Phase) {}
}

/// Sink that keeps every update, in order.
#[derive(Debug, Default)]
pub struct MemoryProgress {
    phases: RefCell<Vec<Phase>>,
}

impl MemoryProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// All phases reported so far.
    pub fn phases(&self) -> Vec<Phase> {
        self.phases.borrow().clone()
    }
}

impl ProgressSink for MemoryProgress {
    fn report(&self, phase: &Phase) {
        self.phases.borrow_mut().push(phase.clone());
    }
}

/// Default sink writing status lines to stderr.
///
/// Transient phases overwrite one line in place; everything else is printed
/// on its own line.
pub struct StderrProgress {
    show_output: bool,
    line_open: RefCell<bool>,
}

impl StderrProgress {
    pub fn new() -> Self {
        Self {
            show_output: true,
            line_open: RefCell::new(false),
        }
    }

    /// Sink with output disabled.
    pub fn quiet() -> Self {
        Self {
            show_output: false,
            line_open: RefCell::new(false),
        }
    }
}

impl Default for StderrProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for StderrProgress {
    fn report(&self, phase: &Phase) {
        if !self.show_output {
            return;
        }

        let mut line_open = self.line_open.borrow_mut();
        let mut stderr = io::stderr();
        if phase.is_transient() {
            // Clear the rest of the previous line
            let _ = write!(stderr, "\r\x1b[2K{}", phase);
            let _ = stderr.flush();
            *line_open = true;
        } else {
            if *line_open {
                let _ = write!(stderr, "\r\x1b[2K");
                *line_open = false;
            }
            let _ = writeln!(stderr, "{}", phase);
        }
    }
}
