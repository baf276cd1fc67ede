//! Pagination controller.
//!
//! The conversation view only materializes recent history. Older items appear
//! when the view is scrolled to its top, which shifts the content and moves
//! the scroll offset away from the top again. The controller keeps issuing
//! scroll commands until the offset stops moving, then takes one snapshot of
//! everything that was materialized.
//!
//! Each tick, in order:
//!
//! 1. stop with [`ExtractError::Cancelled`] if the token is set
//! 2. sample the item count and report it
//! 3. stop if the count exceeds the ceiling (checked first, so it wins ties)
//! 4. stop if the last `window` offset readings are identical
//! 5. stop if the tick budget is spent
//! 6. scroll toward the top and sleep one interval

use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::error::{ExtractError, Result};
use crate::host::HostView;
use crate::progress::{Phase, ProgressSink};

/// Settings for the pagination loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationOptions {
    /// Number of identical offset readings that count as "top reached"
    pub window: usize,
    /// Stop once more than this many items are materialized
    pub ceiling: usize,
    /// Pause between ticks
    pub tick_interval: Duration,
    /// Offset commanded each tick; just below the top so the view keeps
    /// loading
    pub scroll_target: u64,
    /// Hard limit on ticks (`None` = unbounded)
    pub max_ticks: Option<usize>,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            window: 10,
            ceiling: 1000,
            tick_interval: Duration::from_millis(100),
            scroll_target: 1,
            max_ticks: Some(20_000),
        }
    }
}

impl PaginationOptions {
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window.max(1);
        self
    }

    pub fn with_ceiling(mut self, ceiling: usize) -> Self {
        self.ceiling = ceiling;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: Option<usize>) -> Self {
        self.max_ticks = max_ticks;
        self
    }
}

/// Why pagination stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The scroll offset was stable for a full window.
    TopReached,
    /// More than `ceiling` items were materialized.
    CeilingReached { ceiling: usize },
    /// The tick budget ran out while history was still loading.
    TickBudgetExhausted { ticks: usize },
}

impl StopReason {
    /// Whether the full history is known to be materialized.
    pub fn is_complete(&self) -> bool {
        matches!(self, StopReason::TopReached)
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::TopReached => write!(f, "top reached"),
            StopReason::CeilingReached { ceiling } => write!(f, "ceiling of {} reached", ceiling),
            StopReason::TickBudgetExhausted { ticks } => {
                write!(f, "tick budget of {} exhausted", ticks)
            }
        }
    }
}

/// Result of [`materialize_full_history`].
#[derive(Debug)]
pub struct PaginationOutcome<I> {
    /// Snapshot of the materialized items, in document order
    pub items: Vec<I>,
    pub stop_reason: StopReason,
    /// Ticks evaluated, including the one that stopped the loop
    pub ticks: usize,
    /// Item count sampled on the last tick
    pub materialized: usize,
}

/// Scroll `host` until its history is fully materialized, then snapshot it.
pub fn materialize_full_history<H: HostView>(
    host: &mut H,
    options: &PaginationOptions,
    cancel: &CancelToken,
    progress: &dyn ProgressSink,
) -> Result<PaginationOutcome<H::Item>> {
    let window = options.window.max(1);
    let mut readings: VecDeque<u64> = VecDeque::with_capacity(window);
    let mut ticks = 0;

    let (stop_reason, materialized) = loop {
        if cancel.is_cancelled() {
            info!(ticks, "pagination cancelled");
            return Err(ExtractError::Cancelled);
        }
        ticks += 1;

        let count = host.item_count();
        progress.report(&Phase::Scrolling {
            materialized: count,
        });

        if count > options.ceiling {
            break (
                StopReason::CeilingReached {
                    ceiling: options.ceiling,
                },
                count,
            );
        }

        let offset = host.scroll_offset();
        if readings.len() == window {
            readings.pop_front();
        }
        readings.push_back(offset);
        debug!(tick = ticks, count, offset, "pagination tick");

        if readings.len() == window && readings.iter().all(|reading| *reading == offset) {
            break (StopReason::TopReached, count);
        }

        if options.max_ticks.is_some_and(|max| ticks >= max) {
            break (StopReason::TickBudgetExhausted { ticks }, count);
        }

        host.scroll_to(options.scroll_target);
        if !options.tick_interval.is_zero() {
            thread::sleep(options.tick_interval);
        }
    };

    let items = host.items()?;
    info!(
        ticks,
        items = items.len(),
        reason = %stop_reason,
        "history materialized"
    );
    progress.report(&Phase::HistoryLoaded {
        items: items.len(),
        reason: stop_reason,
    });

    Ok(PaginationOutcome {
        items,
        stop_reason,
        ticks,
        materialized,
    })
}
