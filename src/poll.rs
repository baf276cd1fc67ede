//! Bounded polling for state that materializes asynchronously.
//!
//! [`poll_until`] probes a condition up to `max_attempts` times, sleeping
//! `interval` between attempts (never after the last one), and reports how
//! the wait ended. It never waits longer than
//! `interval * (max_attempts - 1)` plus the probe time.

use std::thread;
use std::time::Duration;

use tracing::trace;

use crate::cancel::CancelToken;

/// How long and how often to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between consecutive attempts
    pub interval: Duration,
    /// Maximum number of probes (at least 1)
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_attempts: 10,
        }
    }
}

impl PollPolicy {
    /// Create a policy, clamping `max_attempts` to at least one probe.
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }
}

/// What a single probe observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    /// The awaited state is present.
    Ready(T),
    /// Not there yet; optionally carries whatever interim value was seen.
    Pending(Option<T>),
}

/// How a poll ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// A probe reported `Ready` on attempt `attempts`.
    Resolved { value: T, attempts: u32 },
    /// Every attempt stayed pending; `last_seen` is the last interim value.
    TimedOut { last_seen: Option<T>, attempts: u32 },
    /// The token was cancelled before the awaited state appeared.
    Cancelled { last_seen: Option<T>, attempts: u32 },
}

impl<T> PollOutcome<T> {
    /// Number of probes that ran.
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Resolved { attempts, .. }
            | PollOutcome::TimedOut { attempts, .. }
            | PollOutcome::Cancelled { attempts, .. } => *attempts,
        }
    }

    /// The resolved value, or the last interim value when the wait gave up.
    pub fn into_best_effort(self) -> Option<T> {
        match self {
            PollOutcome::Resolved { value, .. } => Some(value),
            PollOutcome::TimedOut { last_seen, .. } | PollOutcome::Cancelled { last_seen, .. } => {
                last_seen
            }
        }
    }

    /// Whether a probe reported `Ready`.
    pub fn is_resolved(&self) -> bool {
        matches!(self, PollOutcome::Resolved { .. })
    }
}

/// Probe `probe` until it reports ready, the attempt budget runs out, or the
/// token is cancelled.
///
/// The probe receives the 1-based attempt number.
pub fn poll_until<T, F>(policy: &PollPolicy, cancel: &CancelToken, mut probe: F) -> PollOutcome<T>
where
    F: FnMut(u32) -> Probe<T>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_seen = None;

    for attempt in 1..=max_attempts {
        if cancel.is_cancelled() {
            return PollOutcome::Cancelled {
                last_seen,
                attempts: attempt - 1,
            };
        }

        match probe(attempt) {
            Probe::Ready(value) => {
                trace!(attempt, "poll resolved");
                return PollOutcome::Resolved {
                    value,
                    attempts: attempt,
                };
            }
            Probe::Pending(interim) => {
                if interim.is_some() {
                    last_seen = interim;
                }
            }
        }

        if attempt < max_attempts && !policy.interval.is_zero() {
            thread::sleep(policy.interval);
        }
    }

    trace!(attempts = max_attempts, "poll timed out");
    PollOutcome::TimedOut {
        last_seen,
        attempts: max_attempts,
    }
}
