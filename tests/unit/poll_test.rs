//! Unit tests for the bounded polling primitive

use std::time::{Duration, Instant};

use wae::poll::{poll_until, PollOutcome, PollPolicy, Probe};
use wae::CancelToken;

#[test]
fn resolves_on_the_attempt_the_value_appears() {
    let policy = PollPolicy::new(Duration::ZERO, 10);

    for ready_at in 1..=10u32 {
        let mut probes = 0;
        let outcome = poll_until(&policy, &CancelToken::new(), |attempt| {
            probes += 1;
            if attempt >= ready_at {
                Probe::Ready(attempt)
            } else {
                Probe::Pending(None)
            }
        });

        assert_eq!(
            outcome,
            PollOutcome::Resolved {
                value: ready_at,
                attempts: ready_at
            }
        );
        assert_eq!(probes, ready_at, "no probes after success");
    }
}

#[test]
fn gives_up_after_exactly_max_attempts() {
    let policy = PollPolicy::new(Duration::ZERO, 7);
    let mut probes = 0;

    let outcome: PollOutcome<()> = poll_until(&policy, &CancelToken::new(), |_| {
        probes += 1;
        Probe::Pending(None)
    });

    assert_eq!(probes, 7);
    assert_eq!(
        outcome,
        PollOutcome::TimedOut {
            last_seen: None,
            attempts: 7
        }
    );
}

#[test]
fn timed_out_keeps_last_interim_value() {
    let policy = PollPolicy::new(Duration::ZERO, 3);

    let outcome = poll_until(&policy, &CancelToken::new(), |attempt| {
        if attempt == 2 {
            Probe::Pending(Some("placeholder"))
        } else {
            Probe::Pending(None)
        }
    });

    assert!(!outcome.is_resolved());
    assert_eq!(outcome.into_best_effort(), Some("placeholder"));
}

#[test]
fn zero_attempts_still_probes_once() {
    let policy = PollPolicy::new(Duration::ZERO, 0);
    assert_eq!(policy.max_attempts, 1);

    let outcome = poll_until(&policy, &CancelToken::new(), |_| Probe::Ready(()));
    assert!(outcome.is_resolved());
}

#[test]
fn waits_between_attempts_but_not_after_the_last() {
    let policy = PollPolicy::new(Duration::from_millis(20), 3);
    let started = Instant::now();

    let outcome: PollOutcome<()> =
        poll_until(&policy, &CancelToken::new(), |_| Probe::Pending(None));

    let elapsed = started.elapsed();
    assert_eq!(outcome.attempts(), 3);
    assert!(elapsed >= Duration::from_millis(40), "slept {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(60 + 500), "slept {:?}", elapsed);
}

#[test]
fn cancellation_stops_before_the_next_probe() {
    let policy = PollPolicy::new(Duration::ZERO, 10);
    let cancel = CancelToken::new();
    let handle = cancel.clone();

    let outcome = poll_until(&policy, &cancel, |attempt| {
        if attempt == 3 {
            handle.cancel();
        }
        Probe::Pending(Some(attempt))
    });

    assert_eq!(
        outcome,
        PollOutcome::Cancelled {
            last_seen: Some(3),
            attempts: 3
        }
    );
}
