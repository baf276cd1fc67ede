//! Unit tests for media resolution through the public API

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

use wae::extract::{MediaKind, MediaStatus};
use wae::host::replay::{AssetCapture, ImageCapture, ItemCapture, MediaCapture, PageCapture};
use wae::host::{HostView, ItemClass, ReplayHost};
use wae::media::{FetchError, FetchResult, Fetcher, ResourceResolver};
use wae::poll::PollPolicy;
use wae::CancelToken;

const FULL: &str = "blob:https://web.example/full";
const PLACEHOLDER: &str = "data:image/jpeg;base64,cHJldmlldw==";

/// Fetcher that records every reference it is asked for
#[derive(Default)]
struct RecordingFetcher {
    requests: RefCell<Vec<String>>,
}

impl Fetcher for RecordingFetcher {
    fn fetch(&self, reference: &str) -> FetchResult<Vec<u8>> {
        self.requests.borrow_mut().push(reference.to_string());
        if reference == FULL {
            Ok(b"full".to_vec())
        } else {
            Err(FetchError::UnknownReference(reference.to_string()))
        }
    }
}

fn image_host(ready_after: u32) -> ReplayHost {
    let mut assets = BTreeMap::new();
    assets.insert(FULL.to_string(), AssetCapture::text("full"));
    ReplayHost::new(PageCapture {
        items: vec![ItemCapture {
            class: ItemClass::Incoming,
            media: Some(MediaCapture::Image(ImageCapture {
                placeholder: Some(PLACEHOLDER.to_string()),
                source: Some(FULL.to_string()),
                ready_after,
                reveal: false,
            })),
            ..Default::default()
        }],
        assets,
        ..Default::default()
    })
}

fn policy(attempts: u32) -> PollPolicy {
    PollPolicy::new(Duration::ZERO, attempts)
}

#[test]
fn image_succeeds_on_any_attempt_within_budget() {
    let attempts = 6;
    for ready_after in 1..=attempts {
        let mut host = image_host(ready_after);
        let item = host.items().unwrap().remove(0);
        let resolver = ResourceResolver::new(policy(attempts), host.fetcher(), CancelToken::new());

        let media = resolver.resolve(&mut host, &item, "wae_1");

        assert_eq!(media.status, MediaStatus::Ok, "ready_after={}", ready_after);
        assert_eq!(media.payload, b"full");
        assert_eq!(host.image_polls(&item), ready_after);
    }
}

#[test]
fn image_past_budget_degrades_to_preview_after_exactly_n_polls() {
    let mut host = image_host(9);
    let item = host.items().unwrap().remove(0);
    let resolver = ResourceResolver::new(policy(4), host.fetcher(), CancelToken::new());

    let media = resolver.resolve(&mut host, &item, "wae_1");

    assert_eq!(media.status, MediaStatus::Preview);
    assert_eq!(media.payload, b"preview");
    assert_eq!(host.image_polls(&item), 4);
}

#[test]
fn inline_references_are_never_fetched() {
    let mut host = image_host(u32::MAX);
    let item = host.items().unwrap().remove(0);
    let fetcher = RecordingFetcher::default();
    let resolver = ResourceResolver::new(policy(2), &fetcher, CancelToken::new());

    let media = resolver.resolve(&mut host, &item, "wae_1");

    assert_eq!(media.status, MediaStatus::Preview);
    assert!(fetcher.requests.borrow().is_empty());
}

#[test]
fn finalized_references_go_through_the_fetcher() {
    let mut host = image_host(1);
    let item = host.items().unwrap().remove(0);
    let fetcher = RecordingFetcher::default();
    let resolver = ResourceResolver::new(policy(2), &fetcher, CancelToken::new());

    let media = resolver.resolve(&mut host, &item, "wae_1");

    assert_eq!(media.status, MediaStatus::Ok);
    assert_eq!(*fetcher.requests.borrow(), vec![FULL.to_string()]);
}

#[test]
fn cancelled_before_probing_is_not_found() {
    let mut host = image_host(5);
    let item = host.items().unwrap().remove(0);
    let cancel = CancelToken::new();
    cancel.cancel();
    let resolver = ResourceResolver::new(policy(10), host.fetcher(), cancel);

    let media = resolver.resolve(&mut host, &item, "wae_1");

    assert_eq!(media.kind, MediaKind::Image);
    assert_eq!(media.status, MediaStatus::NotFound);
    assert_eq!(media.path, "wae_1.jpeg");
    assert_eq!(host.image_polls(&item), 0);
}

#[test]
fn cancel_after_placeholder_was_seen_is_not_found() {
    let mut host = image_host(50);
    let item = host.items().unwrap().remove(0);
    let cancel = CancelToken::new();
    let resolver = ResourceResolver::new(
        PollPolicy::new(Duration::from_millis(100), 10),
        host.fetcher(),
        cancel.clone(),
    );

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        cancel.cancel();
    });
    let media = resolver.resolve(&mut host, &item, "wae_1");
    canceller.join().unwrap();

    assert!(host.image_polls(&item) >= 1, "placeholder was probed");
    assert_eq!(media.kind, MediaKind::Image);
    assert_eq!(media.status, MediaStatus::NotFound);
    assert!(media.payload.is_empty());
    assert_eq!(media.path, "wae_1.jpeg");
}

#[test]
fn resolver_exposes_its_policy() {
    let host = image_host(1);
    let resolver = ResourceResolver::new(policy(3), host.fetcher(), CancelToken::new());
    assert_eq!(resolver.policy().max_attempts, 3);
}
