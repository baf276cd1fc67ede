//! End-to-end extraction of captured conversations

use std::io::Cursor;

use wae::archive::read_archive;
use wae::extract::{MediaKind, MediaStatus, UNKNOWN_AUTHOR};
use wae::host::replay::{ItemCapture, MediaCapture, PageCapture, VideoCapture};
use wae::host::{ItemClass, ReplayHost};
use wae::pagination::StopReason;
use wae::progress::{MemoryProgress, Phase, ProgressSink};
use wae::{CancelToken, ExtractError, ExtractorService};

use crate::helpers::{fast_options, fixture};

/// Cancels the run once parsing reaches a given item.
struct CancelAt {
    index: usize,
    cancel: CancelToken,
}

impl ProgressSink for CancelAt {
    fn report(&self, phase: &Phase) {
        if let Phase::Parsing { index, .. } = phase {
            if *index == self.index {
                self.cancel.cancel();
            }
        }
    }
}

fn family() -> ReplayHost {
    ReplayHost::load(&fixture("family.json")).unwrap()
}

#[test]
fn family_capture_exports_every_message() {
    let mut host = family();
    let fetcher = host.fetcher();
    let progress = MemoryProgress::new();

    let outcome = ExtractorService::new(fast_options(10))
        .run(&mut host, fetcher, &progress)
        .unwrap();

    let report = &outcome.report;
    assert_eq!(report.title, "Family");
    assert_eq!(report.items_seen, 12);
    assert_eq!(report.records, 9);
    assert_eq!(report.media_found, 4);
    assert_eq!(report.media_missing, 2);
    assert_eq!(report.stop_reason, StopReason::TopReached);
    assert!(!report.cancelled);
    assert!(report.is_complete());

    let ids: Vec<u64> = outcome.records.iter().map(|r| r.id).collect();
    assert_eq!(ids, (1..=9).collect::<Vec<_>>());

    assert!(matches!(
        progress.phases().last(),
        Some(Phase::Finished { records: 9 })
    ));
}

#[test]
fn family_records_carry_the_expected_fields() {
    let mut host = family();
    let fetcher = host.fetcher();
    let outcome = ExtractorService::new(fast_options(10))
        .run(&mut host, fetcher, &MemoryProgress::new())
        .unwrap();
    let records = &outcome.records;

    assert_eq!(records[0].author, "Alice");
    assert_eq!(records[0].text, "hi");
    assert_eq!(records[1].emojis, vec!["😀", "😀"]);

    // Revealed image that finalized on its second poll
    assert_eq!(records[2].author, "Alice");
    assert_eq!(records[2].time, "14:35");
    assert_eq!(records[2].date, "3/4/2021");
    assert_eq!(records[2].media.status, MediaStatus::Ok);
    assert_eq!(records[2].media.path, "wae_3.jpeg");
    assert_eq!(records[2].media.payload, b"full image");

    // Placeholder that never finalizes
    assert_eq!(records[3].author, UNKNOWN_AUTHOR);
    assert_eq!(records[3].time, "");
    assert_eq!(records[3].media.status, MediaStatus::Preview);
    assert_eq!(records[3].media.payload, b"thumbnail");

    assert_eq!(records[4].media.kind, MediaKind::Video);
    assert_eq!(records[4].media.path, "wae_5.mp4");
    assert_eq!(records[4].media.payload, b"fake mp4 bytes");

    assert_eq!(records[5].media.status, MediaStatus::NotFound);
    assert_eq!(records[5].media.path, "");

    assert_eq!(records[6].media.kind, MediaKind::Animation);
    assert_eq!(records[6].media.payload, b"looping gif");

    assert_eq!(records[7].text, "see you");
    assert_eq!(records[7].media.kind, MediaKind::None);

    assert_eq!(records[8].media.status, MediaStatus::NotFound);
    assert_eq!(records[8].media.path, "wae_9.jpeg");
    assert!(records[8].media.payload.is_empty());
}

#[test]
fn archive_matches_the_returned_records() {
    let mut host = family();
    let fetcher = host.fetcher();
    let outcome = ExtractorService::new(fast_options(10))
        .run(&mut host, fetcher, &MemoryProgress::new())
        .unwrap();

    let contents = read_archive(Cursor::new(outcome.archive)).unwrap();

    assert_eq!(contents.folder, "Family");
    assert_eq!(contents.records, outcome.records);
    // Every payload has a path and every archived path has a payload
    for record in &contents.records {
        if record.media.has_payload() {
            assert!(!record.media.path.is_empty(), "record {}", record.id);
        }
    }
    assert_eq!(contents.media_records().count(), 4);
}

#[test]
fn attribution_line_with_trailing_text() {
    let mut host = ReplayHost::new(PageCapture {
        title: Some("Scenario".to_string()),
        items: vec![ItemCapture {
            class: ItemClass::Incoming,
            attribution: Some("[14:32, 3/4/2021] Alice: hi".to_string()),
            ..Default::default()
        }],
        ..Default::default()
    });
    let fetcher = host.fetcher();

    let outcome = ExtractorService::new(fast_options(2))
        .run(&mut host, fetcher, &MemoryProgress::new())
        .unwrap();

    let record = &outcome.records[0];
    assert_eq!(record.author, "Alice");
    assert_eq!(record.date, "3/4/2021");
    assert_eq!(record.time, "14:32");
    assert_eq!(record.text, "hi");
}

#[test]
fn attribution_less_image_takes_the_date_two_items_back() {
    let mut host = ReplayHost::new(PageCapture {
        title: Some("Scenario".to_string()),
        items: vec![
            ItemCapture {
                class: ItemClass::DateDivider,
                label: Some("3/4/2021".to_string()),
                ..Default::default()
            },
            ItemCapture {
                class: ItemClass::System,
                text: Some("Alice joined".to_string()),
                ..Default::default()
            },
            ItemCapture {
                class: ItemClass::Incoming,
                media: Some(MediaCapture::Image(Default::default())),
                ..Default::default()
            },
        ],
        ..Default::default()
    });
    let fetcher = host.fetcher();

    let outcome = ExtractorService::new(fast_options(2))
        .run(&mut host, fetcher, &MemoryProgress::new())
        .unwrap();

    let record = &outcome.records[0];
    assert_eq!(record.author, UNKNOWN_AUTHOR);
    assert_eq!(record.date, "3/4/2021");
    assert_eq!(record.media.kind, MediaKind::Image);
}

#[test]
fn video_that_never_plays_has_no_path() {
    let mut host = ReplayHost::new(PageCapture {
        title: Some("Scenario".to_string()),
        items: vec![ItemCapture {
            class: ItemClass::Outgoing,
            attribution: Some("[09:00, 3/5/2021] Me: ".to_string()),
            media: Some(MediaCapture::Video(VideoCapture {
                source: Some("blob:https://web.example/late".to_string()),
                ready_after: 50,
            })),
            ..Default::default()
        }],
        ..Default::default()
    });
    let fetcher = host.fetcher();

    let outcome = ExtractorService::new(fast_options(5))
        .run(&mut host, fetcher, &MemoryProgress::new())
        .unwrap();

    let media = &outcome.records[0].media;
    assert_eq!(media.kind, MediaKind::Video);
    assert_eq!(media.status, MediaStatus::NotFound);
    assert_eq!(media.path, "");
    assert!(media.payload.is_empty());
    assert_eq!(host.now_playing_polls(), 5);
}

#[test]
fn cancel_during_parsing_packages_a_partial_transcript() {
    let mut host = family();
    let fetcher = host.fetcher();
    let service = ExtractorService::new(fast_options(10));
    // Parsing item 4 is the second message
    let progress = CancelAt {
        index: 4,
        cancel: service.cancel_token(),
    };

    let outcome = service.run(&mut host, fetcher, &progress).unwrap();

    assert!(outcome.report.cancelled);
    assert_eq!(outcome.report.records, 2);
    let contents = read_archive(Cursor::new(outcome.archive)).unwrap();
    let ids: Vec<u64> = contents.records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn cancel_before_history_is_loaded_fails_the_run() {
    let mut host = family();
    let fetcher = host.fetcher();
    let service = ExtractorService::new(fast_options(10));
    service.cancel_token().cancel();

    let result = service.run(&mut host, fetcher, &MemoryProgress::new());

    assert!(matches!(result, Err(ExtractError::Cancelled)));
    assert_eq!(host.scroll_commands(), 0);
}

#[test]
fn unavailable_view_is_reported() {
    let mut host = ReplayHost::load(&fixture("unavailable.json")).unwrap();
    let fetcher = host.fetcher();

    let result =
        ExtractorService::new(fast_options(2)).run(&mut host, fetcher, &MemoryProgress::new());

    assert!(matches!(result, Err(ExtractError::Snapshot(_))));
}

#[test]
fn untitled_conversation_is_rejected() {
    let mut host = ReplayHost::load(&fixture("untitled.json")).unwrap();
    let fetcher = host.fetcher();

    let result =
        ExtractorService::new(fast_options(2)).run(&mut host, fetcher, &MemoryProgress::new());

    assert!(matches!(result, Err(ExtractError::MissingTitle)));
    assert_eq!(host.scroll_commands(), 0);
}
