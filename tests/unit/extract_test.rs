//! Unit tests for record extraction

use std::time::Duration;

use wae::extract::{
    find_last_known_date, parse_attribution, ExtractOptions, MediaKind, RecordExtractor,
    UNKNOWN_AUTHOR, UNKNOWN_DATE,
};
use wae::host::replay::{ItemCapture, ReplayFetcher};
use wae::host::{HostView, ItemClass, ReplayHost};
use wae::media::ResourceResolver;
use wae::poll::PollPolicy;
use wae::CancelToken;

use crate::helpers::{divider, host_with, message};

fn extractor(host: &ReplayHost, options: ExtractOptions) -> RecordExtractor<ReplayFetcher> {
    let resolver = ResourceResolver::new(
        PollPolicy::new(Duration::ZERO, 2),
        host.fetcher(),
        CancelToken::new(),
    );
    RecordExtractor::new(options, resolver)
}

fn bare(class: ItemClass) -> ItemCapture {
    ItemCapture {
        class,
        ..Default::default()
    }
}

#[test]
fn attribution_grammar_variants() {
    let cases = [
        ("[14:32, 3/4/2021] Alice: ", Some(("14:32", "3/4/2021", "Alice"))),
        ("[9:05 PM, 12/31/2020] Bob Smith: ", Some(("9:05 PM", "12/31/2020", "Bob Smith"))),
        ("[14:32, 3/4/2021] +1 555 0100:", Some(("14:32", "3/4/2021", "+1 555 0100"))),
        ("[14:32, 3/4/2021] Alice:hi", Some(("14:32", "3/4/2021", "Alice"))),
        ("14:32, 3/4/2021 Alice: ", None),
        ("[14:32 3/4/2021] Alice: ", None),
        ("[14:32, 3/4/2021] : hi", None),
        ("", None),
    ];

    for (line, expected) in cases {
        let parsed = parse_attribution(line);
        let actual = parsed
            .as_ref()
            .map(|a| (a.time.as_str(), a.date.as_str(), a.author.as_str()));
        assert_eq!(actual, expected, "line {:?}", line);
    }
}

#[test]
fn extracting_twice_yields_the_same_record() {
    let mut host = host_with(vec![
        divider("3/4/2021"),
        message("Alice", "14:32", "3/4/2021", "hi"),
    ]);
    let item = host.items().unwrap().remove(1);
    let extractor = extractor(&host, ExtractOptions::default());

    let first = extractor.extract(&mut host, &item, 1).unwrap();
    let second = extractor.extract(&mut host, &item, 1).unwrap();

    assert_eq!(first, second);
}

#[test]
fn blank_author_label_becomes_unknown() {
    let mut item = bare(ItemClass::Outgoing);
    item.author_label = Some("   ".to_string());
    let mut host = host_with(vec![item]);
    let item = host.items().unwrap().remove(0);

    let record = extractor(&host, ExtractOptions::default())
        .extract(&mut host, &item, 1)
        .unwrap();

    assert_eq!(record.author, UNKNOWN_AUTHOR);
    assert_eq!(record.date, UNKNOWN_DATE);
    assert_eq!(record.time, "");
    assert_eq!(record.text, "");
    assert_eq!(record.media.kind, MediaKind::None);
}

#[test]
fn deep_history_lookup_is_bounded_and_does_not_recurse() {
    let mut items = vec![divider("1/1/2019")];
    items.extend((0..20_000).map(|_| bare(ItemClass::Incoming)));
    let host = host_with(items);
    let last = host.items().unwrap().pop().unwrap();

    assert_eq!(find_last_known_date(&host, &last, 5_000), None);
    assert_eq!(
        find_last_known_date(&host, &last, 20_000).as_deref(),
        Some("1/1/2019")
    );
}

#[test]
fn custom_media_prefix_names_entries() {
    let mut host = host_with(vec![ItemCapture {
        class: ItemClass::Incoming,
        media: Some(wae::host::replay::MediaCapture::Animation { source: None }),
        ..Default::default()
    }]);
    let item = host.items().unwrap().remove(0);
    let options = ExtractOptions {
        media_prefix: "chat".to_string(),
        ..Default::default()
    };

    let record = extractor(&host, options)
        .extract(&mut host, &item, 12)
        .unwrap();

    assert_eq!(record.media.path, "chat_12.mp4");
}
