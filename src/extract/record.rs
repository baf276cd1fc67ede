//! Turning one visual item into a [`ConversationRecord`].
//!
//! Fields come from the attribution line when the item has a parseable one.
//! Attribution-less items (media-only bubbles in some render modes) fall back
//! field by field:
//!
//! | field  | fallback chain                                                    |
//! |--------|-------------------------------------------------------------------|
//! | author | author label → `"Unknown"`                                        |
//! | time   | time label → `""`                                                 |
//! | date   | nearest preceding date divider (bounded walk) → `"Unknown date"`  |

use tracing::debug;

use crate::host::{HostView, ItemClass, VisualItem};
use crate::media::{Fetcher, ResourceResolver};

use super::attribution::parse_attribution;
use super::types::{media_base_name, ConversationRecord, UNKNOWN_AUTHOR, UNKNOWN_DATE};

/// Settings for record extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Prefix of media entry names (`<prefix>_<id>.<ext>`)
    pub media_prefix: String,
    /// Maximum number of siblings visited when looking for a date divider
    pub date_lookback: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            media_prefix: "wae".to_string(),
            date_lookback: 5000,
        }
    }
}

/// Extracts normalized records from visual items.
pub struct RecordExtractor<F> {
    options: ExtractOptions,
    resolver: ResourceResolver<F>,
}

impl<F: Fetcher> RecordExtractor<F> {
    /// Create an extractor that resolves media with `resolver`.
    pub fn new(options: ExtractOptions, resolver: ResourceResolver<F>) -> Self {
        Self { options, resolver }
    }

    /// Extract the record for `item`, numbered `id`.
    ///
    /// Returns `None` for items that are not incoming or outgoing messages.
    /// Media resolution, including all of its polling, completes before this
    /// returns.
    pub fn extract<H: HostView>(
        &self,
        host: &mut H,
        item: &H::Item,
        id: u64,
    ) -> Option<ConversationRecord> {
        if !item.class().is_message() {
            return None;
        }

        let attribution = item
            .attribution_line()
            .and_then(|line| parse_attribution(&line));

        let (author, date, time, trailing) = match attribution {
            Some(a) => (a.author, a.date, a.time, a.trailing),
            None => {
                debug!(id, "no attribution line, using fallbacks");
                let author = item
                    .author_label()
                    .filter(|label| !label.trim().is_empty())
                    .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
                let time = item.time_label().unwrap_or_default();
                let date = find_last_known_date(&*host, item, self.options.date_lookback)
                    .unwrap_or_else(|| UNKNOWN_DATE.to_string());
                (author, date, time, None)
            }
        };

        let text = item.text().or(trailing).unwrap_or_default();
        let emojis = item.emoji_aliases();

        let base_name = media_base_name(&self.options.media_prefix, id);
        let media = self.resolver.resolve(host, item, &base_name);

        Some(ConversationRecord {
            id,
            author,
            date,
            time,
            text,
            emojis,
            media,
        })
    }
}

/// Walk preceding siblings of `item` to the nearest date divider with a
/// non-empty label.
///
/// Visits at most `max_steps` siblings. Returns `None` when the walk reaches
/// the start of the list or the step limit without finding one.
pub fn find_last_known_date<H: HostView>(
    host: &H,
    item: &H::Item,
    max_steps: usize,
) -> Option<String> {
    let mut current = host.preceding_sibling(item);
    let mut steps = 0;

    while let Some(sibling) = current {
        if steps >= max_steps {
            debug!(max_steps, "date lookback limit reached");
            return None;
        }
        steps += 1;

        if sibling.class() == ItemClass::DateDivider {
            if let Some(label) = sibling.divider_label() {
                let label = label.trim();
                if !label.is_empty() {
                    return Some(label.to_string());
                }
            }
        }
        current = host.preceding_sibling(&sibling);
    }

    None
}
