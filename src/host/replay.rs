//! Replay of a captured conversation page.
//!
//! A [`PageCapture`] is a JSON description of a conversation view: its items in
//! document order, how the view materializes older history, and how media
//! renders. [`ReplayHost`] plays it back behind the [`HostView`] trait:
//!
//! - only the newest `initially_rendered` items exist at first; each scroll
//!   command that reaches the top materializes `batch_size` older items and
//!   pushes the offset down by their height
//! - image sources stay on their placeholder until they have been polled
//!   `ready_after` times (and revealed, when the item has a reveal control)
//! - activating a video opens a single page-level player whose source
//!   appears after `ready_after` polls
//!
//! ```json
//! {
//!   "title": "Family",
//!   "initially_rendered": 30,
//!   "batch_size": 20,
//!   "items": [
//!     {"class": "date_divider", "label": "3/4/2021"},
//!     {"class": "incoming", "attribution": "[14:32, 3/4/2021] Alice: ", "text": "hi"},
//!     {"class": "outgoing", "time_label": "14:40",
//!      "media": {"type": "image", "source": "blob:https://host/1", "ready_after": 2}}
//!   ],
//!   "assets": {"blob:https://host/1": {"file": "media/1.jpeg"}}
//! }
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::{HostError, HostView, ItemClass, VisualItem};
use crate::media::fetch::{is_http_reference, FetchError, FetchResult, Fetcher, HttpFetcher};

fn default_batch_size() -> usize {
    20
}

fn default_item_height() -> u64 {
    48
}

fn default_viewport_height() -> u64 {
    720
}

/// Captured conversation page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageCapture {
    #[serde(default)]
    pub title: Option<String>,
    /// Items rendered before any scrolling (`None` = all of them)
    #[serde(default)]
    pub initially_rendered: Option<usize>,
    /// Older items materialized each time the view reaches its top
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Rendered height of one item
    #[serde(default = "default_item_height")]
    pub item_height: u64,
    /// Height of the scrollable viewport
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u64,
    /// When set, snapshots fail with this message
    #[serde(default)]
    pub unavailable: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemCapture>,
    /// Bytes behind non-inline media references
    #[serde(default)]
    pub assets: BTreeMap<String, AssetCapture>,
}

impl Default for PageCapture {
    fn default() -> Self {
        Self {
            title: None,
            initially_rendered: None,
            batch_size: default_batch_size(),
            item_height: default_item_height(),
            viewport_height: default_viewport_height(),
            unavailable: None,
            items: Vec::new(),
            assets: BTreeMap::new(),
        }
    }
}

/// One captured item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCapture {
    pub class: ItemClass,
    #[serde(default)]
    pub attribution: Option<String>,
    #[serde(default)]
    pub author_label: Option<String>,
    #[serde(default)]
    pub time_label: Option<String>,
    /// Date divider label
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub emojis: Vec<String>,
    #[serde(default)]
    pub media: Option<MediaCapture>,
}

impl Default for ItemCapture {
    fn default() -> Self {
        Self {
            class: ItemClass::Incoming,
            attribution: None,
            author_label: None,
            time_label: None,
            label: None,
            text: None,
            emojis: Vec::new(),
            media: None,
        }
    }
}

/// Media affordance of a captured item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaCapture {
    Image(ImageCapture),
    Video(VideoCapture),
    Animation {
        #[serde(default)]
        source: Option<String>,
    },
}

/// Image container behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageCapture {
    /// Inline low-resolution reference shown until the image finalizes
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Final reference
    #[serde(default)]
    pub source: Option<String>,
    /// Polls needed before `source` replaces the placeholder
    #[serde(default)]
    pub ready_after: u32,
    /// The container has a reveal control that must be clicked first
    #[serde(default)]
    pub reveal: bool,
}

/// Video affordance behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoCapture {
    /// Source of the player once it opens (`None` = never plays)
    #[serde(default)]
    pub source: Option<String>,
    /// Polls of the player needed before its source appears
    #[serde(default)]
    pub ready_after: u32,
}

/// Bytes behind one media reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetCapture {
    /// Literal UTF-8 content
    #[serde(default)]
    pub text: Option<String>,
    /// Base64-encoded content
    #[serde(default)]
    pub base64: Option<String>,
    /// File path, relative to the capture file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl AssetCapture {
    /// Asset with literal content.
    pub fn text(content: &str) -> Self {
        Self {
            text: Some(content.to_string()),
            ..Default::default()
        }
    }

    fn load(&self, base_dir: &Path) -> FetchResult<Vec<u8>> {
        if let Some(text) = &self.text {
            return Ok(text.as_bytes().to_vec());
        }
        if let Some(encoded) = &self.base64 {
            return BASE64_STANDARD
                .decode(encoded.as_bytes())
                .map_err(|e| FetchError::Decode(e.to_string()));
        }
        if let Some(file) = &self.file {
            return Ok(fs::read(base_dir.join(file))?);
        }
        Err(FetchError::Empty)
    }
}

/// Handle to one replayed item.
#[derive(Debug, Clone)]
pub struct ReplayItem {
    index: usize,
    capture: Rc<ItemCapture>,
}

impl ReplayItem {
    /// Position of the item in the full capture.
    pub fn index(&self) -> usize {
        self.index
    }

    fn image(&self) -> Option<&ImageCapture> {
        match &self.capture.media {
            Some(MediaCapture::Image(image)) => Some(image),
            _ => None,
        }
    }
}

impl VisualItem for ReplayItem {
    fn class(&self) -> ItemClass {
        self.capture.class
    }

    fn attribution_line(&self) -> Option<String> {
        self.capture.attribution.clone()
    }

    fn author_label(&self) -> Option<String> {
        self.capture.author_label.clone()
    }

    fn time_label(&self) -> Option<String> {
        self.capture.time_label.clone()
    }

    fn divider_label(&self) -> Option<String> {
        self.capture.label.clone()
    }

    fn text(&self) -> Option<String> {
        self.capture.text.clone()
    }

    fn emoji_aliases(&self) -> Vec<String> {
        self.capture.emojis.clone()
    }

    fn has_image_container(&self) -> bool {
        self.image().is_some()
    }

    fn has_reveal_control(&self) -> bool {
        self.image().is_some_and(|image| image.reveal)
    }

    fn has_video_control(&self) -> bool {
        matches!(self.capture.media, Some(MediaCapture::Video(_)))
    }

    fn has_animation_player(&self) -> bool {
        matches!(self.capture.media, Some(MediaCapture::Animation { .. }))
    }
}

/// Host that replays a [`PageCapture`].
pub struct ReplayHost {
    title: Option<String>,
    unavailable: Option<String>,
    items: Vec<Rc<ItemCapture>>,
    assets: Rc<BTreeMap<String, AssetCapture>>,
    base_dir: PathBuf,
    batch_size: usize,
    item_height: u64,
    viewport_height: u64,
    /// Index of the oldest materialized item
    rendered_from: usize,
    offset: u64,
    scroll_commands: usize,
    revealed: HashSet<usize>,
    image_polls: RefCell<HashMap<usize, u32>>,
    playing: Option<usize>,
    now_playing_polls: Cell<u32>,
    overlays_dismissed: usize,
}

impl ReplayHost {
    /// Build a host from an in-memory capture.
    pub fn new(capture: PageCapture) -> Self {
        let total = capture.items.len();
        let rendered = capture.initially_rendered.unwrap_or(total).min(total);

        let mut host = Self {
            title: capture.title,
            unavailable: capture.unavailable,
            items: capture.items.into_iter().map(Rc::new).collect(),
            assets: Rc::new(capture.assets),
            base_dir: PathBuf::from("."),
            batch_size: capture.batch_size.max(1),
            item_height: capture.item_height.max(1),
            viewport_height: capture.viewport_height,
            rendered_from: total - rendered,
            offset: 0,
            scroll_commands: 0,
            revealed: HashSet::new(),
            image_polls: RefCell::new(HashMap::new()),
            playing: None,
            now_playing_polls: Cell::new(0),
            overlays_dismissed: 0,
        };
        // A freshly opened conversation shows its newest messages.
        host.offset = host.max_offset();
        host
    }

    /// Load a capture file; asset paths resolve relative to its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read page capture: {}", path.display()))?;
        let capture: PageCapture = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse page capture: {}", path.display()))?;

        let mut host = Self::new(capture);
        if let Some(parent) = path.parent() {
            host.base_dir = parent.to_path_buf();
        }
        Ok(host)
    }

    /// Fetcher serving this capture's assets.
    pub fn fetcher(&self) -> ReplayFetcher {
        ReplayFetcher {
            assets: Rc::clone(&self.assets),
            base_dir: self.base_dir.clone(),
            http: None,
        }
    }

    /// Number of scroll commands received.
    pub fn scroll_commands(&self) -> usize {
        self.scroll_commands
    }

    /// Number of times the item's image source was read.
    pub fn image_polls(&self, item: &ReplayItem) -> u32 {
        self.image_polls
            .borrow()
            .get(&item.index)
            .copied()
            .unwrap_or(0)
    }

    /// Whether the item's reveal control was clicked.
    pub fn was_revealed(&self, item: &ReplayItem) -> bool {
        self.revealed.contains(&item.index)
    }

    /// Polls of the page-level player since the last video activation.
    pub fn now_playing_polls(&self) -> u32 {
        self.now_playing_polls.get()
    }

    /// Number of times open overlays were dismissed.
    pub fn overlays_dismissed(&self) -> usize {
        self.overlays_dismissed
    }

    fn rendered_count(&self) -> usize {
        self.items.len() - self.rendered_from
    }

    fn max_offset(&self) -> u64 {
        (self.rendered_count() as u64)
            .saturating_mul(self.item_height)
            .saturating_sub(self.viewport_height)
    }

    fn handle(&self, index: usize) -> ReplayItem {
        ReplayItem {
            index,
            capture: Rc::clone(&self.items[index]),
        }
    }
}

impl HostView for ReplayHost {
    type Item = ReplayItem;

    fn title(&self) -> Option<String> {
        self.title.clone()
    }

    fn scroll_offset(&self) -> u64 {
        self.offset
    }

    fn scroll_to(&mut self, offset: u64) {
        self.scroll_commands += 1;
        let previous = self.offset;
        let target = offset.min(self.max_offset());

        // Heading for the top materializes the next batch of history above the
        // viewport. The content shift lands before the scroll does, so the
        // view stays anchored to where it was.
        if target < self.item_height && self.rendered_from > 0 {
            let loaded = self.batch_size.min(self.rendered_from);
            self.rendered_from -= loaded;
            let shift = (loaded as u64).saturating_mul(self.item_height);
            self.offset = previous.saturating_add(shift).min(self.max_offset());
        } else {
            self.offset = target;
        }
    }

    fn item_count(&self) -> usize {
        self.rendered_count()
    }

    fn items(&self) -> Result<Vec<ReplayItem>, HostError> {
        if let Some(reason) = &self.unavailable {
            return Err(HostError::Unavailable(reason.clone()));
        }
        Ok((self.rendered_from..self.items.len())
            .map(|index| self.handle(index))
            .collect())
    }

    fn preceding_sibling(&self, item: &ReplayItem) -> Option<ReplayItem> {
        item.index
            .checked_sub(1)
            .filter(|index| *index >= self.rendered_from)
            .map(|index| self.handle(index))
    }

    fn activate_reveal(&mut self, item: &ReplayItem) {
        self.revealed.insert(item.index);
    }

    fn image_source(&self, item: &ReplayItem) -> Option<String> {
        let image = item.image()?;

        let polls = {
            let mut counts = self.image_polls.borrow_mut();
            let count = counts.entry(item.index).or_insert(0);
            *count += 1;
            *count
        };

        let unlocked = !image.reveal || self.revealed.contains(&item.index);
        if unlocked && polls >= image.ready_after {
            if let Some(source) = &image.source {
                return Some(source.clone());
            }
        }
        image.placeholder.clone()
    }

    fn activate_video(&mut self, item: &ReplayItem) {
        self.playing = Some(item.index);
        self.now_playing_polls.set(0);
    }

    fn now_playing_source(&self) -> Option<String> {
        let polls = self.now_playing_polls.get() + 1;
        self.now_playing_polls.set(polls);

        let playing = self.items.get(self.playing?)?;
        match &playing.media {
            Some(MediaCapture::Video(video)) if polls >= video.ready_after => video.source.clone(),
            _ => None,
        }
    }

    fn animation_source(&self, item: &ReplayItem) -> Option<String> {
        match &item.capture.media {
            Some(MediaCapture::Animation { source }) => source.clone(),
            _ => None,
        }
    }

    fn dismiss_overlays(&mut self) {
        self.playing = None;
        self.overlays_dismissed += 1;
    }
}

/// Fetcher for a replayed page: capture assets first, then http(s).
pub struct ReplayFetcher {
    assets: Rc<BTreeMap<String, AssetCapture>>,
    base_dir: PathBuf,
    http: Option<HttpFetcher>,
}

impl ReplayFetcher {
    /// Fall back to `http` for http(s) references missing from the capture.
    pub fn with_http(mut self, http: HttpFetcher) -> Self {
        self.http = Some(http);
        self
    }
}

impl Fetcher for ReplayFetcher {
    fn fetch(&self, reference: &str) -> FetchResult<Vec<u8>> {
        if let Some(asset) = self.assets.get(reference) {
            let bytes = asset.load(&self.base_dir)?;
            if bytes.is_empty() {
                return Err(FetchError::Empty);
            }
            return Ok(bytes);
        }

        match &self.http {
            Some(http) if is_http_reference(reference) => http.fetch(reference),
            _ => Err(FetchError::UnknownReference(reference.to_string())),
        }
    }
}
