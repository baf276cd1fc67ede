//! The host view the engine reads from.
//!
//! The engine never talks to a page directly. It sees the conversation through
//! two capability traits:
//!
//! - [`VisualItem`] - one rendered turn, answering read-only questions about
//!   itself (classification, attribution line, labels, text, media affordances)
//! - [`HostView`] - the page around the items: scrolling, counting, snapshots,
//!   sibling navigation and the user-triggered media actions
//!
//! Media queries that change over time (`image_source`, `now_playing_source`)
//! take `&self`; implementations that simulate rendering keep their clocks in
//! interior cells.

pub mod replay;

pub use replay::{PageCapture, ReplayFetcher, ReplayHost, ReplayItem};

use thiserror::Error;

/// Classification tag of a visual item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemClass {
    /// Message received from another participant
    Incoming,
    /// Message sent by the exporting user
    Outgoing,
    /// Day boundary marker carrying a date label
    DateDivider,
    /// Any other status/system notice
    System,
}

impl ItemClass {
    /// Whether items of this class become conversation records.
    pub fn is_message(self) -> bool {
        matches!(self, ItemClass::Incoming | ItemClass::Outgoing)
    }
}

/// One rendered turn in the conversation view.
///
/// All methods are pure reads; the engine never mutates an item.
pub trait VisualItem: Clone {
    /// Classification tag of the item.
    fn class(&self) -> ItemClass;

    /// Combined "[time, date] author: " annotation, if the item carries one.
    fn attribution_line(&self) -> Option<String>;

    /// Secondary author label (present on some attribution-less bubbles).
    fn author_label(&self) -> Option<String>;

    /// Secondary time label (present on media bubbles).
    fn time_label(&self) -> Option<String>;

    /// Label of a date divider item.
    fn divider_label(&self) -> Option<String>;

    /// Text content of the item's text sub-element.
    fn text(&self) -> Option<String>;

    /// Aliases of the inline emoji images inside the text sub-element, in order.
    fn emoji_aliases(&self) -> Vec<String>;

    /// The item contains an image container.
    fn has_image_container(&self) -> bool;

    /// The image container has a manual "reveal"/download control.
    fn has_reveal_control(&self) -> bool;

    /// The item shows a video affordance that must be activated to load.
    fn has_video_control(&self) -> bool;

    /// The item embeds a self-contained animation player.
    fn has_animation_player(&self) -> bool;
}

/// Errors a host may report when asked for a snapshot.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Conversation view is not available: {0}")]
    Unavailable(String),

    #[error("Host query failed: {0}")]
    Query(String),
}

/// The page hosting the conversation view.
pub trait HostView {
    /// Handle type for the items of this host.
    type Item: VisualItem;

    /// Title of the open conversation.
    fn title(&self) -> Option<String>;

    /// Current offset of the scrollable message region.
    fn scroll_offset(&self) -> u64;

    /// Command the scrollable region to the given offset.
    fn scroll_to(&mut self, offset: u64);

    /// Number of currently materialized items.
    fn item_count(&self) -> usize;

    /// All materialized items in document order.
    fn items(&self) -> Result<Vec<Self::Item>, HostError>;

    /// The item rendered directly before `item`, if any.
    fn preceding_sibling(&self, item: &Self::Item) -> Option<Self::Item>;

    /// Click the image container's reveal control.
    fn activate_reveal(&mut self, item: &Self::Item);

    /// Current `src` of the item's image element.
    fn image_source(&self, item: &Self::Item) -> Option<String>;

    /// Click the item's video affordance.
    fn activate_video(&mut self, item: &Self::Item);

    /// Source of the page-level "now playing" video element, if one is open.
    fn now_playing_source(&self) -> Option<String>;

    /// Source of the item's embedded animation player.
    fn animation_source(&self, item: &Self::Item) -> Option<String>;

    /// Close any media surface left open by activations.
    fn dismiss_overlays(&mut self) {}
}
