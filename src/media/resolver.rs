//! Resource resolution for one visual item.
//!
//! # Classification
//!
//! First match wins:
//!
//! 1. image container - optional reveal click, then poll the image `src`
//!    until it is finalized (`blob:`), falling back to the last placeholder
//! 2. video affordance - click to start playback, then poll the page-level
//!    "now playing" element
//! 3. animation player - source is present immediately, no polling
//! 4. nothing - `kind = none`
//!
//! Every failure below classification (timeouts, fetch errors, bad inline
//! payloads) degrades to `status = not_found`; nothing is raised.

use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::extract::{MediaKind, MediaResult, MediaStatus};
use crate::host::{HostView, VisualItem};
use crate::poll::{poll_until, PollOutcome, PollPolicy, Probe};

use super::fetch::{decode_data_reference, is_data_reference, FetchResult, Fetcher};

/// Scheme of references backed by bytes the host already holds.
const FINALIZED_SCHEME: &str = "blob:";

/// Classify the media affordance of an item.
pub fn classify<I: VisualItem>(item: &I) -> MediaKind {
    if item.has_image_container() {
        MediaKind::Image
    } else if item.has_video_control() {
        MediaKind::Video
    } else if item.has_animation_player() {
        MediaKind::Animation
    } else {
        MediaKind::None
    }
}

/// Whether an image reference points at the final, full-resolution resource.
pub fn is_finalized(reference: &str) -> bool {
    reference.starts_with(FINALIZED_SCHEME)
}

/// Waits for lazily rendered media and retrieves its bytes.
pub struct ResourceResolver<F> {
    policy: PollPolicy,
    fetcher: F,
    cancel: CancelToken,
}

impl<F: Fetcher> ResourceResolver<F> {
    /// Create a resolver polling with `policy` and fetching with `fetcher`.
    pub fn new(policy: PollPolicy, fetcher: F, cancel: CancelToken) -> Self {
        Self {
            policy,
            fetcher,
            cancel,
        }
    }

    /// The polling policy in use.
    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Resolve the media of `item`, proposing `base_name` for the archive entry.
    pub fn resolve<H: HostView>(
        &self,
        host: &mut H,
        item: &H::Item,
        base_name: &str,
    ) -> MediaResult {
        match classify(item) {
            MediaKind::Image => self.resolve_image(host, item, base_name),
            MediaKind::Video => self.resolve_video(host, item, base_name),
            MediaKind::Animation => self.resolve_animation(host, item, base_name),
            MediaKind::None => MediaResult::none(),
        }
    }

    fn resolve_image<H: HostView>(
        &self,
        host: &mut H,
        item: &H::Item,
        base_name: &str,
    ) -> MediaResult {
        let path = entry_path(base_name, MediaKind::Image);

        if item.has_reveal_control() {
            debug!(base_name, "activating image reveal control");
            host.activate_reveal(item);
        }

        let host = &*host;
        let outcome = poll_until(&self.policy, &self.cancel, |_| match host.image_source(item) {
            Some(source) if is_finalized(&source) => Probe::Ready(source),
            Some(source) if !source.is_empty() => Probe::Pending(Some(source)),
            _ => Probe::Pending(None),
        });

        let reference = match outcome {
            PollOutcome::Resolved { value, .. } => Some(value),
            PollOutcome::TimedOut {
                last_seen,
                attempts,
            } => {
                debug!(
                    base_name,
                    attempts, "image source never finalized, using last reference"
                );
                last_seen
            }
            PollOutcome::Cancelled { .. } => {
                debug!(base_name, "image resolution cancelled");
                return MediaResult::not_found(MediaKind::Image, path);
            }
        };

        let Some(reference) = reference else {
            warn!(base_name, "image has no source reference");
            return MediaResult::not_found(MediaKind::Image, path);
        };

        let status = if is_data_reference(&reference) {
            MediaStatus::Preview
        } else {
            MediaStatus::Ok
        };

        match self.retrieve(&reference) {
            Ok(bytes) => MediaResult::retrieved(MediaKind::Image, path, status, bytes),
            Err(e) => {
                warn!(base_name, error = %e, "failed to retrieve image");
                MediaResult::not_found(MediaKind::Image, path)
            }
        }
    }

    fn resolve_video<H: HostView>(
        &self,
        host: &mut H,
        item: &H::Item,
        base_name: &str,
    ) -> MediaResult {
        debug!(base_name, "activating video control");
        host.activate_video(item);

        let host = &*host;
        let outcome = poll_until(&self.policy, &self.cancel, |_| match host.now_playing_source() {
            Some(source) if !source.is_empty() => Probe::Ready(source),
            _ => Probe::Pending(None),
        });

        let reference = match outcome {
            PollOutcome::Resolved { value, .. } => value,
            PollOutcome::TimedOut { attempts, .. } => {
                warn!(base_name, attempts, "video player never produced a source");
                return MediaResult::unresolved_video();
            }
            PollOutcome::Cancelled { .. } => {
                debug!(base_name, "video resolution cancelled");
                return MediaResult::unresolved_video();
            }
        };

        let path = entry_path(base_name, MediaKind::Video);
        match self.retrieve(&reference) {
            Ok(bytes) => MediaResult::retrieved(MediaKind::Video, path, MediaStatus::Ok, bytes),
            Err(e) => {
                warn!(base_name, error = %e, "failed to retrieve video");
                MediaResult::not_found(MediaKind::Video, path)
            }
        }
    }

    fn resolve_animation<H: HostView>(
        &self,
        host: &mut H,
        item: &H::Item,
        base_name: &str,
    ) -> MediaResult {
        let path = entry_path(base_name, MediaKind::Animation);

        let Some(reference) = host.animation_source(item).filter(|s| !s.is_empty()) else {
            warn!(base_name, "animation player has no source");
            return MediaResult::not_found(MediaKind::Animation, path);
        };

        match self.retrieve(&reference) {
            Ok(bytes) => {
                MediaResult::retrieved(MediaKind::Animation, path, MediaStatus::Ok, bytes)
            }
            Err(e) => {
                warn!(base_name, error = %e, "failed to retrieve animation");
                MediaResult::not_found(MediaKind::Animation, path)
            }
        }
    }

    /// Decode inline references locally, fetch everything else.
    fn retrieve(&self, reference: &str) -> FetchResult<Vec<u8>> {
        if is_data_reference(reference) {
            decode_data_reference(reference)
        } else {
            self.fetcher.fetch(reference)
        }
    }
}

fn entry_path(base_name: &str, kind: MediaKind) -> String {
    match kind.extension() {
        Some(ext) => format!("{}.{}", base_name, ext),
        None => String::new(),
    }
}
