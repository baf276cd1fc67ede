//! Configuration type definitions and defaults

use serde::{Deserialize, Serialize};

/// Characters a media prefix may not contain (it becomes part of a file name).
/// Largest accepted first record id.
const MAX_SEQUENCE_BASE: u64 = 1 << 53;

const INVALID_PREFIX_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|', ' '];

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
}

impl Config {
    /// Check every section, reporting the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        self.pagination.validate()?;
        self.media.validate()?;
        self.extract.validate()?;
        Ok(())
    }
}

/// History loading configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Identical scroll readings needed to consider the top reached
    #[serde(default = "default_window")]
    pub window: usize,
    /// Stop loading once more items than this are rendered
    #[serde(default = "default_ceiling")]
    pub ceiling: usize,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Offset commanded each tick
    #[serde(default = "default_scroll_target")]
    pub scroll_target: u64,
    /// Hard limit on scroll ticks, 0 for none
    #[serde(default = "default_max_ticks")]
    pub max_ticks: usize,
}

pub fn default_window() -> usize {
    10
}

pub fn default_ceiling() -> usize {
    1000
}

pub fn default_tick_interval_ms() -> u64 {
    100
}

pub fn default_scroll_target() -> u64 {
    1
}

pub fn default_max_ticks() -> usize {
    20_000
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            ceiling: default_ceiling(),
            tick_interval_ms: default_tick_interval_ms(),
            scroll_target: default_scroll_target(),
            max_ticks: default_max_ticks(),
        }
    }
}

impl PaginationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.window == 0 {
            return Err("pagination.window must be > 0".to_string());
        }
        if self.ceiling == 0 {
            return Err("pagination.ceiling must be > 0".to_string());
        }
        if self.tick_interval_ms > 60_000 {
            return Err(format!(
                "pagination.tick_interval_ms {} exceeds maximum (60000)",
                self.tick_interval_ms
            ));
        }
        Ok(())
    }
}

/// Media resolution configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Pause between polls of a lazily rendered source
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Polls before giving up on a source
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Timeout of one http(s) fetch
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

pub fn default_poll_interval_ms() -> u64 {
    500
}

pub fn default_max_attempts() -> u32 {
    10
}

pub fn default_fetch_timeout_secs() -> u64 {
    30
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_attempts: default_max_attempts(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl MediaConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("media.max_attempts must be > 0".to_string());
        }
        if self.max_attempts > 1000 {
            return Err(format!(
                "media.max_attempts {} exceeds maximum (1000)",
                self.max_attempts
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err("media.fetch_timeout_secs must be > 0".to_string());
        }
        if self.fetch_timeout_secs > 3600 {
            return Err(format!(
                "media.fetch_timeout_secs {} exceeds maximum (3600s)",
                self.fetch_timeout_secs
            ));
        }
        Ok(())
    }
}

/// Record extraction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Id of the first record
    #[serde(default = "default_sequence_base")]
    pub sequence_base: u64,
    /// Media entries are named `<media_prefix>_<id>.<ext>`
    #[serde(default = "default_media_prefix")]
    pub media_prefix: String,
    /// Siblings visited when looking for a date divider
    #[serde(default = "default_date_lookback")]
    pub date_lookback: usize,
}

pub fn default_sequence_base() -> u64 {
    1
}

pub fn default_media_prefix() -> String {
    "wae".to_string()
}

pub fn default_date_lookback() -> usize {
    5000
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            sequence_base: default_sequence_base(),
            media_prefix: default_media_prefix(),
            date_lookback: default_date_lookback(),
        }
    }
}

impl ExtractConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.media_prefix.is_empty() {
            return Err("extract.media_prefix must not be empty".to_string());
        }
        if let Some(c) = self
            .media_prefix
            .chars()
            .find(|c| INVALID_PREFIX_CHARS.contains(c) || c.is_control())
        {
            return Err(format!(
                "extract.media_prefix contains invalid character {:?}",
                c
            ));
        }
        if self.sequence_base > MAX_SEQUENCE_BASE {
            return Err(format!(
                "extract.sequence_base {} exceeds maximum ({})",
                self.sequence_base, MAX_SEQUENCE_BASE
            ));
        }
        if self.date_lookback == 0 {
            return Err("extract.date_lookback must be > 0".to_string());
        }
        Ok(())
    }
}

/// Archive output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Directory archives are written to (`~/` is expanded)
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

pub fn default_output_dir() -> String {
    ".".to_string()
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}
