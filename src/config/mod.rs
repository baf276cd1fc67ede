//! Configuration management for wae

mod io;
mod types;

pub use types::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::extract::ExtractOptions;
use crate::pagination::PaginationOptions;
use crate::poll::PollPolicy;
use crate::service::RunOptions;

impl Config {
    /// Get the config file path (~/.config/wae/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        io::config_path()
    }

    /// Get the config directory path (~/.config/wae)
    pub fn config_dir() -> Result<PathBuf> {
        io::config_dir()
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> Result<Self> {
        io::load()
    }

    /// Load configuration from a specific file, or return defaults if not found
    pub fn load_from(path: &Path) -> Result<Self> {
        io::load_from(path)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        io::save(self)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        io::save_to(self, path)
    }

    /// Expand ~ in the archive output directory
    pub fn output_directory(&self) -> PathBuf {
        let dir = &self.archive.output_dir;
        if let Some(stripped) = dir.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        }
        PathBuf::from(dir)
    }

    pub fn pagination_options(&self) -> PaginationOptions {
        let p = &self.pagination;
        PaginationOptions {
            window: p.window.max(1),
            ceiling: p.ceiling,
            tick_interval: Duration::from_millis(p.tick_interval_ms),
            scroll_target: p.scroll_target,
            max_ticks: (p.max_ticks > 0).then_some(p.max_ticks),
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_millis(self.media.poll_interval_ms),
            self.media.max_attempts,
        )
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.media.fetch_timeout_secs)
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            media_prefix: self.extract.media_prefix.clone(),
            date_lookback: self.extract.date_lookback,
        }
    }

    /// Everything an extraction run needs from the configuration.
    pub fn run_options(&self) -> RunOptions {
        RunOptions::default()
            .pagination(self.pagination_options())
            .poll(self.poll_policy())
            .extract(self.extract_options())
            .sequence_base(self.extract.sequence_base)
    }
}
