//! CLI definitions for wae
//!
//! This module contains the clap CLI structure definitions, separated from
//! main.rs so the command handlers and tests can share them.

use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser, Subcommand};

/// Build clap styles.
///
/// - Green: headers, usage, command names
/// - White: placeholders and valid values
pub fn build_cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::White.on_default())
        .valid(AnsiColor::White.on_default())
        .invalid(AnsiColor::Red.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

#[derive(Parser)]
#[command(name = "wae")]
#[command(about = "[ web archive extractor ] - export a whole conversation thread as one zip")]
#[command(
    long_about = "wae - incremental conversation extraction engine.

wae scrolls a lazily rendered conversation view back to its beginning,
turns every message into a normalized record, retrieves embedded media
(images, videos, animations, inline previews) and packages everything as
one zip archive: <title>/conversation.json plus one file per media item.

QUICK START:
    wae extract capture.json           Extract a captured conversation page
    wae extract capture.json -o out/   Write the archive to out/
    wae inspect Family.zip             List the records of an archive
    wae config show                    Show the active configuration"
)]
#[command(version)]
#[command(styles = build_cli_styles())]
pub struct Cli {
    /// Enable debug logging (overrides WAE_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract a conversation into a zip archive
    #[command(long_about = "Extract a conversation into a zip archive.

The conversation is replayed from a page capture (JSON). History is loaded
by scrolling to the top until the scroll position stays put, or until the
item ceiling is passed. Every message becomes one record; media that only
renders after a click is activated and polled until its source appears.

The archive is written as <title>.zip in the output directory. Existing
archives are never overwritten; <title>-2.zip and so on are used instead.

Press Ctrl+C to stop early: records gathered so far are still packaged.

EXAMPLES:
    wae extract capture.json
    wae extract capture.json --output ~/exports --ceiling 5000
    wae extract capture.json --attempts 20 --interval-ms 250")]
    Extract(ExtractArgs),

    /// List the records stored in an archive
    #[command(long_about = "Read an archive produced by `wae extract` and list its records.

Each line shows the record id, date, time, author, a text excerpt and the
media status. Media payloads are verified to be present in the archive.

EXAMPLE:
    wae inspect Family.zip")]
    Inspect {
        /// Path to the zip archive
        #[arg(help = "Path to the zip archive")]
        archive: PathBuf,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Arguments of `wae extract`.
#[derive(Args, Debug, Clone, Default)]
pub struct ExtractArgs {
    /// Page capture to replay
    #[arg(help = "Path to the page capture (JSON)")]
    pub capture: PathBuf,

    /// Output directory (overrides archive.output_dir)
    #[arg(short, long, help = "Directory the archive is written to")]
    pub output: Option<PathBuf>,

    /// Materialized-item ceiling (overrides pagination.ceiling)
    #[arg(long, help = "Stop loading history past this many items")]
    pub ceiling: Option<usize>,

    /// Stable-window size (overrides pagination.window)
    #[arg(long, help = "Identical scroll readings that mean the top was reached")]
    pub window: Option<usize>,

    /// Media poll attempts (overrides media.max_attempts)
    #[arg(long, help = "Polls before giving up on a media source")]
    pub attempts: Option<u32>,

    /// Media poll interval (overrides media.poll_interval_ms)
    #[arg(long, help = "Milliseconds between media polls")]
    pub interval_ms: Option<u64>,

    /// Suppress progress output
    #[arg(short, long, help = "Suppress progress output")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration as TOML
    #[command(long_about = "Display the current configuration in TOML format.

EXAMPLE:
    wae config show")]
    Show,
    /// Open configuration file in your default editor
    #[command(long_about = "Open the configuration file in your default editor.

Uses the $EDITOR environment variable (defaults to 'vi').
Config file location: ~/.config/wae/config.toml

EXAMPLE:
    wae config edit
    EDITOR=nano wae config edit")]
    Edit,
    /// Print the configuration file path
    Path,
}
