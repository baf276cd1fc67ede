//! Extract command handler

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use wae::archive::deliver;
use wae::host::ReplayHost;
use wae::media::HttpFetcher;
use wae::progress::StderrProgress;
use wae::service::{ExtractionReport, ExtractorService};
use wae::{CancelToken, Config};

use crate::cli::ExtractArgs;

/// Extract the conversation in a page capture and write its archive.
///
/// Ctrl+C and SIGHUP stop the run; records gathered before the signal are
/// still written.
#[cfg(not(tarpaulin_include))]
pub fn handle(args: &ExtractArgs) -> Result<()> {
    let config = apply_overrides(Config::load()?, args)?;

    let mut host = ReplayHost::load(&args.capture)?;
    let http = HttpFetcher::new(config.fetch_timeout()).context("Failed to create HTTP client")?;
    let fetcher = host.fetcher().with_http(http);

    let cancel = CancelToken::new();
    cancel.register_signal_handlers();
    let service = ExtractorService::new(config.run_options()).with_cancel(cancel);

    let progress = if args.quiet {
        StderrProgress::quiet()
    } else {
        StderrProgress::new()
    };
    let outcome = service
        .run(&mut host, fetcher, &progress)
        .with_context(|| format!("Failed to extract {}", args.capture.display()))?;

    let output_dir = output_dir(args, &config);
    let path = deliver(&output_dir, &outcome.report.title, &outcome.archive)
        .with_context(|| format!("Failed to write archive to {}", output_dir.display()))?;

    println!(
        "{}",
        format_summary(&outcome.report, &path, outcome.archive.len() as u64)
    );
    Ok(())
}

/// Layer command-line overrides on top of the loaded configuration.
pub fn apply_overrides(mut config: Config, args: &ExtractArgs) -> Result<Config> {
    if let Some(ceiling) = args.ceiling {
        config.pagination.ceiling = ceiling;
    }
    if let Some(window) = args.window {
        config.pagination.window = window;
    }
    if let Some(attempts) = args.attempts {
        config.media.max_attempts = attempts;
    }
    if let Some(interval) = args.interval_ms {
        config.media.poll_interval_ms = interval;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid option: {}", e))?;
    Ok(config)
}

fn output_dir(args: &ExtractArgs, config: &Config) -> PathBuf {
    args.output
        .clone()
        .unwrap_or_else(|| config.output_directory())
}

/// Human-readable summary of a finished extraction.
pub fn format_summary(report: &ExtractionReport, path: &Path, archive_bytes: u64) -> String {
    let mut lines = vec![format!(
        "Exported {} message{} from \"{}\" to {} ({})",
        report.records,
        if report.records == 1 { "" } else { "s" },
        report.title,
        path.display(),
        humansize::format_size(archive_bytes, humansize::DECIMAL)
    )];

    if report.media_found > 0 || report.media_missing > 0 {
        lines.push(format!(
            "  Media: {} retrieved, {} not found",
            report.media_found, report.media_missing
        ));
    }
    if !report.stop_reason.is_complete() {
        lines.push(format!(
            "  Warning: history may be incomplete ({})",
            report.stop_reason
        ));
    }
    if report.cancelled {
        lines.push("  Warning: cancelled, the archive holds a partial transcript".to_string());
    }

    let elapsed = report
        .duration()
        .to_std()
        .unwrap_or(Duration::ZERO)
        .as_secs_f64();
    lines.push(format!("  Took {:.1}s", elapsed));
    lines.join("\n")
}
