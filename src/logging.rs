//! Diagnostic output
//!
//! All log lines go to stderr with a local ISO-8601 timestamp so the
//! follow-up command owns stdout.

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

/// `YYYY-MM-DDTHH:MM:SS±HHMM`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Local wall-clock timer for the fmt layer
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTimestamp;

impl FormatTime for LocalTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format(TIMESTAMP_FORMAT))
    }
}

/// Most verbose level that gets printed.
///
/// Quiet wins over verbose; errors always pass.
pub fn level_filter(quiet: bool, verbose: bool) -> LevelFilter {
    if quiet {
        LevelFilter::ERROR
    } else if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    }
}

/// Install the global subscriber.
pub fn init(quiet: bool, verbose: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(level_filter(quiet, verbose))
        .with_writer(std::io::stderr)
        .with_timer(LocalTimestamp)
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
