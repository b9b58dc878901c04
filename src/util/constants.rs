// LogSift - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogSift";

/// Application identifier used for the platform config directory.
pub const APP_ID: &str = "logsift";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Parsing
// =============================================================================

/// Maximum number of per-line diagnostics kept for one parse pass.
/// Further diagnostics are counted but not stored.
pub const MAX_PARSE_DIAGNOSTICS: usize = 1_000;

/// Layout of `generic` format timestamps, CLI time bounds, CSV and verbose output.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Layout of the compact time prefix in text output.
pub const TIME_ONLY_FORMAT: &str = "%H:%M:%S";

/// Text printed in verbose output for a record without a timestamp.
pub const ZERO_TIMESTAMP_TEXT: &str = "0001-01-01 00:00:00";

/// JSON value written for a record without a timestamp.
pub const ZERO_TIMESTAMP_JSON: &str = "0001-01-01T00:00:00Z";

// =============================================================================
// Statistics
// =============================================================================

/// Number of entries shown in each "Top ..." table of the statistics report.
pub const TOP_N: usize = 5;

// =============================================================================
// Follow mode
// =============================================================================

/// Default sleep between polls when no new line is available (ms).
pub const FOLLOW_POLL_INTERVAL_MS: u64 = 100;

/// Minimum user-configurable follow poll interval (ms).
pub const MIN_FOLLOW_POLL_INTERVAL_MS: u64 = 10;

/// Maximum user-configurable follow poll interval (ms).
pub const MAX_FOLLOW_POLL_INTERVAL_MS: u64 = 10_000;

/// Maximum bytes consumed from the followed file in one poll tick.
pub const MAX_FOLLOW_READ_BYTES_PER_TICK: usize = 512 * 1_024; // 512 KiB

/// Maximum size of the buffered incomplete line in follow mode.
/// A fragment that grows past this without a newline is discarded.
pub const MAX_FOLLOW_PARTIAL_BYTES: usize = MAX_FOLLOW_READ_BYTES_PER_TICK * 4; // 2 MiB

// =============================================================================
// Logging
// =============================================================================

/// Default log level. Diagnostics go to stderr, so keep it quiet.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Maximum length of a log line included in trace output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
