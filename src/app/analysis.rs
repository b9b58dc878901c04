// LogSift - app/analysis.rs
//
// One-shot analysis: read the whole file, parse, filter, then write either
// the statistics report or the (windowed) record listing.
//
// Error policy:
//   - Failing to read the input file is fatal.
//   - Per-line parse problems are logged as diagnostics, never fatal.
//   - Output write failures are fatal.

use crate::core::export::{self, OutputFormat, Window};
use crate::core::filter::{self, FilterSpec};
use crate::core::formats::FormatSelection;
use crate::core::parser::LineParser;
use crate::core::stats::{self, Statistics};
use crate::platform;
use crate::util::error::{LogSiftError, Result};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

/// Everything a one-shot run needs, resolved from flags and config.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub path: PathBuf,
    pub selection: FormatSelection,
    pub filter: FilterSpec,
    /// Write the statistics report instead of the records.
    pub stats: bool,
    pub window: Window,
    pub output: OutputFormat,
    pub verbose: bool,
}

/// Counts describing a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisSummary {
    pub lines: usize,
    pub records: usize,
    /// Records that passed the filter.
    pub matched: usize,
    /// Records written to the output. Zero in stats mode.
    pub emitted: usize,
    pub diagnostics: usize,
}

/// Run a one-shot analysis, writing the result to `writer`.
pub fn run<W: Write>(
    request: &AnalysisRequest,
    parser: &LineParser,
    writer: W,
) -> Result<AnalysisSummary> {
    let started = Instant::now();
    tracing::info!(
        file = %request.path.display(),
        format = %request.selection,
        stats = request.stats,
        "Analysis started"
    );

    let content =
        platform::fs::read_file_lossy(&request.path).map_err(|e| LogSiftError::Io {
            path: request.path.clone(),
            operation: "open",
            source: e,
        })?;

    let parsed = parser.parse_content(&content, request.selection);
    for diagnostic in &parsed.diagnostics {
        tracing::debug!(file = %request.path.display(), "{diagnostic}");
    }
    if parsed.diagnostics_total > parsed.diagnostics.len() {
        tracing::debug!(
            dropped = parsed.diagnostics_total - parsed.diagnostics.len(),
            "Further parse diagnostics not recorded"
        );
    }

    let matched = filter::apply_filters(&parsed.records, &request.filter);

    let mut summary = AnalysisSummary {
        lines: parsed.lines_processed,
        records: parsed.records.len(),
        matched: matched.len(),
        emitted: 0,
        diagnostics: parsed.diagnostics_total,
    };

    if request.stats {
        let statistics = Statistics::compute(&matched);
        stats::write_report(&statistics, writer)?;
    } else {
        let selected = request.window.apply(&matched);
        summary.emitted =
            export::write_records(selected, request.output, request.verbose, writer)?;
    }

    tracing::info!(
        lines = summary.lines,
        matched = summary.matched,
        emitted = summary.emitted,
        diagnostics = summary.diagnostics,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Analysis complete"
    );

    Ok(summary)
}
