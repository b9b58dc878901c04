// LogSift - core/stats.rs
//
// Aggregate statistics over a record set and the fixed-layout text report.
// Statistics are recomputed from scratch for each report and never stored.

use crate::core::model::{Level, LogRecord};
use crate::util::constants::{DATETIME_FORMAT, TOP_N};
use crate::util::error::ExportError;
use chrono::{DateTime, FixedOffset};
use std::collections::BTreeMap;
use std::io::Write;

/// Summary statistics for a set of records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Number of records, whatever their level.
    pub total: usize,
    pub error_count: usize,
    pub warn_count: usize,
    pub info_count: usize,
    pub debug_count: usize,
    /// Earliest timestamp among records that have one.
    pub earliest: Option<DateTime<FixedOffset>>,
    /// Latest timestamp among records that have one.
    pub latest: Option<DateTime<FixedOffset>>,
    /// Occurrences per non-empty source.
    pub sources: BTreeMap<String, usize>,
    /// Occurrences per message, ERROR records only.
    pub error_messages: BTreeMap<String, usize>,
}

impl Statistics {
    /// Fold a record set into statistics.
    ///
    /// Records whose level is absent or not one of the four known levels
    /// count towards `total` but towards no level bucket.
    pub fn compute(records: &[LogRecord]) -> Self {
        let mut stats = Statistics {
            total: records.len(),
            ..Default::default()
        };

        for record in records {
            match record.level {
                Some(Level::Error) => {
                    stats.error_count += 1;
                    *stats
                        .error_messages
                        .entry(record.message.clone())
                        .or_insert(0) += 1;
                }
                Some(Level::Warn) => stats.warn_count += 1,
                Some(Level::Info) => stats.info_count += 1,
                Some(Level::Debug) => stats.debug_count += 1,
                Some(Level::Other(_)) | None => {}
            }

            if !record.source.is_empty() {
                *stats.sources.entry(record.source.clone()).or_insert(0) += 1;
            }

            if let Some(ts) = record.timestamp {
                if stats.earliest.map_or(true, |e| ts < e) {
                    stats.earliest = Some(ts);
                }
                if stats.latest.map_or(true, |l| ts > l) {
                    stats.latest = Some(ts);
                }
            }
        }

        tracing::debug!(
            total = stats.total,
            errors = stats.error_count,
            sources = stats.sources.len(),
            "Statistics computed"
        );

        stats
    }

    /// Count for one of the known levels.
    pub fn level_count(&self, level: &Level) -> usize {
        match level {
            Level::Error => self.error_count,
            Level::Warn => self.warn_count,
            Level::Info => self.info_count,
            Level::Debug => self.debug_count,
            Level::Other(_) => 0,
        }
    }

    /// Observed time span, absent if no record had a timestamp.
    pub fn time_span(&self) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        self.earliest.zip(self.latest)
    }

    /// Most frequent sources, at most `n`, by descending count.
    pub fn top_sources(&self, n: usize) -> Vec<(&str, usize)> {
        top_n(&self.sources, n)
    }

    /// Most frequent error messages, at most `n`, by descending count.
    pub fn top_errors(&self, n: usize) -> Vec<(&str, usize)> {
        top_n(&self.error_messages, n)
    }
}

/// Sort a frequency table by count only (stable), then truncate to `n`.
fn top_n(table: &BTreeMap<String, usize>, n: usize) -> Vec<(&str, usize)> {
    let mut entries: Vec<(&str, usize)> = table.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(n);
    entries
}

/// Render the statistics report.
pub fn write_report<W: Write>(stats: &Statistics, mut out: W) -> Result<(), ExportError> {
    let time_range = stats
        .time_span()
        .map(|(earliest, latest)| {
            format!(
                "{} to {}",
                earliest.format(DATETIME_FORMAT),
                latest.format(DATETIME_FORMAT)
            )
        })
        .unwrap_or_default();

    writeln!(out, "=== Log Analysis Statistics ===")?;
    writeln!(out, "Total Lines: {}", stats.total)?;
    writeln!(out, "Time Range: {time_range}")?;
    writeln!(out)?;
    writeln!(out, "Log Levels:")?;
    for level in Level::known() {
        // Labels are padded so the counts line up.
        let label = format!("{}:", level.as_str());
        writeln!(out, "  {label:<6} {}", stats.level_count(&level))?;
    }
    writeln!(out)?;

    let top_sources = stats.top_sources(TOP_N);
    if !top_sources.is_empty() {
        writeln!(out, "Top Sources:")?;
        for (source, count) in top_sources {
            writeln!(out, "  {source}: {count}")?;
        }
        writeln!(out)?;
    }

    let top_errors = stats.top_errors(TOP_N);
    if !top_errors.is_empty() {
        writeln!(out, "Top Errors:")?;
        for (message, count) in top_errors {
            writeln!(out, "  {message}: {count}")?;
        }
    }

    out.flush()?;
    Ok(())
}
