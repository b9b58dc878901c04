// LogSift - app/follow.rs
//
// Live follow: polls one file for lines appended after startup, parses and
// filters each complete line as it arrives and writes matching records in
// text form.
//
// Runs on the caller's thread. An `Arc<AtomicBool>` cancel flag stops the
// loop; the CLI never sets it, so in normal use the loop runs until the
// process is interrupted.
//
// Error policy:
//   - The initial stat of the file is fatal (nothing to follow).
//   - Later stat/read errors are logged and retried on the next tick.
//   - A file that shrinks (truncation or rotation) is re-read from offset 0.
//   - MAX_FOLLOW_READ_BYTES_PER_TICK caps the bytes consumed per tick.

use crate::core::export;
use crate::core::filter::{self, FilterSpec};
use crate::core::formats::FormatSelection;
use crate::core::parser::LineParser;
use crate::platform;
use crate::util::constants::{
    FOLLOW_POLL_INTERVAL_MS, MAX_FOLLOW_PARTIAL_BYTES, MAX_FOLLOW_READ_BYTES_PER_TICK,
};
use crate::util::error::{LogSiftError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Settings for a follow session.
#[derive(Debug, Clone)]
pub struct FollowOptions {
    pub selection: FormatSelection,
    pub filter: FilterSpec,
    pub verbose: bool,
    /// Sleep between polls when nothing new is available.
    pub poll_interval: Duration,
}

impl Default for FollowOptions {
    fn default() -> Self {
        Self {
            selection: FormatSelection::Auto,
            filter: FilterSpec::default(),
            verbose: false,
            poll_interval: Duration::from_millis(FOLLOW_POLL_INTERVAL_MS),
        }
    }
}

/// Counts for a finished follow session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FollowSummary {
    /// Complete lines read and parsed.
    pub lines_read: usize,
    /// Records that passed the filter and were written.
    pub emitted: usize,
    /// Number of times the file was seen to shrink.
    pub rotations: usize,
}

/// Read position and the incomplete trailing line carried between ticks.
struct FollowState {
    path: PathBuf,
    /// Byte position of the next unread byte.
    offset: u64,
    /// Bytes after the last newline seen so far: an in-progress line.
    /// Kept undecoded so a multi-byte character split across reads survives.
    partial: Vec<u8>,
}

impl FollowState {
    /// Pull any newly appended bytes and return the complete lines' text
    /// (ending with a newline), or `None` when there is nothing new.
    /// Only whole lines are decoded.
    fn poll(&mut self, summary: &mut FollowSummary) -> Option<String> {
        let current_size = match platform::fs::file_len(&self.path) {
            Ok(len) => len,
            Err(e) => {
                tracing::warn!(file = %self.path.display(), error = %e, "Follow: stat error");
                return None;
            }
        };

        if current_size < self.offset {
            tracing::warn!(
                file = %self.path.display(),
                old_offset = self.offset,
                new_size = current_size,
                "Follow: file truncated or rotated, resetting offset to 0"
            );
            self.offset = 0;
            self.partial.clear();
            summary.rotations += 1;
        }

        if current_size == self.offset {
            return None;
        }

        let available = (current_size - self.offset) as usize;
        let limit = available.min(MAX_FOLLOW_READ_BYTES_PER_TICK);
        let bytes = match platform::fs::read_bytes_at(&self.path, self.offset, limit) {
            Ok(b) if !b.is_empty() => b,
            Ok(_) => return None,
            Err(e) => {
                tracing::warn!(file = %self.path.display(), error = %e, "Follow: read error");
                return None;
            }
        };

        // Consumed whether or not they complete a line.
        self.offset += bytes.len() as u64;
        self.partial.extend_from_slice(&bytes);

        let Some(nl_pos) = self.partial.iter().rposition(|&b| b == b'\n') else {
            if self.partial.len() > MAX_FOLLOW_PARTIAL_BYTES {
                tracing::warn!(
                    file = %self.path.display(),
                    bytes = self.partial.len(),
                    "Follow: discarding oversized incomplete line"
                );
                self.partial.clear();
            }
            return None;
        };

        let rest = self.partial.split_off(nl_pos + 1);
        let complete = std::mem::replace(&mut self.partial, rest);
        Some(String::from_utf8_lossy(&complete).into_owned())
    }
}

/// Follow `path`, writing matching records to `writer` until `cancel` is set.
///
/// Only content appended after the call starts is shown.
pub fn follow_file<W: Write>(
    path: &Path,
    options: &FollowOptions,
    parser: &LineParser,
    mut writer: W,
    cancel: &Arc<AtomicBool>,
) -> Result<FollowSummary> {
    let offset = platform::fs::file_len(path).map_err(|e| LogSiftError::Io {
        path: path.to_path_buf(),
        operation: "open",
        source: e,
    })?;

    tracing::info!(
        file = %path.display(),
        offset,
        format = %options.selection,
        "Follow started"
    );

    let mut state = FollowState {
        path: path.to_path_buf(),
        offset,
        partial: Vec::new(),
    };
    let mut summary = FollowSummary::default();

    while !cancel.load(Ordering::SeqCst) {
        let Some(text) = state.poll(&mut summary) else {
            std::thread::sleep(options.poll_interval);
            continue;
        };

        let mut matched = Vec::new();
        for line in text.lines() {
            summary.lines_read += 1;
            let record = parser.parse_line(line, options.selection);
            if filter::matches(&record, &options.filter) {
                matched.push(record);
            }
        }

        if !matched.is_empty() {
            summary.emitted += export::write_text(&matched, options.verbose, &mut writer)?;
        }
    }

    tracing::info!(
        lines = summary.lines_read,
        emitted = summary.emitted,
        rotations = summary.rotations,
        "Follow stopped"
    );

    Ok(summary)
}
