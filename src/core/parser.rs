// LogSift - core/parser.rs
//
// Line parsing: turns one raw line into a `LogRecord` using the format
// registry, and batches that over whole file contents.
// Core layer: accepts strings, never touches the filesystem.
//
// Parsing never fails. A line no matcher accepts still yields a record
// (worst case: message = raw line, everything else empty). Problems that
// would be worth knowing about are reported as `ParseDiagnostic`s.

use crate::core::formats::{
    FormatRegistry, FormatSelection, LevelRule, LogFormat, Matcher, RawFields,
};
use crate::core::level::infer_level;
use crate::core::model::{Level, LogRecord};
use crate::core::timestamp::FALLBACK_LAYOUTS;
use crate::util::constants;
use chrono::{Datelike, Utc};
use std::borrow::Cow;
use std::fmt;

// =============================================================================
// Diagnostics
// =============================================================================

/// A non-fatal problem encountered while parsing one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseIssue {
    /// A matcher captured a timestamp that did not fit its layout.
    /// The record keeps no timestamp.
    TimestampUnparsed { raw: String, layout: &'static str },

    /// The line was routed to JSON but did not decode to an object.
    /// The record holds the raw line as its message.
    MalformedJson,
}

/// A `ParseIssue` tied to its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub line_number: u64,
    pub issue: ParseIssue,
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issue {
            ParseIssue::TimestampUnparsed { raw, layout } => write!(
                f,
                "line {}: cannot parse timestamp '{raw}' as {layout}",
                self.line_number
            ),
            ParseIssue::MalformedJson => {
                write!(f, "line {}: malformed JSON object", self.line_number)
            }
        }
    }
}

/// Result of parsing a whole block of content.
#[derive(Debug, Default)]
pub struct ParseResult {
    /// One record per line, in input order.
    pub records: Vec<LogRecord>,
    /// Diagnostics (capped at `MAX_PARSE_DIAGNOSTICS`).
    pub diagnostics: Vec<ParseDiagnostic>,
    /// Total diagnostics raised, including those past the cap.
    pub diagnostics_total: usize,
    /// Total lines processed.
    pub lines_processed: usize,
}

// =============================================================================
// Line parser
// =============================================================================

/// Parses raw lines against an explicitly supplied format registry.
#[derive(Debug)]
pub struct LineParser {
    registry: FormatRegistry,
    /// Year attached to year-less (syslog-style) timestamps.
    reference_year: i32,
}

impl LineParser {
    /// Create a parser that attaches the current UTC year to year-less timestamps.
    pub fn new(registry: FormatRegistry) -> Self {
        Self {
            registry,
            reference_year: Utc::now().year(),
        }
    }

    /// Override the year attached to year-less timestamps.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    /// Parse one line. Always returns a record whose `raw` equals `line`.
    pub fn parse_line(&self, line: &str, selection: FormatSelection) -> LogRecord {
        self.parse_line_detailed(line, selection).0
    }

    /// Parse one line, also reporting any non-fatal issue.
    pub fn parse_line_detailed(
        &self,
        line: &str,
        selection: FormatSelection,
    ) -> (LogRecord, Option<ParseIssue>) {
        if self.registry.routes_to_json(line, selection) {
            let extracted = self
                .registry
                .get(LogFormat::Json)
                .and_then(|m| m.extract(line).map(|fields| (m, fields)));
            return match extracted {
                Some((matcher, fields)) => self.build_record(line, matcher, fields),
                None => (LogRecord::unparsed(line), Some(ParseIssue::MalformedJson)),
            };
        }

        for matcher in self.registry.candidates(selection) {
            if let Some(fields) = matcher.extract(line) {
                tracing::trace!(
                    format = %matcher.format(),
                    line = preview(line),
                    "Matched line shape"
                );
                return self.build_record(line, matcher, fields);
            }
        }

        (self.parse_unstructured(line), None)
    }

    /// Parse every line of `content`.
    ///
    /// Empty lines are kept: every line yields a record.
    pub fn parse_content(&self, content: &str, selection: FormatSelection) -> ParseResult {
        let mut result = ParseResult::default();

        for (idx, line) in content.lines().enumerate() {
            result.lines_processed += 1;
            let (record, issue) = self.parse_line_detailed(line, selection);
            result.records.push(record);

            if let Some(issue) = issue {
                result.diagnostics_total += 1;
                if result.diagnostics.len() < constants::MAX_PARSE_DIAGNOSTICS {
                    result.diagnostics.push(ParseDiagnostic {
                        line_number: idx as u64 + 1,
                        issue,
                    });
                }
            }
        }

        tracing::debug!(
            format = %selection,
            lines = result.lines_processed,
            records = result.records.len(),
            diagnostics = result.diagnostics_total,
            "Parsing complete"
        );

        result
    }

    /// Turn a matcher's raw fields into a record.
    fn build_record(
        &self,
        line: &str,
        matcher: &Matcher,
        fields: RawFields<'_>,
    ) -> (LogRecord, Option<ParseIssue>) {
        let mut issue = None;
        let layout = matcher.timestamp_layout();

        let timestamp = fields.timestamp.as_deref().and_then(|raw| {
            let parsed = layout.parse(raw, self.reference_year);
            if parsed.is_none() {
                issue = Some(ParseIssue::TimestampUnparsed {
                    raw: raw.to_string(),
                    layout: layout.describe(),
                });
            }
            parsed
        });

        let message = fields.message.map(Cow::into_owned).unwrap_or_default();

        let level = match matcher.level_rule() {
            LevelRule::Captured => fields
                .level
                .as_deref()
                .filter(|label| !label.is_empty())
                .map(Level::from_label),
            LevelRule::Inferred => Some(infer_level(&message)),
            LevelRule::HttpStatus => fields
                .status
                .as_deref()
                .and_then(|s| s.parse::<i64>().ok())
                .map(level_from_status),
        };

        let record = LogRecord {
            timestamp,
            level,
            source: fields.source.map(Cow::into_owned).unwrap_or_default(),
            message,
            raw: line.to_string(),
        };
        (record, issue)
    }

    /// Best-effort parse of a line no matcher accepted.
    ///
    /// Tries each fallback layout against the line prefix of that layout's
    /// width. The first that parses sets the timestamp and is stripped,
    /// together with one separator character, from the message.
    fn parse_unstructured(&self, line: &str) -> LogRecord {
        let mut timestamp = None;
        let mut message = line;

        for layout in FALLBACK_LAYOUTS {
            let width = layout.prefix_width();
            let Some(prefix) = line.get(..width) else {
                continue;
            };
            if let Some(ts) = layout.parse(prefix, self.reference_year) {
                timestamp = Some(ts);
                if line.len() > width + 1 {
                    let mut rest = line[width..].chars();
                    rest.next();
                    message = rest.as_str().trim();
                }
                break;
            }
        }

        LogRecord {
            timestamp,
            level: Some(infer_level(message)),
            source: String::new(),
            message: message.to_string(),
            raw: line.to_string(),
        }
    }
}

/// Map an HTTP status code to a level: 5xx ERROR, 4xx WARN, else INFO.
fn level_from_status(status: i64) -> Level {
    if status >= 500 {
        Level::Error
    } else if status >= 400 {
        Level::Warn
    } else {
        Level::Info
    }
}

/// Shorten a line for trace output.
fn preview(line: &str) -> &str {
    match line.char_indices().nth(constants::DEBUG_MAX_LINE_PREVIEW) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> LineParser {
        LineParser::new(FormatRegistry::builtin().unwrap()).with_reference_year(2024)
    }

    fn fmt_ts(record: &LogRecord) -> String {
        record
            .timestamp
            .expect("record should have a timestamp")
            .format("%Y-%m-%d %H:%M:%S %z")
            .to_string()
    }

    #[test]
    fn test_generic_line() {
        let r = parser().parse_line(
            "2024-01-01 10:00:00 [INFO] Application started",
            FormatSelection::Auto,
        );
        assert_eq!(fmt_ts(&r), "2024-01-01 10:00:00 +0000");
        assert_eq!(r.level, Some(Level::Info));
        assert_eq!(r.message, "Application started");
        assert_eq!(r.source, "");
    }

    #[test]
    fn test_generic_level_kept_verbatim() {
        let r = parser().parse_line(
            "2024-01-01 10:00:00 [notice] Config reloaded",
            FormatSelection::Auto,
        );
        assert_eq!(r.level, Some(Level::Other("NOTICE".to_string())));
    }

    #[test]
    fn test_generic_bad_timestamp_is_unset_but_line_still_parsed() {
        let (r, issue) = parser().parse_line_detailed(
            "2024-13-45 10:00:00 [ERROR] impossible date",
            FormatSelection::Auto,
        );
        assert!(r.timestamp.is_none());
        assert_eq!(r.level, Some(Level::Error));
        assert_eq!(r.message, "impossible date");
        assert!(matches!(issue, Some(ParseIssue::TimestampUnparsed { .. })));
    }

    #[test]
    fn test_json_line() {
        let r = parser().parse_line(
            r#"{"timestamp":"2024-01-01T10:00:00Z","level":"error","message":"boom","source":"db"}"#,
            FormatSelection::Auto,
        );
        assert_eq!(r.level, Some(Level::Error));
        assert_eq!(r.source, "db");
        assert_eq!(r.message, "boom");
        assert_eq!(fmt_ts(&r), "2024-01-01 10:00:00 +0000");
    }

    #[test]
    fn test_json_without_level_is_not_inferred() {
        let r = parser().parse_line(r#"{"msg":"fatal crash"}"#, FormatSelection::Auto);
        assert_eq!(r.level, None);
        assert_eq!(r.message, "fatal crash");
    }

    #[test]
    fn test_json_non_rfc3339_timestamp_left_unset() {
        let (r, issue) = parser().parse_line_detailed(
            r#"{"timestamp":"2024-01-01 10:00:00","message":"x"}"#,
            FormatSelection::Auto,
        );
        assert!(r.timestamp.is_none());
        assert!(issue.is_some());
    }

    #[test]
    fn test_json_space_separated_zulu_timestamp_left_unset() {
        let (r, issue) = parser().parse_line_detailed(
            r#"{"timestamp":"2024-01-01 10:00:00Z","message":"x"}"#,
            FormatSelection::Auto,
        );
        assert!(r.timestamp.is_none());
        assert_eq!(r.message, "x");
        assert!(matches!(issue, Some(ParseIssue::TimestampUnparsed { .. })));
    }

    #[test]
    fn test_malformed_json_degrades_to_raw() {
        let line = r#"{"level": "error", "message": "#;
        let (r, issue) = parser().parse_line_detailed(line, FormatSelection::Auto);
        assert_eq!(r, LogRecord::unparsed(line));
        assert_eq!(issue, Some(ParseIssue::MalformedJson));
    }

    #[test]
    fn test_forced_json_on_plain_text() {
        let r = parser().parse_line(
            "2024-01-01 10:00:00 [INFO] not json",
            FormatSelection::Fixed(LogFormat::Json),
        );
        assert_eq!(r.message, "2024-01-01 10:00:00 [INFO] not json");
        assert!(r.timestamp.is_none());
        assert_eq!(r.level, None);
    }

    #[test]
    fn test_syslog_line() {
        let r = parser().parse_line(
            "Oct 10 13:55:36 web01 sshd[42]: error: connection reset",
            FormatSelection::Auto,
        );
        assert_eq!(fmt_ts(&r), "2024-10-10 13:55:36 +0000");
        assert_eq!(r.source, "web01");
        assert_eq!(r.message, "error: connection reset");
        assert_eq!(r.level, Some(Level::Error));
    }

    #[test]
    fn test_syslog_single_digit_hour() {
        let (r, issue) = parser().parse_line_detailed(
            "Oct 10 1:02:03 web01 cron[7]: job started",
            FormatSelection::Auto,
        );
        assert_eq!(fmt_ts(&r), "2024-10-10 01:02:03 +0000");
        assert_eq!(r.source, "web01");
        assert_eq!(issue, None);
    }

    #[test]
    fn test_apache_line() {
        let r = parser().parse_line(
            r#"127.0.0.1 - - [10/Oct/2023:13:55:36 -0700] "GET /index.html" 200 2326"#,
            FormatSelection::Auto,
        );
        assert_eq!(r.source, "127.0.0.1");
        assert_eq!(r.level, Some(Level::Info));
        assert_eq!(r.message, "GET /index.html");
        assert_eq!(fmt_ts(&r), "2023-10-10 13:55:36 -0700");
    }

    #[test]
    fn test_access_log_status_levels() {
        let p = parser();
        let line = |status: &str| {
            format!(r#"10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "POST /api" {status} 10"#)
        };
        assert_eq!(
            p.parse_line(&line("503"), FormatSelection::Auto).level,
            Some(Level::Error)
        );
        assert_eq!(
            p.parse_line(&line("404"), FormatSelection::Auto).level,
            Some(Level::Warn)
        );
        assert_eq!(
            p.parse_line(&line("302"), FormatSelection::Auto).level,
            Some(Level::Info)
        );
    }

    #[test]
    fn test_fixed_format_mismatch_falls_back() {
        let r = parser().parse_line(
            "2024-01-01 10:00:00 [INFO] Application started",
            FormatSelection::Fixed(LogFormat::Apache),
        );
        // Fallback: timestamp prefix stripped, level inferred from the rest.
        assert_eq!(fmt_ts(&r), "2024-01-01 10:00:00 +0000");
        assert_eq!(r.message, "[INFO] Application started");
        assert_eq!(r.level, Some(Level::Info));
    }

    #[test]
    fn test_fallback_slash_date() {
        let r = parser().parse_line("2024/02/03 04:05:06 WARN low memory", FormatSelection::Auto);
        assert_eq!(fmt_ts(&r), "2024-02-03 04:05:06 +0000");
        assert_eq!(r.message, "WARN low memory");
        assert_eq!(r.level, Some(Level::Warn));
    }

    #[test]
    fn test_fallback_yearless_prefix() {
        let r = parser().parse_line("Jan 5 14:30:22 kernel panic", FormatSelection::Auto);
        assert_eq!(fmt_ts(&r), "2024-01-05 14:30:22 +0000");
        assert_eq!(r.message, "kernel panic");
    }

    #[test]
    fn test_fallback_rfc3339_prefix() {
        let r = parser().parse_line(
            "2024-01-01T10:00:00+01:00 trace: cache warm",
            FormatSelection::Auto,
        );
        assert_eq!(fmt_ts(&r), "2024-01-01 10:00:00 +0100");
        assert_eq!(r.message, "trace: cache warm");
        assert_eq!(r.level, Some(Level::Debug));
    }

    #[test]
    fn test_fallback_timestamp_only_line_keeps_whole_message() {
        let r = parser().parse_line("2024-01-01 10:00:00", FormatSelection::Auto);
        assert!(r.timestamp.is_some());
        assert_eq!(r.message, "2024-01-01 10:00:00");
    }

    #[test]
    fn test_plain_text_line() {
        let r = parser().parse_line("just some text", FormatSelection::Auto);
        assert!(r.timestamp.is_none());
        assert_eq!(r.message, "just some text");
        assert_eq!(r.level, Some(Level::Info));
    }

    #[test]
    fn test_non_ascii_digits_fall_back_to_whole_line() {
        let line = "٢٠٢٤-٠١-٠١ ١٠:٠٠:٠٠ [ERROR] boom";
        let (r, issue) = parser().parse_line_detailed(line, FormatSelection::Auto);
        assert!(r.timestamp.is_none());
        assert_eq!(r.message, line);
        assert_eq!(r.level, Some(Level::Error));
        assert_eq!(issue, None);
    }

    #[test]
    fn test_raw_always_preserved() {
        let p = parser();
        let lines = [
            "",
            "   ",
            "  2024-01-01 10:00:00 [INFO] leading space  ",
            "\t{\"message\":\"tabbed\"}",
            "{broken",
            "ünïcödé ✓ line",
            r#"127.0.0.1 - - [10/Oct/2023:13:55:36 -0700] "GET /" 200 1"#,
        ];
        for line in lines {
            for selection in [
                FormatSelection::Auto,
                FormatSelection::Fixed(LogFormat::Syslog),
                FormatSelection::Fixed(LogFormat::Json),
            ] {
                assert_eq!(p.parse_line(line, selection).raw, line);
            }
        }
    }

    #[test]
    fn test_parse_content_keeps_every_line() {
        let content = "2024-01-01 10:00:00 [INFO] one\n\n{oops\r\nplain\n";
        let result = parser().parse_content(content, FormatSelection::Auto);
        assert_eq!(result.lines_processed, 4);
        assert_eq!(result.records.len(), 4);
        assert_eq!(result.records[1].raw, "");
        assert_eq!(result.records[2].raw, "{oops");
        assert_eq!(result.diagnostics_total, 1);
        assert_eq!(
            result.diagnostics[0],
            ParseDiagnostic {
                line_number: 3,
                issue: ParseIssue::MalformedJson
            }
        );
    }

    #[test]
    fn test_parse_content_caps_diagnostics() {
        let content = "{bad\n".repeat(constants::MAX_PARSE_DIAGNOSTICS + 5);
        let result = parser().parse_content(&content, FormatSelection::Auto);
        assert_eq!(result.diagnostics.len(), constants::MAX_PARSE_DIAGNOSTICS);
        assert_eq!(
            result.diagnostics_total,
            constants::MAX_PARSE_DIAGNOSTICS + 5
        );
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(constants::DEBUG_MAX_LINE_PREVIEW + 10);
        assert_eq!(
            preview(&long).chars().count(),
            constants::DEBUG_MAX_LINE_PREVIEW
        );
        assert_eq!(preview("short"), "short");
    }
}
