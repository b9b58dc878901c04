// LogSift - core/filter.rs
//
// Record filter. All active criteria are AND-combined.
// Core layer: pure logic, no I/O dependencies.

use crate::core::model::{Level, LogRecord};
use crate::util::constants::DATETIME_FORMAT;
use crate::util::error::FilterError;
use chrono::{DateTime, FixedOffset, NaiveDateTime};

/// User-supplied filter criteria, fixed for the duration of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Exact level to keep. None = all levels.
    pub level: Option<Level>,

    /// Case-insensitive substring of the record source. Empty = no filter.
    pub source: String,

    /// Case-insensitive substring of the record message. Empty = no filter.
    pub keyword: String,

    /// Lower time bound (inclusive). None = no lower bound.
    pub start: Option<DateTime<FixedOffset>>,

    /// Upper time bound (inclusive). None = no upper bound.
    pub end: Option<DateTime<FixedOffset>>,
}

impl FilterSpec {
    /// Returns true if no criteria are active.
    pub fn is_empty(&self) -> bool {
        self.level.is_none()
            && self.source.is_empty()
            && self.keyword.is_empty()
            && self.start.is_none()
            && self.end.is_none()
    }

    /// Build a spec from the raw strings supplied on the command line.
    ///
    /// An empty level means "no level filter"; any other label is
    /// uppercased. Time bounds use `YYYY-MM-DD HH:MM:SS` and are read as
    /// UTC. An unparseable bound is an error.
    pub fn from_inputs(
        level: &str,
        source: &str,
        keyword: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self, FilterError> {
        let level = if level.trim().is_empty() {
            None
        } else {
            Some(Level::from_label(level.trim()))
        };

        Ok(Self {
            level,
            source: source.to_string(),
            keyword: keyword.to_string(),
            start: start
                .filter(|s| !s.is_empty())
                .map(|s| parse_time_bound("start", s))
                .transpose()?,
            end: end
                .filter(|s| !s.is_empty())
                .map(|s| parse_time_bound("end", s))
                .transpose()?,
        })
    }
}

/// Parse a time-range bound given on the command line.
pub fn parse_time_bound(
    bound: &'static str,
    value: &str,
) -> Result<DateTime<FixedOffset>, FilterError> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .map(|ndt| ndt.and_utc().fixed_offset())
        .map_err(|e| FilterError::InvalidTime {
            bound,
            value: value.to_string(),
            source: e,
        })
}

/// Check whether a single record passes every active criterion.
///
/// A record without a timestamp always passes the time-range criteria.
pub fn matches(record: &LogRecord, spec: &FilterSpec) -> bool {
    if let Some(ref level) = spec.level {
        if record.level.as_ref() != Some(level) {
            return false;
        }
    }

    if !spec.source.is_empty()
        && !record
            .source
            .to_lowercase()
            .contains(&spec.source.to_lowercase())
    {
        return false;
    }

    if !spec.keyword.is_empty()
        && !record
            .message
            .to_lowercase()
            .contains(&spec.keyword.to_lowercase())
    {
        return false;
    }

    if let (Some(start), Some(ts)) = (spec.start, record.timestamp) {
        if ts < start {
            return false;
        }
    }

    if let (Some(end), Some(ts)) = (spec.end, record.timestamp) {
        if ts > end {
            return false;
        }
    }

    true
}

/// Keep the records that match `spec`, preserving order.
pub fn apply_filters(records: &[LogRecord], spec: &FilterSpec) -> Vec<LogRecord> {
    if spec.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|record| matches(record, spec))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(level: Option<Level>, source: &str, message: &str, ts: Option<&str>) -> LogRecord {
        LogRecord {
            timestamp: ts.map(|s| parse_time_bound("start", s).unwrap()),
            level,
            source: source.to_string(),
            message: message.to_string(),
            raw: message.to_string(),
        }
    }

    fn sample() -> Vec<LogRecord> {
        vec![
            make_record(Some(Level::Error), "db", "Connection FAILED", Some("2024-01-01 10:00:00")),
            make_record(Some(Level::Info), "api", "Request served", Some("2024-01-01 11:00:00")),
            make_record(Some(Level::Warn), "Database", "Slow query", Some("2024-01-01 12:00:00")),
            make_record(None, "", "no timestamp at all", None),
        ]
    }

    #[test]
    fn test_empty_filter_returns_all() {
        let records = sample();
        assert_eq!(apply_filters(&records, &FilterSpec::default()), records);
    }

    #[test]
    fn test_level_filter_is_exact() {
        let spec = FilterSpec::from_inputs("error", "", "", None, None).unwrap();
        let result = apply_filters(&sample(), &spec);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].source, "db");

        // WARNING is not WARN.
        let spec = FilterSpec::from_inputs("warning", "", "", None, None).unwrap();
        assert!(apply_filters(&sample(), &spec).is_empty());
    }

    #[test]
    fn test_source_substring_case_insensitive() {
        let spec = FilterSpec::from_inputs("", "DB", "", None, None).unwrap();
        let result = apply_filters(&sample(), &spec);
        let sources: Vec<_> = result.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(sources, vec!["db"]);

        let spec = FilterSpec::from_inputs("", "data", "", None, None).unwrap();
        assert_eq!(apply_filters(&sample(), &spec)[0].source, "Database");
    }

    #[test]
    fn test_keyword_case_insensitive() {
        let spec = FilterSpec::from_inputs("", "", "failed", None, None).unwrap();
        let result = apply_filters(&sample(), &spec);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].message, "Connection FAILED");
    }

    #[test]
    fn test_time_range_is_inclusive() {
        let spec = FilterSpec::from_inputs(
            "",
            "",
            "",
            Some("2024-01-01 11:00:00"),
            Some("2024-01-01 12:00:00"),
        )
        .unwrap();
        let result = apply_filters(&sample(), &spec);
        let messages: Vec<_> = result.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["Request served", "Slow query", "no timestamp at all"]
        );
    }

    #[test]
    fn test_untimestamped_record_passes_any_time_range() {
        let record = make_record(Some(Level::Info), "", "x", None);
        let spec = FilterSpec::from_inputs(
            "",
            "",
            "",
            Some("2030-01-01 00:00:00"),
            Some("2000-01-01 00:00:00"),
        )
        .unwrap();
        assert!(matches(&record, &spec));
    }

    #[test]
    fn test_bounds_compare_instants_across_offsets() {
        let mut record = make_record(Some(Level::Info), "", "x", None);
        // 10:30 at -07:00 is 17:30 UTC.
        record.timestamp = Some(
            DateTime::parse_from_rfc3339("2024-01-01T10:30:00-07:00").unwrap(),
        );
        let spec = FilterSpec::from_inputs("", "", "", Some("2024-01-01 17:00:00"), None).unwrap();
        assert!(matches(&record, &spec));
        let spec = FilterSpec::from_inputs("", "", "", None, Some("2024-01-01 17:00:00")).unwrap();
        assert!(!matches(&record, &spec));
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let spec = FilterSpec::from_inputs("", "", "o", Some("2024-01-01 10:30:00"), None).unwrap();
        let once = apply_filters(&sample(), &spec);
        let twice = apply_filters(&once, &spec);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_invalid_time_bound() {
        let result = FilterSpec::from_inputs("", "", "", Some("yesterday"), None);
        assert!(matches!(
            result,
            Err(FilterError::InvalidTime { bound: "start", .. })
        ));
        let result = FilterSpec::from_inputs("", "", "", None, Some("2024-01-01T10:00:00"));
        assert!(matches!(
            result,
            Err(FilterError::InvalidTime { bound: "end", .. })
        ));
    }

    #[test]
    fn test_record_without_level_fails_level_filter() {
        let record = make_record(None, "", "GET /", None);
        let spec = FilterSpec::from_inputs("INFO", "", "", None, None).unwrap();
        assert!(!matches(&record, &spec));
    }
}
