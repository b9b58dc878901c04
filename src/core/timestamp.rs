// LogSift - core/timestamp.rs
//
// Fixed timestamp layouts recognised by the format matchers and by the
// unstructured fallback parser. Parsing is best-effort: a layout either
// yields a timestamp or `None`, never an error.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

/// Three-letter month abbreviations, matched case-insensitively.
const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// A timestamp shape the parser knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampLayout {
    /// `YYYY-MM-DD HH:MM:SS`, interpreted as UTC.
    DateTime,
    /// `YYYY/MM/DD HH:MM:SS`, interpreted as UTC.
    SlashDateTime,
    /// `Mon D HH:MM:SS` with no year (BSD syslog).
    Yearless,
    /// `DD/Mon/YYYY:HH:MM:SS ±HHMM` (web access logs).
    AccessLog,
    /// RFC 3339 with `Z` or a `±HH:MM` offset.
    Rfc3339,
}

/// Layouts tried, in order, against the prefix of a line no matcher accepted.
pub const FALLBACK_LAYOUTS: [TimestampLayout; 4] = [
    TimestampLayout::DateTime,
    TimestampLayout::SlashDateTime,
    TimestampLayout::Yearless,
    TimestampLayout::Rfc3339,
];

impl TimestampLayout {
    /// Human-readable layout, used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TimestampLayout::DateTime => "YYYY-MM-DD HH:MM:SS",
            TimestampLayout::SlashDateTime => "YYYY/MM/DD HH:MM:SS",
            TimestampLayout::Yearless => "Mon D HH:MM:SS",
            TimestampLayout::AccessLog => "DD/Mon/YYYY:HH:MM:SS +ZZZZ",
            TimestampLayout::Rfc3339 => "YYYY-MM-DDTHH:MM:SS+HH:MM",
        }
    }

    /// Width of the line prefix examined by the fallback parser.
    pub fn prefix_width(&self) -> usize {
        self.describe().len()
    }

    /// Parse `raw` with this layout.
    ///
    /// `reference_year` is only used by [`TimestampLayout::Yearless`].
    pub fn parse(&self, raw: &str, reference_year: i32) -> Option<DateTime<FixedOffset>> {
        match self {
            TimestampLayout::DateTime => parse_naive_utc(raw, "%Y-%m-%d %H:%M:%S"),
            TimestampLayout::SlashDateTime => parse_naive_utc(raw, "%Y/%m/%d %H:%M:%S"),
            TimestampLayout::Yearless => parse_yearless(raw, reference_year),
            TimestampLayout::AccessLog => {
                DateTime::parse_from_str(raw.trim(), "%d/%b/%Y:%H:%M:%S %z").ok()
            }
            TimestampLayout::Rfc3339 => parse_rfc3339(raw.trim()),
        }
    }
}

/// Parse a zone-less date-time and pin it to UTC.
///
/// Runs of whitespace between the date and time are collapsed so that
/// `2024-01-01   10:00:00` is accepted like the single-space form.
fn parse_naive_utc(raw: &str, format: &str) -> Option<DateTime<FixedOffset>> {
    let normalised = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&normalised, format)
        .ok()
        .map(|ndt| ndt.and_utc().fixed_offset())
}

/// Strict RFC 3339: uppercase `T` between date and time, then `Z` or a
/// `±HH:MM` offset. Fractional seconds are allowed. The space separator and
/// lowercase `t`/`z` that chrono's own RFC 3339 parser tolerates are rejected.
fn parse_rfc3339(raw: &str) -> Option<DateTime<FixedOffset>> {
    if raw.as_bytes().get(10) != Some(&b'T') {
        return None;
    }
    match raw.strip_suffix('Z') {
        Some(body) => NaiveDateTime::parse_from_str(body, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|ndt| ndt.and_utc().fixed_offset()),
        None => DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%:z").ok(),
    }
}

/// Parse `Mon D HH:MM:SS` and attach a year.
///
/// The date is read as if it were in year 0 (so Feb 29 is valid), then
/// moved forward by `reference_year` calendar years. A Feb 29 that does not
/// exist in the target year rolls over to Mar 1.
fn parse_yearless(raw: &str, reference_year: i32) -> Option<DateTime<FixedOffset>> {
    let mut parts = raw.split_whitespace();
    let (month, day, time) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let month = MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(month))
        .map(|idx| idx as u32 + 1)?;

    if day.is_empty() || day.len() > 2 || !day.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day: u32 = day.parse().ok()?;

    let time = parse_clock(time)?;

    // Validate against year 0 (a leap year) before moving the date.
    NaiveDate::from_ymd_opt(0, month, day)?;
    let date = NaiveDate::from_ymd_opt(reference_year, month, day).or_else(|| {
        if month == 2 && day == 29 {
            NaiveDate::from_ymd_opt(reference_year, 3, 1)
        } else {
            None
        }
    })?;

    Some(date.and_time(time).and_utc().fixed_offset())
}

/// Parse an `H:MM:SS` or `HH:MM:SS` clock. Minutes and seconds must be two
/// digits; the hour may be one or two.
fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let mut fields = raw.split(':');
    let (hour, minute, second) = (fields.next()?, fields.next()?, fields.next()?);
    if fields.next().is_some() {
        return None;
    }

    let digits = |field: &str, min: usize, max: usize| {
        (min..=max).contains(&field.len()) && field.bytes().all(|b| b.is_ascii_digit())
    };
    if !(digits(hour, 1, 2) && digits(minute, 2, 2) && digits(second, 2, 2)) {
        return None;
    }

    NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, second.parse().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(ts: DateTime<FixedOffset>) -> String {
        ts.format("%Y-%m-%d %H:%M:%S %z").to_string()
    }

    #[test]
    fn test_datetime_layout_is_utc() {
        let ts = TimestampLayout::DateTime
            .parse("2024-01-01 10:00:00", 2024)
            .unwrap();
        assert_eq!(fmt(ts), "2024-01-01 10:00:00 +0000");
    }

    #[test]
    fn test_datetime_layout_collapses_whitespace() {
        assert!(TimestampLayout::DateTime
            .parse("2024-01-01   10:00:00", 2024)
            .is_some());
    }

    #[test]
    fn test_slash_layout() {
        let ts = TimestampLayout::SlashDateTime
            .parse("2024/03/15 08:09:10", 2024)
            .unwrap();
        assert_eq!(fmt(ts), "2024-03-15 08:09:10 +0000");
    }

    #[test]
    fn test_access_log_layout_keeps_offset() {
        let ts = TimestampLayout::AccessLog
            .parse("10/Oct/2023:13:55:36 -0700", 2024)
            .unwrap();
        assert_eq!(fmt(ts), "2023-10-10 13:55:36 -0700");
    }

    #[test]
    fn test_rfc3339_layout() {
        let ts = TimestampLayout::Rfc3339
            .parse("2024-01-01T10:00:00+02:00", 2024)
            .unwrap();
        assert_eq!(fmt(ts), "2024-01-01 10:00:00 +0200");
        assert!(TimestampLayout::Rfc3339
            .parse("2024-01-01 10:00:00", 2024)
            .is_none());
    }

    #[test]
    fn test_rfc3339_is_strict() {
        let layout = TimestampLayout::Rfc3339;
        let ts = layout.parse("2024-01-01T10:00:00.250Z", 2024).unwrap();
        assert_eq!(fmt(ts), "2024-01-01 10:00:00 +0000");
        assert!(layout.parse("2024-01-01T10:00:00-05:30", 2024).is_some());

        assert!(layout.parse("2024-01-01 10:00:00Z", 2024).is_none());
        assert!(layout.parse("2024-01-01t10:00:00Z", 2024).is_none());
        assert!(layout.parse("2024-01-01T10:00:00z", 2024).is_none());
        assert!(layout.parse("2024-01-01T10:00:00", 2024).is_none());
    }

    #[test]
    fn test_yearless_attaches_reference_year() {
        let ts = TimestampLayout::Yearless
            .parse("Oct  5 13:55:36", 2023)
            .unwrap();
        assert_eq!(fmt(ts), "2023-10-05 13:55:36 +0000");
    }

    #[test]
    fn test_yearless_leap_day_rolls_over_in_common_year() {
        let ts = TimestampLayout::Yearless
            .parse("Feb 29 00:00:01", 2023)
            .unwrap();
        assert_eq!(fmt(ts), "2023-03-01 00:00:01 +0000");

        let ts = TimestampLayout::Yearless
            .parse("Feb 29 00:00:01", 2024)
            .unwrap();
        assert_eq!(fmt(ts), "2024-02-29 00:00:01 +0000");
    }

    #[test]
    fn test_yearless_rejects_bad_shapes() {
        let layout = TimestampLayout::Yearless;
        assert!(layout.parse("Foo 5 13:55:36", 2024).is_none());
        assert!(layout.parse("Feb 30 13:55:36", 2024).is_none());
        assert!(layout.parse("Jan 15 14:30:2", 2024).is_none());
        assert!(layout.parse("Jan 15", 2024).is_none());
    }

    #[test]
    fn test_yearless_single_digit_hour() {
        let layout = TimestampLayout::Yearless;
        let ts = layout.parse("Oct 10 1:02:03", 2023).unwrap();
        assert_eq!(fmt(ts), "2023-10-10 01:02:03 +0000");

        assert!(layout.parse("Oct 10 1:2:03", 2023).is_none());
        assert!(layout.parse("Oct 10 123:02:03", 2023).is_none());
        assert!(layout.parse("Oct 10 24:00:00", 2023).is_none());
    }

    #[test]
    fn test_prefix_widths() {
        assert_eq!(TimestampLayout::DateTime.prefix_width(), 19);
        assert_eq!(TimestampLayout::SlashDateTime.prefix_width(), 19);
        assert_eq!(TimestampLayout::Yearless.prefix_width(), 14);
        assert_eq!(TimestampLayout::Rfc3339.prefix_width(), 25);
    }
}
