// LogSift - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies. These types are the shared vocabulary across
// all layers.

use crate::util::constants::ZERO_TIMESTAMP_JSON;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Serialize, Serializer};

// =============================================================================
// Log Record (normalised output of parsing)
// =============================================================================

/// A single parsed log line, normalised across all formats.
///
/// Every raw line yields exactly one record. Only `raw` is guaranteed;
/// all other fields are best-effort and may be empty or absent. Records
/// are never mutated after the parser produces them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LogRecord {
    /// Parsed timestamp, keeping the offset written in the source line
    /// (UTC for zone-less formats). `None` if no timestamp could be extracted.
    #[serde(rename = "Timestamp", serialize_with = "serialize_timestamp")]
    pub timestamp: Option<DateTime<FixedOffset>>,

    /// Severity level. `None` when the format left it undetermined.
    #[serde(rename = "Level", serialize_with = "serialize_level")]
    pub level: Option<Level>,

    /// The semantic payload text.
    #[serde(rename = "Message")]
    pub message: String,

    /// Origin or component label. Empty when the format does not expose one.
    #[serde(rename = "Source")]
    pub source: String,

    /// The original, unmodified line.
    #[serde(rename = "Raw")]
    pub raw: String,
}

impl LogRecord {
    /// A record carrying only the raw line as its message: the worst-case
    /// outcome of parsing.
    pub fn unparsed(line: &str) -> Self {
        Self {
            message: line.to_string(),
            raw: line.to_string(),
            ..Default::default()
        }
    }

    /// Level label, or the empty string when undetermined.
    pub fn level_label(&self) -> &str {
        self.level.as_ref().map(Level::as_str).unwrap_or("")
    }
}

/// RFC 3339 with `Z` for a zero offset; the zero instant when unset.
fn serialize_timestamp<S: Serializer>(
    ts: &Option<DateTime<FixedOffset>>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match ts {
        Some(ts) => s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        None => s.serialize_str(ZERO_TIMESTAMP_JSON),
    }
}

fn serialize_level<S: Serializer>(level: &Option<Level>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(level.as_ref().map(Level::as_str).unwrap_or(""))
}

// =============================================================================
// Level
// =============================================================================

/// Severity level of a record.
///
/// Inference only ever produces the four known variants. Formats that
/// carry an explicit level field keep whatever label the line had, so an
/// unrecognised label such as `NOTICE` is preserved as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
    /// Any other uppercased label, kept verbatim.
    Other(String),
}

impl Level {
    /// The four known levels in report order.
    pub fn known() -> [Level; 4] {
        [Level::Error, Level::Warn, Level::Info, Level::Debug]
    }

    /// Build a level from a label, uppercasing it first.
    ///
    /// Only the exact labels `ERROR`, `WARN`, `INFO` and `DEBUG` map to the
    /// known variants; `WARNING` or `ERR` become `Other`.
    pub fn from_label(label: &str) -> Self {
        let upper = label.to_uppercase();
        match upper.as_str() {
            "ERROR" => Level::Error,
            "WARN" => Level::Warn,
            "INFO" => Level::Info,
            "DEBUG" => Level::Debug,
            _ => Level::Other(upper),
        }
    }

    /// Uppercase label.
    pub fn as_str(&self) -> &str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Other(label) => label,
        }
    }

    /// True for the four levels counted by the statistics report.
    pub fn is_known(&self) -> bool {
        !matches!(self, Level::Other(_))
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_uppercases() {
        assert_eq!(Level::from_label("error"), Level::Error);
        assert_eq!(Level::from_label("Warn"), Level::Warn);
        assert_eq!(Level::from_label("info"), Level::Info);
        assert_eq!(Level::from_label("DEBUG"), Level::Debug);
    }

    #[test]
    fn test_from_label_keeps_unknown_labels() {
        let level = Level::from_label("warning");
        assert_eq!(level, Level::Other("WARNING".to_string()));
        assert_eq!(level.as_str(), "WARNING");
        assert!(!level.is_known());
    }

    #[test]
    fn test_unparsed_record_keeps_raw_as_message() {
        let record = LogRecord::unparsed("  something odd ");
        assert_eq!(record.raw, "  something odd ");
        assert_eq!(record.message, "  something odd ");
        assert!(record.timestamp.is_none());
        assert_eq!(record.level_label(), "");
        assert!(record.source.is_empty());
    }

    #[test]
    fn test_record_serialises_empty_fields() {
        let record = LogRecord::unparsed("x");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Timestamp"], "0001-01-01T00:00:00Z");
        assert_eq!(json["Level"], "");
        assert_eq!(json["Source"], "");
        assert_eq!(json["Message"], "x");
        assert_eq!(json["Raw"], "x");
    }

    #[test]
    fn test_record_serialises_keys_in_field_order() {
        let record = LogRecord {
            timestamp: DateTime::parse_from_rfc3339("2024-01-01T10:00:00Z").ok(),
            level: Some(Level::Warn),
            source: "api".to_string(),
            message: "slow".to_string(),
            raw: "line".to_string(),
        };
        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(
            text,
            r#"{"Timestamp":"2024-01-01T10:00:00Z","Level":"WARN","Message":"slow","Source":"api","Raw":"line"}"#
        );
    }

    #[test]
    fn test_record_serialises_non_utc_offset() {
        let record = LogRecord {
            timestamp: DateTime::parse_from_rfc3339("2023-10-10T13:55:36.5-07:00").ok(),
            ..LogRecord::unparsed("x")
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Timestamp"], "2023-10-10T13:55:36.500-07:00");
    }
}
