// LogSift - core/formats.rs
//
// Format registry: the fixed, ordered set of named line-shape matchers and
// the raw field strings each one extracts. Built once at startup and handed
// to the parser explicitly; nothing here is global or mutable.
//
// Matchers are not mutually exclusive at the text level (every nginx line
// also matches the apache shape). Priority order is the only tie-break.

use crate::core::timestamp::TimestampLayout;
use crate::util::error::{FormatSelectionError, RegistryError};
use regex::Regex;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::str::FromStr;

// =============================================================================
// Format names
// =============================================================================

/// A named line-shape convention the parser can recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogFormat {
    Generic,
    Syslog,
    Apache,
    Nginx,
    Json,
}

/// Order in which matchers are tried when the format is auto-detected.
/// JSON is not listed: it is routed by its own predicate before these run.
pub const AUTO_DETECT_ORDER: [LogFormat; 4] = [
    LogFormat::Generic,
    LogFormat::Syslog,
    LogFormat::Apache,
    LogFormat::Nginx,
];

impl LogFormat {
    pub fn name(&self) -> &'static str {
        match self {
            LogFormat::Generic => "generic",
            LogFormat::Syslog => "syslog",
            LogFormat::Apache => "apache",
            LogFormat::Nginx => "nginx",
            LogFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogFormat {
    type Err = FormatSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generic" => Ok(LogFormat::Generic),
            "syslog" => Ok(LogFormat::Syslog),
            "apache" => Ok(LogFormat::Apache),
            "nginx" => Ok(LogFormat::Nginx),
            "json" => Ok(LogFormat::Json),
            _ => Err(FormatSelectionError::UnknownFormat {
                value: s.to_string(),
            }),
        }
    }
}

/// The format requested for a run: one fixed format, or auto-detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatSelection {
    #[default]
    Auto,
    Fixed(LogFormat),
}

impl FromStr for FormatSelection {
    type Err = FormatSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(FormatSelection::Auto);
        }
        s.parse().map(FormatSelection::Fixed)
    }
}

impl std::fmt::Display for FormatSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatSelection::Auto => f.write_str("auto"),
            FormatSelection::Fixed(format) => write!(f, "{format}"),
        }
    }
}

// =============================================================================
// Matcher definition
// =============================================================================

/// How the record level is obtained for a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelRule {
    /// Uppercase the captured level label verbatim.
    Captured,
    /// Run keyword inference over the message.
    Inferred,
    /// Derive from the captured HTTP status code.
    HttpStatus,
}

/// Raw field strings pulled out of one line by a matcher.
///
/// Strings borrow from the line for capture-based shapes; JSON values are
/// owned because they may have been unescaped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields<'a> {
    pub timestamp: Option<Cow<'a, str>>,
    pub level: Option<Cow<'a, str>>,
    pub source: Option<Cow<'a, str>>,
    pub message: Option<Cow<'a, str>>,
    pub status: Option<Cow<'a, str>>,
}

/// Capture group positions for a pattern-based format (1-based; 0 = unused).
#[derive(Debug, Clone, Copy)]
struct Groups {
    timestamp: usize,
    level: usize,
    source: usize,
    message: usize,
    status: usize,
}

#[derive(Debug)]
enum Shape {
    /// Fixed-position capture pattern.
    Pattern { regex: Regex, groups: Groups },
    /// Any line whose trimmed form starts with `{`.
    JsonObject,
}

/// Static description of a built-in matcher, compiled by the registry.
struct MatcherDef {
    format: LogFormat,
    pattern: &'static str,
    groups: Groups,
    timestamp: TimestampLayout,
    level: LevelRule,
}

// Character classes are spelled out ASCII-only: `\d`, `\w` and `\s` are
// Unicode-aware in `regex` and would accept non-ASCII digits and spaces.
const BUILTIN_PATTERNS: &[MatcherDef] = &[
    MatcherDef {
        format: LogFormat::Generic,
        pattern: r"^([0-9]{4}-[0-9]{2}-[0-9]{2}[\t\n\f\r ]+[0-9]{2}:[0-9]{2}:[0-9]{2})[\t\n\f\r ]+\[([0-9A-Za-z_]+)\][\t\n\f\r ]+(.*)",
        groups: Groups {
            timestamp: 1,
            level: 2,
            source: 0,
            message: 3,
            status: 0,
        },
        timestamp: TimestampLayout::DateTime,
        level: LevelRule::Captured,
    },
    MatcherDef {
        format: LogFormat::Syslog,
        pattern: r"^([0-9A-Za-z_]+[\t\n\f\r ]+[0-9]+[\t\n\f\r ]+[0-9]+:[0-9]+:[0-9]+) ([^\t\n\f\r ]+) ([^:]+): (.*)",
        groups: Groups {
            timestamp: 1,
            level: 0,
            source: 2,
            message: 4,
            status: 0,
        },
        timestamp: TimestampLayout::Yearless,
        level: LevelRule::Inferred,
    },
    MatcherDef {
        format: LogFormat::Apache,
        pattern: r#"^([^\t\n\f\r ]+) [^\t\n\f\r ]+ [^\t\n\f\r ]+ \[([^\]]+)\] "([^"]*)" ([0-9]+) ([0-9]+)"#,
        groups: Groups {
            timestamp: 2,
            level: 0,
            source: 1,
            message: 3,
            status: 4,
        },
        timestamp: TimestampLayout::AccessLog,
        level: LevelRule::HttpStatus,
    },
    MatcherDef {
        format: LogFormat::Nginx,
        pattern: r#"^([^\t\n\f\r ]+) - - \[([^\]]+)\] "([^"]*)" ([0-9]+) ([0-9]+) "([^"]*)" "([^"]*)""#,
        groups: Groups {
            timestamp: 2,
            level: 0,
            source: 1,
            message: 3,
            status: 4,
        },
        timestamp: TimestampLayout::AccessLog,
        level: LevelRule::HttpStatus,
    },
];

/// One named matcher: a shape predicate plus its extraction rules.
#[derive(Debug)]
pub struct Matcher {
    format: LogFormat,
    shape: Shape,
    timestamp: TimestampLayout,
    level: LevelRule,
}

impl Matcher {
    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Layout of the timestamp field this matcher captures.
    pub fn timestamp_layout(&self) -> TimestampLayout {
        self.timestamp
    }

    pub fn level_rule(&self) -> LevelRule {
        self.level
    }

    /// Does the line have this matcher's shape?
    pub fn matches(&self, line: &str) -> bool {
        match &self.shape {
            Shape::Pattern { regex, .. } => regex.is_match(line),
            Shape::JsonObject => line.trim().starts_with('{'),
        }
    }

    /// Extract raw field strings from a line.
    ///
    /// Returns `None` when the line does not have the shape, or for JSON,
    /// when it does not decode to an object.
    pub fn extract<'a>(&self, line: &'a str) -> Option<RawFields<'a>> {
        match &self.shape {
            Shape::Pattern { regex, groups } => {
                let caps = regex.captures(line)?;
                let group = |idx: usize| -> Option<Cow<'a, str>> {
                    if idx == 0 {
                        return None;
                    }
                    caps.get(idx).map(|m| Cow::Borrowed(m.as_str()))
                };
                Some(RawFields {
                    timestamp: group(groups.timestamp),
                    level: group(groups.level),
                    source: group(groups.source),
                    message: group(groups.message),
                    status: group(groups.status),
                })
            }
            Shape::JsonObject => extract_json(line),
        }
    }
}

/// Decode a JSON object and pick out the recognised keys.
///
/// Values that are absent or not strings are treated as "key not found".
fn extract_json(line: &str) -> Option<RawFields<'static>> {
    let map: Map<String, Value> = serde_json::from_str(line).ok()?;

    let text = |key: &str| -> Option<Cow<'static, str>> {
        map.get(key)
            .and_then(Value::as_str)
            .map(|s| Cow::Owned(s.to_string()))
    };

    Some(RawFields {
        timestamp: text("timestamp"),
        level: text("level"),
        source: text("source").or_else(|| text("component")),
        message: text("message").or_else(|| text("msg")),
        status: None,
    })
}

// =============================================================================
// Registry
// =============================================================================

/// Immutable, ordered list of matchers.
#[derive(Debug)]
pub struct FormatRegistry {
    matchers: Vec<Matcher>,
}

impl FormatRegistry {
    /// Compile the built-in matchers.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut matchers = Vec::with_capacity(BUILTIN_PATTERNS.len() + 1);

        for def in BUILTIN_PATTERNS {
            let regex = Regex::new(def.pattern).map_err(|e| RegistryError::InvalidPattern {
                format: def.format.name(),
                pattern: def.pattern,
                source: e,
            })?;
            matchers.push(Matcher {
                format: def.format,
                shape: Shape::Pattern {
                    regex,
                    groups: def.groups,
                },
                timestamp: def.timestamp,
                level: def.level,
            });
        }

        matchers.push(Matcher {
            format: LogFormat::Json,
            shape: Shape::JsonObject,
            timestamp: TimestampLayout::Rfc3339,
            level: LevelRule::Captured,
        });

        tracing::debug!(matchers = matchers.len(), "Format registry compiled");

        Ok(Self { matchers })
    }

    /// Look up a matcher by format name.
    pub fn get(&self, format: LogFormat) -> Option<&Matcher> {
        self.matchers.iter().find(|m| m.format == format)
    }

    /// Pattern matchers to try for a selection, in priority order.
    /// JSON is never included: it is routed separately.
    pub fn candidates(&self, selection: FormatSelection) -> Vec<&Matcher> {
        match selection {
            FormatSelection::Auto => AUTO_DETECT_ORDER
                .iter()
                .filter_map(|f| self.get(*f))
                .collect(),
            FormatSelection::Fixed(LogFormat::Json) => Vec::new(),
            FormatSelection::Fixed(format) => self.get(format).into_iter().collect(),
        }
    }

    /// Should this line go to the JSON extractor?
    pub fn routes_to_json(&self, line: &str, selection: FormatSelection) -> bool {
        match selection {
            FormatSelection::Fixed(LogFormat::Json) => true,
            FormatSelection::Fixed(_) => false,
            FormatSelection::Auto => self
                .get(LogFormat::Json)
                .is_some_and(|m| m.matches(line)),
        }
    }

    /// First matcher in auto-detection order whose shape fits the line.
    pub fn detect(&self, line: &str) -> Option<&Matcher> {
        if self.routes_to_json(line, FormatSelection::Auto) {
            return self.get(LogFormat::Json);
        }
        self.candidates(FormatSelection::Auto)
            .into_iter()
            .find(|m| m.matches(line))
    }
}
