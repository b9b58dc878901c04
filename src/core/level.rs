// LogSift - core/level.rs
//
// Severity inference from free message text. Used for formats that carry
// no explicit level field (syslog, unstructured fallback lines).

use crate::core::model::Level;

/// Keywords that mark a message as ERROR.
const ERROR_KEYWORDS: &[&str] = &["ERROR", "FATAL", "CRITICAL"];

/// Keywords that mark a message as WARN.
const WARN_KEYWORDS: &[&str] = &["WARN", "WARNING"];

/// Keywords that mark a message as DEBUG.
const DEBUG_KEYWORDS: &[&str] = &["DEBUG", "TRACE"];

/// Infer a severity level from message text.
///
/// Case-insensitive substring scan with priority ERROR > WARN > DEBUG.
/// Defaults to INFO, so the result is always one of the four known levels.
pub fn infer_level(message: &str) -> Level {
    let upper = message.to_uppercase();
    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| upper.contains(k));

    if contains_any(ERROR_KEYWORDS) {
        Level::Error
    } else if contains_any(WARN_KEYWORDS) {
        Level::Warn
    } else if contains_any(DEBUG_KEYWORDS) {
        Level::Debug
    } else {
        Level::Info
    }
}
