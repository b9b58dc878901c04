// LogSift - platform/config.rs
//
// Platform config directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::export::OutputFormat;
use crate::core::formats::FormatSelection;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of `config.toml`.
///
/// Falls back to the current directory if platform dirs cannot be determined.
pub fn default_config_path() -> PathBuf {
    match ProjectDirs::from("", "", constants::APP_ID) {
        Some(dirs) => dirs.config_dir().join(constants::CONFIG_FILE_NAME),
        None => {
            tracing::warn!("Could not determine platform directories, using current directory");
            PathBuf::from(".").join(constants::CONFIG_FILE_NAME)
        }
    }
}

// =============================================================================
// Raw file shape
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored, so a newer config file works with an
/// older binary.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub analysis: AnalysisSection,
    pub follow: FollowSection,
    pub logging: LoggingSection,
}

/// `[analysis]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    /// Default format selection: apache, nginx, syslog, generic, json, auto.
    pub format: Option<String>,
    /// Default output rendering: text, json, csv.
    pub output: Option<String>,
    /// Verbose text output.
    pub verbose: Option<bool>,
}

/// `[follow]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct FollowSection {
    /// Sleep between polls when no new data is available.
    pub poll_interval_ms: Option<u64>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

// =============================================================================
// Validated config
// =============================================================================

/// Validated application configuration. Command-line flags override these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub format: FormatSelection,
    pub output: OutputFormat,
    pub verbose: bool,
    pub poll_interval: Duration,
    /// Logging level string, applied when logging is initialised.
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            format: FormatSelection::Auto,
            output: OutputFormat::Text,
            verbose: false,
            poll_interval: Duration::from_millis(constants::FOLLOW_POLL_INTERVAL_MS),
            log_level: None,
        }
    }
}

/// Load and validate `config.toml` from `path`.
///
/// Returns the validated config and every non-fatal problem found. A
/// missing file yields defaults with no warnings. An unreadable or
/// unparseable file yields defaults plus one warning. Invalid values fall
/// back to their defaults individually.
///
/// Runs before logging is initialised, so callers report the warnings.
pub fn load_config(path: &Path) -> (AppConfig, Vec<ConfigError>) {
    let mut warnings = Vec::new();

    if !path.exists() {
        return (AppConfig::default(), warnings);
    }

    let raw = match read_raw_config(path) {
        Ok(raw) => raw,
        Err(e) => {
            warnings.push(e);
            return (AppConfig::default(), warnings);
        }
    };

    let config = validate(raw, &mut warnings);
    (config, warnings)
}

fn read_raw_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Validate each field, accumulating every problem.
fn validate(raw: RawConfig, warnings: &mut Vec<ConfigError>) -> AppConfig {
    let mut config = AppConfig::default();

    if let Some(ref format) = raw.analysis.format {
        match format.parse::<FormatSelection>() {
            Ok(selection) => config.format = selection,
            Err(_) => warnings.push(ConfigError::ValueOutOfRange {
                field: "analysis.format".to_string(),
                value: format.clone(),
                expected: "apache, nginx, syslog, generic, json or auto".to_string(),
            }),
        }
    }

    if let Some(ref output) = raw.analysis.output {
        match output.parse::<OutputFormat>() {
            Ok(output) => config.output = output,
            Err(_) => warnings.push(ConfigError::ValueOutOfRange {
                field: "analysis.output".to_string(),
                value: output.clone(),
                expected: "text, json or csv".to_string(),
            }),
        }
    }

    if let Some(verbose) = raw.analysis.verbose {
        config.verbose = verbose;
    }

    if let Some(ms) = raw.follow.poll_interval_ms {
        if (constants::MIN_FOLLOW_POLL_INTERVAL_MS..=constants::MAX_FOLLOW_POLL_INTERVAL_MS)
            .contains(&ms)
        {
            config.poll_interval = Duration::from_millis(ms);
        } else {
            warnings.push(ConfigError::ValueOutOfRange {
                field: "follow.poll_interval_ms".to_string(),
                value: ms.to_string(),
                expected: format!(
                    "{}-{} (default {})",
                    constants::MIN_FOLLOW_POLL_INTERVAL_MS,
                    constants::MAX_FOLLOW_POLL_INTERVAL_MS,
                    constants::FOLLOW_POLL_INTERVAL_MS,
                ),
            });
        }
    }

    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(ConfigError::ValueOutOfRange {
                field: "logging.level".to_string(),
                value: level.clone(),
                expected: "error, warn, info, debug or trace".to_string(),
            });
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::formats::LogFormat;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("absent.toml"));
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_config() {
        let file = write_config(
            r#"
            [analysis]
            format = "syslog"
            output = "csv"
            verbose = true

            [follow]
            poll_interval_ms = 250

            [logging]
            level = "DEBUG"

            [future]
            ignored = 1
            "#,
        );
        let (config, warnings) = load_config(file.path());
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.format, FormatSelection::Fixed(LogFormat::Syslog));
        assert_eq!(config.output, OutputFormat::Csv);
        assert!(config.verbose);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_invalid_values_fall_back_individually() {
        let file = write_config(
            r#"
            [analysis]
            format = "xml"
            verbose = true

            [follow]
            poll_interval_ms = 5

            [logging]
            level = "loud"
            "#,
        );
        let (config, warnings) = load_config(file.path());
        assert_eq!(warnings.len(), 3);
        assert!(warnings
            .iter()
            .all(|w| matches!(w, ConfigError::ValueOutOfRange { .. })));
        assert_eq!(config.format, FormatSelection::Auto);
        assert!(config.verbose);
        assert_eq!(
            config.poll_interval,
            Duration::from_millis(constants::FOLLOW_POLL_INTERVAL_MS)
        );
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_unparseable_file() {
        let file = write_config("[analysis\nformat = ");
        let (config, warnings) = load_config(file.path());
        assert_eq!(config, AppConfig::default());
        assert!(matches!(warnings.as_slice(), [ConfigError::TomlParse { .. }]));
    }
}
