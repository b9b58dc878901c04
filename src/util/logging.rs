// LogSift - util/logging.rs
//
// Diagnostic logging for the CLI. Everything goes to stderr so stdout
// carries only records and reports.
//
// The filter directive is taken from the first of: RUST_LOG, --debug,
// `[logging] level` in config.toml, then the built-in default.

use super::constants::{APP_NAME, APP_VERSION, DEFAULT_LOG_LEVEL};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides every other level setting.
const ENV_VAR: &str = "RUST_LOG";

/// Where the active filter directive came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelSource {
    /// A non-empty `RUST_LOG` value, used verbatim.
    Env(String),
    /// `--debug` on the command line.
    DebugFlag,
    /// The validated level from the config file.
    Config(String),
    /// Nothing set.
    Default,
}

impl LevelSource {
    /// Pick the directive source by priority.
    pub fn resolve(env: Option<&str>, debug_flag: bool, config_level: Option<&str>) -> Self {
        match (env.map(str::trim).filter(|v| !v.is_empty()), config_level) {
            (Some(directive), _) => LevelSource::Env(directive.to_string()),
            (None, _) if debug_flag => LevelSource::DebugFlag,
            (None, Some(level)) => LevelSource::Config(level.to_string()),
            (None, None) => LevelSource::Default,
        }
    }

    pub fn directive(&self) -> &str {
        match self {
            LevelSource::Env(d) | LevelSource::Config(d) => d,
            LevelSource::DebugFlag => "debug",
            LevelSource::Default => DEFAULT_LOG_LEVEL,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            LevelSource::Env(_) => ENV_VAR,
            LevelSource::DebugFlag => "--debug",
            LevelSource::Config(_) => "config",
            LevelSource::Default => "default",
        }
    }
}

/// Compile `source`'s directive. An unparseable directive falls back to
/// the default level and the parse error is handed back for reporting.
fn build_filter(source: &LevelSource) -> (EnvFilter, Option<ParseError>) {
    match EnvFilter::try_new(source.directive()) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(DEFAULT_LOG_LEVEL), Some(e)),
    }
}

/// Install the global stderr subscriber.
///
/// Does nothing if a subscriber is already installed.
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let env = std::env::var(ENV_VAR).ok();
    let source = LevelSource::resolve(env.as_deref(), debug_flag, config_level);
    let (filter, rejected) = build_filter(&source);

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .try_init();
    if installed.is_err() {
        return;
    }

    if let Some(e) = rejected {
        tracing::warn!(
            source = source.name(),
            directive = source.directive(),
            error = %e,
            "Invalid log filter, using {DEFAULT_LOG_LEVEL}"
        );
    }
    tracing::debug!(
        app = APP_NAME,
        version = APP_VERSION,
        source = source.name(),
        directive = source.directive(),
        "Logging ready"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_wins_over_everything() {
        let source = LevelSource::resolve(Some("logsift=trace"), true, Some("info"));
        assert_eq!(source, LevelSource::Env("logsift=trace".to_string()));
        assert_eq!(source.directive(), "logsift=trace");
    }

    #[test]
    fn test_blank_env_is_ignored() {
        assert_eq!(LevelSource::resolve(Some("  "), true, None), LevelSource::DebugFlag);
    }

    #[test]
    fn test_debug_flag_beats_config() {
        let source = LevelSource::resolve(None, true, Some("error"));
        assert_eq!(source, LevelSource::DebugFlag);
        assert_eq!(source.directive(), "debug");
    }

    #[test]
    fn test_config_then_default() {
        assert_eq!(
            LevelSource::resolve(None, false, Some("info")).directive(),
            "info"
        );
        let source = LevelSource::resolve(None, false, None);
        assert_eq!(source, LevelSource::Default);
        assert_eq!(source.directive(), DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_bad_directive_falls_back() {
        let (_, rejected) = build_filter(&LevelSource::Env("logsift=loud".to_string()));
        assert!(rejected.is_some());

        let (_, rejected) = build_filter(&LevelSource::Config("debug".to_string()));
        assert!(rejected.is_none());
    }
}
