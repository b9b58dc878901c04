// LogSift - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Resolving flags + config into a filter, format and output selection
// 4. One-shot analysis or live follow, with fatal errors mapped to exit 1

use clap::Parser;
use logsift::app::analysis::{self, AnalysisRequest};
use logsift::app::follow::{self, FollowOptions};
use logsift::core::export::{OutputFormat, Window};
use logsift::core::filter::FilterSpec;
use logsift::core::formats::{FormatRegistry, FormatSelection};
use logsift::core::parser::LineParser;
use logsift::platform::config::{self, AppConfig};
use logsift::util;
use logsift::util::error::{LogSiftError, Result};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Analyse, filter and summarise log files.
#[derive(Parser, Debug)]
#[command(name = "logsift", version, about)]
struct Cli {
    /// Log file to analyse
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    file: PathBuf,

    /// Log format: apache, nginx, syslog, generic, json, auto
    #[arg(long)]
    format: Option<String>,

    /// Only show records at this level (ERROR, WARN, INFO, DEBUG, ...)
    #[arg(long, default_value = "")]
    level: String,

    /// Only show records whose source contains this text
    #[arg(long, default_value = "")]
    source: String,

    /// Only show records whose message contains this text
    #[arg(long, default_value = "")]
    keyword: String,

    /// Start time (YYYY-MM-DD HH:MM:SS)
    #[arg(long)]
    start: Option<String>,

    /// End time (YYYY-MM-DD HH:MM:SS)
    #[arg(long)]
    end: Option<String>,

    /// Show statistics instead of records
    #[arg(long)]
    stats: bool,

    /// Show only the first N matching records
    #[arg(long, value_name = "N", default_value_t = 0)]
    head: usize,

    /// Show only the last N matching records
    #[arg(long, value_name = "N", default_value_t = 0)]
    tail: usize,

    /// Follow the file for new lines (like tail -f)
    #[arg(long)]
    follow: bool,

    /// Output format: text, json, csv
    #[arg(long)]
    output: Option<String>,

    /// Print every field of each record
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Enable debug logging on stderr
    #[arg(short = 'd', long)]
    debug: bool,

    /// Use this config file instead of the platform default
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(config::default_config_path);
    let (app_config, config_warnings) = config::load_config(&config_path);

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "LogSift starting"
    );
    for warning in &config_warnings {
        tracing::warn!(error = %warning, "Config warning, using default");
    }

    if let Err(e) = run(&cli, &app_config) {
        tracing::error!(error = %e, "Fatal error");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli, app_config: &AppConfig) -> Result<()> {
    let filter = FilterSpec::from_inputs(
        &cli.level,
        &cli.source,
        &cli.keyword,
        cli.start.as_deref(),
        cli.end.as_deref(),
    )?;

    let selection = match cli.format {
        Some(ref value) => value.parse::<FormatSelection>()?,
        None => app_config.format,
    };
    let output = match cli.output {
        Some(ref value) => value.parse::<OutputFormat>()?,
        None => app_config.output,
    };
    let verbose = cli.verbose || app_config.verbose;

    let parser = LineParser::new(FormatRegistry::builtin()?);
    let stdout = std::io::stdout();

    if cli.follow {
        let options = FollowOptions {
            selection,
            filter,
            verbose,
            poll_interval: app_config.poll_interval,
        };
        let mut out = stdout.lock();
        writeln!(out, "Following log file... (Press Ctrl+C to exit)").map_err(|e| {
            LogSiftError::Io {
                path: PathBuf::from("<stdout>"),
                operation: "write",
                source: e,
            }
        })?;
        // Never set: the loop runs until the process is interrupted.
        let cancel = Arc::new(AtomicBool::new(false));
        follow::follow_file(&cli.file, &options, &parser, out, &cancel)?;
        return Ok(());
    }

    let request = AnalysisRequest {
        path: cli.file.clone(),
        selection,
        filter,
        stats: cli.stats,
        window: Window::from_counts(cli.head, cli.tail),
        output,
        verbose,
    };
    analysis::run(&request, &parser, stdout.lock())?;
    Ok(())
}
