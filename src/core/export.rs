// LogSift - core/export.rs
//
// Text, JSON and CSV rendering of record sequences.
// Core layer: writes to any Write trait object.

use crate::core::model::LogRecord;
use crate::util::constants::{DATETIME_FORMAT, TIME_ONLY_FORMAT, ZERO_TIMESTAMP_TEXT};
use crate::util::error::{ExportError, FormatSelectionError};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

// =============================================================================
// Output format
// =============================================================================

/// Rendering used for the record stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = FormatSelectionError;

    /// The empty string selects text output.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(FormatSelectionError::UnknownOutput {
                value: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// Head / tail window
// =============================================================================

/// Slice of the filtered sequence that gets rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    #[default]
    All,
    /// First N records.
    Head(usize),
    /// Last N records.
    Tail(usize),
}

impl Window {
    /// Build from the raw head/tail counts. Zero means "not requested";
    /// head wins when both are positive.
    pub fn from_counts(head: usize, tail: usize) -> Self {
        if head > 0 {
            Window::Head(head)
        } else if tail > 0 {
            Window::Tail(tail)
        } else {
            Window::All
        }
    }

    pub fn apply<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        match *self {
            Window::All => items,
            Window::Head(n) => &items[..n.min(items.len())],
            Window::Tail(n) => &items[items.len().saturating_sub(n)..],
        }
    }
}

// =============================================================================
// Renderers
// =============================================================================

/// Render records in the chosen format. Returns the number written.
pub fn write_records<W: Write>(
    records: &[LogRecord],
    format: OutputFormat,
    verbose: bool,
    writer: W,
) -> Result<usize, ExportError> {
    match format {
        OutputFormat::Text => write_text(records, verbose, writer),
        OutputFormat::Json => write_json(records, writer),
        OutputFormat::Csv => write_csv(records, writer),
    }
}

/// One line per record.
///
/// Compact form: `HH:MM:SS [LEVEL] message`, with the time and level
/// prefixes left out when absent. Verbose form always prints every field
/// bracketed: `[YYYY-MM-DD HH:MM:SS] [LEVEL] [source] message`.
pub fn write_text<W: Write>(
    records: &[LogRecord],
    verbose: bool,
    mut writer: W,
) -> Result<usize, ExportError> {
    for record in records {
        write_text_line(record, verbose, &mut writer)?;
    }
    writer.flush()?;
    Ok(records.len())
}

fn write_text_line<W: Write>(
    record: &LogRecord,
    verbose: bool,
    writer: &mut W,
) -> Result<(), ExportError> {
    if verbose {
        let ts = record
            .timestamp
            .map(|t| t.format(DATETIME_FORMAT).to_string())
            .unwrap_or_else(|| ZERO_TIMESTAMP_TEXT.to_string());
        writeln!(
            writer,
            "[{ts}] [{}] [{}] {}",
            record.level_label(),
            record.source,
            record.message
        )?;
        return Ok(());
    }

    if let Some(ts) = record.timestamp {
        write!(writer, "{} ", ts.format(TIME_ONLY_FORMAT))?;
    }
    if let Some(ref level) = record.level {
        write!(writer, "[{level}] ")?;
    }
    writeln!(writer, "{}", record.message)?;
    Ok(())
}

/// Pretty-printed JSON array with every field, followed by a newline.
pub fn write_json<W: Write>(records: &[LogRecord], mut writer: W) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(&mut writer, records)
        .map_err(|e| ExportError::Json { source: e })?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(records.len())
}

/// CSV with a `Timestamp,Level,Source,Message` header.
///
/// Only the message is quoted (embedded quotes doubled); the other
/// columns are written as-is.
pub fn write_csv<W: Write>(records: &[LogRecord], writer: W) -> Result<usize, ExportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer
        .write_record(["Timestamp", "Level", "Source", "Message"])
        .map_err(|e| ExportError::Csv { source: e })?;

    for record in records {
        let ts = record
            .timestamp
            .map(|t| t.format(DATETIME_FORMAT).to_string())
            .unwrap_or_default();
        let message = format!("\"{}\"", record.message.replace('"', "\"\""));

        csv_writer
            .write_record([
                ts.as_str(),
                record.level_label(),
                record.source.as_str(),
                message.as_str(),
            ])
            .map_err(|e| ExportError::Csv { source: e })?;
    }

    csv_writer.flush()?;
    Ok(records.len())
}
