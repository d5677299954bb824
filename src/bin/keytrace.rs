//! Keytrace CLI - replay tooling for recorded keystroke logs
//!
//! Commands:
//! - extract: Replay a key-event log through the pipeline and emit the feature vector
//! - validate: Validate a key-event log
//! - schema: Print wire-schema information

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use keytrace::clock::{Clock, ManualClock};
use keytrace::types::{Difficulty, KeyEvent, KeyEventKind};
use keytrace::{CaptureConfig, CaptureError, CaptureSession, ENGINE_VERSION};

/// Keytrace - on-device capture engine for keystroke-dynamics signals
#[derive(Parser)]
#[command(name = "keytrace")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Replay keystroke logs into identification feature vectors", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a key-event log through the pipeline and emit the feature vector
    Extract {
        /// Input file path (use - for stdin), one JSON key event per line
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Reference text the log was recorded against
        #[arg(short, long)]
        text: String,

        /// Difficulty tag for the attempt
        #[arg(long, default_value = "easy")]
        difficulty: DifficultyArg,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Validate a key-event log
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaType {
    /// Input schema (key-event NDJSON)
    Input,
    /// Output schema (feature vector)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), KeytraceCliError> {
    match cli.command {
        Commands::Extract {
            input,
            output,
            text,
            difficulty,
            output_format,
        } => cmd_extract(&input, &output, &text, difficulty.into(), output_format),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Schema { schema_type } => {
            cmd_schema(schema_type);
            Ok(())
        }
    }
}

/// Clock handle shared between the CLI (which drives it from recorded
/// timestamps) and the session that reads it.
struct ReplayClock(Rc<ManualClock>);

impl Clock for ReplayClock {
    fn now_ms(&self) -> f64 {
        self.0.now_ms()
    }
}

fn cmd_extract(
    input: &PathBuf,
    output: &PathBuf,
    text: &str,
    difficulty: Difficulty,
    output_format: OutputFormat,
) -> Result<(), KeytraceCliError> {
    let input_data = read_input(input)?;
    let events = parse_ndjson(&input_data)?;

    if events.is_empty() {
        return Err(KeytraceCliError::NoEvents);
    }

    let clock = Rc::new(ManualClock::new());
    let mut session = CaptureSession::with_clock(
        CaptureConfig::default(),
        Box::new(ReplayClock(Rc::clone(&clock))),
    );
    session.start_attempt(text, difficulty);

    for event in &events {
        clock.set_ms(event.time_ms);
        match event.kind {
            KeyEventKind::Press => session.on_press(&event.key_id),
            KeyEventKind::Release => session.on_release(&event.key_id),
        }
    }

    let features = session.feature_vector()?;
    let output_data = match output_format {
        OutputFormat::Json => serde_json::to_string(&features)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&features)?,
    };

    if output.to_string_lossy() == "-" {
        println!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(input: &PathBuf, json: bool) -> Result<(), KeytraceCliError> {
    let input_data = read_input(input)?;

    let mut total = 0usize;
    let mut errors: Vec<ValidationErrorDetail> = Vec::new();
    let mut last_time: Option<f64> = None;

    for (index, line) in input_data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        total += 1;

        let event: KeyEvent = match serde_json::from_str(trimmed) {
            Ok(event) => event,
            Err(e) => {
                errors.push(ValidationErrorDetail {
                    index,
                    error: format!("invalid event: {}", e),
                });
                continue;
            }
        };

        if event.time_ms < 0.0 {
            errors.push(ValidationErrorDetail {
                index,
                error: format!("negative timestamp: {}", event.time_ms),
            });
        } else if let Some(last) = last_time {
            if event.time_ms < last {
                errors.push(ValidationErrorDetail {
                    index,
                    error: format!(
                        "timestamp went backwards: {} after {}",
                        event.time_ms, last
                    ),
                });
            }
        }
        last_time = Some(event.time_ms.max(last_time.unwrap_or(0.0)));
    }

    let report = ValidationReport {
        total_events: total,
        valid_events: total - errors.len(),
        invalid_events: errors.len(),
        errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total events:   {}", report.total_events);
        println!("Valid events:   {}", report.valid_events);
        println!("Invalid events: {}", report.invalid_events);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - line {}: {}", err.index + 1, err.error);
            }
        }
    }

    if report.invalid_events > 0 {
        Err(KeytraceCliError::ValidationFailed(report.invalid_events))
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType) {
    match schema_type {
        SchemaType::Input => {
            println!("Input: key-event NDJSON, one event per line");
            println!();
            println!("  {{\"key\": \"KeyT\", \"time\": 0.0, \"type\": \"down\"}}");
            println!("  {{\"key\": \"KeyT\", \"time\": 84.2, \"type\": \"up\"}}");
            println!();
            println!("- key: logical key identity (DOM KeyboardEvent.code vocabulary,");
            println!("  e.g. KeyA, Digit3, Space) or a bare printable character");
            println!("- time: milliseconds since attempt start, monotonic");
            println!("- type: \"down\" or \"up\"");
        }
        SchemaType::Output => {
            println!("Output: feature vector for the identification service");
            println!();
            println!("- text: the reference phrase");
            println!("- hold_times: release − press per key, ms");
            println!("- flight_times: press(n) − release(n−1), ms (negative under rollover)");
            println!("- down_down_times: press(n) − press(n−1), ms");
            println!("- ngram_data: digraph/trigraph timing samples keyed by gram");
            println!("- keystroke_sequence: lower-cased character events in recorded order");
        }
    }
}

// Helper functions

fn read_input(input: &PathBuf) -> Result<String, KeytraceCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_ndjson(data: &str) -> Result<Vec<KeyEvent>, KeytraceCliError> {
    let mut events = Vec::new();
    for (index, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let event: KeyEvent = serde_json::from_str(trimmed).map_err(|e| {
            KeytraceCliError::ParseError(format!("line {}: {}", index + 1, e))
        })?;
        events.push(event);
    }
    Ok(events)
}

// Error types

#[derive(Debug)]
enum KeytraceCliError {
    Io(io::Error),
    Capture(CaptureError),
    Json(serde_json::Error),
    NoEvents,
    ValidationFailed(usize),
    ParseError(String),
}

impl From<io::Error> for KeytraceCliError {
    fn from(e: io::Error) -> Self {
        KeytraceCliError::Io(e)
    }
}

impl From<CaptureError> for KeytraceCliError {
    fn from(e: CaptureError) -> Self {
        KeytraceCliError::Capture(e)
    }
}

impl From<serde_json::Error> for KeytraceCliError {
    fn from(e: serde_json::Error) -> Self {
        KeytraceCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<KeytraceCliError> for CliError {
    fn from(e: KeytraceCliError) -> Self {
        match e {
            KeytraceCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            KeytraceCliError::Capture(e) => CliError {
                code: "CAPTURE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("The log may hold too few events for the gate".to_string()),
            },
            KeytraceCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            KeytraceCliError::NoEvents => CliError {
                code: "NO_EVENTS".to_string(),
                message: "No events found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            KeytraceCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} events failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            KeytraceCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format with 'keytrace schema input'".to_string()),
            },
        }
    }
}

#[derive(serde::Serialize)]
struct ValidationReport {
    total_events: usize,
    valid_events: usize,
    invalid_events: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    error: String,
}
