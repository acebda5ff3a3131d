mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::Value;
use std::process;
use tracing::warn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use commands::batch::BatchArgs;
use commands::display::{ClassifyArgs, FormatArgs};
use commands::roic::CalculateArgs;
use commands::scenarios::SensitivityArgs;

/// Return on invested capital calculations
#[derive(Parser)]
#[command(
    name = "roic",
    version,
    about = "Return on invested capital calculations",
    long_about = "Compute ROIC for a company under four methods (basic, detailed, asset, \
                  lease-adjusted) with decimal precision. Supports single records, batches \
                  of filed statements, sensitivity grids and display formatting."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate ROIC for one company and fiscal year
    Calculate(CalculateArgs),
    /// Calculate ROIC for a file of financial statements
    Batch(BatchArgs),
    /// Sweep tax rate and invested capital adjustment for one method
    Sensitivity(SensitivityArgs),
    /// Place a ROIC value in its evaluation band
    Classify(ClassifyArgs),
    /// Format a ROIC ratio or a monetary amount for display
    Format(FormatArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Filter directive for this binary's events, e.g. `roic=warn`.
fn log_directive(level: &str) -> String {
    format!("{}={level}", env!("CARGO_CRATE_NAME"))
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(log_directive("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_directive("warn")))
    };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .init();
}

/// Surface envelope warnings on stderr so they are visible in every output mode.
fn log_warnings(value: &Value) {
    if let Some(Value::Array(warnings)) = value.get("warnings") {
        for w in warnings.iter().filter_map(Value::as_str) {
            warn!("{w}");
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::roic::run_calculate(args),
        Commands::Batch(args) => commands::batch::run_batch(args),
        Commands::Sensitivity(args) => commands::scenarios::run_sensitivity(args),
        Commands::Classify(args) => commands::display::run_classify(args),
        Commands::Format(args) => commands::display::run_format(args),
        Commands::Version => {
            println!("roic {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            log_warnings(&value);
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
