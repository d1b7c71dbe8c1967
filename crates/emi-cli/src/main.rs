mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::compare::CompareArgs;
use commands::loan::{EmiArgs, ScheduleArgs};
use commands::prepay::PrepayArgs;

/// Loan EMI, amortization and prepayment calculations
#[derive(Parser)]
#[command(
    name = "emi",
    version,
    about = "Loan EMI, amortization and prepayment calculations",
    long_about = "A CLI for reducing-balance loan calculations with decimal precision. \
                  Computes EMIs, full amortization schedules, the effect of lump-sum \
                  or recurring prepayments, and ranks competing loan offers."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Path to a JSON or YAML file overriding the default loan limits
    #[arg(long, global = true)]
    limits: Option<String>,

    /// Skip loan size, rate and tenure limits
    #[arg(long, global = true, conflicts_with = "limits")]
    no_limits: bool,

    /// Also write the JSON result to this file
    #[arg(long, global = true)]
    save: Option<String>,

    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the EMI and loan totals
    Emi(EmiArgs),
    /// Generate the month-by-month amortization schedule
    Schedule(ScheduleArgs),
    /// Simulate a lump-sum or recurring extra payment
    Prepay(PrepayArgs),
    /// Compare two or more loan offers
    Compare(CompareArgs),
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

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = match config::load_context(cli.limits.as_deref(), cli.no_limits) {
        Ok(ctx) => ctx,
        Err(e) => fail(e),
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Emi(args) => commands::loan::run_emi(args, &ctx),
        Commands::Schedule(args) => commands::loan::run_schedule(args, &ctx),
        Commands::Prepay(args) => commands::prepay::run_prepay(args, &ctx),
        Commands::Compare(args) => commands::compare::run_compare(args, &ctx),
        Commands::Version => {
            println!("emi {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            if let Some(ref path) = cli.save {
                if let Err(e) = output::json::save_json(path, &value) {
                    fail(e);
                }
            }
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => fail(e),
    }
}

fn fail(e: Box<dyn std::error::Error>) -> ! {
    eprintln!("{}: {}", "error".red().bold(), e);
    process::exit(1);
}

/// Events go to stderr so stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("emi_core=debug,emi_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
