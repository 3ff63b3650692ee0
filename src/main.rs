// Command-line entry point for srcequiv.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use srcequiv::application::batch::{compare_dirs, BatchOutcome, BatchReport};
use srcequiv::application::dto::{BatchReportDto, ComparisonDto};
use srcequiv::domain::error::AssertionError;
use srcequiv::infrastructure::concurrency::init_thread_pool;
use srcequiv::infrastructure::config::{EquivConfig, OutputFormat};
use srcequiv::infrastructure::loader::load_file;
use srcequiv::infrastructure::SynSourceParser;
use srcequiv::verify_that;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: nearest srcequiv.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that two files have identical bytes
    Contents { actual: PathBuf, expected: PathBuf },

    /// Check that a file's decoded text contains a regex match
    Matches {
        file: PathBuf,
        pattern: String,
        /// Character set label (e.g. utf-8, windows-1252)
        #[arg(long)]
        charset: Option<String>,
    },

    /// Check that two source files are structurally equivalent
    Equivalent { actual: PathBuf, expected: PathBuf },

    /// Compare every source file of two directories
    Batch {
        actual_dir: PathBuf,
        expected_dir: PathBuf,
        /// Worker threads
        #[arg(short, long)]
        jobs: Option<usize>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns whether the assertion held.
fn run(cli: Cli) -> Result<bool> {
    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    let config = EquivConfig::load(cli.config.as_deref(), &cwd)?;
    let format = cli.format.unwrap_or(config.format);

    match cli.command {
        Command::Contents { actual, expected } => {
            let actual = load_file(&actual)?;
            let expected = load_file(&expected)?;
            verdict(verify_that(&actual).has_contents(expected.bytes()))
        }
        Command::Matches {
            file,
            pattern,
            charset,
        } => {
            let file = load_file(&file)?;
            let charset = charset.unwrap_or(config.charset);
            let text = verify_that(&file).contents_as_string_labeled(&charset)?;
            verdict(text.contains_match(&pattern))
        }
        Command::Equivalent { actual, expected } => {
            let actual = load_file(&actual)?;
            let expected = load_file(&expected)?;
            match format {
                OutputFormat::Text => verdict(verify_that(&actual).has_source_equivalent_to(&expected)),
                OutputFormat::Json => {
                    let comparison = verify_that(&actual).compare_with(&expected)?;
                    let dto = ComparisonDto::from(&comparison);
                    println!("{}", serde_json::to_string_pretty(&dto)?);
                    Ok(dto.equivalent)
                }
            }
        }
        Command::Batch {
            actual_dir,
            expected_dir,
            jobs,
        } => {
            init_thread_pool(jobs.or(config.jobs))?;
            let report = compare_dirs(&SynSourceParser, &actual_dir, &expected_dir, &config.extensions)?;
            match format {
                OutputFormat::Text => print_batch(&report),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&BatchReportDto::from(&report))?)
                }
            }
            Ok(report.is_success())
        }
    }
}

/// Print an assertion failure and turn it into a verdict; other errors propagate.
fn verdict(outcome: Result<(), AssertionError>) -> Result<bool> {
    match outcome {
        Ok(()) => Ok(true),
        Err(AssertionError::Failed(failure)) => {
            println!("{}", failure);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_batch(report: &BatchReport) {
    for entry in &report.entries {
        let path = entry.path.display();
        match &entry.outcome {
            BatchOutcome::Equivalent => println!("ok       {}", path),
            BatchOutcome::Different(message) => {
                println!("DIFFERS  {}", path);
                print_indented(message);
            }
            BatchOutcome::MissingActual => println!("MISSING  {} (no actual file)", path),
            BatchOutcome::MissingExpected => println!("MISSING  {} (no expected file)", path),
            BatchOutcome::Error(message) => println!("ERROR    {}: {}", path, message),
        }
    }
    println!(
        "\n{} equivalent, {} failed",
        report.equivalent_count(),
        report.failed_count()
    );
}

fn print_indented(message: &str) {
    for line in message.lines() {
        println!("    {}", line);
    }
}
