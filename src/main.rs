use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use civicpulse::cli::commands::{self, ReportOptions};
use civicpulse::cli::runtime;
use civicpulse::constants::report;
use civicpulse::{PulseError, ReportFormat, TimeBucket};

#[derive(Parser)]
#[command(name = "civicpulse")]
#[command(
    version,
    about = "Analyze resident feedback and produce an executive report"
)]
struct Cli {
    #[arg(long, short, default_value = report::DEFAULT_INPUT, help = "Feedback file or glob pattern (.csv, .json, .yaml)")]
    input: String,

    #[arg(long, short, help = "Output directory for the report")]
    output: Option<PathBuf>,

    #[arg(long, short, help = "Configuration file (TOML)")]
    config: Option<PathBuf>,

    #[arg(long, short, help = "Report format: markdown, json, both")]
    format: Option<ReportFormat>,

    #[arg(long, help = "Trend granularity: week, month")]
    time_bucket: Option<TimeBucket>,

    #[arg(long, help = "Maximum number of key findings")]
    top_k: Option<usize>,

    #[arg(long = "dry-run", help = "Analyze and print the summary without writing files")]
    dry_run: bool,

    #[arg(long, conflicts_with = "quiet")]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mcivicpulse encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<PulseError>() {
                Some(err) => eprintln!("\x1b[31mError [{}]:\x1b[0m {}", err.stage(), err),
                None => eprintln!("\x1b[31mError:\x1b[0m {}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let options = ReportOptions {
        input: cli.input,
        output: cli.output,
        config: cli.config,
        format: cli.format,
        time_bucket: cli.time_bucket,
        top_k: cli.top_k,
        dry_run: cli.dry_run,
        quiet: cli.quiet,
    };

    runtime::block_on(commands::run(options))??;

    Ok(())
}
