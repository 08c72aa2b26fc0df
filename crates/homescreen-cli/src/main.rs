#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use homescreen_core::config::resolve_config;
use homescreen_core::lookup::LookupError;
use homescreen_core::{EnrichError, ErrorCode, SnapshotError, timing};
use output::OutputMode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "hs: resolve user data for home screen TODO items",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit command timing report to stderr.
    #[arg(long, global = true)]
    timing: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Enrich a home screen snapshot",
        long_about = "Decode a home screen snapshot and fill in the phone number or email \
                      each data-carrying TODO item needs.",
        after_help = "EXAMPLES:\n    # Enrich against configured directory files\n    hs enrich home.json\n\n    # Point at explicit directory files\n    hs enrich home.json --phones phones.json --emails emails.json\n\n    # Rewrite the snapshot with resolved values\n    hs enrich home.json --in-place\n\n    # Emit the enriched snapshot as JSON\n    hs enrich home.json --json"
    )]
    Enrich(cmd::enrich::EnrichArgs),

    #[command(
        about = "Show task prompts for a snapshot",
        long_about = "Enrich a snapshot, then render the prompt text and actions of every \
                      TODO item that resolved its user data.",
        after_help = "EXAMPLES:\n    # Show prompts\n    hs prompts home.json\n\n    # Emit machine-readable output\n    hs prompts home.json --json"
    )]
    Prompts(cmd::prompts::PromptsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("HS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "homescreen=debug,hs=debug,info"
        } else {
            "homescreen=info,warn"
        })
    });

    let format = env::var("HS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Pick the most specific error code found along the error chain.
fn error_code(err: &anyhow::Error) -> ErrorCode {
    for cause in err.chain() {
        if let Some(snapshot) = cause.downcast_ref::<SnapshotError>() {
            return snapshot.code();
        }
        if let Some(enrich) = cause.downcast_ref::<EnrichError>() {
            return enrich.code();
        }
        if let Some(lookup) = cause.downcast_ref::<LookupError>() {
            return lookup.code();
        }
        if cause.downcast_ref::<toml::de::Error>().is_some() {
            return ErrorCode::ConfigParseError;
        }
        if cause.downcast_ref::<serde_json::Error>().is_some() {
            return ErrorCode::SnapshotParseFailed;
        }
    }
    ErrorCode::InternalUnexpected
}

fn report_error(err: &anyhow::Error, json: bool) {
    let code = error_code(err);
    if json {
        let payload = serde_json::json!({
            "error": {
                "code": code.code(),
                "message": format!("{err:#}"),
                "hint": code.hint(),
            }
        });
        eprintln!("{payload}");
        return;
    }

    eprintln!("error[{code}]: {err:#}");
    if let Some(hint) = code.hint() {
        eprintln!("  hint: {hint}");
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let project_root = env::current_dir()?;
    let config = resolve_config(&project_root, cli.json)?;

    let timing_enabled =
        cli.timing || timing::timing_enabled_from_env() || config.project.enrich.timing;
    timing::set_timing_enabled(timing_enabled);
    timing::clear_timings();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = OutputMode::from_resolved(&config.resolved_output);
    debug!(?output, root = %project_root.display(), "resolved output mode");

    let command_result = match &cli.command {
        Commands::Enrich(args) => timing::timed("cmd.enrich", || {
            cmd::enrich::run_enrich(args, output, &config.project, &project_root)
        }),
        Commands::Prompts(args) => timing::timed("cmd.prompts", || {
            cmd::prompts::run_prompts(args, output, &config.project, &project_root)
        }),
    };

    if timing_enabled {
        let report = timing::collect_report();
        if report.is_empty() {
            eprintln!("timing report: no samples recorded");
        } else {
            eprintln!("timing report:");
            eprintln!("{}", report.display_table());
            eprintln!("timing report (json):");
            eprintln!("{}", serde_json::to_string_pretty(&report.to_json())?);
        }
    }

    command_result
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, cli.json);
            ExitCode::FAILURE
        }
    }
}
