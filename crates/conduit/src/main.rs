//! Conduit - automation registry inspector
//!
//! Main entry point for the Conduit CLI.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use conduit_config::{ConduitConfig, LoggingSection};

mod commands;

use commands::{catalog, check, context, convert, fire, path};

/// Environment variable overriding the console log filter.
const LOG_ENV: &str = "CONDUIT_LOG";

const VERBOSE_FILTER: &str =
    "conduit=debug,conduit_automation=debug,conduit_integrations=debug,conduit_config=debug,info";

const FILE_FILTER: &str =
    "conduit=trace,conduit_automation=trace,conduit_integrations=trace,conduit_config=trace,info";

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Conduit - inspect and exercise the automation registry
#[derive(Parser)]
#[command(name = "conduit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file to use instead of discovery
    #[arg(long, global = true, env = "CONDUIT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List registered subjects, triggers, transformers and context factories
    Catalog(catalog::CatalogArgs),

    /// Show the transformer chain between two subject kinds
    Path(path::PathArgs),

    /// Extract the subject a trigger emits for an event payload
    Fire(fire::FireArgs),

    /// Convert subject arguments from one kind to another
    Convert(convert::ConvertArgs),

    /// Evaluate context factories in a fresh scope
    Context(context::ContextArgs),

    /// Boot the registry and report its integrity
    Check(check::CheckArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, warnings) = load_config(cli.config.as_deref())?;
    let _guard = init_tracing(cli.verbose, &config.logging());
    for warning in &warnings {
        warn!("{}", warning);
    }

    let ctx = commands::Context {
        config,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Catalog(args) => catalog::run(args, &ctx),
        Commands::Path(args) => path::run(args, &ctx),
        Commands::Fire(args) => fire::run(args, &ctx),
        Commands::Convert(args) => convert::run(args, &ctx),
        Commands::Context(args) => context::run(args, &ctx),
        Commands::Check(args) => check::run(args, &ctx),
    }
}

/// Load an explicit config file, or discover and merge the config layers.
fn load_config(explicit: Option<&std::path::Path>) -> Result<(ConduitConfig, Vec<String>)> {
    match explicit {
        Some(path) => {
            let config = conduit_config::load_config_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            Ok((config, Vec::new()))
        }
        None => {
            let loaded = conduit_config::load_config(None).context("failed to load config")?;
            Ok((loaded.config, loaded.warnings))
        }
    }
}

/// Console logging on stderr, plus a daily-rolling JSON file when
/// `logging.file_dir` is set. The returned guard flushes the file on drop.
fn init_tracing(verbose: bool, logging: &LoggingSection) -> Option<WorkerGuard> {
    use tracing_subscriber::prelude::*;

    let console_filter = || match std::env::var(LOG_ENV) {
        Ok(directives) if !directives.is_empty() => EnvFilter::new(directives),
        _ if verbose => EnvFilter::new(VERBOSE_FILTER),
        _ => EnvFilter::new(&logging.level),
    };

    let (console_text, console_json) = if logging.json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter());
        (None, Some(layer))
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_filter(console_filter());
        (Some(layer), None)
    };

    let (file_layer, guard) = match &logging.file_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "conduit.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new(FILE_FILTER));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_text)
        .with(console_json)
        .with(file_layer)
        .init();

    guard
}
