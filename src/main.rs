//! Kolea - Main entrypoint.
//!
//! Loads configuration, initializes logging and runs filter commands from the
//! command line or from a script.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use kolea_lib::config::{ConfigLoader, KoleaConfig, LogConfig, ENV_PREFIX};
use kolea_lib::data_structures::kolea_cuckoo_filter::{
    JsonLinesObserver, Key, KoleaCuckooFilter, TracingObserver,
};
use kolea_lib::error::{report_error, ErrorContext, KoleaError, KoleaResult};
use kolea_lib::runner::{CommandOutcome, CommandRunner, FilterCommand};
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Command line arguments for Kolea.
#[derive(Parser, Debug)]
#[clap(name = "kolea", version, author, about)]
struct Args {
    /// Path to configuration file
    #[clap(short, long, value_parser, global = true)]
    config: Option<PathBuf>,

    /// Emit operation reports as JSON lines on stdout
    #[clap(long, global = true)]
    json: bool,

    /// Command to execute
    #[clap(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Run a command script (reads stdin when no file is given)
    Run {
        /// Path to the script
        #[clap(short, long, value_parser)]
        script: Option<PathBuf>,
    },

    /// Insert keys into a fresh filter and print the table
    Insert {
        /// Keys to insert
        #[clap(required = true, allow_negative_numbers = true)]
        keys: Vec<Key>,
    },

    /// Look keys up in a fresh filter
    Lookup {
        /// Keys to look up
        #[clap(required = true, allow_negative_numbers = true)]
        keys: Vec<Key>,

        /// Keys inserted before the lookups
        #[clap(long, num_args = 1.., allow_negative_numbers = true)]
        preload: Vec<Key>,
    },

    /// Delete keys from a fresh filter
    Delete {
        /// Keys to delete
        #[clap(required = true, allow_negative_numbers = true)]
        keys: Vec<Key>,

        /// Keys inserted before the deletions
        #[clap(long, num_args = 1.., allow_negative_numbers = true)]
        preload: Vec<Key>,
    },

    /// Validate the configuration file
    Validate,

    /// Generate a default configuration file
    GenConfig {
        /// Path to output configuration file
        #[clap(short, long, value_parser)]
        output: PathBuf,
    },
}

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(log: &LogConfig) -> KoleaResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default());

    let result = if log.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_file(log.source_location)
                    .with_line_number(log.source_location),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(io::stderr)
                    .with_file(log.source_location)
                    .with_line_number(log.source_location)
                    .with_thread_names(true),
            )
            .try_init()
    };

    result.map_err(|e| KoleaError::Custom(format!("Failed to set global tracing subscriber: {e}")))
}

/// Builds a filter from the configuration, preloads keys, then attaches the report sink.
fn build_filter(config: &KoleaConfig, json: bool, preload: &[Key]) -> KoleaResult<KoleaCuckooFilter> {
    let mut filter = KoleaCuckooFilter::with_config(config.filter.to_filter_config())?;
    for &key in preload {
        filter.insert(key)?;
    }

    if json {
        filter.add_observer(Box::new(JsonLinesObserver::new(io::stdout())));
    } else {
        filter.add_observer(Box::new(TracingObserver));
    }
    Ok(filter)
}

/// Runs commands and prints their outcomes unless reports go to stdout.
fn execute(
    config: &KoleaConfig,
    json: bool,
    preload: &[Key],
    commands: Vec<FilterCommand>,
) -> KoleaResult<()> {
    let mut runner = CommandRunner::new(build_filter(config, json, preload)?);
    for command in commands {
        let outcome = runner.run(command)?;
        if !json {
            println!("{outcome}");
        }
    }
    info!(
        live_keys = runner.filter().len(),
        bucket_count = runner.filter().bucket_count(),
        "Commands complete"
    );
    Ok(())
}

fn read_script(path: Option<&PathBuf>) -> KoleaResult<String> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut script = String::new();
            io::stdin().read_to_string(&mut script)?;
            Ok(script)
        }
    }
}

fn dispatch(args: Args, config: &KoleaConfig) -> KoleaResult<()> {
    match args.command {
        Command::Run { script } => {
            let script = read_script(script.as_ref())?;
            let commands = kolea_lib::runner::parse_script(&script)?;
            info!(commands = commands.len(), "Running script");
            execute(config, args.json, &[], commands)
        }
        Command::Insert { keys } => {
            let mut commands: Vec<_> = keys.into_iter().map(FilterCommand::Insert).collect();
            commands.push(FilterCommand::Show);
            execute(config, args.json, &[], commands)
        }
        Command::Lookup { keys, preload } => {
            let commands = keys.into_iter().map(FilterCommand::Lookup).collect();
            execute(config, args.json, &preload, commands)
        }
        Command::Delete { keys, preload } => {
            let commands = keys.into_iter().map(FilterCommand::Delete).collect();
            execute(config, args.json, &preload, commands)
        }
        Command::Validate => {
            info!("Configuration validated successfully");
            let outcome = CommandOutcome::Table(build_filter(config, false, &[])?.snapshot());
            println!("{outcome}");
            Ok(())
        }
        Command::GenConfig { output } => {
            info!("Generating default configuration");
            let default_config = KoleaConfig::default();

            // Create parent directories if they don't exist
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let rendered = default_config.render(&output)?;
            std::fs::write(&output, rendered)?;

            info!("Default configuration written to {:?}", output);
            Ok(())
        }
    }
}

/// Main entry point for the application.
fn main() {
    let args = Args::parse();

    let loaded = ConfigLoader::new(args.config.as_deref(), ENV_PREFIX).load();
    let log_config = loaded
        .as_ref()
        .map(|config| config.log.clone())
        .unwrap_or_default();
    if let Err(e) = init_logging(&log_config) {
        eprintln!("{e}");
    }
    kolea_lib::init();

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            report_error(ErrorContext::new(e.into(), "config").with_span_trace());
            process::exit(1);
        }
    };

    if let Err(e) = dispatch(args, &config) {
        report_error(ErrorContext::new(e, "cli").with_span_trace());
        process::exit(1);
    }
}
