//! Fernt CLI - command-line front end for the Fern interpreter.
//!
//! Provides an interactive REPL, a script runner, a parse-only mode
//! for inspecting expanded programs, and one-shot expression
//! evaluation. Uses clap for argument parsing and dispatches to the
//! command handlers.

mod commands;
mod config;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{run_eval, run_parse, run_repl, run_script};
use config::Config;
use error::{FerntError, Result};

/// Fernt - run and inspect Fern programs
#[derive(Parser, Debug)]
#[command(name = "fernt")]
#[command(author = "Fern Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run and inspect Fern programs", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, env = "FERNT_VERBOSE")]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "FERNT_CONFIG")]
    config: Option<PathBuf>,

    /// Disable color output
    #[arg(long, global = true, env = "FERNT_NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands; the default is the REPL.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive session
    Repl,

    /// Evaluate a script file and print its result
    Run {
        /// Script path
        path: PathBuf,
    },

    /// Read and expand a file without evaluating it
    Parse {
        /// Script path
        path: PathBuf,
    },

    /// Evaluate a single expression and print its result
    Eval {
        /// Program text
        text: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(cli.verbose || config.verbose, cli.no_color)?;

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => run_repl(&config)?,
        Commands::Run { path } => run_script(&path, &config)?,
        Commands::Parse { path } => run_parse(&path, &config)?,
        Commands::Eval { text } => run_eval(&text, &config)?,
    }
    Ok(())
}

/// Initialize the tracing subscriber (which also captures `log`
/// records from the interpreter crate).
fn init_logging(verbose: bool, no_color: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let subscriber = fmt::layer()
        .with_ansi(!no_color)
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .map_err(|e| FerntError::Config(format!("failed to initialize logging: {e}")))?;

    Ok(())
}

fn load_config(config_path: Option<&std::path::Path>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
}
