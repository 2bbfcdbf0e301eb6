//! fita CLI - run tree automata over binary trees step by step.
//!
//! Automata and trees are read from JSON documents. Infinite trees are
//! written with repeat anchors and back-references.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

mod commands;
mod config;
mod session;

use commands::{config as config_cmd, inspect, run};
use config::Config;
use session::SessionArgs;

/// fita - finite and infinite tree automata.
///
/// Run `fita run -a automaton.json -t tree.json` to run an automaton over a
/// tree and check acceptance.
#[derive(Parser, Debug)]
#[command(
    name = "fita",
    author,
    version,
    about = "fita: run tree automata step by step",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the automaton until it finishes or reaches a back-reference.
    Run {
        #[command(flatten)]
        session: SessionArgs,

        /// Unroll back-references up to this many times (infinite automata).
        #[arg(short, long, default_value_t = 0)]
        unroll: usize,

        /// Maximum steps for a single run. Overrides the configuration.
        #[arg(long)]
        max_steps: Option<usize>,

        /// Print every engine event as a JSON line.
        #[arg(long)]
        events: bool,

        /// Print the final state of every vertex.
        #[arg(long)]
        states: bool,
    },

    /// Take a number of steps, printing each processed batch.
    Step {
        #[command(flatten)]
        session: SessionArgs,

        /// Number of steps to take.
        #[arg(short = 'n', long, default_value_t = 1)]
        steps: usize,

        /// Unroll back-references when the run pauses on them.
        #[arg(long = "continue")]
        continue_recursive: bool,
    },

    /// Validate an automaton document, and a tree against it.
    Validate {
        /// Automaton document (JSON).
        #[arg(short, long)]
        automaton: PathBuf,

        /// Tree document (JSON).
        #[arg(short, long)]
        tree: Option<PathBuf>,
    },

    /// Print a tree document in normalized form.
    Show {
        /// Tree document (JSON).
        tree: PathBuf,
    },

    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration.
    Show,

    /// Reset configuration to defaults.
    Reset,

    /// Show path to config file.
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load()?;

    match cli.command {
        Commands::Run {
            session,
            unroll,
            max_steps,
            events,
            states,
        } => {
            if let Some(max_steps) = max_steps {
                config.engine.max_steps = max_steps;
            }
            let options = run::RunOptions {
                unroll,
                events,
                states,
            };
            run::execute(&config, &session, &options)?;
        }

        Commands::Step {
            session,
            steps,
            continue_recursive,
        } => {
            run::step(&config, &session, steps, continue_recursive)?;
        }

        Commands::Validate { automaton, tree } => {
            inspect::validate(&automaton, tree.as_deref())?;
        }

        Commands::Show { tree } => {
            inspect::show(&tree)?;
        }

        Commands::Config(config_cmd_inner) => match config_cmd_inner {
            ConfigCommands::Show => config_cmd::show(&config)?,
            ConfigCommands::Reset => config_cmd::reset()?,
            ConfigCommands::Path => config_cmd::path()?,
        },
    }

    Ok(())
}
