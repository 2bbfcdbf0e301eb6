//! Loading documents and binding them to an engine.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use anyhow::{Context, Result};
use clap::Args;
use fita_automaton::{
    AutomatonDocument, AutomatonEvent, ChoiceMode, Determinism, Engine, TracingSink,
    TraversalMode,
};
use fita_core::{Tree, TreeDocument};
use tracing::info;

use crate::config::Config;

/// Documents and strategies shared by the commands that drive an engine.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Automaton document (JSON).
    #[arg(short, long)]
    pub automaton: PathBuf,

    /// Tree document (JSON).
    #[arg(short, long)]
    pub tree: PathBuf,

    /// Traversal: dfs, bfs or level. Overrides the automaton document.
    #[arg(long)]
    pub traversal: Option<TraversalMode>,

    /// Choice for non-deterministic automata: first, greatest or random.
    #[arg(long)]
    pub choice: Option<ChoiceMode>,
}

/// An engine bound to a tree. Captured events arrive on `events`; otherwise
/// they go to the log.
pub struct Session {
    pub engine: Engine,
    pub events: Option<Receiver<AutomatonEvent>>,
}

impl Session {
    /// Load both documents and bind them. Strategies are resolved from the
    /// arguments, then the automaton document, then the configuration.
    pub fn open(config: &Config, args: &SessionArgs, capture_events: bool) -> Result<Self> {
        let document = load_automaton(&args.automaton)?;
        let traversal = args
            .traversal
            .or(document.traversal)
            .unwrap_or(config.traversal);
        let choice = args
            .choice
            .or(document.choice)
            .unwrap_or(config.engine.default_choice);

        let automaton = document
            .into_automaton()
            .with_context(|| format!("Invalid automaton in {}", args.automaton.display()))?;
        let tree = load_tree(&args.tree)?;

        let engine = Engine::with_config(automaton, config.engine.clone());
        let (mut engine, events) = if capture_events {
            let (tx, rx) = mpsc::channel();
            (engine.with_sink(tx), Some(rx))
        } else {
            (engine.with_sink(TracingSink), None)
        };
        engine
            .set_traversal(traversal)
            .context("Traversal does not fit the automaton")?;
        if engine.automaton().determinism() == Determinism::NonDeterministic {
            engine.set_choice(choice);
        }
        engine
            .set_tree(tree)
            .with_context(|| format!("Cannot run the automaton on {}", args.tree.display()))?;

        info!(
            automaton = %engine.automaton().kind().abbreviation(),
            traversal = %traversal,
            "session_opened"
        );
        Ok(Self { engine, events })
    }

    /// Events captured since the last drain.
    pub fn drain_events(&self) -> Vec<AutomatonEvent> {
        self.events
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default()
    }
}

pub fn load_automaton(path: &Path) -> Result<AutomatonDocument> {
    AutomatonDocument::load(path)
        .with_context(|| format!("Failed to load automaton from {}", path.display()))
}

pub fn load_tree(path: &Path) -> Result<Tree> {
    TreeDocument::load(path)
        .and_then(TreeDocument::into_tree)
        .with_context(|| format!("Failed to load tree from {}", path.display()))
}
