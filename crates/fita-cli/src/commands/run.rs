//! Run and step commands.
//!
//! Both drive an engine over a bound tree and report the running mode,
//! vertex states and acceptance verdicts.

use anyhow::{Context, Result};
use fita_automaton::{AutomatonError, AutomatonEvent, Engine, RunningMode};

use crate::config::Config;
use crate::session::{Session, SessionArgs};

/// Options for `fita run`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Back-reference unrollings after the first pass.
    pub unroll: usize,
    /// Print every published event as a JSON line.
    pub events: bool,
    /// Print the final state of every vertex.
    pub states: bool,
}

/// Run the automaton until it finishes or waits for a continuation.
pub fn execute(config: &Config, args: &SessionArgs, options: &RunOptions) -> Result<()> {
    let mut session = Session::open(config, args, options.events)?;

    let result = if options.unroll > 0 {
        session.engine.run_to_depth(options.unroll)
    } else {
        session.engine.run()
    };
    let mode = result.context("Run failed")?;

    if options.events {
        print_events(&session.drain_events())?;
    }

    print_summary(&session.engine, mode);
    if options.states {
        print_states(&session.engine)?;
    }
    print_verdicts(&session.engine);
    Ok(())
}

/// Take up to `steps` steps, printing each processed batch. With
/// `continue_recursive` set, a paused infinite run is unrolled once more
/// instead of stopping.
pub fn step(
    config: &Config,
    args: &SessionArgs,
    steps: usize,
    continue_recursive: bool,
) -> Result<()> {
    let mut session = Session::open(config, args, true)?;

    for _ in 0..steps {
        let engine = &mut session.engine;
        if engine.running_mode() == RunningMode::Continuing && continue_recursive {
            engine.continue_recursive()?;
        }
        let before = engine.steps();
        let mode = engine.step().context("Step failed")?;
        let taken = engine.steps();
        if taken == before {
            break;
        }

        for event in session.drain_events() {
            if let AutomatonEvent::CurrentVertices { vertices } = event {
                if vertices.is_empty() {
                    continue;
                }
                let ids: Vec<String> = vertices.iter().map(ToString::to_string).collect();
                println!("step {taken:>3}  {mode:<10}  [{}]", ids.join(", "));
            }
        }
    }

    print_summary(&session.engine, session.engine.running_mode());
    print_verdicts(&session.engine);
    Ok(())
}

fn print_events(events: &[AutomatonEvent]) -> Result<()> {
    for event in events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

fn print_summary(engine: &Engine, mode: RunningMode) {
    let automaton = engine.automaton();
    println!(
        "Automaton:  {}{}",
        automaton.type_name(),
        automaton
            .name()
            .map(|name| format!(" ({name})"))
            .unwrap_or_default()
    );
    if let Some(traversal) = engine.traversal_mode() {
        println!("Traversal:  {traversal}");
    }
    println!("Mode:       {mode}");
    println!("Steps:      {}", engine.steps());
    if mode == RunningMode::Continuing {
        println!(
            "Pending:    {} back-reference(s)",
            engine.pending_back_references().len()
        );
    }
}

fn print_states(engine: &Engine) -> Result<()> {
    let Some(tree) = engine.tree() else {
        return Ok(());
    };

    println!();
    println!("{:<6} {:<8} {:<8} state", "vertex", "kind", "label");
    for id in tree.preorder() {
        let kind = tree
            .kind(id)
            .map(|kind| format!("{kind:?}").to_lowercase())
            .unwrap_or_default();
        let label = tree.label(id).unwrap_or_default();
        let state = match tree.full_state(id) {
            Some(state) if !state.is_empty() => serde_json::to_string(state)?,
            _ => "-".to_string(),
        };
        println!("{:<6} {:<8} {:<8} {}", id.to_string(), kind, label, state);
    }
    Ok(())
}

fn print_verdicts(engine: &Engine) {
    println!();
    if let Some(verdict) = verdict(engine.is_accepted()) {
        println!("Accepted:   {verdict}");
    }
    if engine.automaton().is_infinite() {
        if let Some(verdict) = verdict(engine.is_buchi_accepted()) {
            println!("Büchi:      {verdict}");
        }
    }
}

/// `None` when the automaton defines no such acceptance.
fn verdict(result: Result<bool, AutomatonError>) -> Option<String> {
    match result {
        Ok(true) => Some("yes".to_string()),
        Ok(false) => Some("no".to_string()),
        Err(AutomatonError::UndefinedAcceptance { .. }) => None,
        Err(err) => Some(format!("undefined ({err})")),
    }
}
