//! Integration tests for the fita CLI.
//!
//! Every test writes its documents into a temporary directory and points
//! `FITA_CONFIG` there, so no user configuration leaks in.
//!
//! Run with: `cargo test --package fita-cli --test cli_integration`

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const CYCLE: &str = r#"{
    "name": "cycle",
    "direction": "top_down",
    "alphabet": ["0", "1"],
    "variables": [{ "id": 1, "values": ["A", "B", "C"], "init": "A" }],
    "transitions": [
        { "var": 1, "value": "A", "label": "0", "left": "B", "right": "C" },
        { "var": 1, "value": "A", "label": "1", "left": "A", "right": "A" },
        { "var": 1, "value": "B", "label": "0", "left": "C", "right": "A" },
        { "var": 1, "value": "B", "label": "1", "left": "B", "right": "B" },
        { "var": 1, "value": "C", "label": "0", "left": "A", "right": "B" },
        { "var": 1, "value": "C", "label": "1", "left": "C", "right": "C" }
    ],
    "accepting": [{ "1": { "value": "*", "include": true } }],
    "traversal": "dfs"
}"#;

const CYCLE_INFINITE: &str = r#"{
    "direction": "top_down",
    "infinite": true,
    "alphabet": ["0", "1"],
    "variables": [{ "id": 1, "values": ["A", "B", "C"], "init": "A" }],
    "transitions": [
        { "var": 1, "value": "A", "label": "0", "left": "B", "right": "C" },
        { "var": 1, "value": "B", "label": "0", "left": "C", "right": "A" },
        { "var": 1, "value": "C", "label": "0", "left": "A", "right": "B" },
        { "var": 1, "value": "*", "label": "1", "left": "=", "right": "=" }
    ],
    "buchi_accepting": [{ "1": { "value": "A", "include": true } }]
}"#;

const ANY_ONE: &str = r#"{
    "direction": "bottom_up",
    "alphabet": ["0", "1"],
    "variables": [{ "id": 1, "values": ["N", "Y"], "init": "N" }],
    "transitions": [
        { "var": 1, "left": "*", "right": "*", "label": "1", "result": "Y" },
        { "var": 1, "left": "Y", "right": "*", "label": "*", "result": "Y" },
        { "var": 1, "left": "*", "right": "Y", "label": "*", "result": "Y" },
        { "var": 1, "left": "N", "right": "N", "label": "0", "result": "N" }
    ],
    "accepting": [{ "1": { "value": "Y", "include": true } }]
}"#;

const SMALL_TREE: &str = r#"{
    "kind": "node", "label": "0",
    "left":  { "kind": "node", "label": "0",
               "left":  { "kind": "node", "label": "1" },
               "right": { "kind": "node", "label": "0" } },
    "right": { "kind": "node", "label": "0" }
}"#;

const LOOP_TREE: &str = r#"{
    "kind": "node", "label": "0",
    "left": { "kind": "node", "label": "1" },
    "right": { "kind": "repeat", "id": "loop", "label": "0",
               "left": { "kind": "rec", "anchor": "loop" },
               "right": { "kind": "node", "label": "0" } }
}"#;

/// Temporary directory holding documents and an isolated config path.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config").join("config.json")
    }

    fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_fita"));
        command
            .current_dir(self.dir.path())
            .env("FITA_CONFIG", self.config_path())
            .env_remove("FITA_MAX_STEPS")
            .env_remove("FITA_MAX_CONTINUATIONS")
            .env_remove("FITA_CHOICE")
            .env_remove("FITA_TRAVERSAL");
        command
    }

    /// Run fita with the given arguments.
    fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .output()
            .expect("Failed to execute fita command")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ============================================================================
// Run
// ============================================================================

#[test]
fn test_run_finite_top_down() {
    let ws = Workspace::new();
    let automaton = ws.write("cycle.json", CYCLE);
    let tree = ws.write("tree.json", SMALL_TREE);

    let output = ws.run(&["run", "-a", arg(&automaton), "-t", arg(&tree)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Top-down deterministic finite tree automaton (cycle)"));
    assert!(out.contains("Traversal:  dfs"));
    assert!(out.contains("Mode:       FINISHED"));
    assert!(out.contains("Steps:      5"));
    assert!(out.contains("Accepted:   yes"));
}

#[test]
fn test_run_prints_states() {
    let ws = Workspace::new();
    let automaton = ws.write("cycle.json", CYCLE);
    let tree = ws.write("tree.json", SMALL_TREE);

    let output = ws.run(&["run", "-a", arg(&automaton), "-t", arg(&tree), "--states"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    // Root keeps the initial value; its children follow (A, 0) -> (B, C).
    assert!(out.contains(r#"{"1":"A"}"#));
    assert!(out.contains(r#"{"1":"B"}"#));
    assert!(out.contains(r#"{"1":"C"}"#));
    assert!(out.contains("v0"));
}

#[test]
fn test_run_prints_events() {
    let ws = Workspace::new();
    let automaton = ws.write("any_one.json", ANY_ONE);
    let tree = ws.write("tree.json", SMALL_TREE);

    let output = ws.run(&["run", "-a", arg(&automaton), "-t", arg(&tree), "--events"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains(r#""event":"bottom_up_transition""#));
    assert!(out.contains(r#""event":"current_vertices""#));
    assert!(out.contains(r#""event":"running_mode","mode":"FINISHED""#));
    assert!(out.contains("Accepted:   yes"));
}

#[test]
fn test_bottom_up_rejects_dfs() {
    let ws = Workspace::new();
    let automaton = ws.write("any_one.json", ANY_ONE);
    let tree = ws.write("tree.json", SMALL_TREE);

    let output = ws.run(&[
        "run",
        "-a",
        arg(&automaton),
        "-t",
        arg(&tree),
        "--traversal",
        "dfs",
    ]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Traversal does not fit the automaton"));
}

#[test]
fn test_run_infinite_with_unrolling() {
    let ws = Workspace::new();
    let automaton = ws.write("infinite.json", CYCLE_INFINITE);
    let tree = ws.write("loop.json", LOOP_TREE);

    let output = ws.run(&[
        "run",
        "-a",
        arg(&automaton),
        "-t",
        arg(&tree),
        "--unroll",
        "3",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Top-down deterministic infinite tree automaton"));
    assert!(out.contains("Mode:       CONTINUING"));
    assert!(out.contains("Pending:    1 back-reference(s)"));
    assert!(out.contains("Büchi:      yes"));
}

#[test]
fn test_finite_automaton_on_infinite_tree() {
    let ws = Workspace::new();
    let automaton = ws.write("cycle.json", CYCLE);
    let tree = ws.write("loop.json", LOOP_TREE);

    let output = ws.run(&["run", "-a", arg(&automaton), "-t", arg(&tree)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Cannot run the automaton"));
}

#[test]
fn test_step_limit_from_environment() {
    let ws = Workspace::new();
    let automaton = ws.write("cycle.json", CYCLE);
    let tree = ws.write("tree.json", SMALL_TREE);

    let output = ws
        .command()
        .env("FITA_MAX_STEPS", "2")
        .args(["run", "-a", arg(&automaton), "-t", arg(&tree)])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("step limit of 2"));
}

#[test]
fn test_max_steps_flag_overrides_environment() {
    let ws = Workspace::new();
    let automaton = ws.write("cycle.json", CYCLE);
    let tree = ws.write("tree.json", SMALL_TREE);

    let output = ws
        .command()
        .env("FITA_MAX_STEPS", "2")
        .args([
            "run",
            "-a",
            arg(&automaton),
            "-t",
            arg(&tree),
            "--max-steps",
            "100",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
}

// ============================================================================
// Step
// ============================================================================

#[test]
fn test_step_prints_batches() {
    let ws = Workspace::new();
    let automaton = ws.write("cycle.json", CYCLE);
    let tree = ws.write("tree.json", SMALL_TREE);

    let output = ws.run(&[
        "step",
        "-a",
        arg(&automaton),
        "-t",
        arg(&tree),
        "-n",
        "2",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("step   1"));
    assert!(out.contains("step   2"));
    assert!(!out.contains("step   3"));
    assert!(out.contains("Mode:       RUNNING"));
    // Depth first: root, then its left child; no leaf is reached yet.
    assert!(out.contains("Accepted:   undefined"));
}

#[test]
fn test_step_stops_when_finished() {
    let ws = Workspace::new();
    let automaton = ws.write("cycle.json", CYCLE);
    let tree = ws.write("tree.json", SMALL_TREE);

    let output = ws.run(&["step", "-a", arg(&automaton), "-t", arg(&tree), "-n", "50"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("step   5"));
    assert!(!out.contains("step   6"));
    assert!(out.contains("Mode:       FINISHED"));
}

#[test]
fn test_step_continues_through_back_reference() {
    let ws = Workspace::new();
    let automaton = ws.write("infinite.json", CYCLE_INFINITE);
    let tree = ws.write("loop.json", LOOP_TREE);

    let output = ws.run(&[
        "step",
        "-a",
        arg(&automaton),
        "-t",
        arg(&tree),
        "-n",
        "8",
        "--continue",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("step   8"));
}

// ============================================================================
// Validate and show
// ============================================================================

#[test]
fn test_validate_reports_kind() {
    let ws = Workspace::new();
    let automaton = ws.write("cycle.json", CYCLE);
    let tree = ws.write("tree.json", SMALL_TREE);

    let output = ws.run(&["validate", "-a", arg(&automaton), "-t", arg(&tree)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("TopDownDFTA"));
    assert!(out.contains("Transitions: 6 (top-down)"));
    assert!(out.contains("Tree with 5 vertices"));
}

#[test]
fn test_validate_rejects_unknown_label() {
    let ws = Workspace::new();
    let automaton = ws.write("bad.json", &CYCLE.replace(r#""label": "1""#, r#""label": "2""#));

    let output = ws.run(&["validate", "-a", arg(&automaton)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid automaton"));
}

#[test]
fn test_validate_rejects_infinite_tree_for_finite_automaton() {
    let ws = Workspace::new();
    let automaton = ws.write("cycle.json", CYCLE);
    let tree = ws.write("loop.json", LOOP_TREE);

    let output = ws.run(&["validate", "-a", arg(&automaton), "-t", arg(&tree)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("infinite"));
}

#[test]
fn test_show_normalizes_tree() {
    let ws = Workspace::new();
    let tree = ws.write("loop.json", LOOP_TREE);

    let output = ws.run(&["show", arg(&tree)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains(r#""kind": "repeat""#));
    assert!(out.contains(r#""kind": "rec""#));
    // Anchors are renamed after their vertex.
    assert!(!out.contains(r#""loop""#));
}

#[test]
fn test_show_missing_file() {
    let ws = Workspace::new();
    let output = ws.run(&["show", "missing.json"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to load tree"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_path() {
    let ws = Workspace::new();
    let output = ws.run(&["config", "path"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), ws.config_path().display().to_string());
}

#[test]
fn test_config_reset_then_show() {
    let ws = Workspace::new();

    let output = ws.run(&["config", "reset"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(ws.config_path().exists());

    let output = ws.run(&["config", "show"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Max Steps:           10000"));
    assert!(out.contains("Default Choice:      first"));
}

#[test]
fn test_config_file_and_environment() {
    let ws = Workspace::new();
    fs::create_dir_all(ws.config_path().parent().unwrap()).unwrap();
    fs::write(
        ws.config_path(),
        r#"{ "engine": { "max_steps": 42 }, "traversal": "level" }"#,
    )
    .unwrap();

    let output = ws
        .command()
        .env("FITA_CHOICE", "greatest")
        .args(["config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Max Steps:           42"));
    assert!(out.contains("Default Choice:      greatest"));
    assert!(out.contains("Default Traversal:   level"));
}

#[test]
fn test_quiet_mode() {
    let ws = Workspace::new();
    let automaton = ws.write("cycle.json", CYCLE);
    let tree = ws.write("tree.json", SMALL_TREE);

    let output = ws.run(&["--quiet", "run", "-a", arg(&automaton), "-t", arg(&tree)]);
    assert!(output.status.success());
    assert!(stderr(&output).is_empty());
}
