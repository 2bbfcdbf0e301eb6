//! CLI configuration management.
//!
//! Values come from the config file, then environment variables (also read
//! from `.env`), then command-line arguments, each overriding the previous.

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use fita_automaton::{ChoiceMode, EngineConfig, TraversalMode};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application-wide configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine bounds and defaults.
    pub engine: EngineConfig,

    /// Traversal used when neither the command line nor the automaton
    /// document names one.
    pub traversal: TraversalMode,
}

impl Config {
    /// Load configuration from the config file and environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present (silently ignore if missing)
        let _ = dotenvy::dotenv();

        let mut config = match Self::config_file_path() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config from {}", path.display()))?;
                serde_json::from_str(&contents).with_context(|| "Failed to parse config file")?
            }
            _ => Self::default(),
        };

        if let Ok(max_steps) = std::env::var("FITA_MAX_STEPS") {
            match max_steps.parse() {
                Ok(value) => config.engine.max_steps = value,
                Err(_) => warn!(value = %max_steps, "ignoring invalid FITA_MAX_STEPS"),
            }
        }
        if let Ok(max_continuations) = std::env::var("FITA_MAX_CONTINUATIONS") {
            match max_continuations.parse() {
                Ok(value) => config.engine.max_continuations = value,
                Err(_) => warn!(value = %max_continuations, "ignoring invalid FITA_MAX_CONTINUATIONS"),
            }
        }
        if let Ok(choice) = std::env::var("FITA_CHOICE") {
            match choice.parse::<ChoiceMode>() {
                Ok(mode) => config.engine.default_choice = mode,
                Err(err) => warn!(error = %err, "ignoring invalid FITA_CHOICE"),
            }
        }
        if let Ok(traversal) = std::env::var("FITA_TRAVERSAL") {
            match traversal.parse::<TraversalMode>() {
                Ok(mode) => config.traversal = mode,
                Err(err) => warn!(error = %err, "ignoring invalid FITA_TRAVERSAL"),
            }
        }

        Ok(config)
    }

    /// Save current configuration to the config file.
    pub fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::config_file_path() {
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
            let contents = serde_json::to_string_pretty(self)?;
            std::fs::write(&config_path, contents)
                .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
        }
        Ok(())
    }

    /// Get the path to the config file. `FITA_CONFIG` takes precedence over
    /// the platform config directory.
    pub fn config_file_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("FITA_CONFIG") {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("dev", "fita", "fita").map(|dirs| dirs.config_dir().join("config.json"))
    }
}
