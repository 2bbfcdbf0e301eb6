//! Config command implementation.
//!
//! Manages CLI configuration.

use anyhow::Result;

use crate::config::Config;

/// Show current configuration.
pub fn show(config: &Config) -> Result<()> {
    println!("fita CLI Configuration");
    println!("{:-<40}", "");

    println!("Max Steps:           {}", config.engine.max_steps);
    println!("Max Continuations:   {}", config.engine.max_continuations);
    println!("Emit Events:         {}", config.engine.emit_events);
    println!("Default Choice:      {}", config.engine.default_choice);
    println!("Default Traversal:   {}", config.traversal);

    if let Some(config_path) = Config::config_file_path() {
        println!("\nConfig file: {}", config_path.display());
    }

    Ok(())
}

/// Show the config file path.
pub fn path() -> Result<()> {
    match Config::config_file_path() {
        Some(path) => println!("{}", path.display()),
        None => println!("(no config file path available)"),
    }
    Ok(())
}

/// Reset configuration to defaults.
pub fn reset() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults");
    Ok(())
}
