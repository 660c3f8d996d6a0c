//! Init command - write an example whattodo.toml

use crate::config::{CONFIG_FILE_NAME, EXAMPLE_CONFIG};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

/// Run the init command
pub fn run(path: &Path) -> Result<()> {
    let root = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }

    println!("\n{} Initializing whattodo\n", style("📝").bold());

    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        println!(
            "{} Already initialized at {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
    } else {
        std::fs::write(&config_path, EXAMPLE_CONFIG)
            .with_context(|| format!("Failed to create {}", config_path.display()))?;
        println!(
            "{} Created {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
    }

    println!("\nNext steps:");
    println!("  {} List TODOs", style("whattodo scan .").cyan());
    println!("  {} Trace a file's TODOs", style("whattodo history <FILE>").cyan());

    Ok(())
}
