//! Provider listing

use anyhow::Result;
use colored::*;
use heaven_runner::provider::registry;

/// List all registered providers
pub fn list_providers() -> Result<()> {
    let names: Vec<&str> = registry::names().collect();

    println!("{}", format!("Found {} provider(s):", names.len()).bold());
    println!();
    for name in names {
        println!("  {} {}", "▸".cyan(), name.bold());
    }

    Ok(())
}
