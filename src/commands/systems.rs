//! Connected systems listing

use colored::*;
use eyre::Result;

use crate::api::{Api, ConnectedSystem};
use crate::cli::OutputFormat;
use crate::commands::require_session;
use crate::features;

pub fn run(format: OutputFormat, api: &Api) -> Result<()> {
    let systems = require_session(api.systems()?)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&systems)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&systems)?),
        OutputFormat::Text => print_text(&systems),
    }

    Ok(())
}

fn print_text(systems: &[ConnectedSystem]) {
    println!(
        "{} ({}):",
        "Connected Systems".bold(),
        format!("{} total", systems.len()).dimmed()
    );
    if systems.is_empty() {
        println!("  {}", "(none — connect a system to unlock features)".dimmed());
        return;
    }

    for system in systems {
        let badge = if system.is_active {
            "[active]".green().to_string()
        } else {
            "[inactive]".yellow().to_string()
        };
        let unlocks = features::features_for_system(&system.system).len();
        println!(
            "  {} {:12} {} {}",
            if system.is_active { "✓".green() } else { "○".dimmed() },
            system.system.tag(),
            badge,
            format!("{} feature(s)", unlocks).dimmed()
        );
    }
}
