//! System status command
//!
//! Backend reachability, connection snapshot, and what the gating engine
//! unlocks for it.

use colored::*;
use eyre::Result;
use serde::Serialize;

use crate::api::Api;
use crate::cli::OutputFormat;
use crate::client::ApiError;
use crate::config::Config;
use crate::features;

#[derive(Serialize)]
struct Status {
    version: String,
    backend_url: String,
    reachable: bool,
    signed_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    backend_error: Option<String>,
    systems: Vec<SystemStatus>,
    catalog_size: usize,
    features_unlocked: usize,
    advanced_unlocked: usize,
}

#[derive(Serialize)]
struct SystemStatus {
    system: String,
    active: bool,
}

pub fn run(format: OutputFormat, api: &Api, config: &Config) -> Result<()> {
    let (reachable, signed_in, backend_error, systems) = match api.systems() {
        Ok(Some(systems)) => (true, true, None, systems),
        Ok(None) => (true, false, None, Vec::new()),
        Err(error @ ApiError::Transport(_)) => (false, false, Some(error.to_string()), Vec::new()),
        Err(error) => (true, false, Some(error.to_string()), Vec::new()),
    };

    let connected: Vec<_> = systems
        .iter()
        .filter(|s| s.is_active)
        .map(|s| s.system.clone())
        .collect();

    let status = Status {
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend_url: config.backend.base_url.clone(),
        reachable,
        signed_in,
        backend_error,
        systems: systems
            .iter()
            .map(|s| SystemStatus {
                system: s.system.tag().to_string(),
                active: s.is_active,
            })
            .collect(),
        catalog_size: features::catalog().count(),
        features_unlocked: features::available_features(&connected).len(),
        advanced_unlocked: features::advanced_features(&connected).len(),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&status)?),
        OutputFormat::Text => print_text_status(&status),
    }

    Ok(())
}

fn print_text_status(status: &Status) {
    println!("{}", "QueryLinker Status".bold());
    println!();

    println!("  {:14} {}", "Version:".dimmed(), status.version);
    println!("  {:14} {}", "Backend:".dimmed(), status.backend_url);
    if status.reachable {
        println!("  {:14} {} reachable", "Health:".dimmed(), "✓".green());
    } else {
        println!("  {:14} {} unreachable", "Health:".dimmed(), "✗".red());
    }
    if let Some(error) = &status.backend_error {
        println!("  {:14} {}", "Error:".dimmed(), error.red());
    }
    if status.reachable && !status.signed_in {
        println!("  {:14} {}", "Session:".dimmed(), "not signed in".yellow());
    }
    println!();

    println!(
        "{} ({}):",
        "Systems".cyan(),
        format!(
            "{} connected",
            status.systems.iter().filter(|s| s.active).count()
        )
        .dimmed()
    );
    if status.systems.is_empty() {
        println!("  {}", "(none)".dimmed());
    } else {
        for system in &status.systems {
            if system.active {
                println!("  {} {}", "✓".green(), system.system.green());
            } else {
                println!("  {} {} {}", "○".dimmed(), system.system, "(inactive)".dimmed());
            }
        }
    }
    println!();

    println!("{}:", "Features".cyan());
    println!(
        "  {:14} {} / {}",
        "Unlocked:".dimmed(),
        status.features_unlocked.to_string().yellow(),
        status.catalog_size
    );
    println!(
        "  {:14} {}",
        "Advanced:".dimmed(),
        status.advanced_unlocked.to_string().yellow()
    );
}
