//! Dashboard metrics

use colored::*;
use eyre::Result;

use crate::api::{Api, DashboardMetrics};
use crate::cli::OutputFormat;
use crate::commands::require_session;

pub fn run(format: OutputFormat, api: &Api) -> Result<()> {
    let metrics = require_session(api.metrics()?)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&metrics)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&metrics)?),
        OutputFormat::Text => print_text(&metrics),
    }

    Ok(())
}

fn print_text(metrics: &DashboardMetrics) {
    println!("{}", "Dashboard".bold());
    println!();
    println!("  {:20} {}", "Open tickets:".dimmed(), metrics.open_tickets.to_string().yellow());
    println!(
        "  {:20} {}",
        "Active incidents:".dimmed(),
        if metrics.active_incidents > 0 {
            metrics.active_incidents.to_string().red().to_string()
        } else {
            "0".green().to_string()
        }
    );
    println!(
        "  {:20} {}",
        "SLA attainment:".dimmed(),
        format!("{:.1}%", metrics.sla_attainment)
    );
    println!(
        "  {:20} {}",
        "Connected systems:".dimmed(),
        metrics.connected_systems.to_string().cyan()
    );
}
