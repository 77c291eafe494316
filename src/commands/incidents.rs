//! Active incidents

use colored::*;
use eyre::Result;

use crate::api::{Api, Incident};
use crate::cli::OutputFormat;
use crate::commands::require_session;

pub fn run(format: OutputFormat, api: &Api) -> Result<()> {
    let incidents = require_session(api.active_incidents()?)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&incidents)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&incidents)?),
        OutputFormat::Text => print_text(&incidents),
    }

    Ok(())
}

fn severity_colored(severity: &str) -> ColoredString {
    match severity {
        "critical" => severity.red().bold(),
        "high" => severity.red(),
        "medium" => severity.yellow(),
        "low" => severity.normal(),
        _ => severity.dimmed(),
    }
}

fn print_text(incidents: &[Incident]) {
    println!(
        "{} ({}):",
        "Active Incidents".bold(),
        format!("{} open", incidents.len()).dimmed()
    );
    if incidents.is_empty() {
        println!("  {}", "(all clear)".green());
        return;
    }

    for incident in incidents {
        let assignee = incident
            .assignee
            .as_deref()
            .map(|a| a.cyan().to_string())
            .unwrap_or_else(|| "(unassigned)".dimmed().to_string());
        println!(
            "  {} [{}] {} {} {}",
            "!".red(),
            severity_colored(&incident.severity),
            incident.id.dimmed(),
            incident.title,
            assignee
        );
        println!(
            "    {} {}",
            incident.status.dimmed(),
            incident.created_at.format("%Y-%m-%d %H:%M UTC").to_string().dimmed()
        );
    }
}
