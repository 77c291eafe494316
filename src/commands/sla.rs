//! SLA attainment

use colored::*;
use eyre::Result;

use crate::api::{Api, SlaRecord};
use crate::cli::OutputFormat;
use crate::commands::require_session;

pub fn run(format: OutputFormat, api: &Api) -> Result<()> {
    let records = require_session(api.sla()?)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&records)?),
        OutputFormat::Text => print_text(&records),
    }

    Ok(())
}

fn print_text(records: &[SlaRecord]) {
    println!("{} ({}):", "SLA".bold(), format!("{} targets", records.len()).dimmed());
    if records.is_empty() {
        println!("  {}", "(none configured)".dimmed());
        return;
    }

    for record in records {
        let attained = format!("{:.1}%", record.attained_pct);
        let badge = if record.breached {
            format!("{} breached", "✗".red())
        } else {
            format!("{} on target", "✓".green())
        };
        println!(
            "  {:24} {:>7} / {:<7} {}",
            record.name,
            if record.breached { attained.red().to_string() } else { attained.green().to_string() },
            format!("{:.1}%", record.target_pct).dimmed(),
            badge
        );
    }
}
