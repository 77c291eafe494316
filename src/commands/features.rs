//! Feature gating queries
//!
//! `catalog` is fully offline; the rest ask the backend for the connection
//! snapshot first, then evaluate the static catalog against it.

use colored::*;
use eyre::Result;

use crate::api::Api;
use crate::cli::{FeaturesAction, OutputFormat};
use crate::features::{self, Feature, SystemType};

pub fn run(action: FeaturesAction, api: &Api) -> Result<()> {
    match action {
        FeaturesAction::List { format } => list(OutputFormat::resolve(format), api),
        FeaturesAction::Advanced { format } => advanced(OutputFormat::resolve(format), api),
        FeaturesAction::ForSystem { system, format } => for_system(&system, OutputFormat::resolve(format)),
        FeaturesAction::Catalog { format } => catalog(OutputFormat::resolve(format)),
        FeaturesAction::Check { id } => check(&id, api),
    }
}

fn list(format: OutputFormat, api: &Api) -> Result<()> {
    let connected = api.connected_types()?;
    let available = features::available_features(&connected);

    if format == OutputFormat::Text && available.is_empty() {
        println!("{}", "No features unlocked — no systems connected.".yellow());
        return Ok(());
    }
    print_features(format, "Available Features", &available, Some(connected.as_slice()));
    Ok(())
}

fn advanced(format: OutputFormat, api: &Api) -> Result<()> {
    let connected = api.connected_types()?;
    let advanced = features::advanced_features(&connected);
    print_features(format, "Advanced Features", &advanced, Some(connected.as_slice()));
    Ok(())
}

fn for_system(tag: &str, format: OutputFormat) -> Result<()> {
    let system = SystemType::from_tag(tag);
    let tied = features::features_for_system(&system);
    print_features(format, &format!("Features for {}", system.tag()), &tied, None);
    Ok(())
}

fn catalog(format: OutputFormat) -> Result<()> {
    let all: Vec<&Feature> = features::catalog().collect();
    print_features(format, "Feature Catalog", &all, None);
    Ok(())
}

fn check(id: &str, api: &Api) -> Result<()> {
    let connected = api.connected_types()?;
    if features::is_feature_enabled(id, &connected) {
        println!("{} {} is enabled", "✓".green(), id.green());
    } else {
        // unknown ids land here too; the gating engine never errors on them
        println!("{} {} is not enabled", "○".dimmed(), id);
        std::process::exit(1);
    }
    Ok(())
}

fn print_features(format: OutputFormat, heading: &str, list: &[&Feature], connected: Option<&[SystemType]>) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(list).unwrap_or_else(|_| "[]".to_string()))
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(list).unwrap_or_default())
        }
        OutputFormat::Text => {
            println!("{} ({}):", heading.bold(), format!("{} total", list.len()).dimmed());
            if list.is_empty() {
                println!("  {}", "(none)".dimmed());
                return;
            }
            for feature in list {
                let deps = if feature.dependencies.is_empty() {
                    "any connected system".dimmed().to_string()
                } else {
                    feature
                        .dependencies
                        .iter()
                        .map(|d| match connected {
                            Some(connected) if connected.contains(d) => d.tag().green().to_string(),
                            _ => d.tag().dimmed().to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                println!("  {} {:24} {}", "✓".green(), feature.id.cyan(), deps);
                println!("    {}", feature.description.dimmed());
            }
        }
    }
}
