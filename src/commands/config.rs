use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Path => {
            println!("{}", Config::default_path().display());
            Ok(())
        }
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "QueryLinker Configuration".bold());
            println!();

            println!("{}:", "backend".cyan());
            println!("  base_url: {}", config.backend.base_url);
            println!("  timeout_secs: {}", config.backend.timeout_secs);
            println!(
                "  on_unauthorized: {}",
                match config.backend.on_unauthorized {
                    crate::config::UnauthorizedPolicy::Surface => "surface",
                    crate::config::UnauthorizedPolicy::Ignore => "ignore",
                }
            );
            println!();

            println!("{}:", "refresh".cyan());
            println!("  metrics_secs: {}", config.refresh.metrics_secs);
            println!("  incidents_secs: {}", config.refresh.incidents_secs);
            println!();

            println!("log_level: {}", config.log_level.as_filter());
        }
    }

    Ok(())
}
