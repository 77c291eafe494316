//! Unified knowledge-base search

use colored::*;
use eyre::Result;
use terminal_size::{Width, terminal_size};

use crate::api::{Api, SearchResult};
use crate::cli::OutputFormat;

pub fn run(query: &str, format: OutputFormat, api: &Api) -> Result<()> {
    let results = api.search(query)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&results)?),
        OutputFormat::Text => print_text(query, &results),
    }

    Ok(())
}

fn snippet_width() -> usize {
    let total = terminal_size().map(|(Width(w), _)| w as usize).unwrap_or(100);
    // leave room for the indent and source badge
    total.saturating_sub(24).max(40)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", cut)
}

fn print_text(query: &str, results: &[SearchResult]) {
    println!(
        "{} {} ({}):",
        "Search:".bold(),
        query.cyan(),
        format!("{} result(s)", results.len()).dimmed()
    );
    if results.is_empty() {
        println!("  {}", "(no matches across connected systems)".dimmed());
        return;
    }

    let width = snippet_width();
    for result in results {
        println!(
            "  {} {} {}",
            "→".blue(),
            result.title.bold(),
            format!("[{}]", result.source.tag()).dimmed()
        );
        println!("    {}", truncate(&result.snippet, width).dimmed());
        if let Some(url) = &result.url {
            println!("    {}", url.underline().dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate("short", 40), "short");
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        let truncated = truncate(&"a".repeat(100), 40);
        assert_eq!(truncated.chars().count(), 40);
        assert!(truncated.ends_with('…'));
    }
}
