//! Ticket CRUD

use colored::*;
use eyre::Result;

use crate::api::{Api, NewTicket, Ticket};
use crate::cli::{OutputFormat, TicketsAction};
use crate::commands::require_session;

pub fn run(action: TicketsAction, api: &Api) -> Result<()> {
    match action {
        TicketsAction::List { format } => list(OutputFormat::resolve(format), api),
        TicketsAction::Create {
            title,
            description,
            priority,
        } => create(&title, description, &priority, api),
        TicketsAction::Close { id } => close(&id, api),
        TicketsAction::Remove { id } => remove(&id, api),
    }
}

fn list(format: OutputFormat, api: &Api) -> Result<()> {
    let tickets = require_session(api.tickets()?)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tickets)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&tickets)?),
        OutputFormat::Text => print_text(&tickets),
    }

    Ok(())
}

fn create(title: &str, description: Option<String>, priority: &str, api: &Api) -> Result<()> {
    let ticket = api.create_ticket(&NewTicket {
        title: title.to_string(),
        description,
        priority: priority.to_string(),
    })?;

    println!(
        "{} Created ticket {} {}",
        "✓".green(),
        ticket.id.green(),
        format!("[{}]", ticket.priority).dimmed()
    );
    Ok(())
}

fn close(id: &str, api: &Api) -> Result<()> {
    let ticket = api.close_ticket(id)?;
    println!("{} Closed ticket {} ({})", "✓".green(), ticket.id.green(), ticket.status);
    Ok(())
}

fn remove(id: &str, api: &Api) -> Result<()> {
    api.delete_ticket(id)?;
    println!("{} Deleted ticket {}", "✓".green(), id);
    Ok(())
}

fn priority_colored(priority: &str) -> ColoredString {
    match priority {
        "critical" => priority.red().bold(),
        "high" => priority.red(),
        "medium" => priority.yellow(),
        _ => priority.normal(),
    }
}

fn print_text(tickets: &[Ticket]) {
    println!("{} ({}):", "Tickets".bold(), format!("{} total", tickets.len()).dimmed());
    if tickets.is_empty() {
        println!("  {}", "(none)".dimmed());
        return;
    }

    for ticket in tickets {
        let status = if ticket.status == "closed" {
            ticket.status.dimmed()
        } else {
            ticket.status.green()
        };
        println!(
            "  {:10} [{:8}] {:8} {} {}",
            ticket.id.dimmed(),
            priority_colored(&ticket.priority),
            status,
            ticket.title,
            format!("[{}]", ticket.system.tag()).dimmed()
        );
    }
}
