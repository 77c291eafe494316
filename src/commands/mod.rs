//! CLI subcommand implementations

pub mod completions;
pub mod config;
pub mod dashboard;
pub mod features;
pub mod incidents;
pub mod search;
pub mod sla;
pub mod status;
pub mod systems;
pub mod tickets;

use eyre::{Result, eyre};

/// Unwrap a suppressed-401 read: commands that need data treat the signed-out
/// state as an error with a stable message
pub fn require_session<T>(value: Option<T>) -> Result<T> {
    value.ok_or_else(|| eyre!("Not signed in to the QueryLinker backend"))
}
