//! Typed backend resources
//!
//! One schema per endpoint, decoded at the pipeline boundary so malformed
//! payloads surface as decode errors instead of leaking into display code.
//! Mutations declare the cache keys they invalidate right next to the call.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{
    ApiClient, ApiError, CacheService, HttpTransport, QueryOptions, RequestDescriptor, Unauthorized,
};
use crate::config::Config;
use crate::features::SystemType;

pub const SYSTEMS: &[&str] = &["api", "systems"];
pub const METRICS: &[&str] = &["api", "dashboard", "metrics"];
pub const ACTIVE_INCIDENTS: &[&str] = &["api", "incidents", "active"];
pub const TICKETS: &[&str] = &["api", "tickets"];
pub const SLA: &[&str] = &["api", "sla"];
pub const SEARCH: &[&str] = &["api", "search"];

/// An external integration the user has connected
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedSystem {
    #[serde(rename = "type")]
    pub system: SystemType,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub open_tickets: u64,
    pub active_incidents: u64,
    pub sla_attainment: f64,
    pub connected_systems: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub title: String,
    pub severity: String,
    pub status: String,
    #[serde(default)]
    pub assignee: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub priority: String,
    pub status: String,
    pub system: SystemType,
    pub created_at: DateTime<Utc>,
}

/// Payload for ticket creation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaRecord {
    pub name: String,
    pub target_pct: f64,
    pub attained_pct: f64,
    pub breached: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub source: SystemType,
    #[serde(default)]
    pub url: Option<String>,
}

/// High-level backend handle: cache service plus the policies the config
/// selects. Constructed once in main and passed by reference.
pub struct Api {
    cache: CacheService,
    on_unauthorized: Unauthorized,
    metrics_refresh: Option<Duration>,
    incidents_refresh: Option<Duration>,
}

impl Api {
    pub fn new(config: &Config) -> Self {
        let transport = Arc::new(HttpTransport::new(Duration::from_secs(config.backend.timeout_secs)));
        let client = ApiClient::new(&config.backend.base_url, transport);
        Self::with_cache(CacheService::new(client), config)
    }

    /// Used by tests to substitute a mock transport
    pub fn with_cache(cache: CacheService, config: &Config) -> Self {
        Self {
            cache,
            on_unauthorized: config.backend.on_unauthorized.as_policy(),
            metrics_refresh: refresh_interval(config.refresh.metrics_secs),
            incidents_refresh: refresh_interval(config.refresh.incidents_secs),
        }
    }

    pub fn cache(&self) -> &CacheService {
        &self.cache
    }

    fn read_opts(&self, refetch_after: Option<Duration>) -> QueryOptions {
        QueryOptions {
            on_unauthorized: self.on_unauthorized,
            refetch_after,
            force_refetch: false,
        }
    }

    /// Connected systems; `None` means signed out under the suppress policy
    pub fn systems(&self) -> Result<Option<Vec<ConnectedSystem>>, ApiError> {
        self.cache.query_as(SYSTEMS, self.read_opts(None))
    }

    /// Active system-type snapshot for the gating engine. Signed out reads
    /// as "nothing connected".
    pub fn connected_types(&self) -> Result<Vec<SystemType>, ApiError> {
        let systems = self.systems()?.unwrap_or_default();
        Ok(systems
            .into_iter()
            .filter(|s| s.is_active)
            .map(|s| s.system)
            .collect())
    }

    pub fn metrics(&self) -> Result<Option<DashboardMetrics>, ApiError> {
        self.cache.query_as(METRICS, self.read_opts(self.metrics_refresh))
    }

    pub fn active_incidents(&self) -> Result<Option<Vec<Incident>>, ApiError> {
        self.cache
            .query_as(ACTIVE_INCIDENTS, self.read_opts(self.incidents_refresh))
    }

    pub fn tickets(&self) -> Result<Option<Vec<Ticket>>, ApiError> {
        self.cache.query_as(TICKETS, self.read_opts(None))
    }

    pub fn sla(&self) -> Result<Option<Vec<SlaRecord>>, ApiError> {
        self.cache.query_as(SLA, self.read_opts(None))
    }

    /// Unified knowledge-base search; uncached, every invocation asks the
    /// backend
    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>, ApiError> {
        let descriptor = RequestDescriptor::post(SEARCH, serde_json::json!({ "query": query }));
        self.cache.client().fetch(&descriptor)
    }

    pub fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket, ApiError> {
        let body = serde_json::to_value(ticket).map_err(|e| ApiError::Decode {
            resource: TICKETS.join("/"),
            detail: e.to_string(),
        })?;
        let created = self
            .cache
            .mutate(&RequestDescriptor::post(TICKETS, body), &[TICKETS, METRICS])?;
        decode(TICKETS, created)
    }

    pub fn close_ticket(&self, id: &str) -> Result<Ticket, ApiError> {
        let resource = ["api", "tickets", id];
        let updated = self.cache.mutate(
            &RequestDescriptor::put(&resource, serde_json::json!({ "status": "closed" })),
            &[TICKETS, METRICS],
        )?;
        decode(&resource, updated)
    }

    pub fn delete_ticket(&self, id: &str) -> Result<(), ApiError> {
        let resource = ["api", "tickets", id];
        self.cache
            .mutate(&RequestDescriptor::delete(&resource), &[TICKETS, METRICS])?;
        Ok(())
    }
}

fn decode<T: serde::de::DeserializeOwned>(resource: &[&str], value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode {
        resource: resource.join("/"),
        detail: e.to_string(),
    })
}

fn refresh_interval(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
