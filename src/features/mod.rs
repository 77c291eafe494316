//! Feature catalog and gating engine
//!
//! The backend exposes which external systems a user has connected; this
//! module decides which product features that unlocks. Pure functions over a
//! static catalog — no I/O, recomputed on every call.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Tag identifying an external integration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SystemType {
    Jira,
    ServiceNow,
    Slack,
    Notion,
    Linear,
    GitHub,
    Zendesk,
    /// Unknown tag from the backend; preserved so new integrations never
    /// break decoding
    Other(String),
}

impl SystemType {
    /// Canonical lowercase wire tag
    pub fn tag(&self) -> &str {
        match self {
            SystemType::Jira => "jira",
            SystemType::ServiceNow => "servicenow",
            SystemType::Slack => "slack",
            SystemType::Notion => "notion",
            SystemType::Linear => "linear",
            SystemType::GitHub => "github",
            SystemType::Zendesk => "zendesk",
            SystemType::Other(tag) => tag,
        }
    }

    /// Parse a wire tag (case-insensitive)
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "jira" => SystemType::Jira,
            "servicenow" => SystemType::ServiceNow,
            "slack" => SystemType::Slack,
            "notion" => SystemType::Notion,
            "linear" => SystemType::Linear,
            "github" => SystemType::GitHub,
            "zendesk" => SystemType::Zendesk,
            other => SystemType::Other(other.to_string()),
        }
    }
}

impl From<String> for SystemType {
    fn from(tag: String) -> Self {
        SystemType::from_tag(&tag)
    }
}

impl From<SystemType> for String {
    fn from(system: SystemType) -> Self {
        system.tag().to_string()
    }
}

impl std::fmt::Display for SystemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A product capability gated by which system types are connected
#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<&'static str>,
    /// Empty means "available whenever at least one system is connected"
    pub dependencies: Vec<SystemType>,
}

/// Marker substrings that flag a feature as "advanced" (naming convention
/// over the catalog, not a separate field)
const ADVANCED_MARKERS: [&str; 2] = ["advanced", "cross-platform"];

macro_rules! feature {
    ($id:expr, $name:expr, $desc:expr, $icon:expr, $path:expr, [$($dep:ident),*]) => {
        (
            $id,
            Feature {
                id: $id,
                name: $name,
                description: $desc,
                icon: $icon,
                path: $path,
                dependencies: vec![$(SystemType::$dep),*],
            },
        )
    };
}

/// Static catalog, in declaration order. Iteration order of the IndexMap is
/// the order features appear in listings.
static CATALOG: Lazy<IndexMap<&'static str, Feature>> = Lazy::new(|| {
    IndexMap::from([
        feature!(
            "dashboard-overview",
            "Dashboard Overview",
            "Aggregate metrics across every connected system",
            "layout-dashboard",
            Some("/dashboard"),
            []
        ),
        feature!(
            "unified-search",
            "Unified Search",
            "Search tickets, docs, and conversations in one place",
            "search",
            Some("/search"),
            []
        ),
        feature!(
            "ticket-management",
            "Ticket Management",
            "Create, triage, and close tickets",
            "ticket",
            Some("/tickets"),
            [Jira, ServiceNow, Zendesk]
        ),
        feature!(
            "incident-tracking",
            "Incident Tracking",
            "Active incident timeline and assignments",
            "siren",
            Some("/incidents"),
            [ServiceNow, Jira]
        ),
        feature!(
            "sla-monitoring",
            "SLA Monitoring",
            "Attainment and breach alerts for service targets",
            "timer",
            Some("/sla"),
            [ServiceNow, Zendesk]
        ),
        feature!(
            "team-chat",
            "Team Chat",
            "Post updates and read channel activity",
            "message-circle",
            Some("/chat"),
            [Slack]
        ),
        feature!(
            "knowledge-base",
            "Knowledge Base",
            "Browse and link workspace documentation",
            "book-open",
            Some("/knowledge"),
            [Notion]
        ),
        feature!(
            "issue-sync",
            "Issue Sync",
            "Mirror engineering issues into service tickets",
            "git-pull-request",
            None,
            [Linear, GitHub]
        ),
        feature!(
            "code-context",
            "Code Context",
            "Attach commits and pull requests to incidents",
            "code",
            None,
            [GitHub]
        ),
        // Unlocks with any single connected system. An upstream note suggested
        // requiring two or more systems here; shipped behavior is one, pending
        // product clarification.
        feature!(
            "advanced-analytics",
            "Advanced Analytics",
            "Trend and correlation reports across systems",
            "chart-line",
            Some("/analytics"),
            []
        ),
        feature!(
            "cross-platform-reports",
            "Cross-Platform Reports",
            "Combined reporting spanning multiple integrations",
            "files",
            Some("/reports"),
            [Jira, ServiceNow, Slack, Notion, Linear, GitHub, Zendesk]
        ),
    ])
});

/// Iterate the full catalog in declaration order
pub fn catalog() -> impl Iterator<Item = &'static Feature> {
    CATALOG.values()
}

fn unlocked(feature: &Feature, connected: &[SystemType]) -> bool {
    if connected.is_empty() {
        return false;
    }
    feature.dependencies.is_empty() || feature.dependencies.iter().any(|dep| connected.contains(dep))
}

/// Features usable with the given connection snapshot, in catalog order.
///
/// A feature with no dependencies is included whenever at least one system is
/// connected. A feature with dependencies is included when ANY of them is
/// connected (OR semantics). An empty snapshot yields an empty list.
pub fn available_features(connected: &[SystemType]) -> Vec<&'static Feature> {
    CATALOG.values().filter(|f| unlocked(f, connected)).collect()
}

/// Whether a single feature is usable. Unknown ids are tolerated and report
/// false rather than erroring.
pub fn is_feature_enabled(id: &str, connected: &[SystemType]) -> bool {
    CATALOG.get(id).map(|f| unlocked(f, connected)).unwrap_or(false)
}

/// Every feature whose dependency set contains `system`, regardless of
/// connection state
pub fn features_for_system(system: &SystemType) -> Vec<&'static Feature> {
    CATALOG
        .values()
        .filter(|f| f.dependencies.contains(system))
        .collect()
}

/// Features flagged advanced by catalog naming convention, gated only by a
/// non-empty connection snapshot
pub fn advanced_features(connected: &[SystemType]) -> Vec<&'static Feature> {
    if connected.is_empty() {
        return Vec::new();
    }
    CATALOG
        .values()
        .filter(|f| ADVANCED_MARKERS.iter().any(|m| f.id.contains(m)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_unique() {
        // IndexMap keys are unique by construction; verify key matches id
        for (key, feature) in CATALOG.iter() {
            assert_eq!(*key, feature.id);
        }
    }

    #[test]
    fn test_empty_snapshot_yields_nothing() {
        assert!(available_features(&[]).is_empty());
        assert!(advanced_features(&[]).is_empty());
        assert!(!is_feature_enabled("dashboard-overview", &[]));
    }

    #[test]
    fn test_zero_dependency_feature_needs_one_connection() {
        let connected = vec![SystemType::Zendesk];
        assert!(is_feature_enabled("dashboard-overview", &connected));
        assert!(is_feature_enabled("unified-search", &connected));
    }

    #[test]
    fn test_or_semantics_over_dependencies() {
        // ticket-management depends on jira OR servicenow OR zendesk
        assert!(is_feature_enabled("ticket-management", &[SystemType::Zendesk]));
        assert!(is_feature_enabled("ticket-management", &[SystemType::Jira]));
        assert!(!is_feature_enabled("ticket-management", &[SystemType::Slack]));
    }

    #[test]
    fn test_unknown_feature_id_is_false() {
        assert!(!is_feature_enabled("no-such-feature", &[SystemType::Jira]));
    }

    #[test]
    fn test_available_preserves_catalog_order() {
        let connected = vec![SystemType::Notion];
        let available = available_features(&connected);
        let ids: Vec<&str> = available.iter().map(|f| f.id).collect();

        // notion unlocks: both zero-dep features, knowledge-base, the
        // advanced pair; team-chat (slack) and code-context (github) stay
        // locked
        assert!(ids.contains(&"knowledge-base"));
        assert!(!ids.contains(&"team-chat"));
        assert!(!ids.contains(&"code-context"));

        // order equals catalog declaration order
        let catalog_positions: Vec<usize> = ids
            .iter()
            .map(|id| CATALOG.get_index_of(id).expect("feature in catalog"))
            .collect();
        let mut sorted = catalog_positions.clone();
        sorted.sort_unstable();
        assert_eq!(catalog_positions, sorted);
    }

    #[test]
    fn test_features_for_system_ignores_connection_state() {
        let github = features_for_system(&SystemType::GitHub);
        let ids: Vec<&str> = github.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec!["issue-sync", "code-context", "cross-platform-reports"]);
    }

    #[test]
    fn test_advanced_requires_one_connection_only() {
        // advanced-analytics unlocks with a single system (see catalog note)
        let advanced = advanced_features(&[SystemType::Slack]);
        let ids: Vec<&str> = advanced.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec!["advanced-analytics", "cross-platform-reports"]);
    }

    #[test]
    fn test_system_type_tag_roundtrip() {
        for tag in ["jira", "servicenow", "slack", "notion", "linear", "github", "zendesk"] {
            assert_eq!(SystemType::from_tag(tag).tag(), tag);
        }
        assert_eq!(SystemType::from_tag("JIRA"), SystemType::Jira);
    }

    #[test]
    fn test_unknown_system_tag_preserved() {
        let system = SystemType::from_tag("pagerduty");
        assert_eq!(system, SystemType::Other("pagerduty".to_string()));
        assert_eq!(system.tag(), "pagerduty");
        assert!(features_for_system(&system).is_empty());
    }

    #[test]
    fn test_system_type_serde() {
        let parsed: SystemType = serde_json::from_str("\"slack\"").unwrap();
        assert_eq!(parsed, SystemType::Slack);
        assert_eq!(serde_json::to_string(&SystemType::Slack).unwrap(), "\"slack\"");
    }
}
