use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ResourceKind;

/// An artifact this tool created on the host.
///
/// Identified by `(kind, key)`; the registry holds at most one entry per
/// identity. `detail` carries the path or engine that makes the entry
/// actionable on teardown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedResource {
    pub kind: ResourceKind,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
    /// False for resources reported by a dry run.
    #[serde(default = "materialized_default")]
    pub materialized: bool,
}

fn materialized_default() -> bool {
    true
}

impl ManagedResource {
    pub fn new(kind: ResourceKind, key: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            detail,
            created_at: Utc::now(),
            materialized: true,
        }
    }

    /// Same identity, flagged as not present on disk.
    pub fn simulated(kind: ResourceKind, key: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            materialized: false,
            ..Self::new(kind, key, detail)
        }
    }

    pub fn matches(&self, kind: ResourceKind, key: &str) -> bool {
        self.kind == kind && self.key == key
    }
}

impl fmt::Display for ManagedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.key)
    }
}
