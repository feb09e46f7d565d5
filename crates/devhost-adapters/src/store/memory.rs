//! In-memory resource store for testing.

use std::sync::{Arc, RwLock};

use devhost_core::{
    application::ports::ResourceStore,
    domain::{ManagedResource, ResourceKind},
    error::{DevhostError, DevhostResult},
};

/// Thread-safe in-memory `ResourceStore`. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceStore {
    resources: Arc<RwLock<Vec<ManagedResource>>>,
}

impl MemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.resources.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> DevhostError {
    DevhostError::Internal {
        message: "memory store lock poisoned".into(),
    }
}

impl ResourceStore for MemoryResourceStore {
    fn load(&self) -> DevhostResult<Vec<ManagedResource>> {
        Ok(self.resources.read().map_err(|_| poisoned())?.clone())
    }

    fn insert(&self, resource: ManagedResource) -> DevhostResult<bool> {
        let mut resources = self.resources.write().map_err(|_| poisoned())?;
        if resources
            .iter()
            .any(|existing| existing.matches(resource.kind, &resource.key))
        {
            return Ok(false);
        }
        resources.push(resource);
        Ok(true)
    }

    fn remove(&self, kind: ResourceKind, key: &str) -> DevhostResult<bool> {
        let mut resources = self.resources.write().map_err(|_| poisoned())?;
        let before = resources.len();
        resources.retain(|existing| !existing.matches(kind, key));
        Ok(resources.len() != before)
    }

    fn location(&self) -> String {
        "memory".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_most_one_entry_per_identity() {
        let store = MemoryResourceStore::new();
        let entry = ManagedResource::new(ResourceKind::Database, "blog", Some("mysql".into()));
        assert!(store.insert(entry.clone()).unwrap());
        assert!(!store.insert(entry).unwrap());
        assert_eq!(store.len(), 1);
        assert!(store.remove(ResourceKind::Database, "blog").unwrap());
        assert!(store.is_empty());
    }
}
