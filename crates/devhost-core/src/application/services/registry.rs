//! Resource Registry - the durable record of what devhost did to this host.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    application::{ActionExecutor, Execution, ports::ResourceStore},
    domain::{ManagedResource, ResourceKind},
    error::DevhostResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    /// `(kind, key)` was already registered; nothing changed.
    AlreadyExists,
}

/// Idempotency ledger over a [`ResourceStore`].
///
/// Writes go through the executor, so a dry run reads the real registry but
/// never persists to it.
pub struct ResourceRegistry {
    executor: Arc<ActionExecutor>,
    store: Box<dyn ResourceStore>,
}

impl ResourceRegistry {
    pub fn new(executor: Arc<ActionExecutor>, store: Box<dyn ResourceStore>) -> Self {
        Self { executor, store }
    }

    pub fn exists(&self, kind: ResourceKind, key: &str) -> DevhostResult<bool> {
        Ok(self.find(kind, key)?.is_some())
    }

    pub fn find(&self, kind: ResourceKind, key: &str) -> DevhostResult<Option<ManagedResource>> {
        Ok(self
            .store
            .load()?
            .into_iter()
            .find(|resource| resource.matches(kind, key)))
    }

    #[instrument(skip(self, detail), fields(kind = %kind))]
    pub fn record(
        &self,
        kind: ResourceKind,
        key: &str,
        detail: Option<String>,
    ) -> DevhostResult<RecordOutcome> {
        if self.exists(kind, key)? {
            debug!("already registered");
            return Ok(RecordOutcome::AlreadyExists);
        }

        let resource = ManagedResource::new(kind, key, detail);
        let inserted = self
            .executor
            .execute(format!("register {kind}:{key}"), || self.store.insert(resource))?;

        Ok(match inserted {
            Execution::Performed(false) => RecordOutcome::AlreadyExists,
            Execution::Performed(true) | Execution::Simulated => RecordOutcome::Recorded,
        })
    }

    /// Returns whether an entry was (or would be) removed.
    #[instrument(skip(self), fields(kind = %kind))]
    pub fn forget(&self, kind: ResourceKind, key: &str) -> DevhostResult<bool> {
        if !self.exists(kind, key)? {
            return Ok(false);
        }
        let removed = self
            .executor
            .execute(format!("unregister {kind}:{key}"), || self.store.remove(kind, key))?;
        Ok(removed.performed().unwrap_or(true))
    }

    pub fn list(&self) -> DevhostResult<Vec<ManagedResource>> {
        let mut resources = self.store.load()?;
        resources.sort_by(|a, b| (a.kind, &a.key).cmp(&(b.kind, &b.key)));
        Ok(resources)
    }

    pub fn location(&self) -> String {
        self.store.location()
    }
}
