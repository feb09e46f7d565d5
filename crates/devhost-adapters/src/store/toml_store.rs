//! TOML resource store.
//!
//! Persists the registry at `<state_dir>/registry.toml`. Every mutation
//! takes an exclusive lock on `registry.lock`, re-reads the file, applies
//! the change and writes it back, so concurrent runs cannot lose updates.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use devhost_core::{
    application::{ApplicationError, ports::ResourceStore},
    domain::{ManagedResource, ResourceKind},
    error::{DevhostError, DevhostResult},
};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
enum StoreFileError {
    #[error("cannot access {path}: {source}")]
    Access {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is corrupted: {message}")]
    Corrupted { path: PathBuf, message: String },
    #[error("cannot serialize registry: {0}")]
    Serialization(String),
}

impl From<StoreFileError> for DevhostError {
    fn from(e: StoreFileError) -> Self {
        ApplicationError::Store {
            reason: e.to_string(),
        }
        .into()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TomlResource {
    kind: ResourceKind,
    key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TomlRegistry {
    version: u32,
    #[serde(default)]
    resources: Vec<TomlResource>,
}

/// File-backed `ResourceStore`.
#[derive(Debug, Clone)]
pub struct TomlResourceStore {
    path: PathBuf,
}

impl TomlResourceStore {
    /// Store at `<state_dir>/registry.toml`.
    pub fn new(state_dir: &Path) -> Self {
        Self::with_path(state_dir.join("registry.toml"))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn load_from_disk(&self) -> Result<Vec<ManagedResource>, StoreFileError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(access(&self.path))?;
        let registry: TomlRegistry =
            toml::from_str(&content).map_err(|e| StoreFileError::Corrupted {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        Ok(registry.resources.into_iter().map(from_toml).collect())
    }

    fn save_to_disk(&self, resources: &[ManagedResource]) -> Result<(), StoreFileError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(access(parent))?;
        }
        let registry = TomlRegistry {
            version: FORMAT_VERSION,
            resources: resources.iter().map(to_toml).collect(),
        };
        let content = toml::to_string_pretty(&registry)
            .map_err(|e| StoreFileError::Serialization(e.to_string()))?;

        // Stage, then rename over the live file.
        let staging = self.path.with_extension("toml.tmp");
        fs::write(&staging, content).map_err(access(&staging))?;
        fs::rename(&staging, &self.path).map_err(access(&self.path))
    }

    /// Run `change` on the current contents under the exclusive lock.
    fn update<T>(
        &self,
        change: impl FnOnce(&mut Vec<ManagedResource>) -> (T, bool),
    ) -> Result<T, StoreFileError> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(access(parent))?;
        }
        let lock_file = File::create(&lock_path).map_err(access(&lock_path))?;
        lock_file
            .lock_exclusive()
            .map_err(access(&lock_path))?;

        let result = self.load_from_disk().and_then(|mut resources| {
            let (value, dirty) = change(&mut resources);
            if dirty {
                self.save_to_disk(&resources)?;
            }
            Ok(value)
        });

        let _ = lock_file.unlock();
        result
    }
}

impl ResourceStore for TomlResourceStore {
    fn load(&self) -> DevhostResult<Vec<ManagedResource>> {
        Ok(self.load_from_disk()?)
    }

    fn insert(&self, resource: ManagedResource) -> DevhostResult<bool> {
        let inserted = self.update(|resources| {
            if resources
                .iter()
                .any(|existing| existing.matches(resource.kind, &resource.key))
            {
                (false, false)
            } else {
                resources.push(resource);
                (true, true)
            }
        })?;
        debug!(inserted, path = %self.path.display(), "registry insert");
        Ok(inserted)
    }

    fn remove(&self, kind: ResourceKind, key: &str) -> DevhostResult<bool> {
        Ok(self.update(|resources| {
            let before = resources.len();
            resources.retain(|existing| !existing.matches(kind, key));
            let removed = resources.len() != before;
            (removed, removed)
        })?)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

fn access(path: &Path) -> impl FnOnce(std::io::Error) -> StoreFileError + use<> {
    let path = path.to_path_buf();
    move |source| StoreFileError::Access { path, source }
}

fn from_toml(resource: TomlResource) -> ManagedResource {
    ManagedResource {
        kind: resource.kind,
        key: resource.key,
        detail: resource.detail,
        created_at: resource.created_at,
        materialized: true,
    }
}

fn to_toml(resource: &ManagedResource) -> TomlResource {
    TomlResource {
        kind: resource.kind,
        key: resource.key.clone(),
        detail: resource.detail.clone(),
        created_at: resource.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = TomlResourceStore::new(dir.path());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn insert_persists_and_rejects_duplicates() {
        let dir = tempdir().unwrap();
        let store = TomlResourceStore::new(dir.path());
        let entry = ManagedResource::new(
            ResourceKind::Certificate,
            "blog.local",
            Some("/etc/devhost/certs".into()),
        );

        assert!(store.insert(entry.clone()).unwrap());
        assert!(!store.insert(entry).unwrap());

        let reopened = TomlResourceStore::new(dir.path());
        let loaded = reopened.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].key, "blog.local");
        assert_eq!(loaded[0].detail.as_deref(), Some("/etc/devhost/certs"));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("[[resources]]"));
    }

    #[test]
    fn remove_reports_presence() {
        let dir = tempdir().unwrap();
        let store = TomlResourceStore::new(dir.path());
        store
            .insert(ManagedResource::new(ResourceKind::HostsEntry, "a.local", None))
            .unwrap();

        assert!(store.remove(ResourceKind::HostsEntry, "a.local").unwrap());
        assert!(!store.remove(ResourceKind::HostsEntry, "a.local").unwrap());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn corrupted_file_is_a_store_error() {
        let dir = tempdir().unwrap();
        let store = TomlResourceStore::new(dir.path());
        fs::write(store.path(), "not = [valid").unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(
            err,
            DevhostError::Application(ApplicationError::Store { .. })
        ));
    }
}
