//! Per-domain lock files.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use devhost_core::{
    application::{
        ApplicationError,
        ports::{DomainLockGuard, DomainLocks},
    },
    error::DevhostResult,
};

/// `<state_dir>/locks/<domain>.lock`, held with an exclusive advisory lock.
#[derive(Debug, Clone)]
pub struct FileDomainLocks {
    dir: PathBuf,
}

impl FileDomainLocks {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            dir: state_dir.join("locks"),
        }
    }

    pub fn lock_path(&self, domain: &str) -> PathBuf {
        self.dir.join(format!("{domain}.lock"))
    }
}

/// Releases the advisory lock on drop.
struct HeldLock {
    file: File,
}

impl Drop for HeldLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

impl DomainLocks for FileDomainLocks {
    fn try_acquire(&self, domain: &str) -> DevhostResult<DomainLockGuard> {
        let path = self.lock_path(domain);
        let io_error = |e: std::io::Error| ApplicationError::FilesystemError {
            path: path.clone(),
            reason: e.to_string(),
        };

        fs::create_dir_all(&self.dir).map_err(io_error)?;
        let file = File::create(&path).map_err(io_error)?;
        if file.try_lock_exclusive().is_err() {
            return Err(ApplicationError::LockHeld {
                domain: domain.to_string(),
            }
            .into());
        }
        debug!(path = %path.display(), "domain lock acquired");
        Ok(DomainLockGuard::new(HeldLock { file }))
    }
}

/// Locks that always succeed, for tests and single-run tooling.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDomainLocks;

impl DomainLocks for NoopDomainLocks {
    fn try_acquire(&self, _domain: &str) -> DevhostResult<DomainLockGuard> {
        Ok(DomainLockGuard::new(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devhost_core::error::DevhostError;
    use tempfile::tempdir;

    #[test]
    fn second_acquire_fails_until_first_is_dropped() {
        let dir = tempdir().unwrap();
        let locks = FileDomainLocks::new(dir.path());

        let guard = locks.try_acquire("blog.local").unwrap();
        let err = locks.try_acquire("blog.local").unwrap_err();
        assert!(matches!(
            err,
            DevhostError::Application(ApplicationError::LockHeld { .. })
        ));
        assert!(locks.try_acquire("shop.local").is_ok());

        drop(guard);
        assert!(locks.try_acquire("blog.local").is_ok());
        assert!(locks.lock_path("blog.local").exists());
    }
}
