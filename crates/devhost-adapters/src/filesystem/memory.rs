//! In-memory filesystem adapter for testing.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use devhost_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::FileMode,
    error::{DevhostError, DevhostResult},
};

/// In-memory filesystem for testing.
///
/// Clones share state, so a test can keep one handle while the executor
/// owns another.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: HashMap<PathBuf, String>,
    directories: HashSet<PathBuf>,
    modes: HashMap<PathBuf, FileMode>,
    symlinks: HashMap<PathBuf, PathBuf>,
    mutations: usize,
}

impl MemoryFilesystemInner {
    fn add_dirs(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }

    fn require_parent(&self, path: &Path) -> DevhostResult<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !self.directories.contains(parent) => {
                Err(not_found(path, "Parent directory does not exist"))
            }
            _ => Ok(()),
        }
    }
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Seed a file (and its parent directories) without counting a mutation.
    pub fn with_file(self, path: impl AsRef<Path>, content: &str) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            let path = path.as_ref();
            if let Some(parent) = path.parent() {
                inner.add_dirs(parent);
            }
            inner.files.insert(path.to_path_buf(), content.to_string());
        }
        self
    }

    /// Seed a directory without counting a mutation.
    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.add_dirs(path.as_ref());
        }
        self
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: impl AsRef<Path>) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path.as_ref()).cloned()
    }

    /// Mode last set on a file.
    pub fn mode_of(&self, path: impl AsRef<Path>) -> Option<FileMode> {
        let inner = self.inner.read().ok()?;
        inner.modes.get(path.as_ref()).copied()
    }

    /// Target of a symlink.
    pub fn link_target(&self, link: impl AsRef<Path>) -> Option<PathBuf> {
        let inner = self.inner.read().ok()?;
        inner.symlinks.get(link.as_ref()).cloned()
    }

    /// All files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<_> = self
            .inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default();
        files.sort();
        files
    }

    /// Number of mutating calls served so far.
    pub fn mutations(&self) -> usize {
        self.inner.read().map(|inner| inner.mutations).unwrap_or(0)
    }

    fn read(&self) -> DevhostResult<RwLockReadGuard<'_, MemoryFilesystemInner>> {
        self.inner.read().map_err(|_| poisoned())
    }

    fn write(&self) -> DevhostResult<RwLockWriteGuard<'_, MemoryFilesystemInner>> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        inner.mutations += 1;
        Ok(inner)
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> DevhostResult<()> {
        self.write()?.add_dirs(path);
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> DevhostResult<()> {
        let mut inner = self.write()?;
        inner.require_parent(path)?;
        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn write_file_with_mode(&self, path: &Path, content: &str, mode: FileMode) -> DevhostResult<()> {
        let mut inner = self.write()?;
        inner.require_parent(path)?;
        inner.files.insert(path.to_path_buf(), content.to_string());
        inner.modes.insert(path.to_path_buf(), mode);
        Ok(())
    }

    fn append_file(&self, path: &Path, content: &str) -> DevhostResult<()> {
        let mut inner = self.write()?;
        inner.require_parent(path)?;
        inner
            .files
            .entry(path.to_path_buf())
            .or_default()
            .push_str(content);
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> DevhostResult<String> {
        let inner = self.read()?;
        let resolved = inner.symlinks.get(path).map_or(path, PathBuf::as_path);
        inner
            .files
            .get(resolved)
            .cloned()
            .ok_or_else(|| not_found(path, "No such file"))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> DevhostResult<()> {
        let mut inner = self.write()?;
        let content = inner
            .files
            .get(from)
            .cloned()
            .ok_or_else(|| not_found(from, "No such file"))?;
        inner.require_parent(to)?;
        inner.files.insert(to.to_path_buf(), content);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> DevhostResult<()> {
        let mut inner = self.write()?;
        let was_file = inner.files.remove(path).is_some();
        let was_link = inner.symlinks.remove(path).is_some();
        inner.modes.remove(path);
        if was_file || was_link {
            Ok(())
        } else {
            Err(not_found(path, "No such file"))
        }
    }

    fn remove_dir_all(&self, path: &Path) -> DevhostResult<()> {
        let mut inner = self.write()?;
        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));
        inner.modes.retain(|p, _| !p.starts_with(path));
        inner.symlinks.retain(|p, _| !p.starts_with(path));
        Ok(())
    }

    fn set_mode(&self, path: &Path, mode: FileMode) -> DevhostResult<()> {
        let mut inner = self.write()?;
        if !inner.files.contains_key(path) && !inner.directories.contains(path) {
            return Err(not_found(path, "No such file"));
        }
        inner.modes.insert(path.to_path_buf(), mode);
        Ok(())
    }

    fn symlink(&self, target: &Path, link: &Path) -> DevhostResult<()> {
        let mut inner = self.write()?;
        inner.require_parent(link)?;
        if inner.files.contains_key(link) || inner.symlinks.contains_key(link) {
            return Err(ApplicationError::FilesystemError {
                path: link.to_path_buf(),
                reason: "File exists".into(),
            }
            .into());
        }
        inner
            .symlinks
            .insert(link.to_path_buf(), target.to_path_buf());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.read().is_ok_and(|inner| {
            inner.files.contains_key(path)
                || inner.directories.contains(path)
                || inner.symlinks.contains_key(path)
        })
    }

    fn list_dir(&self, path: &Path) -> DevhostResult<Vec<PathBuf>> {
        let inner = self.read()?;
        if !inner.directories.contains(path) {
            return Err(not_found(path, "No such directory"));
        }
        let mut children: Vec<PathBuf> = inner
            .files
            .keys()
            .chain(inner.directories.iter())
            .chain(inner.symlinks.keys())
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect();
        children.sort();
        children.dedup();
        Ok(children)
    }
}

fn not_found(path: &Path, reason: &str) -> DevhostError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
    .into()
}

fn poisoned() -> DevhostError {
    DevhostError::Internal {
        message: "memory filesystem lock poisoned".into(),
    }
}
