//! Local filesystem adapter using std::fs.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use devhost_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::FileMode,
    error::{DevhostError, DevhostResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> DevhostResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> DevhostResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn write_file_with_mode(&self, path: &Path, content: &str, mode: FileMode) -> DevhostResult<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode.bits());
        }
        let mut file = options
            .open(path)
            .map_err(|e| map_io_error(path, e, "create file"))?;
        // `mode` only applies on creation; tighten a pre-existing file too.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(mode.bits()))
                .map_err(|e| map_io_error(path, e, "set permissions"))?;
        }
        #[cfg(not(unix))]
        let _ = mode;
        file.write_all(content.as_bytes())
            .map_err(|e| map_io_error(path, e, "write file"))
    }

    fn append_file(&self, path: &Path, content: &str) -> DevhostResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| map_io_error(path, e, "open for append"))?;
        file.write_all(content.as_bytes())
            .map_err(|e| map_io_error(path, e, "append to file"))
    }

    fn read_to_string(&self, path: &Path) -> DevhostResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> DevhostResult<()> {
        std::fs::copy(from, to)
            .map(|_| ())
            .map_err(|e| map_io_error(to, e, "copy file"))
    }

    fn remove_file(&self, path: &Path) -> DevhostResult<()> {
        std::fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove file"))
    }

    fn remove_dir_all(&self, path: &Path) -> DevhostResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }

    fn set_mode(&self, path: &Path, mode: FileMode) -> DevhostResult<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(mode.bits());
            std::fs::set_permissions(path, perms)
                .map_err(|e| map_io_error(path, e, "set permissions"))?;
        }
        #[cfg(not(unix))]
        {
            // No Unix permission bits on this platform
            let _ = (path, mode);
        }
        Ok(())
    }

    fn symlink(&self, target: &Path, link: &Path) -> DevhostResult<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target, link)
                .map_err(|e| map_io_error(link, e, "create symlink"))
        }
        #[cfg(not(unix))]
        {
            std::fs::copy(target, link)
                .map(|_| ())
                .map_err(|e| map_io_error(link, e, "copy in place of symlink"))
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists() || path.symlink_metadata().is_ok()
    }

    fn list_dir(&self, path: &Path) -> DevhostResult<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path).map_err(|e| map_io_error(path, e, "list directory"))?;
        let mut children = entries
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<io::Result<Vec<_>>>()
            .map_err(|e| map_io_error(path, e, "list directory"))?;
        children.sort();
        Ok(children)
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> DevhostError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn append_creates_then_extends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts");
        let fs = LocalFilesystem::new();

        fs.append_file(&path, "a\n").unwrap();
        fs.append_file(&path, "b\n").unwrap();
        assert_eq!(fs.read_to_string(&path).unwrap(), "a\nb\n");
    }

    #[cfg(unix)]
    #[test]
    fn set_mode_applies_exact_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.key");
        let fs = LocalFilesystem::new();
        fs.write_file(&path, "key").unwrap();
        fs.set_mode(&path, FileMode::private()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn write_with_mode_never_leaves_a_readable_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();

        let fresh = dir.path().join(".devhost-db.env");
        fs.write_file_with_mode(&fresh, "DB_PASS=x\n", FileMode::private())
            .unwrap();
        let mode = std::fs::metadata(&fresh).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert_eq!(fs.read_to_string(&fresh).unwrap(), "DB_PASS=x\n");

        let loose = dir.path().join("old.env");
        fs.write_file(&loose, "stale").unwrap();
        fs.set_mode(&loose, FileMode::public_read()).unwrap();
        fs.write_file_with_mode(&loose, "DB_PASS=y\n", FileMode::private())
            .unwrap();
        let mode = std::fs::metadata(&loose).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert_eq!(fs.read_to_string(&loose).unwrap(), "DB_PASS=y\n");
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_counts_as_existing() {
        let dir = TempDir::new().unwrap();
        let link = dir.path().join("enabled.conf");
        let fs = LocalFilesystem::new();
        fs.symlink(&dir.path().join("missing.conf"), &link).unwrap();
        assert!(fs.exists(&link));
    }

    #[test]
    fn list_dir_is_sorted() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        fs.write_file(&dir.path().join("b"), "").unwrap();
        fs.write_file(&dir.path().join("a"), "").unwrap();
        let names: Vec<_> = fs
            .list_dir(dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn missing_file_maps_to_filesystem_error() {
        let fs = LocalFilesystem::new();
        let err = fs.read_to_string(Path::new("/nonexistent/devhost")).unwrap_err();
        assert!(matches!(
            err,
            DevhostError::Application(ApplicationError::FilesystemError { .. })
        ));
    }
}
