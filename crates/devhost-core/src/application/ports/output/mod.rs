//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from the host. Only
//! [`ActionExecutor`](crate::application::ActionExecutor) holds the
//! world-touching ones (`Filesystem`, `ProcessRunner`, `PortProbe`, `Prompt`);
//! services never see them directly. The `devhost-adapters` crate provides
//! implementations.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::{FileMode, ManagedResource, ResourceKind, Secret};
use crate::error::DevhostResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `devhost_adapters::filesystem::LocalFilesystem` (production)
/// - `devhost_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> DevhostResult<()>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &str) -> DevhostResult<()>;

    /// Write content to a file that already carries `mode` before the first
    /// byte lands. For secrets.
    fn write_file_with_mode(&self, path: &Path, content: &str, mode: FileMode) -> DevhostResult<()>;

    /// Append content to a file, creating it if absent.
    fn append_file(&self, path: &Path, content: &str) -> DevhostResult<()>;

    fn read_to_string(&self, path: &Path) -> DevhostResult<String>;

    fn copy_file(&self, from: &Path, to: &Path) -> DevhostResult<()>;

    fn remove_file(&self, path: &Path) -> DevhostResult<()>;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> DevhostResult<()>;

    /// Set Unix permission bits. No-op where the platform has none.
    fn set_mode(&self, path: &Path, mode: FileMode) -> DevhostResult<()>;

    /// Create `link` pointing at `target`.
    fn symlink(&self, target: &Path, link: &Path) -> DevhostResult<()>;

    /// Check if path exists (a dangling symlink counts).
    fn exists(&self, path: &Path) -> bool;

    /// Immediate children of a directory.
    fn list_dir(&self, path: &Path) -> DevhostResult<Vec<PathBuf>>;
}

/// A program invocation, described without touching the host.
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Fed to the child's stdin. Treated as sensitive.
    pub stdin: Option<Secret>,
    /// Extra environment. Values are treated as sensitive.
    pub env: Vec<(String, Secret)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn stdin(mut self, input: Secret) -> Self {
        self.stdin = Some(input);
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: Secret) -> Self {
        self.env.push((key.into(), value));
        self
    }
}

/// Shell-like rendering with stdin and env values redacted.
impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{key}={value} ")?;
        }
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        if let Some(dir) = &self.cwd {
            write!(f, " (in {})", dir.display())?;
        }
        if self.stdin.is_some() {
            f.write_str(" <<< [redacted]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the child was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Port for spawning programs.
///
/// `run` returns `Ok` for any exit status; mapping a non-zero status to an
/// error is the executor's call. Implementations map a missing program to
/// `CapabilityUnavailable` and an expired deadline to `ToolTimeout`.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessRunner: Send + Sync {
    fn run(&self, command: &CommandSpec) -> DevhostResult<CommandOutput>;

    /// Whether `program` resolves on PATH.
    fn program_exists(&self, program: &str) -> bool;

    fn timeout(&self) -> Duration;
}

/// Port for checking whether a local TCP port is bound.
#[cfg_attr(test, mockall::automock)]
pub trait PortProbe: Send + Sync {
    fn is_in_use(&self, port: u16) -> bool;
}

/// Port for asking the operator a question.
#[cfg_attr(test, mockall::automock)]
pub trait Prompt: Send + Sync {
    /// Returns the raw answer line.
    fn ask(&self, question: &str) -> DevhostResult<String>;
}

/// Port for persisting the resource registry.
///
/// Implemented by:
/// - `devhost_adapters::store::TomlResourceStore` (production)
/// - `devhost_adapters::store::MemoryResourceStore` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait ResourceStore: Send + Sync {
    fn load(&self) -> DevhostResult<Vec<ManagedResource>>;

    /// Add under the store lock. Returns `false`, leaving the store
    /// untouched, when `(kind, key)` is already present.
    fn insert(&self, resource: ManagedResource) -> DevhostResult<bool>;

    /// Remove under the store lock. Returns `false` when absent.
    fn remove(&self, kind: ResourceKind, key: &str) -> DevhostResult<bool>;

    /// Human-readable location, for `devhost list` and logs.
    fn location(&self) -> String;
}

/// Held for the duration of a run; dropping it releases the lock.
pub struct DomainLockGuard {
    _inner: Box<dyn Send>,
}

impl DomainLockGuard {
    pub fn new(inner: impl Send + 'static) -> Self {
        Self {
            _inner: Box::new(inner),
        }
    }
}

impl fmt::Debug for DomainLockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DomainLockGuard")
    }
}

/// Port for per-domain mutual exclusion between runs.
#[cfg_attr(test, mockall::automock)]
pub trait DomainLocks: Send + Sync {
    /// Fails with `LockHeld` when another run owns the domain.
    fn try_acquire(&self, domain: &str) -> DevhostResult<DomainLockGuard>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_display_redacts_stdin_and_env() {
        let cmd = CommandSpec::new("mysql")
            .args(["-u", "root"])
            .env("MYSQL_PWD", Secret::new("topsecret"))
            .stdin(Secret::new("CREATE USER x IDENTIFIED BY 'pw'"));
        let shown = cmd.to_string();
        assert_eq!(shown, "MYSQL_PWD=*** mysql -u root <<< [redacted]");
        assert!(!shown.contains("topsecret"));
        assert!(!format!("{cmd:?}").contains("'pw'"));
    }

    #[test]
    fn command_display_quotes_args_with_spaces() {
        let cmd = CommandSpec::new("git").args(["commit", "-m", "initial commit"]);
        assert_eq!(cmd.to_string(), "git commit -m 'initial commit'");
    }
}
