//! Application layer errors.
//!
//! These errors represent failures while acting on the host, not business
//! rule violations. Business rule violations are `DomainError` from
//! `crate::domain`.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while provisioning or inspecting the host.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A required external program or daemon is absent.
    #[error("Capability unavailable: {capability} ({reason})")]
    CapabilityUnavailable { capability: String, reason: String },

    /// A spawned program exited non-zero.
    #[error("`{program}` failed with exit code {code:?}: {stderr}")]
    ExternalTool {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A spawned program ran past its deadline and was killed.
    #[error("`{program}` timed out after {timeout:?}")]
    ToolTimeout { program: String, timeout: Duration },

    /// The key is already claimed by something incompatible.
    #[error("Resource conflict on {key}: {reason}")]
    ResourceConflict { key: String, reason: String },

    /// A system file could not be backed up, so it was left untouched.
    #[error("Backup of {path} failed, refusing to modify it: {reason}")]
    BackupRequired { path: PathBuf, reason: String },

    /// Neither certificate issuer produced a bundle.
    #[error("Could not obtain a certificate for {domain}: {reason}")]
    Certificate { domain: String, reason: String },

    /// The database engine could not be reached or refused the request.
    #[error("Database provisioning failed for {database} on {engine}: {reason}")]
    DatabaseProvision {
        engine: String,
        database: String,
        reason: String,
    },

    /// The stack generator failed.
    #[error("Scaffolding {stack} failed: {reason}")]
    Scaffold { stack: String, reason: String },

    /// No free TCP port between the start port and the scan ceiling.
    #[error("No free port in {start}..={end}")]
    PortsExhausted { start: u16, end: u16 },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Registry persistence failed.
    #[error("Resource registry error: {reason}")]
    Store { reason: String },

    /// Another run holds the lock for this domain.
    #[error("Another devhost run is provisioning {domain}")]
    LockHeld { domain: String },

    /// The operator declined a confirmation prompt.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Remote repository creation failed.
    #[error("Publishing {repository} failed: {reason}")]
    Publish { repository: String, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::CapabilityUnavailable { capability, .. } => vec![
                format!("Install {capability} and make sure it is on PATH"),
                "Run `devhost doctor` to see what is missing".into(),
                "Or run `devhost setup` to install the base packages".into(),
            ],
            Self::ExternalTool { program, .. } => vec![
                format!("Re-run `{program}` by hand to see the full output"),
                "Fix the problem and run the same devhost command again".into(),
            ],
            Self::ToolTimeout { .. } => vec![
                "Raise `command_timeout_secs` in the config file".into(),
                "Check your network connection for downloads".into(),
            ],
            Self::ResourceConflict { key, .. } => vec![
                format!("Something else already uses {key}"),
                "Remove or rename the conflicting entry, or pick another --domain".into(),
            ],
            Self::BackupRequired { path, .. } => vec![
                format!("Make sure the directory of {} is writable", path.display()),
                "Run devhost with sufficient privileges (e.g. sudo)".into(),
            ],
            Self::Certificate { .. } => vec![
                "Install mkcert or openssl".into(),
                "Or re-run without --tls".into(),
            ],
            Self::DatabaseProvision { engine, .. } => vec![
                format!("Check that the {engine} server is installed and running"),
                "Try `devhost doctor`".into(),
            ],
            Self::PortsExhausted { .. } => vec![
                "Stop unused development servers".into(),
                "Or pass a different starting port with --port".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::LockHeld { .. } => vec![
                "Wait for the other run to finish".into(),
                "If no other run is active, delete the stale lock file".into(),
            ],
            Self::Publish { .. } => vec![
                "Check that GITHUB_TOKEN is set and has the `repo` scope".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CapabilityUnavailable { .. } => ErrorCategory::Capability,
            Self::ExternalTool { .. }
            | Self::ToolTimeout { .. }
            | Self::Certificate { .. }
            | Self::DatabaseProvision { .. }
            | Self::Scaffold { .. }
            | Self::Publish { .. } => ErrorCategory::External,
            Self::ResourceConflict { .. } | Self::LockHeld { .. } => ErrorCategory::Conflict,
            Self::PortsExhausted { .. } => ErrorCategory::Conflict,
            Self::BackupRequired { .. } | Self::FilesystemError { .. } => ErrorCategory::Io,
            Self::Store { .. } => ErrorCategory::Internal,
            Self::Cancelled(_) => ErrorCategory::Cancelled,
        }
    }
}
