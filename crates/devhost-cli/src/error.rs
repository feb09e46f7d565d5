//! Error handling for the devhost CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Exit code mapping

use std::error::Error;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use thiserror::Error;

use devhost_core::application::ProvisionStatus;
use devhost_core::domain::Step;
use devhost_core::error::{DevhostError, ErrorCategory as CoreCategory};

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// An error propagated from `devhost-core` or an adapter.
    #[error("{0}")]
    Core(#[from] DevhostError),

    /// Provisioning stopped at `step`; the report has already been printed.
    #[error("{step} step failed: {cause}")]
    ProvisionFailed {
        step: Step,
        status: ProvisionStatus,
        cause: DevhostError,
    },

    /// A configuration file could not be read, parsed, or written.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// `GITHUB_TOKEN` is unset.
    #[error("GITHUB_TOKEN is not set")]
    MissingToken,

    /// The target of a command does not exist.
    #[error("No project at {path}")]
    ProjectMissing { path: PathBuf },

    /// An I/O operation failed.
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Operation cancelled by user.
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Core(core) => core.suggestions(),

            Self::ProvisionFailed { cause, status, .. } => {
                let mut suggestions = cause.suggestions();
                if *status == ProvisionStatus::FailedWithPartialCommits {
                    suggestions.push(
                        "Earlier steps were kept; re-run the same command once the cause is fixed"
                            .into(),
                    );
                    suggestions.push("Use `devhost list` to see what was created".into());
                }
                suggestions
            }

            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {message}"),
                "Run `devhost config path` to locate the file in use".into(),
                "Use `devhost config init --force` to restore the defaults".into(),
            ],

            Self::MissingToken => vec![
                "Create a token with the `repo` scope at https://github.com/settings/tokens".into(),
                "Export it: export GITHUB_TOKEN=<token>".into(),
            ],

            Self::ProjectMissing { path } => vec![
                format!("Check that {} exists", path.display()),
                "Pass the project directory explicitly".into(),
            ],

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {message}"),
                "Check file permissions".into(),
            ],

            Self::Cancelled => vec!["Nothing was changed".into()],
        }
    }

    /// Get the error category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Core(core) => match core.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::Cancelled => ErrorCategory::UserError,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Capability
                | CoreCategory::External
                | CoreCategory::Conflict
                | CoreCategory::Io => ErrorCategory::Aborted,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::ProvisionFailed { status, cause, .. } => match status {
                ProvisionStatus::FailedWithPartialCommits => ErrorCategory::PartiallyApplied,
                _ if cause.category() == CoreCategory::Validation => ErrorCategory::UserError,
                _ => ErrorCategory::Aborted,
            },
            Self::ConfigError { .. } | Self::MissingToken => ErrorCategory::Configuration,
            Self::ProjectMissing { .. } => ErrorCategory::UserError,
            Self::IoError { .. } => ErrorCategory::Internal,
            Self::Cancelled => ErrorCategory::UserError,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category          | Code |
    /// |-------------------|------|
    /// | User error        |  2   |
    /// | Aborted           |  3   |
    /// | Configuration     |  4   |
    /// | Partially applied |  5   |
    /// | Internal          |  1   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::Aborted => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::PartiallyApplied => 5,
            ErrorCategory::Internal => 1,
        }
    }

    /// Format the error for display with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n{} {}\n\n",
            "✗".red().bold(),
            "Error:".red().bold()
        ));
        output.push_str(&format!("  {}\n", self.to_string().red()));

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                output.push_str(&format!(
                    "\n  {} {}\n",
                    "→".dimmed(),
                    err.to_string().dimmed()
                ));
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  {suggestion}\n"));
            }
        }

        if !verbose {
            output.push('\n');
            output.push_str(&format!(
                "{} {}\n",
                "\u{2139}".blue(),
                "Use -v / --verbose for more details.".dimmed(),
            ));
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`].
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!("\nError: {self}\n"));

        if verbose {
            let mut src = self.source();
            while let Some(err) = src {
                out.push_str(&format!("  Caused by: {err}\n"));
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::Aborted => tracing::warn!("Aborted: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::PartiallyApplied => tracing::error!("Partially applied: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad arguments or a declined confirmation.
    UserError,
    /// Failed before the host was changed.
    Aborted,
    Configuration,
    /// Failed after some steps were committed.
    PartiallyApplied,
    Internal,
}

/// Attach a context message to foreign errors at call-sites.
pub trait IntoCli<T> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devhost_core::application::ApplicationError;
    use devhost_core::domain::DomainError;
    use std::io;

    fn lock_held() -> DevhostError {
        ApplicationError::LockHeld {
            domain: "blog.local".into(),
        }
        .into()
    }

    #[test]
    fn validation_errors_exit_2() {
        let err = CliError::Core(DomainError::InvalidPort { port: 0 }.into());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn conflicts_before_mutation_exit_3() {
        let err = CliError::ProvisionFailed {
            step: Step::Preflight,
            status: ProvisionStatus::FailedBeforeMutation,
            cause: lock_held(),
        };
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn invalid_request_in_preflight_exits_2() {
        let err = CliError::ProvisionFailed {
            step: Step::Preflight,
            status: ProvisionStatus::FailedBeforeMutation,
            cause: DomainError::InvalidPort { port: 70000 }.into(),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn partial_commits_exit_5_and_suggest_rerun() {
        let err = CliError::ProvisionFailed {
            step: Step::Tls,
            status: ProvisionStatus::FailedWithPartialCommits,
            cause: lock_held(),
        };
        assert_eq!(err.exit_code(), 5);
        assert!(err.suggestions().iter().any(|s| s.contains("re-run")));
        assert!(err.to_string().starts_with("tls step failed"));
    }

    #[test]
    fn missing_token_is_configuration() {
        assert_eq!(CliError::MissingToken.exit_code(), 4);
        assert!(
            CliError::MissingToken
                .suggestions()
                .iter()
                .any(|s| s.contains("GITHUB_TOKEN"))
        );
    }

    #[test]
    fn io_errors_are_internal() {
        let err = CliError::IoError {
            message: "x".into(),
            source: io::Error::other("e"),
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn format_plain_lists_suggestions() {
        let s = CliError::MissingToken.format_plain(false);
        assert!(s.contains("Error: GITHUB_TOKEN is not set"));
        assert!(s.contains("Suggestions:"));
        assert!(s.contains("--verbose"));
    }

    #[test]
    fn format_plain_verbose_omits_hint() {
        let s = CliError::Cancelled.format_plain(true);
        assert!(!s.contains("--verbose"));
    }

    #[test]
    fn into_cli_io_error() {
        let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let cli: CliResult<()> = result.with_cli_context(|| "reading hosts");
        assert!(matches!(cli, Err(CliError::IoError { .. })));
    }
}
