// ============================================================================
// domain/error.rs - VALIDATION ERROR DOMAIN
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// Every variant is a validation failure: it is raised before the
/// orchestrator touches the host, so nothing needs undoing.
///
/// All errors are:
/// - Cloneable (carried inside provisioning reports)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Request validation
    // ========================================================================
    #[error("Invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: String },

    #[error("Invalid domain '{domain}': {reason}")]
    InvalidDomain { domain: String, reason: String },

    #[error("Invalid port {port}: must be between 1 and 65535")]
    InvalidPort { port: u32 },

    #[error("Root directory must be an absolute path: {path}")]
    RelativeRootDirectory { path: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    // ========================================================================
    // Unknown identifiers
    // ========================================================================
    #[error("Unknown stack: {0}")]
    UnknownStack(String),

    #[error("Unknown engine: {0}")]
    UnknownEngine(String),

    // ========================================================================
    // Derived identifiers
    // ========================================================================
    #[error("'{input}' contains no characters usable in a database identifier")]
    EmptyIdentifier { input: String },

    // ========================================================================
    // State machine
    // ========================================================================
    #[error("Invalid orchestration transition from {from}")]
    InvalidTransition { from: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidProjectName { .. } => vec![
                "Use letters, digits, '.', '-' and '_' only".into(),
                "Start with a letter or digit".into(),
                "Examples: blog, my-shop, api_v2".into(),
            ],
            Self::InvalidDomain { .. } => vec![
                "Domains are dot-separated labels of letters, digits and '-'".into(),
                "Omit --domain to use <name>.local".into(),
            ],
            Self::InvalidPort { .. } => vec!["Pick a port between 1 and 65535".into()],
            Self::RelativeRootDirectory { path } => vec![
                format!("Root directory given: {path}"),
                "Pass an absolute path with --root".into(),
            ],
            Self::UnknownStack(_) => vec![
                "Supported stacks:".into(),
                "  • framework-php, cms, static, static-bootstrap".into(),
                "  • node-spa[:react|vue|svelte|preact|vanilla], node-server".into(),
                "  • dotnet-app[:webapp|mvc|webapi|blazor]".into(),
            ],
            Self::UnknownEngine(_) => vec![
                "Databases: mysql, sqlite, mongo".into(),
                "Web servers: apache, nginx".into(),
            ],
            Self::EmptyIdentifier { .. } => vec![
                "Database names keep only a-z, 0-9 and '_'".into(),
                "Include at least one ASCII letter or digit in the project name".into(),
            ],
            _ => vec!["See `devhost --help` for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidTransition { .. } => ErrorCategory::Internal,
            _ => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Internal,
}
