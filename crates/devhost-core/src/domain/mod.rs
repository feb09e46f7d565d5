// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for devhost.
//!
//! This module contains the vocabulary of a provisioning run: what the
//! operator asked for, what the tool has created on the host, and the state
//! machine a run moves through. All filesystem, process and network access is
//! handled via ports (traits) defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **No logging**: observability belongs to the outer layers
//! - **Immutable entities**: requests are validated once and never change
//!
// Public API - what the world sees
pub mod capabilities;
pub mod entities;
pub mod error;
pub mod value_objects;

mod validation;

// Re-exports for convenience
pub use entities::{
    AppBackend, CertificateBundle, ConnectionParams, DbCredential, ManagedResource,
    OrchestrationState, ProjectRequest, Secret, Step, StepOutcome, StepRecord, VhostDescriptor,
    common::FileMode,
    request::{HasStack, NoStack, ProjectRequestBuilder},
};

pub use error::{DomainError, ErrorCategory};

pub use value_objects::{
    BackendSelection, DbEngine, DotnetTemplate, ExecutionMode, ResourceKind, SpaVariant,
    StackKind, StackTag, WebServerKind,
};

pub use capabilities::{ServingMode, StackDef, find_stack, serving_mode};
pub use validation::{DomainValidator, MAX_DB_NAME_LEN, MAX_DB_USER_LEN};

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    // ========================================================================
    // Value Object Tests
    // ========================================================================

    #[test]
    fn stack_kind_parses_tags_and_options() {
        assert_eq!(StackKind::from_str("static").unwrap(), StackKind::Static);
        assert_eq!(
            StackKind::from_str("node-spa:vue").unwrap(),
            StackKind::NodeSpa(SpaVariant::Vue)
        );
        assert_eq!(
            StackKind::from_str("node-spa").unwrap(),
            StackKind::NodeSpa(SpaVariant::React)
        );
        assert_eq!(
            StackKind::from_str("DOTNET-APP:webapi").unwrap(),
            StackKind::DotnetApp(DotnetTemplate::WebApi)
        );
        assert_eq!(StackKind::from_str("laravel").unwrap(), StackKind::FrameworkPhp);
    }

    #[test]
    fn stack_kind_rejects_unknown_and_stray_options() {
        assert!(matches!(
            StackKind::from_str("rails"),
            Err(DomainError::UnknownStack(_))
        ));
        assert!(StackKind::from_str("static:vue").is_err());
        assert!(StackKind::from_str("node-spa:angular").is_err());
    }

    #[test]
    fn stack_kind_display_round_trips_through_parser() {
        for stack in [
            StackKind::Cms,
            StackKind::NodeSpa(SpaVariant::Svelte),
            StackKind::DotnetApp(DotnetTemplate::Blazor),
            StackKind::StaticBootstrap,
        ] {
            assert_eq!(StackKind::from_str(&stack.to_string()).unwrap(), stack);
        }
    }

    #[test]
    fn engines_parse_aliases() {
        assert_eq!(DbEngine::from_str("MariaDB").unwrap(), DbEngine::Mysql);
        assert_eq!(DbEngine::from_str("mongodb").unwrap(), DbEngine::Mongo);
        assert!(DbEngine::from_str("oracle").is_err());
        assert_eq!(WebServerKind::from_str("httpd").unwrap(), WebServerKind::Apache);
        assert!(DbEngine::Mysql.uses_credentials());
        assert!(!DbEngine::Sqlite.uses_credentials());
    }

    #[test]
    fn resource_kind_round_trips() {
        for kind in [
            ResourceKind::HostsEntry,
            ResourceKind::Certificate,
            ResourceKind::ApacheVhost,
            ResourceKind::NginxVhost,
            ResourceKind::Database,
        ] {
            assert_eq!(ResourceKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert_eq!(WebServerKind::Nginx.resource_kind(), ResourceKind::NginxVhost);
    }

    #[test]
    fn execution_modes() {
        assert!(ExecutionMode::dry_run().is_dry_run());
        assert!(ExecutionMode::dry_run().assume_yes());
        assert!(!ExecutionMode::live().assume_yes());
        assert_eq!(ExecutionMode::unattended().to_string(), "live (assume yes)");
    }

    // ========================================================================
    // Request Tests
    // ========================================================================

    #[test]
    fn request_serving_mode_follows_stack() {
        let req = ProjectRequest::builder("api")
            .stack(StackKind::FrameworkPhp)
            .root("/srv")
            .build()
            .unwrap();
        assert_eq!(serving_mode(req.stack().tag()), ServingMode::Php);
        assert_eq!(find_stack(req.stack().tag()).unwrap().document_subdir, "public");
    }

    #[test]
    fn domain_errors_carry_suggestions() {
        let err = StackKind::from_str("rails").unwrap_err();
        assert!(!err.suggestions().is_empty());
        assert_eq!(err.category(), ErrorCategory::Validation);
    }
}
