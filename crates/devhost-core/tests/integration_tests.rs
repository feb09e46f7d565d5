//! Integration tests for devhost-core's public API.
//!
//! End-to-end provisioning against in-memory adapters lives in
//! `devhost-adapters/tests`.

use std::path::Path;
use std::time::Duration;

use devhost_core::{
    domain::{
        AppBackend, BackendSelection, CertificateBundle, DbEngine, DomainError,
        OrchestrationState, ProjectRequest, ServingMode, StackKind, Step, VhostDescriptor,
        WebServerKind, find_stack, serving_mode,
    },
    application::ApplicationError,
    error::{DevhostError, ErrorCategory},
    prelude::*,
};

#[test]
fn request_from_cli_like_input() {
    let stack: StackKind = "node-spa:svelte".parse().unwrap();
    let request = ProjectRequest::builder("dashboard")
        .stack(stack)
        .root("/home/dev/sites")
        .port(Some(5173))
        .domain(None)
        .tls(true)
        .database(Some("sqlite".parse::<DbEngine>().unwrap()))
        .backends(BackendSelection::Explicit(vec![WebServerKind::Nginx]))
        .build()
        .unwrap();

    assert_eq!(request.domain(), "dashboard.local");
    assert_eq!(request.desired_port(), Some(5173));
    assert_eq!(serving_mode(request.stack().tag()), ServingMode::Proxy);
    assert_eq!(
        request.project_dir(),
        Path::new("/home/dev/sites/dashboard")
    );
}

#[test]
fn validation_errors_surface_as_devhost_errors() {
    let err: DevhostError = ProjectRequest::builder("my app")
        .stack(StackKind::Static)
        .root("/srv")
        .build()
        .unwrap_err()
        .into();
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(matches!(
        err,
        DevhostError::Domain(DomainError::InvalidProjectName { .. })
    ));
    assert!(!err.suggestions().is_empty());
}

#[test]
fn host_failures_are_categorised_for_the_cli() {
    let timeout: DevhostError = ApplicationError::ToolTimeout {
        program: "composer".into(),
        timeout: Duration::from_secs(300),
    }
    .into();
    assert_eq!(timeout.category(), ErrorCategory::External);
    assert!(timeout.is_retryable());

    let held: DevhostError = ApplicationError::LockHeld {
        domain: "blog.local".into(),
    }
    .into();
    assert!(held.is_retryable());

    let missing: DevhostError = ApplicationError::CapabilityUnavailable {
        capability: "mkcert".into(),
        reason: "not on PATH".into(),
    }
    .into();
    assert_eq!(missing.category(), ErrorCategory::Capability);
    assert!(!missing.is_retryable());
}

#[test]
fn failed_state_reports_the_step() {
    let state = OrchestrationState::Requested
        .advance()
        .and_then(|s| s.fail(Step::Scaffold, "composer exited 1"))
        .unwrap();
    assert!(state.is_terminal());
    assert_eq!(state.to_string(), "failed at scaffold: composer exited 1");
}

#[test]
fn vhost_descriptor_for_php_stack() {
    let def = find_stack(StackKind::FrameworkPhp.tag()).unwrap();
    let root = Path::new("/srv/shop").join(def.document_subdir);
    let vhost = VhostDescriptor::new(
        "shop.local",
        root,
        AppBackend::PhpFpm {
            socket: "/run/php/php8.3-fpm.sock".into(),
        },
    )
    .unwrap()
    .with_tls(CertificateBundle::for_domain(Path::new("/etc/devhost/certs"), "shop.local"));

    assert_eq!(vhost.document_root(), Path::new("/srv/shop/public"));
    assert_eq!(
        vhost.tls().unwrap().key_path(),
        Path::new("/etc/devhost/certs/shop.local.key")
    );
}

#[test]
fn execution_mode_is_a_plain_value() {
    let mode = ExecutionMode::new(true, false);
    let copy = mode;
    assert_eq!(mode, copy);
    assert!(copy.is_dry_run());
}
