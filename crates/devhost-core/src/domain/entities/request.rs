//! The `ProjectRequest` aggregate root and its typestate builder.
//!
//! A `ProjectRequest` is the fully-resolved, validated description of the
//! environment the operator wants provisioned. Every field is validated at
//! build time; once a request exists it is guaranteed consistent and cannot
//! be changed.
//!
//! # Typestate builder
//!
//! The builder uses two phantom marker types (`NoStack` / `HasStack`) so that
//! `build()` only exists once a stack has been chosen. Runtime validation
//! still runs in `build()` for name, domain, root, and port.
//!
//! # Domain purity
//!
//! This module must not import `tracing`. Observability is the responsibility
//! of the application and CLI layers, not the domain.

use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::domain::{
    error::DomainError,
    validation::DomainValidator,
    value_objects::{BackendSelection, DbEngine, StackKind},
};

// ── Aggregate root ────────────────────────────────────────────────────────────

/// A validated, immutable provisioning request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRequest {
    name: String,
    root: PathBuf,
    stack: StackKind,
    port: Option<u16>,
    domain: String,
    tls: bool,
    database: Option<DbEngine>,
    backends: BackendSelection,
}

impl ProjectRequest {
    /// Start building a new request.
    pub fn builder(name: impl Into<String>) -> ProjectRequestBuilder<NoStack> {
        ProjectRequestBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn root(&self) -> &Path {
        &self.root
    }
    pub const fn stack(&self) -> StackKind {
        self.stack
    }
    /// Port the operator asked for, if any.
    pub const fn desired_port(&self) -> Option<u16> {
        self.port
    }
    pub fn domain(&self) -> &str {
        &self.domain
    }
    pub const fn tls(&self) -> bool {
        self.tls
    }
    pub const fn database(&self) -> Option<DbEngine> {
        self.database
    }
    pub fn backends(&self) -> &BackendSelection {
        &self.backends
    }

    /// Directory the project is scaffolded into: `<root>/<name>`.
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(&self.name)
    }
}

impl fmt::Display for ProjectRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) at {}", self.name, self.stack, self.domain)?;
        if self.tls {
            f.write_str(" +tls")?;
        }
        if let Some(db) = self.database {
            write!(f, " +{db}")?;
        }
        Ok(())
    }
}

// ── Typestate markers ─────────────────────────────────────────────────────────

/// Marker: stack has not yet been chosen.
pub struct NoStack;
/// Marker: stack chosen; the request can be built.
pub struct HasStack;

// ── Builder ───────────────────────────────────────────────────────────────────

/// Typestate builder for [`ProjectRequest`].
pub struct ProjectRequestBuilder<S> {
    name: String,
    root: Option<PathBuf>,
    stack: Option<StackKind>,
    port: Option<u32>,
    domain: Option<String>,
    tls: bool,
    database: Option<DbEngine>,
    backends: BackendSelection,
    _marker: PhantomData<S>,
}

impl ProjectRequestBuilder<NoStack> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: None,
            stack: None,
            port: None,
            domain: None,
            tls: false,
            database: None,
            backends: BackendSelection::Auto,
            _marker: PhantomData,
        }
    }

    /// Choose the stack. This transitions the builder to `HasStack`.
    pub fn stack(self, stack: StackKind) -> ProjectRequestBuilder<HasStack> {
        ProjectRequestBuilder {
            name: self.name,
            root: self.root,
            stack: Some(stack),
            port: self.port,
            domain: self.domain,
            tls: self.tls,
            database: self.database,
            backends: self.backends,
            _marker: PhantomData,
        }
    }
}

impl<S> ProjectRequestBuilder<S> {
    /// Parent directory of the project.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Desired port. Validated at build time so CLI input of any width can
    /// be passed straight through.
    pub fn port(mut self, port: Option<u32>) -> Self {
        self.port = port;
        self
    }

    /// Domain override. Empty or blank values fall back to `<name>.local`.
    pub fn domain(mut self, domain: Option<String>) -> Self {
        self.domain = domain.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    pub fn database(mut self, database: Option<DbEngine>) -> Self {
        self.database = database;
        self
    }

    pub fn backends(mut self, backends: BackendSelection) -> Self {
        self.backends = backends;
        self
    }
}

impl ProjectRequestBuilder<HasStack> {
    /// Validate every field and produce the immutable request.
    pub fn build(self) -> Result<ProjectRequest, DomainError> {
        DomainValidator::validate_project_name(&self.name)?;

        let root = self
            .root
            .ok_or(DomainError::MissingRequiredField { field: "root" })?;
        if !root.is_absolute() {
            return Err(DomainError::RelativeRootDirectory {
                path: root.display().to_string(),
            });
        }

        let port = match self.port {
            Some(port) => Some(
                u16::try_from(port)
                    .ok()
                    .filter(|p| *p != 0)
                    .ok_or(DomainError::InvalidPort { port })?,
            ),
            None => None,
        };

        let domain = match self.domain {
            Some(domain) => domain.trim().to_ascii_lowercase(),
            None => DomainValidator::default_domain(&self.name),
        };
        DomainValidator::validate_domain(&domain)?;

        if let BackendSelection::Explicit(list) = &self.backends {
            if list.is_empty() {
                return Err(DomainError::InvalidRequest(
                    "explicit web server list cannot be empty".into(),
                ));
            }
        }

        Ok(ProjectRequest {
            name: self.name,
            root,
            stack: self.stack.ok_or(DomainError::MissingRequiredField { field: "stack" })?,
            port,
            domain,
            tls: self.tls,
            database: self.database,
            backends: self.backends,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{SpaVariant, WebServerKind};

    fn blog() -> ProjectRequestBuilder<HasStack> {
        ProjectRequest::builder("blog")
            .stack(StackKind::Static)
            .root("/srv/www")
    }

    #[test]
    fn empty_domain_defaults_to_name_dot_local() {
        let req = blog().domain(Some(String::new())).build().unwrap();
        assert_eq!(req.domain(), "blog.local");
        assert_eq!(req.desired_port(), None);
        assert!(!req.tls());
    }

    #[test]
    fn explicit_domain_is_lowercased() {
        let req = blog().domain(Some("Blog.Test".into())).build().unwrap();
        assert_eq!(req.domain(), "blog.test");
    }

    #[test]
    fn project_dir_joins_root_and_name() {
        let req = blog().build().unwrap();
        assert_eq!(req.project_dir(), PathBuf::from("/srv/www/blog"));
    }

    #[test]
    fn rejects_relative_root() {
        let err = ProjectRequest::builder("blog")
            .stack(StackKind::Static)
            .root("www")
            .build()
            .unwrap_err();
        assert!(matches!(err, DomainError::RelativeRootDirectory { .. }));
    }

    #[test]
    fn rejects_missing_root() {
        let err = ProjectRequest::builder("blog")
            .stack(StackKind::Static)
            .build()
            .unwrap_err();
        assert_eq!(err, DomainError::MissingRequiredField { field: "root" });
    }

    #[test]
    fn rejects_out_of_range_ports() {
        assert!(matches!(
            blog().port(Some(0)).build(),
            Err(DomainError::InvalidPort { port: 0 })
        ));
        assert!(matches!(
            blog().port(Some(70_000)).build(),
            Err(DomainError::InvalidPort { port: 70_000 })
        ));
        assert_eq!(blog().port(Some(8080)).build().unwrap().desired_port(), Some(8080));
    }

    #[test]
    fn rejects_empty_name() {
        assert!(matches!(
            ProjectRequest::builder("").stack(StackKind::Static).root("/srv").build(),
            Err(DomainError::InvalidProjectName { .. })
        ));
    }

    #[test]
    fn rejects_empty_explicit_backend_list() {
        let err = blog()
            .backends(BackendSelection::Explicit(vec![]))
            .build()
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));
    }

    #[test]
    fn display_summarises_options() {
        let req = ProjectRequest::builder("shop")
            .stack(StackKind::NodeSpa(SpaVariant::Vue))
            .root("/srv")
            .tls(true)
            .database(Some(DbEngine::Mysql))
            .backends(BackendSelection::Explicit(vec![WebServerKind::Nginx]))
            .build()
            .unwrap();
        assert_eq!(req.to_string(), "shop (node-spa:vue) at shop.local +tls +mysql");
    }
}
