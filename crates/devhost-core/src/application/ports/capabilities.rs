//! Capability ports - typed interfaces to external tooling.
//!
//! Each trait wraps one family of host programs (web servers, certificate
//! tools, database clients, stack generators, service and package managers).
//! Implementations live in `devhost-adapters` and never touch the host
//! themselves: every call receives the [`ActionExecutor`] and routes its
//! commands and file writes through it, so dry-run and journaling apply
//! uniformly.

use std::path::{Path, PathBuf};

use crate::{
    application::ActionExecutor,
    domain::{
        CertificateBundle, ConnectionParams, DbEngine, Secret, StackKind, StackTag,
        VhostDescriptor, WebServerKind, find_stack,
    },
    error::DevhostResult,
};

/// One web server flavour (Apache, Nginx).
pub trait WebServerEngine: Send + Sync {
    fn kind(&self) -> WebServerKind;

    /// Whether the server is installed on this host.
    fn is_available(&self, exec: &ActionExecutor) -> bool;

    /// Directory holding site files.
    fn sites_available(&self) -> &Path;

    /// Directory the server reads enabled sites from.
    fn sites_enabled(&self) -> &Path;

    /// Service unit name, for reloads.
    fn service_name(&self) -> &str;

    /// Render the complete site configuration.
    fn render(&self, vhost: &VhostDescriptor) -> String;

    /// Syntax check for the installed configuration.
    fn config_test(&self, exec: &ActionExecutor) -> DevhostResult<()>;

    fn site_path(&self, domain: &str) -> PathBuf {
        self.sites_available().join(format!("{domain}.conf"))
    }

    fn enabled_path(&self, domain: &str) -> PathBuf {
        self.sites_enabled().join(format!("{domain}.conf"))
    }
}

/// A way of producing a key/certificate pair.
#[cfg_attr(test, mockall::automock)]
pub trait CertificateIssuer: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_available(&self, exec: &ActionExecutor) -> bool;

    /// One-time setup before the first issue (e.g. trusting a local CA).
    fn prepare(&self, _exec: &ActionExecutor) -> DevhostResult<()> {
        Ok(())
    }

    /// Write both files of `bundle`.
    fn issue(&self, exec: &ActionExecutor, bundle: &CertificateBundle) -> DevhostResult<()>;
}

/// What a database engine is asked to create.
#[derive(Debug, Clone)]
pub struct DatabaseSpec {
    pub database: String,
    pub username: Option<String>,
    pub secret: Option<Secret>,
    pub project_dir: PathBuf,
}

/// A database engine client.
pub trait DatabaseEngine: Send + Sync {
    fn kind(&self) -> DbEngine;

    /// Fail with `DatabaseProvision` when the server cannot be reached.
    fn ping(&self, exec: &ActionExecutor) -> DevhostResult<()>;

    /// Create the database (and user, when credentials are given).
    fn provision(&self, exec: &ActionExecutor, spec: &DatabaseSpec)
    -> DevhostResult<ConnectionParams>;
}

/// Inputs handed to a stack generator.
#[derive(Debug, Clone)]
pub struct ScaffoldContext {
    pub name: String,
    pub target_dir: PathBuf,
    pub stack: StackKind,
    /// Port the application should listen on.
    pub port: u16,
}

/// Generator for one stack.
pub trait Scaffolder: Send + Sync {
    fn tag(&self) -> StackTag;

    /// Programs the generator invokes.
    fn required_programs(&self) -> &'static [&'static str] {
        find_stack(self.tag())
            .map(|def| def.required_programs)
            .unwrap_or_default()
    }

    /// Where the generated project's document root sits.
    fn document_root(&self, target_dir: &Path) -> PathBuf {
        let subdir = find_stack(self.tag()).map_or("", |def| def.document_subdir);
        if subdir.is_empty() {
            target_dir.to_path_buf()
        } else {
            target_dir.join(subdir)
        }
    }

    /// Materialize the project and return its document root.
    fn generate(&self, exec: &ActionExecutor, ctx: &ScaffoldContext) -> DevhostResult<PathBuf>;
}

/// Daemon control.
pub trait ServiceManager: Send + Sync {
    fn is_active(&self, exec: &ActionExecutor, service: &str) -> bool;

    /// Start and enable the service if it is not running.
    fn ensure_running(&self, exec: &ActionExecutor, service: &str) -> DevhostResult<()>;

    /// Reload configuration without restarting.
    fn reload(&self, exec: &ActionExecutor, service: &str) -> DevhostResult<()>;
}

/// System package installation.
pub trait PackageManager: Send + Sync {
    fn is_installed(&self, exec: &ActionExecutor, package: &str) -> bool;

    /// Install whichever of `packages` are missing.
    fn ensure_installed(&self, exec: &ActionExecutor, packages: &[&str]) -> DevhostResult<()>;
}

/// Remote repository hosting.
pub trait RepositoryPublisher: Send + Sync {
    /// Create the remote repository, push the project, return its URL.
    fn publish(
        &self,
        exec: &ActionExecutor,
        project_dir: &Path,
        name: &str,
        private: bool,
    ) -> DevhostResult<String>;
}
