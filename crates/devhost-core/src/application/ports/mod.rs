//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `devhost-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: host primitives held by the executor
//!   - `Filesystem`, `ProcessRunner`, `PortProbe`, `Prompt`
//!   - `ResourceStore`: registry persistence
//!   - `DomainLocks`: per-domain run exclusion
//!
//! - **Capability Ports**: typed wrappers over external tooling
//!   - `WebServerEngine`, `CertificateIssuer`, `DatabaseEngine`, `Scaffolder`
//!   - `ServiceManager`, `PackageManager`, `RepositoryPublisher`

pub mod capabilities;
pub mod output;

pub use capabilities::{
    CertificateIssuer, DatabaseEngine, DatabaseSpec, PackageManager, RepositoryPublisher,
    ScaffoldContext, Scaffolder, ServiceManager, WebServerEngine,
};
pub use output::{
    CommandOutput, CommandSpec, DomainLockGuard, DomainLocks, Filesystem, PortProbe,
    ProcessRunner, Prompt, ResourceStore,
};

#[cfg(test)]
pub use capabilities::MockCertificateIssuer;
#[cfg(test)]
pub use output::{
    MockDomainLocks, MockFilesystem, MockPortProbe, MockProcessRunner, MockPrompt,
    MockResourceStore,
};
