//! Application layer for devhost.
//!
//! This layer contains:
//! - **Executor**: the single gateway to the host, honouring dry-run
//! - **Services**: one per provisioning concern, plus the orchestrator
//! - **Ports**: interface definitions (traits) for external dependencies
//! - **Errors**: application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! validation rules itself. Those live in `crate::domain`.

pub mod error;
pub mod executor;
pub mod ports;
pub mod services;

pub use executor::{AUDIT_TARGET, ActionExecutor, ActionLevel, ActionRecord, Execution};

// Re-export main services
pub use services::{
    Applied, CertificateProvisioner, DatabaseProvisioner, DatabaseSummary, HostsWriter,
    OrchestratorSettings, PortAllocator, ProvisionReport, ProvisionStatus,
    ProvisioningOrchestrator, ProvisioningServices, RecordOutcome, ResourceRegistry,
    SCAFFOLD_MARKER, ScaffoldDispatcher, StepFailure, TeardownReport, VhostWriter,
};

// Re-export port traits (for adapter implementation)
pub use ports::{
    CertificateIssuer, CommandOutput, CommandSpec, DatabaseEngine, DatabaseSpec, DomainLockGuard,
    DomainLocks, Filesystem, PackageManager, PortProbe, ProcessRunner, Prompt,
    RepositoryPublisher, ResourceStore, ScaffoldContext, Scaffolder, ServiceManager,
    WebServerEngine,
};

pub use error::ApplicationError;
