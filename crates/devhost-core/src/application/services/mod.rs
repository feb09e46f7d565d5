//! Application services - one per provisioning concern.
//!
//! Each service owns a shared handle to the [`ActionExecutor`] and reports
//! what it did through [`Applied`], which the orchestrator turns into step
//! records and committed resources.

pub mod certificates;
pub mod database;
pub mod hosts;
pub mod orchestrator;
pub mod ports;
pub mod registry;
pub mod scaffold;
pub mod vhosts;

pub use certificates::CertificateProvisioner;
pub use database::DatabaseProvisioner;
pub use hosts::HostsWriter;
pub use orchestrator::{
    DatabaseSummary, OrchestratorSettings, ProvisionReport, ProvisionStatus,
    ProvisioningOrchestrator, ProvisioningServices, StepFailure, TeardownReport,
};
pub use ports::{DEFAULT_START_PORT, PORT_SCAN_CEILING, PortAllocator};
pub use registry::{RecordOutcome, ResourceRegistry};
pub use scaffold::{SCAFFOLD_MARKER, ScaffoldDispatcher};
pub use vhosts::VhostWriter;

use crate::{
    application::ActionExecutor,
    domain::{ManagedResource, ResourceKind, StepOutcome},
};

/// What a service call produced and how it got there.
#[derive(Debug, Clone)]
pub struct Applied<T> {
    pub value: T,
    pub outcome: StepOutcome,
    /// Registry entries this call created (or, in a dry run, would create).
    pub resources: Vec<ManagedResource>,
}

impl<T> Applied<T> {
    /// Nothing needed doing.
    pub fn unchanged(value: T) -> Self {
        Self {
            value,
            outcome: StepOutcome::AlreadyPresent,
            resources: Vec::new(),
        }
    }

    pub fn skipped(value: T, reason: impl Into<String>) -> Self {
        Self {
            value,
            outcome: StepOutcome::Skipped(reason.into()),
            resources: Vec::new(),
        }
    }

    /// The host was (or would be) changed.
    pub fn changed(exec: &ActionExecutor, value: T, resources: Vec<ManagedResource>) -> Self {
        Self {
            value,
            outcome: exec.change_outcome(),
            resources,
        }
    }
}

/// Registry entry for a resource created in the current mode.
pub(crate) fn resource_for(
    exec: &ActionExecutor,
    kind: ResourceKind,
    key: &str,
    detail: Option<String>,
) -> ManagedResource {
    if exec.is_dry_run() {
        ManagedResource::simulated(kind, key, detail)
    } else {
        ManagedResource::new(kind, key, detail)
    }
}
