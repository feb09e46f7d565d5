//! devhost Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the devhost
//! local-environment provisioner, following hexagonal (ports and adapters)
//! architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           devhost-cli (CLI)             │
//! │   (builds ExecutionMode, wires adapters)│
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       ProvisioningOrchestrator          │
//! │  scaffold → hosts → tls → vhost → db    │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    Services + ActionExecutor            │
//! │  (only the executor touches the host)   │
//! └──────────────────┬──────────────────────┘
//!                    │ through ports
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    devhost-adapters (Infrastructure)    │
//! │ (filesystem, processes, engines, CA...) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use devhost_core::domain::{ProjectRequest, StackKind};
//!
//! let request = ProjectRequest::builder("blog")
//!     .stack(StackKind::Static)
//!     .root("/srv/www")
//!     .tls(true)
//!     .build()
//!     .unwrap();
//!
//! // `orchestrator` is assembled from adapters by the CLI.
//! // let report = orchestrator.provision(&request);
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ActionExecutor, Execution, ProvisionReport, ProvisionStatus, ProvisioningOrchestrator,
        ports::{
            CertificateIssuer, CommandOutput, CommandSpec, DatabaseEngine, Filesystem,
            PortProbe, ProcessRunner, Prompt, ResourceStore, Scaffolder, WebServerEngine,
        },
    };
    pub use crate::domain::{
        BackendSelection, DbEngine, ExecutionMode, ProjectRequest, ResourceKind, StackKind,
        WebServerKind,
    };
    pub use crate::error::{DevhostError, DevhostResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
