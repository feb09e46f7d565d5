pub mod certificate;
pub mod common;
pub mod credential;
pub mod request;
pub mod resource;
pub mod state;
pub mod vhost;

pub use crate::domain::DomainError;
pub use certificate::CertificateBundle;
pub use credential::{ConnectionParams, DbCredential, Secret};
pub use request::ProjectRequest;
pub use resource::ManagedResource;
pub use state::{OrchestrationState, Step, StepOutcome, StepRecord};
pub use vhost::{AppBackend, VhostDescriptor};
