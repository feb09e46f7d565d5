//! Infrastructure adapters for devhost.
//!
//! This crate implements the ports defined in `devhost-core::application::ports`.
//! It contains all external dependencies and I/O operations: the filesystem,
//! child processes, TCP probing, the registry file, lock files, and the
//! typed wrappers around web servers, certificate tools, database clients and
//! stack generators.
//!
//! Each host primitive has an in-memory twin (`MemoryFilesystem`,
//! `ScriptedRunner`, `FixedPortProbe`, `MemoryResourceStore`,
//! `ScriptedPrompt`) so whole provisioning runs can be exercised in tests.

pub mod certs;
pub mod database;
pub mod filesystem;
pub mod locks;
pub mod network;
pub mod process;
pub mod prompt;
pub mod publish;
pub mod scaffolders;
pub mod store;
pub mod system;
pub mod webserver;

// Re-export commonly used adapters
pub use certs::{MkcertIssuer, OpensslIssuer};
pub use database::{MongoEngine, MysqlEngine, SqliteEngine};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use locks::{FileDomainLocks, NoopDomainLocks};
pub use network::{FixedPortProbe, TcpPortProbe};
pub use process::{ScriptedRunner, SystemProcessRunner};
pub use prompt::{ScriptedPrompt, StdinPrompt};
pub use publish::GithubPublisher;
pub use store::{MemoryResourceStore, TomlResourceStore};
pub use system::{AptPackageManager, SystemctlServiceManager};
pub use webserver::{ApacheEngine, NginxEngine};
