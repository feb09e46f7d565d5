//! One module per subcommand. Handlers translate arguments, call the core
//! and render the result; no provisioning logic lives here.

pub mod completions;
pub mod config;
pub mod doctor;
pub mod list;
pub mod new;
pub mod publish;
pub mod remove;
pub mod setup;
