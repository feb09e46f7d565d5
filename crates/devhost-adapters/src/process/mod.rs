//! Process runner adapters.

mod scripted;
mod system;

pub use scripted::ScriptedRunner;
pub use system::{DEFAULT_TIMEOUT, SystemProcessRunner, find_in_path};
