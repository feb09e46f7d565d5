//! Stack generators.
//!
//! File-only generators (`static`, `static-bootstrap`, `node-server`) write
//! through the executor; the rest shell out to the stack's own tooling.

mod dotnet;
mod node;
mod php;
mod static_site;

pub use dotnet::DotnetScaffolder;
pub use node::{NodeServerScaffolder, ViteScaffolder};
pub use php::{LaravelScaffolder, WordpressScaffolder};
pub use static_site::{BootstrapSiteScaffolder, StaticSiteScaffolder};

use std::path::Path;

use devhost_core::{
    application::{ActionExecutor, ApplicationError, ports::Scaffolder},
    domain::StackKind,
    error::DevhostResult,
};

/// One generator per stack.
pub fn default_scaffolders() -> Vec<Box<dyn Scaffolder>> {
    vec![
        Box::new(LaravelScaffolder),
        Box::new(WordpressScaffolder),
        Box::new(StaticSiteScaffolder),
        Box::new(ViteScaffolder),
        Box::new(NodeServerScaffolder),
        Box::new(DotnetScaffolder),
        Box::new(BootstrapSiteScaffolder),
    ]
}

fn ensure_dir(exec: &ActionExecutor, dir: &Path) -> DevhostResult<()> {
    if !exec.exists(dir) {
        exec.create_dir_all(dir)?;
    }
    Ok(())
}

/// Parent directory and final component of the project directory.
fn split_target(target_dir: &Path) -> DevhostResult<(&Path, String)> {
    match (target_dir.parent(), target_dir.file_name()) {
        (Some(parent), Some(name)) => Ok((parent, name.to_string_lossy().into_owned())),
        _ => Err(ApplicationError::Scaffold {
            stack: "project".into(),
            reason: format!("{} has no parent directory", target_dir.display()),
        }
        .into()),
    }
}

fn wrong_stack(expected: &str, got: StackKind) -> ApplicationError {
    ApplicationError::Scaffold {
        stack: got.to_string(),
        reason: format!("dispatched to the {expected} generator"),
    }
}
