//! Web server engines.

mod apache;
mod nginx;

pub use apache::ApacheEngine;
pub use nginx::NginxEngine;

use devhost_core::{application::ports::WebServerEngine, domain::WebServerKind};

/// Engine for `kind` with the distribution's default directories.
pub fn engine_for(kind: WebServerKind) -> Box<dyn WebServerEngine> {
    match kind {
        WebServerKind::Apache => Box::new(ApacheEngine::new()),
        WebServerKind::Nginx => Box::new(NginxEngine::new()),
    }
}

/// Every supported engine, Apache first.
pub fn default_engines() -> Vec<Box<dyn WebServerEngine>> {
    WebServerKind::ALL.into_iter().map(engine_for).collect()
}
