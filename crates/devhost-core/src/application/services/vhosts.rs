//! Virtual Host Writer.
//!
//! Site files are always rewritten, so re-running with a changed document
//! root or backend updates the served configuration. The registry entry per
//! engine is only created once. Config tests and reloads are best-effort:
//! the file is already in place and a failure there is reported as a warning.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    application::{
        ActionExecutor, ApplicationError,
        ports::{ServiceManager, WebServerEngine},
        services::ResourceRegistry,
    },
    domain::{BackendSelection, VhostDescriptor},
    error::DevhostResult,
};

use super::{Applied, resource_for};

pub struct VhostWriter {
    executor: Arc<ActionExecutor>,
    registry: Arc<ResourceRegistry>,
    engines: Vec<Box<dyn WebServerEngine>>,
    services: Arc<dyn ServiceManager>,
}

impl VhostWriter {
    pub fn new(
        executor: Arc<ActionExecutor>,
        registry: Arc<ResourceRegistry>,
        engines: Vec<Box<dyn WebServerEngine>>,
        services: Arc<dyn ServiceManager>,
    ) -> Self {
        Self {
            executor,
            registry,
            engines,
            services,
        }
    }

    /// Engines the selection resolves to on this host.
    ///
    /// Auto-detection yields whatever is installed, possibly nothing. An
    /// explicitly requested engine that is not installed is an error.
    pub fn select(&self, selection: &BackendSelection) -> DevhostResult<Vec<&dyn WebServerEngine>> {
        match selection {
            BackendSelection::Auto => Ok(self
                .engines
                .iter()
                .filter(|engine| engine.is_available(&self.executor))
                .map(|engine| &**engine)
                .collect()),
            BackendSelection::Explicit(kinds) => kinds
                .iter()
                .map(|kind| {
                    self.engines
                        .iter()
                        .find(|engine| engine.kind() == *kind)
                        .filter(|engine| engine.is_available(&self.executor))
                        .map(|engine| &**engine)
                        .ok_or_else(|| {
                            ApplicationError::CapabilityUnavailable {
                                capability: kind.to_string(),
                                reason: "requested web server is not installed".into(),
                            }
                            .into()
                        })
                })
                .collect(),
        }
    }

    /// Write, enable and reload the site for every selected engine.
    #[instrument(skip_all, fields(domain = %vhost.domain()))]
    pub fn install(
        &self,
        vhost: &VhostDescriptor,
        selection: &BackendSelection,
    ) -> DevhostResult<Applied<Vec<PathBuf>>> {
        let engines = self.select(selection)?;
        if engines.is_empty() {
            self.executor
                .warn("no web server detected; skipping virtual host configuration");
            return Ok(Applied::skipped(Vec::new(), "no web server detected"));
        }

        let mut paths = Vec::with_capacity(engines.len());
        let mut resources = Vec::with_capacity(engines.len());
        for engine in engines {
            let site = engine.site_path(vhost.domain());
            if !self.executor.exists(engine.sites_available()) {
                self.executor.create_dir_all(engine.sites_available())?;
            }
            self.executor.write_file(&site, &engine.render(vhost))?;

            let link = engine.enabled_path(vhost.domain());
            if link != site && !self.executor.exists(&link) {
                if !self.executor.exists(engine.sites_enabled()) {
                    self.executor.create_dir_all(engine.sites_enabled())?;
                }
                self.executor.symlink(&site, &link)?;
            }

            if let Err(e) = engine.config_test(&self.executor) {
                self.executor
                    .warn(format!("{} config test failed: {e}", engine.kind()));
            }
            if let Err(e) = self.services.reload(&self.executor, engine.service_name()) {
                self.executor
                    .warn(format!("{} reload failed: {e}", engine.kind()));
            }

            let kind = engine.kind().resource_kind();
            let detail = Some(site.display().to_string());
            self.registry.record(kind, vhost.domain(), detail.clone())?;
            resources.push(resource_for(&self.executor, kind, vhost.domain(), detail));
            info!(engine = %engine.kind(), path = %site.display(), "virtual host installed");
            paths.push(site);
        }

        Ok(Applied::changed(&self.executor, paths, resources))
    }

    /// Disable and delete the site on every engine devhost installed it for.
    ///
    /// Site files without a registry entry are not ours and are left alone.
    #[instrument(skip(self))]
    pub fn remove(&self, domain: &str) -> DevhostResult<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for engine in &self.engines {
            let kind = engine.kind().resource_kind();
            if !self.registry.exists(kind, domain)? {
                continue;
            }
            let site = engine.site_path(domain);
            let link = engine.enabled_path(domain);
            let mut touched = false;

            if link != site && self.executor.exists(&link) {
                self.executor.remove_file(&link)?;
                touched = true;
            }
            if self.executor.exists(&site) {
                self.executor.remove_file(&site)?;
                removed.push(site);
                touched = true;
            }
            if touched && engine.is_available(&self.executor) {
                if let Err(e) = self.services.reload(&self.executor, engine.service_name()) {
                    self.executor
                        .warn(format!("{} reload failed: {e}", engine.kind()));
                }
            }
            self.registry.forget(kind, domain)?;
        }
        Ok(removed)
    }
}
