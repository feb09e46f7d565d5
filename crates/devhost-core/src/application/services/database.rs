//! Database Provisioner.
//!
//! The generated secret leaves this module in exactly two places: the
//! engine's stdin and the project's sidecar file (mode `0600`).

use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    application::{
        ActionExecutor, ApplicationError,
        ports::{DatabaseEngine, DatabaseSpec},
        services::ResourceRegistry,
    },
    domain::{DbCredential, DbEngine, DomainValidator, FileMode, ResourceKind, Secret},
    error::DevhostResult,
};

use super::{Applied, resource_for};

pub struct DatabaseProvisioner {
    executor: Arc<ActionExecutor>,
    registry: Arc<ResourceRegistry>,
    engines: Vec<Box<dyn DatabaseEngine>>,
}

impl DatabaseProvisioner {
    pub fn new(
        executor: Arc<ActionExecutor>,
        registry: Arc<ResourceRegistry>,
        engines: Vec<Box<dyn DatabaseEngine>>,
    ) -> Self {
        Self {
            executor,
            registry,
            engines,
        }
    }

    /// Reduce a project name to `[a-z0-9_]+`.
    pub fn sanitize_identifier(name: &str) -> DevhostResult<String> {
        Ok(DomainValidator::sanitize_identifier(name)?)
    }

    /// Create the database for `project_name` and write the sidecar.
    ///
    /// Returns `None` as the value when the database is already registered.
    #[instrument(skip(self, project_dir), fields(engine = %engine))]
    pub fn provision(
        &self,
        engine: DbEngine,
        project_name: &str,
        project_dir: &Path,
    ) -> DevhostResult<Applied<Option<DbCredential>>> {
        let database = Self::sanitize_identifier(project_name)?;
        if self.registry.exists(ResourceKind::Database, &database)? {
            info!(database, "database already provisioned");
            return Ok(Applied::unchanged(None));
        }

        let client = self
            .engines
            .iter()
            .find(|candidate| candidate.kind() == engine)
            .ok_or_else(|| ApplicationError::CapabilityUnavailable {
                capability: engine.to_string(),
                reason: "no client configured for this engine".into(),
            })?;

        client.ping(&self.executor)?;

        let (username, secret) = if engine.uses_credentials() {
            (
                Some(DomainValidator::database_user(&database)),
                Some(Secret::generate()),
            )
        } else {
            (None, None)
        };
        let spec = DatabaseSpec {
            database: database.clone(),
            username: username.clone(),
            secret: secret.clone(),
            project_dir: project_dir.to_path_buf(),
        };
        let connection = client.provision(&self.executor, &spec)?;

        let credential = DbCredential {
            engine,
            database: database.clone(),
            username,
            secret,
            connection,
            sidecar_path: DbCredential::sidecar_path_for(project_dir),
        };
        self.write_sidecar(&credential)?;

        let detail = Some(engine.to_string());
        self.registry
            .record(ResourceKind::Database, &database, detail.clone())?;
        info!(database, sidecar = %credential.sidecar_path.display(), "database provisioned");

        Ok(Applied::changed(
            &self.executor,
            Some(credential),
            vec![resource_for(
                &self.executor,
                ResourceKind::Database,
                &database,
                detail,
            )],
        ))
    }

    fn write_sidecar(&self, credential: &DbCredential) -> DevhostResult<()> {
        let path = &credential.sidecar_path;
        if let Some(dir) = path.parent() {
            if !self.executor.exists(dir) {
                self.executor.create_dir_all(dir)?;
            }
        }
        let contents = credential.sidecar_contents();
        self.executor
            .write_file_with_mode(path, &contents, FileMode::private())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizer_lowercases_and_strips_punctuation() {
        assert_eq!(
            DatabaseProvisioner::sanitize_identifier("My Cool App!").unwrap(),
            "my_cool_app"
        );
        assert!(DatabaseProvisioner::sanitize_identifier("!!!").is_err());
    }
}
