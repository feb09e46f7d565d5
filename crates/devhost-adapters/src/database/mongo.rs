use devhost_core::{
    application::{
        ActionExecutor,
        ports::{CommandSpec, DatabaseEngine, DatabaseSpec},
    },
    domain::{ConnectionParams, DbEngine},
    error::DevhostResult,
};

use super::provision_error;

/// MongoDB through `mongosh`. A database only exists once it holds data, so
/// provisioning inserts one sentinel document into `devhost_meta`.
#[derive(Debug, Clone)]
pub struct MongoEngine {
    host: String,
    port: u16,
}

impl MongoEngine {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    fn uri(&self, database: &str) -> String {
        format!("mongodb://{}:{}/{database}", self.host, self.port)
    }
}

impl Default for MongoEngine {
    fn default() -> Self {
        Self::new("127.0.0.1", 27017)
    }
}

impl DatabaseEngine for MongoEngine {
    fn kind(&self) -> DbEngine {
        DbEngine::Mongo
    }

    fn ping(&self, exec: &ActionExecutor) -> DevhostResult<()> {
        let command = CommandSpec::new("mongosh").args([
            self.uri("admin").as_str(),
            "--quiet",
            "--eval",
            "db.runCommand({ ping: 1 }).ok",
        ]);
        exec.query_ok(&command)
            .map(|_| ())
            .map_err(|e| provision_error(DbEngine::Mongo, "server", &e))
    }

    fn provision(&self, exec: &ActionExecutor, spec: &DatabaseSpec) -> DevhostResult<ConnectionParams> {
        let sentinel = format!(
            "db.devhost_meta.insertOne({{ project: \"{}\", created_by: \"devhost\", created_at: new Date() }})",
            spec.database
        );
        let command = CommandSpec::new("mongosh").args([
            self.uri(&spec.database),
            "--quiet".into(),
            "--eval".into(),
            sentinel,
        ]);
        exec.run(&command)
            .map_err(|e| provision_error(DbEngine::Mongo, &spec.database, &e))?;

        Ok(ConnectionParams::Network {
            host: self.host.clone(),
            port: self.port,
        })
    }
}
