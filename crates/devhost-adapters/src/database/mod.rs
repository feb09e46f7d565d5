//! Database engine clients.

mod mongo;
mod mysql;
mod sqlite;

pub use mongo::MongoEngine;
pub use mysql::MysqlEngine;
pub use sqlite::SqliteEngine;

use devhost_core::{
    application::{ApplicationError, ports::DatabaseEngine},
    domain::DbEngine,
    error::DevhostError,
};

/// One client per supported engine, with default connection settings.
pub fn default_engines() -> Vec<Box<dyn DatabaseEngine>> {
    vec![
        Box::new(MysqlEngine::default()),
        Box::new(SqliteEngine),
        Box::new(MongoEngine::default()),
    ]
}

fn provision_error(engine: DbEngine, database: &str, cause: &DevhostError) -> DevhostError {
    ApplicationError::DatabaseProvision {
        engine: engine.to_string(),
        database: database.to_string(),
        reason: cause.to_string(),
    }
    .into()
}
