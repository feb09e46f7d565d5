use std::path::PathBuf;

use devhost_core::{
    application::{
        ActionExecutor,
        ports::{DatabaseEngine, DatabaseSpec},
    },
    domain::{ConnectionParams, DbEngine},
    error::DevhostResult,
};

/// Embedded database: an empty file at `<project>/database/<name>.sqlite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteEngine;

impl SqliteEngine {
    pub fn database_path(spec: &DatabaseSpec) -> PathBuf {
        spec.project_dir
            .join("database")
            .join(format!("{}.sqlite", spec.database))
    }
}

impl DatabaseEngine for SqliteEngine {
    fn kind(&self) -> DbEngine {
        DbEngine::Sqlite
    }

    /// Nothing to reach.
    fn ping(&self, _exec: &ActionExecutor) -> DevhostResult<()> {
        Ok(())
    }

    fn provision(&self, exec: &ActionExecutor, spec: &DatabaseSpec) -> DevhostResult<ConnectionParams> {
        let path = Self::database_path(spec);
        if let Some(dir) = path.parent() {
            if !exec.exists(dir) {
                exec.create_dir_all(dir)?;
            }
        }
        if !exec.exists(&path) {
            exec.write_file(&path, "")?;
        }
        Ok(ConnectionParams::File { path })
    }
}
