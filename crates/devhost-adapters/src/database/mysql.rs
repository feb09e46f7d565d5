//! MySQL / MariaDB through the `mysql` and `mysqladmin` clients.
//!
//! Statements go to the client's stdin, so the generated password never
//! appears in argv, the process table or the journal.

use devhost_core::{
    application::{
        ActionExecutor, ApplicationError,
        ports::{CommandSpec, DatabaseEngine, DatabaseSpec},
    },
    domain::{ConnectionParams, DbEngine, Secret},
    error::DevhostResult,
};
use tracing::instrument;

use super::provision_error;

#[derive(Debug, Clone)]
pub struct MysqlEngine {
    /// Administrative account; `root` authenticates over the unix socket on
    /// stock Debian installs.
    admin_user: String,
    host: String,
    port: u16,
}

impl MysqlEngine {
    pub fn new(admin_user: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            admin_user: admin_user.into(),
            host: host.into(),
            port,
        }
    }

    /// SQL creating the database and its owner. Identifiers are already
    /// restricted to `[a-z0-9_]`.
    pub fn provisioning_sql(database: &str, username: &str, secret: &Secret) -> Secret {
        let password = secret.expose().replace('\\', "\\\\").replace('\'', "''");
        Secret::new(format!(
            "CREATE DATABASE IF NOT EXISTS `{database}` CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;\n\
             CREATE USER IF NOT EXISTS '{username}'@'localhost' IDENTIFIED BY '{password}';\n\
             ALTER USER '{username}'@'localhost' IDENTIFIED BY '{password}';\n\
             GRANT ALL PRIVILEGES ON `{database}`.* TO '{username}'@'localhost';\n\
             FLUSH PRIVILEGES;\n"
        ))
    }
}

impl Default for MysqlEngine {
    fn default() -> Self {
        Self::new("root", "127.0.0.1", 3306)
    }
}

impl DatabaseEngine for MysqlEngine {
    fn kind(&self) -> DbEngine {
        DbEngine::Mysql
    }

    fn ping(&self, exec: &ActionExecutor) -> DevhostResult<()> {
        let command = CommandSpec::new("mysqladmin").args(["-u", self.admin_user.as_str(), "ping"]);
        exec.query_ok(&command)
            .map(|_| ())
            .map_err(|e| provision_error(DbEngine::Mysql, "server", &e))
    }

    #[instrument(skip_all, fields(database = %spec.database))]
    fn provision(&self, exec: &ActionExecutor, spec: &DatabaseSpec) -> DevhostResult<ConnectionParams> {
        let (Some(username), Some(secret)) = (&spec.username, &spec.secret) else {
            return Err(ApplicationError::DatabaseProvision {
                engine: DbEngine::Mysql.to_string(),
                database: spec.database.clone(),
                reason: "a user and password are required".into(),
            }
            .into());
        };

        let command = CommandSpec::new("mysql")
            .args(["-u", self.admin_user.as_str()])
            .stdin(Self::provisioning_sql(&spec.database, username, secret));
        exec.run(&command)
            .map_err(|e| provision_error(DbEngine::Mysql, &spec.database, &e))?;

        Ok(ConnectionParams::Network {
            host: self.host.clone(),
            port: self.port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_covers_database_user_and_grants() {
        let sql = MysqlEngine::provisioning_sql("shop", "shop", &Secret::new("s3cr3t+/="));
        let sql = sql.expose();
        assert!(sql.contains("CREATE DATABASE IF NOT EXISTS `shop`"));
        assert!(sql.contains("CREATE USER IF NOT EXISTS 'shop'@'localhost'"));
        assert!(sql.contains("ALTER USER 'shop'@'localhost' IDENTIFIED BY 's3cr3t+/='"));
        assert!(sql.contains("GRANT ALL PRIVILEGES ON `shop`.* TO 'shop'@'localhost'"));
        assert!(sql.trim_end().ends_with("FLUSH PRIVILEGES;"));
    }

    #[test]
    fn quotes_in_password_are_escaped() {
        let sql = MysqlEngine::provisioning_sql("a", "a", &Secret::new("it's"));
        assert!(sql.expose().contains("IDENTIFIED BY 'it''s'"));
    }
}
