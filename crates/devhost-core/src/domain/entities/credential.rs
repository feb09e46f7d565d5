//! Database credentials and the secret wrapper that carries them.
//!
//! A [`Secret`] never prints its value: `Debug` and `Display` both render a
//! placeholder, and the buffer is wiped when dropped. The only way to read
//! it is [`Secret::expose`], which keeps every disclosure greppable.

use std::fmt;
use std::path::{Path, PathBuf};

use base64::{Engine, engine::general_purpose::STANDARD};
use rand::{RngCore, rngs::OsRng};
use zeroize::Zeroizing;

use crate::domain::value_objects::DbEngine;

/// Random bytes behind every generated password.
pub const SECRET_BYTES: usize = 16;

const REDACTED: &str = "***";

/// A string that is zeroed on drop and redacted when formatted.
#[derive(Clone)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Fresh password: [`SECRET_BYTES`] from the OS RNG, standard base64.
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0u8; SECRET_BYTES]);
        OsRng.fill_bytes(bytes.as_mut());
        Self::new(STANDARD.encode(bytes.as_ref()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({REDACTED})")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

/// How an application reaches its database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionParams {
    Network { host: String, port: u16 },
    File { path: PathBuf },
}

/// Everything needed to connect to a freshly provisioned database.
#[derive(Debug, Clone)]
pub struct DbCredential {
    pub engine: DbEngine,
    pub database: String,
    pub username: Option<String>,
    pub secret: Option<Secret>,
    pub connection: ConnectionParams,
    pub sidecar_path: PathBuf,
}

impl DbCredential {
    /// Name of the sidecar file written into the project root.
    pub const SIDECAR_FILE: &'static str = ".devhost-db.env";

    pub fn sidecar_path_for(project_dir: &Path) -> PathBuf {
        project_dir.join(Self::SIDECAR_FILE)
    }

    /// `KEY=value` lines for the sidecar. Contains the secret in clear.
    pub fn sidecar_contents(&self) -> Zeroizing<String> {
        let mut out = Zeroizing::new(String::new());
        out.push_str(&format!("DB_ENGINE={}\n", self.engine));
        out.push_str(&format!("DB_NAME={}\n", self.database));
        if let Some(user) = &self.username {
            out.push_str(&format!("DB_USER={user}\n"));
        }
        if let Some(secret) = &self.secret {
            out.push_str("DB_PASS=");
            out.push_str(secret.expose());
            out.push('\n');
        }
        match &self.connection {
            ConnectionParams::Network { host, port } => {
                out.push_str(&format!("DB_HOST={host}\nDB_PORT={port}\n"));
            }
            ConnectionParams::File { path } => {
                out.push_str(&format!("DB_PATH={}\n", path.display()));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_is_redacted_when_formatted() {
        let s = Secret::new("hunter2");
        assert_eq!(format!("{s}"), "***");
        assert_eq!(format!("{s:?}"), "Secret(***)");
        assert_eq!(s.expose(), "hunter2");
    }

    #[test]
    fn generated_secrets_are_fresh_and_long_enough() {
        let a = Secret::generate();
        let b = Secret::generate();
        assert_ne!(a.expose(), b.expose());
        // 16 bytes -> 24 base64 chars
        assert_eq!(a.expose().len(), 24);
    }

    #[test]
    fn sidecar_for_relational_engine_has_credentials_and_host() {
        let cred = DbCredential {
            engine: DbEngine::Mysql,
            database: "blog".into(),
            username: Some("blog".into()),
            secret: Some(Secret::new("pw")),
            connection: ConnectionParams::Network {
                host: "127.0.0.1".into(),
                port: 3306,
            },
            sidecar_path: DbCredential::sidecar_path_for(Path::new("/srv/blog")),
        };
        let text = cred.sidecar_contents();
        assert!(text.contains("DB_NAME=blog\n"));
        assert!(text.contains("DB_USER=blog\n"));
        assert!(text.contains("DB_PASS=pw\n"));
        assert!(text.contains("DB_PORT=3306\n"));
        assert_eq!(cred.sidecar_path, PathBuf::from("/srv/blog/.devhost-db.env"));
        assert!(!format!("{cred:?}").contains("pw\""));
    }

    #[test]
    fn sidecar_for_embedded_engine_has_path() {
        let cred = DbCredential {
            engine: DbEngine::Sqlite,
            database: "blog".into(),
            username: None,
            secret: None,
            connection: ConnectionParams::File {
                path: "/srv/blog/database/blog.sqlite".into(),
            },
            sidecar_path: "/srv/blog/.devhost-db.env".into(),
        };
        let text = cred.sidecar_contents();
        assert!(text.contains("DB_PATH=/srv/blog/database/blog.sqlite\n"));
        assert!(!text.contains("DB_PASS"));
    }
}
