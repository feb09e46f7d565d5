//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate only sees the values it is handed.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `DEVHOST_*` environment variables, `__` between sections
//!    (`DEVHOST_PORTS__START=4000`)
//! 3. Config file (`--config`, else the platform config path)
//! 4. Built-in defaults (always present)

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "DEVHOST";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub ports: PortsConfig,
    pub php: PhpConfig,
    pub proxy: ProxyConfig,
    pub process: ProcessConfig,
    pub nginx: SitesConfig,
    pub apache: SitesConfig,
    pub mysql: MysqlConfig,
    pub mongo: MongoConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Registry, lock files and the audit log.
    pub state_dir: PathBuf,
    pub cert_dir: PathBuf,
    pub hosts_file: PathBuf,
    /// Default parent directory for new projects.
    pub projects_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortsConfig {
    pub start: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhpConfig {
    pub fpm_socket: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub host: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitesConfig {
    pub sites_available: PathBuf,
    pub sites_enabled: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MysqlConfig {
    pub admin_user: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MongoConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig {
                state_dir: default_state_dir(),
                cert_dir: PathBuf::from("/etc/devhost/certs"),
                hosts_file: PathBuf::from("/etc/hosts"),
                projects_root: PathBuf::from("/var/www"),
            },
            ports: PortsConfig { start: 3000 },
            php: PhpConfig {
                fpm_socket: PathBuf::from("/run/php/php-fpm.sock"),
            },
            proxy: ProxyConfig {
                host: "127.0.0.1".into(),
            },
            process: ProcessConfig { timeout_secs: 600 },
            nginx: SitesConfig {
                sites_available: PathBuf::from("/etc/nginx/sites-available"),
                sites_enabled: PathBuf::from("/etc/nginx/sites-enabled"),
            },
            apache: SitesConfig {
                sites_available: PathBuf::from("/etc/apache2/sites-available"),
                sites_enabled: PathBuf::from("/etc/apache2/sites-enabled"),
            },
            mysql: MysqlConfig {
                admin_user: "root".into(),
                host: "127.0.0.1".into(),
                port: 3306,
            },
            mongo: MongoConfig {
                host: "127.0.0.1".into(),
                port: 27017,
            },
            output: OutputConfig { no_color: false },
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the file, then the environment.
    ///
    /// An explicitly named file must exist; the default one is optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let defaults = toml::to_string(&Self::default()).context("serialising defaults")?;
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };

        Config::builder()
            .add_source(File::from_str(&defaults, FileFormat::Toml))
            .add_source(File::from(path.as_path()).format(FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("reading configuration from {}", path.display()))?
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.devhost.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "devhost", "devhost")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".devhost.toml"))
    }

    /// The file `load` would read, given the `--config` flag.
    pub fn active_path(config_file: Option<&PathBuf>) -> PathBuf {
        config_file.cloned().unwrap_or_else(Self::config_path)
    }

    pub fn process_timeout(&self) -> Duration {
        Duration::from_secs(self.process.timeout_secs)
    }

    pub fn registry_path(&self) -> PathBuf {
        self.paths.state_dir.join("registry.toml")
    }
}

fn default_state_dir() -> PathBuf {
    directories::ProjectDirs::from("dev", "devhost", "devhost")
        .map(|d| {
            d.state_dir()
                .unwrap_or_else(|| d.data_local_dir())
                .to_path_buf()
        })
        .unwrap_or_else(|| PathBuf::from("/var/lib/devhost"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_debian_layout() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.paths.hosts_file, PathBuf::from("/etc/hosts"));
        assert_eq!(cfg.ports.start, 3000);
        assert_eq!(cfg.process_timeout(), Duration::from_secs(600));
        assert!(cfg.nginx.sites_enabled.ends_with("sites-enabled"));
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("devhost.toml");
        std::fs::write(
            &path,
            "[ports]\nstart = 4100\n\n[paths]\ncert_dir = \"/tmp/certs\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.ports.start, 4100);
        assert_eq!(cfg.paths.cert_dir, PathBuf::from("/tmp/certs"));
        assert_eq!(cfg.paths.hosts_file, PathBuf::from("/etc/hosts"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("devhost.toml");
        std::fs::write(&path, "[ports]\nstart = \"soon\"\n").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let rendered = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }

    #[test]
    fn config_path_is_not_empty() {
        assert!(!AppConfig::config_path().as_os_str().is_empty());
    }
}
