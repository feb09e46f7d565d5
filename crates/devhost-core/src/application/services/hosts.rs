//! Host Resolution Writer - loopback mappings in the static hosts table.
//!
//! The table is only ever appended to after a timestamped backup copy has
//! been taken next to it. A domain already mapped to loopback is left alone;
//! a domain mapped anywhere else is a conflict the operator must resolve.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use crate::{
    application::{ActionExecutor, ApplicationError, services::ResourceRegistry},
    domain::ResourceKind,
    error::DevhostResult,
};

use super::{Applied, resource_for};

pub const LOOPBACK_V4: &str = "127.0.0.1";
const LOOPBACK_V6: &str = "::1";

/// How the table currently resolves a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mapping {
    Absent,
    Loopback,
    /// Mapped to a non-loopback address.
    Foreign(String),
}

/// Address and host names of one table line, comments stripped.
fn parse_line(line: &str) -> Option<(&str, impl Iterator<Item = &str>)> {
    let content = line.split('#').next().unwrap_or_default();
    let mut tokens = content.split_whitespace();
    let address = tokens.next()?;
    Some((address, tokens))
}

fn line_lists(line: &str, domain: &str) -> bool {
    parse_line(line).is_some_and(|(_, mut hosts)| hosts.any(|h| h.eq_ignore_ascii_case(domain)))
}

/// Loopback lines win over foreign ones so a table that lists both is
/// treated as already mapped.
pub fn lookup(table: &str, domain: &str) -> Mapping {
    let mut foreign = None;
    for line in table.lines() {
        let Some((address, mut hosts)) = parse_line(line) else {
            continue;
        };
        if !hosts.any(|h| h.eq_ignore_ascii_case(domain)) {
            continue;
        }
        if address == LOOPBACK_V4 || address == LOOPBACK_V6 {
            return Mapping::Loopback;
        }
        foreign.get_or_insert_with(|| address.to_string());
    }
    foreign.map_or(Mapping::Absent, Mapping::Foreign)
}

pub struct HostsWriter {
    executor: Arc<ActionExecutor>,
    registry: Arc<ResourceRegistry>,
    table: PathBuf,
}

impl HostsWriter {
    pub fn new(
        executor: Arc<ActionExecutor>,
        registry: Arc<ResourceRegistry>,
        table: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executor,
            registry,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &Path {
        &self.table
    }

    /// Append `127.0.0.1    <domain>` unless a loopback line already lists it.
    #[instrument(skip(self))]
    pub fn ensure_mapping(&self, domain: &str) -> DevhostResult<Applied<()>> {
        let contents = self.executor.read_to_string(&self.table)?;

        match lookup(&contents, domain) {
            Mapping::Loopback => {
                // Only lines devhost appended are registered; this one may be
                // the operator's and must survive teardown.
                info!("hosts table already maps domain to loopback");
                return Ok(Applied::unchanged(()));
            }
            Mapping::Foreign(address) => {
                return Err(ApplicationError::ResourceConflict {
                    key: domain.to_string(),
                    reason: format!("{} maps it to {address}", self.table.display()),
                }
                .into());
            }
            Mapping::Absent => {}
        }

        self.backup()?;

        let separator = if contents.is_empty() || contents.ends_with('\n') {
            ""
        } else {
            "\n"
        };
        let line = format!("{separator}{LOOPBACK_V4}    {domain}\n");
        self.executor.append_file(&self.table, &line)?;

        let detail = Some(self.table.display().to_string());
        self.registry
            .record(ResourceKind::HostsEntry, domain, detail.clone())?;

        Ok(Applied::changed(
            &self.executor,
            (),
            vec![resource_for(&self.executor, ResourceKind::HostsEntry, domain, detail)],
        ))
    }

    /// Drop every line listing `domain` as a host name, if devhost added it.
    #[instrument(skip(self))]
    pub fn remove_mapping(&self, domain: &str) -> DevhostResult<bool> {
        if !self.registry.exists(ResourceKind::HostsEntry, domain)? {
            info!("hosts entry not managed by devhost, leaving the table alone");
            return Ok(false);
        }
        let contents = self.executor.read_to_string(&self.table)?;
        if !contents.lines().any(|line| line_lists(line, domain)) {
            self.registry.forget(ResourceKind::HostsEntry, domain)?;
            return Ok(false);
        }

        self.backup()?;

        let mut kept: String = contents
            .lines()
            .filter(|line| !line_lists(line, domain))
            .collect::<Vec<_>>()
            .join("\n");
        kept.push('\n');
        self.executor.write_file(&self.table, &kept)?;

        self.registry.forget(ResourceKind::HostsEntry, domain)?;
        Ok(true)
    }

    /// Copy the table to `<table>.devhost-<YYYYmmddHHMMSSmmm>.bak`, never
    /// overwriting an earlier backup.
    fn backup(&self) -> DevhostResult<PathBuf> {
        let file_name = self
            .table
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "hosts".into());
        let stamp = Utc::now().format("%Y%m%d%H%M%S%3f").to_string();
        let backup = unused_backup_path(&self.table, &file_name, &stamp, |path| {
            self.executor.exists(path)
        });

        self.executor
            .copy_file(&self.table, &backup)
            .map_err(|e| ApplicationError::BackupRequired {
                path: self.table.clone(),
                reason: e.to_string(),
            })?;
        Ok(backup)
    }
}

/// First of `<name>.devhost-<stamp>.bak`, `<name>.devhost-<stamp>-1.bak`, ...
/// that does not exist yet.
fn unused_backup_path(
    table: &Path,
    file_name: &str,
    stamp: &str,
    exists: impl Fn(&Path) -> bool,
) -> PathBuf {
    let mut candidate = table.with_file_name(format!("{file_name}.devhost-{stamp}.bak"));
    let mut attempt = 1;
    while exists(&candidate) {
        candidate = table.with_file_name(format!("{file_name}.devhost-{stamp}-{attempt}.bak"));
        attempt += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
127.0.0.1   localhost
::1         localhost ip6-localhost
# 10.0.0.5  commented.local
192.168.1.20  nas.lan  media.lan
";

    #[test]
    fn finds_loopback_mapping() {
        assert_eq!(lookup(TABLE, "localhost"), Mapping::Loopback);
        assert_eq!(lookup(TABLE, "ip6-localhost"), Mapping::Loopback);
    }

    #[test]
    fn reports_foreign_mapping() {
        assert_eq!(
            lookup(TABLE, "media.lan"),
            Mapping::Foreign("192.168.1.20".into())
        );
    }

    #[test]
    fn ignores_comments_and_partial_names() {
        assert_eq!(lookup(TABLE, "commented.local"), Mapping::Absent);
        assert_eq!(lookup(TABLE, "local"), Mapping::Absent);
        assert_eq!(lookup(TABLE, "nas"), Mapping::Absent);
    }

    #[test]
    fn matches_host_tokens_only() {
        assert!(line_lists("127.0.0.1    blog.local", "blog.local"));
        assert!(!line_lists("127.0.0.1    myblog.local", "blog.local"));
        assert!(!line_lists("# 127.0.0.1 blog.local", "blog.local"));
    }

    #[test]
    fn loopback_wins_over_foreign() {
        let table = "10.0.0.1 blog.local\n127.0.0.1 blog.local\n";
        assert_eq!(lookup(table, "blog.local"), Mapping::Loopback);
    }

    #[test]
    fn backup_name_never_reuses_an_existing_file() {
        let table = Path::new("/etc/hosts");
        let taken = [
            PathBuf::from("/etc/hosts.devhost-20260101120000123.bak"),
            PathBuf::from("/etc/hosts.devhost-20260101120000123-1.bak"),
        ];
        let path = unused_backup_path(table, "hosts", "20260101120000123", |p| {
            taken.iter().any(|t| t == p)
        });
        assert_eq!(path, PathBuf::from("/etc/hosts.devhost-20260101120000123-2.bak"));

        let fresh = unused_backup_path(table, "hosts", "20260101120000124", |_| false);
        assert_eq!(fresh, PathBuf::from("/etc/hosts.devhost-20260101120000124.bak"));
    }
}
