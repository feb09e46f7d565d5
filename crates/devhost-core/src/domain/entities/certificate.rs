use std::path::{Path, PathBuf};

/// A TLS key/certificate pair for one domain.
///
/// Paths are derived from the certificate directory and the domain, so the
/// same domain always maps to the same two files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateBundle {
    domain: String,
    key_path: PathBuf,
    cert_path: PathBuf,
}

impl CertificateBundle {
    /// `<cert_dir>/<domain>.key` and `<cert_dir>/<domain>.crt`.
    pub fn for_domain(cert_dir: &Path, domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            key_path: cert_dir.join(format!("{domain}.key")),
            cert_path: cert_dir.join(format!("{domain}.crt")),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    pub fn cert_path(&self) -> &Path {
        &self.cert_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_domain() {
        let b = CertificateBundle::for_domain(Path::new("/etc/devhost/certs"), "blog.local");
        assert_eq!(b.key_path(), Path::new("/etc/devhost/certs/blog.local.key"));
        assert_eq!(b.cert_path(), Path::new("/etc/devhost/certs/blog.local.crt"));
    }
}
