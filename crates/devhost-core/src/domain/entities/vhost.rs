use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::{entities::certificate::CertificateBundle, error::DomainError};

pub const HTTP_PORT: u16 = 80;
pub const HTTPS_PORT: u16 = 443;

/// Where dynamic requests for a site are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppBackend {
    /// Everything served from the document root.
    Static,
    /// `.php` requests handed to php-fpm on a unix socket.
    PhpFpm { socket: PathBuf },
    /// Every request proxied to `http://host:port`.
    Proxy { host: String, port: u16 },
}

impl fmt::Display for AppBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => f.write_str("static"),
            Self::PhpFpm { socket } => write!(f, "php-fpm ({})", socket.display()),
            Self::Proxy { host, port } => write!(f, "proxy (http://{host}:{port})"),
        }
    }
}

/// Engine-independent description of one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VhostDescriptor {
    domain: String,
    document_root: PathBuf,
    tls: Option<CertificateBundle>,
    backend: AppBackend,
    http_port: u16,
    https_port: u16,
}

impl VhostDescriptor {
    pub fn new(
        domain: impl Into<String>,
        document_root: impl Into<PathBuf>,
        backend: AppBackend,
    ) -> Result<Self, DomainError> {
        let document_root = document_root.into();
        if !document_root.is_absolute() {
            return Err(DomainError::InvalidRequest(format!(
                "document root must be absolute: {}",
                document_root.display()
            )));
        }
        Ok(Self {
            domain: domain.into(),
            document_root,
            tls: None,
            backend,
            http_port: HTTP_PORT,
            https_port: HTTPS_PORT,
        })
    }

    /// Attach a certificate bundle, enabling the TLS listener.
    pub fn with_tls(mut self, bundle: CertificateBundle) -> Self {
        self.tls = Some(bundle);
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
    pub fn document_root(&self) -> &Path {
        &self.document_root
    }
    pub fn tls(&self) -> Option<&CertificateBundle> {
        self.tls.as_ref()
    }
    pub fn backend(&self) -> &AppBackend {
        &self.backend
    }
    pub const fn http_port(&self) -> u16 {
        self.http_port
    }
    pub const fn https_port(&self) -> u16 {
        self.https_port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_relative_document_root() {
        assert!(VhostDescriptor::new("blog.local", "blog", AppBackend::Static).is_err());
    }

    #[test]
    fn tls_is_off_until_a_bundle_is_attached() {
        let vhost = VhostDescriptor::new("blog.local", "/srv/blog", AppBackend::Static).unwrap();
        assert!(vhost.tls().is_none());
        assert_eq!(vhost.http_port(), 80);

        let bundle = CertificateBundle::for_domain(Path::new("/certs"), "blog.local");
        let vhost = vhost.with_tls(bundle.clone());
        assert_eq!(vhost.tls(), Some(&bundle));
        assert_eq!(vhost.https_port(), 443);
    }
}
