//! Apache httpd engine (Debian layout).

use std::fmt::{self, Write};
use std::path::{Path, PathBuf};

use devhost_core::{
    application::{
        ActionExecutor,
        ports::{CommandSpec, WebServerEngine},
    },
    domain::{AppBackend, VhostDescriptor, WebServerKind},
    error::DevhostResult,
};

#[derive(Debug, Clone)]
pub struct ApacheEngine {
    sites_available: PathBuf,
    sites_enabled: PathBuf,
}

impl ApacheEngine {
    pub fn new() -> Self {
        Self::with_dirs("/etc/apache2/sites-available", "/etc/apache2/sites-enabled")
    }

    pub fn with_dirs(sites_available: impl Into<PathBuf>, sites_enabled: impl Into<PathBuf>) -> Self {
        Self {
            sites_available: sites_available.into(),
            sites_enabled: sites_enabled.into(),
        }
    }

    fn write_config(&self, vhost: &VhostDescriptor, out: &mut String) -> fmt::Result {
        writeln!(out, "# Managed by devhost. Regenerated on every run.")?;
        writeln!(out, "<VirtualHost *:{}>", vhost.http_port())?;
        writeln!(out, "    ServerName {}", vhost.domain())?;
        if vhost.tls().is_some() {
            writeln!(out, "    Redirect permanent / https://{}/", vhost.domain())?;
        } else {
            write_body(vhost, out)?;
        }
        writeln!(out, "</VirtualHost>")?;

        if let Some(bundle) = vhost.tls() {
            writeln!(out)?;
            writeln!(out, "<IfModule mod_ssl.c>")?;
            writeln!(out, "<VirtualHost *:{}>", vhost.https_port())?;
            writeln!(out, "    ServerName {}", vhost.domain())?;
            writeln!(out, "    SSLEngine on")?;
            writeln!(out, "    SSLCertificateFile {}", bundle.cert_path().display())?;
            writeln!(out, "    SSLCertificateKeyFile {}", bundle.key_path().display())?;
            write_body(vhost, out)?;
            writeln!(out, "</VirtualHost>")?;
            writeln!(out, "</IfModule>")?;
        }
        Ok(())
    }
}

fn write_body(vhost: &VhostDescriptor, out: &mut String) -> fmt::Result {
    let root = vhost.document_root().display();
    writeln!(out, "    DocumentRoot {root}")?;
    writeln!(out, "    <Directory {root}>")?;
    writeln!(out, "        Options -Indexes +FollowSymLinks")?;
    writeln!(out, "        AllowOverride All")?;
    writeln!(out, "        Require all granted")?;
    writeln!(out, "        DirectoryIndex index.php index.html")?;
    writeln!(out, "    </Directory>")?;
    match vhost.backend() {
        AppBackend::Static => {}
        AppBackend::PhpFpm { socket } => {
            writeln!(out, "    <FilesMatch \\.php$>")?;
            writeln!(
                out,
                "        SetHandler \"proxy:unix:{}|fcgi://localhost\"",
                socket.display()
            )?;
            writeln!(out, "    </FilesMatch>")?;
        }
        AppBackend::Proxy { host, port } => {
            writeln!(out, "    ProxyPreserveHost On")?;
            writeln!(out, "    ProxyPass / http://{host}:{port}/")?;
            writeln!(out, "    ProxyPassReverse / http://{host}:{port}/")?;
        }
    }
    writeln!(out, "    ErrorLog ${{APACHE_LOG_DIR}}/{}-error.log", vhost.domain())?;
    writeln!(
        out,
        "    CustomLog ${{APACHE_LOG_DIR}}/{}-access.log combined",
        vhost.domain()
    )?;
    Ok(())
}

impl Default for ApacheEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WebServerEngine for ApacheEngine {
    fn kind(&self) -> WebServerKind {
        WebServerKind::Apache
    }

    fn is_available(&self, exec: &ActionExecutor) -> bool {
        exec.program_exists("apache2") || exec.program_exists("apachectl")
    }

    fn sites_available(&self) -> &Path {
        &self.sites_available
    }

    fn sites_enabled(&self) -> &Path {
        &self.sites_enabled
    }

    fn service_name(&self) -> &str {
        "apache2"
    }

    fn render(&self, vhost: &VhostDescriptor) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_config(vhost, &mut out);
        out
    }

    fn config_test(&self, exec: &ActionExecutor) -> DevhostResult<()> {
        exec.run(&CommandSpec::new("apachectl").arg("configtest"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devhost_core::domain::CertificateBundle;

    fn static_site() -> VhostDescriptor {
        VhostDescriptor::new("blog.local", "/srv/www/blog", AppBackend::Static).unwrap()
    }

    #[test]
    fn static_site_serves_document_root() {
        let conf = ApacheEngine::new().render(&static_site());
        assert!(conf.contains("<VirtualHost *:80>"));
        assert!(conf.contains("ServerName blog.local"));
        assert!(conf.contains("DocumentRoot /srv/www/blog"));
        assert!(!conf.contains("SSLEngine"));
        assert!(!conf.contains("ProxyPass"));
    }

    #[test]
    fn tls_site_gets_443_block_with_bundle_paths() {
        let bundle = CertificateBundle::for_domain(Path::new("/etc/devhost/certs"), "blog.local");
        let conf = ApacheEngine::new().render(&static_site().with_tls(bundle));
        assert!(conf.contains("Redirect permanent / https://blog.local/"));
        assert!(conf.contains("<VirtualHost *:443>"));
        assert!(conf.contains("SSLCertificateFile /etc/devhost/certs/blog.local.crt"));
        assert!(conf.contains("SSLCertificateKeyFile /etc/devhost/certs/blog.local.key"));
    }

    #[test]
    fn proxied_site_forwards_to_app_port() {
        let vhost = VhostDescriptor::new(
            "api.local",
            "/srv/api/public",
            AppBackend::Proxy {
                host: "127.0.0.1".into(),
                port: 3000,
            },
        )
        .unwrap();
        let conf = ApacheEngine::new().render(&vhost);
        assert!(conf.contains("ProxyPass / http://127.0.0.1:3000/"));
    }
}
