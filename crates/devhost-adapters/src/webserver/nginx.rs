//! Nginx engine (Debian layout).

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
pub struct NginxEngine {
    sites_available: PathBuf,
    sites_enabled: PathBuf,
}

impl NginxEngine {
    pub fn new() -> Self {
        Self::with_dirs("/etc/nginx/sites-available", "/etc/nginx/sites-enabled")
    }

    pub fn with_dirs(sites_available: impl Into<PathBuf>, sites_enabled: impl Into<PathBuf>) -> Self {
        Self {
            sites_available: sites_available.into(),
            sites_enabled: sites_enabled.into(),
        }
    }

    fn write_config(&self, vhost: &VhostDescriptor, out: &mut String) -> fmt::Result {
        writeln!(out, "# Managed by devhost. Regenerated on every run.")?;
        writeln!(out, "server {{")?;
        writeln!(out, "    listen {};", vhost.http_port())?;
        writeln!(out, "    listen [::]:{};", vhost.http_port())?;
        writeln!(out, "    server_name {};", vhost.domain())?;
        if vhost.tls().is_some() {
            writeln!(out, "    return 301 https://$host$request_uri;")?;
        } else {
            write_body(vhost, out)?;
        }
        writeln!(out, "}}")?;

        if let Some(bundle) = vhost.tls() {
            writeln!(out)?;
            writeln!(out, "server {{")?;
            writeln!(out, "    listen {} ssl;", vhost.https_port())?;
            writeln!(out, "    listen [::]:{} ssl;", vhost.https_port())?;
            writeln!(out, "    server_name {};", vhost.domain())?;
            writeln!(out, "    ssl_certificate {};", bundle.cert_path().display())?;
            writeln!(out, "    ssl_certificate_key {};", bundle.key_path().display())?;
            write_body(vhost, out)?;
            writeln!(out, "}}")?;
        }
        Ok(())
    }
}

fn write_body(vhost: &VhostDescriptor, out: &mut String) -> fmt::Result {
    writeln!(out, "    root {};", vhost.document_root().display())?;
    writeln!(out, "    index index.php index.html;")?;
    writeln!(out, "    access_log /var/log/nginx/{}.access.log;", vhost.domain())?;
    writeln!(out, "    error_log /var/log/nginx/{}.error.log;", vhost.domain())?;
    writeln!(out)?;
    match vhost.backend() {
        AppBackend::Static => {
            writeln!(out, "    location / {{")?;
            writeln!(out, "        try_files $uri $uri/ =404;")?;
            writeln!(out, "    }}")?;
        }
        AppBackend::PhpFpm { socket } => {
            writeln!(out, "    location / {{")?;
            writeln!(out, "        try_files $uri $uri/ /index.php?$query_string;")?;
            writeln!(out, "    }}")?;
            writeln!(out)?;
            writeln!(out, "    location ~ \\.php$ {{")?;
            writeln!(out, "        include snippets/fastcgi-php.conf;")?;
            writeln!(out, "        fastcgi_pass unix:{};", socket.display())?;
            writeln!(out, "    }}")?;
            writeln!(out)?;
            writeln!(out, "    location ~ /\\.ht {{")?;
            writeln!(out, "        deny all;")?;
            writeln!(out, "    }}")?;
        }
        AppBackend::Proxy { host, port } => {
            writeln!(out, "    location / {{")?;
            writeln!(out, "        proxy_pass http://{host}:{port};")?;
            writeln!(out, "        proxy_http_version 1.1;")?;
            writeln!(out, "        proxy_set_header Host $host;")?;
            writeln!(out, "        proxy_set_header X-Real-IP $remote_addr;")?;
            writeln!(out, "        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;")?;
            writeln!(out, "        proxy_set_header X-Forwarded-Proto $scheme;")?;
            writeln!(out, "        proxy_set_header Upgrade $http_upgrade;")?;
            writeln!(out, "        proxy_set_header Connection \"upgrade\";")?;
            writeln!(out, "    }}")?;
        }
    }
    Ok(())
}

impl Default for NginxEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WebServerEngine for NginxEngine {
    fn kind(&self) -> WebServerKind {
        WebServerKind::Nginx
    }

    fn is_available(&self, exec: &ActionExecutor) -> bool {
        exec.program_exists("nginx")
    }

    fn sites_available(&self) -> &Path {
        &self.sites_available
    }

    fn sites_enabled(&self) -> &Path {
        &self.sites_enabled
    }

    fn service_name(&self) -> &str {
        "nginx"
    }

    fn render(&self, vhost: &VhostDescriptor) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_config(vhost, &mut out);
        out
    }

    fn config_test(&self, exec: &ActionExecutor) -> DevhostResult<()> {
        exec.run(&CommandSpec::new("nginx").arg("-t"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devhost_core::domain::CertificateBundle;

    fn proxied() -> VhostDescriptor {
        VhostDescriptor::new(
            "shop.local",
            "/srv/shop/dist",
            AppBackend::Proxy {
                host: "127.0.0.1".into(),
                port: 3001,
            },
        )
        .unwrap()
    }

    #[test]
    fn plain_site_listens_on_80_only() {
        let conf = NginxEngine::new().render(&proxied());
        assert!(conf.contains("listen 80;"));
        assert!(conf.contains("server_name shop.local;"));
        assert!(conf.contains("proxy_pass http://127.0.0.1:3001;"));
        assert!(!conf.contains("ssl"));
    }

    #[test]
    fn tls_site_redirects_and_references_the_bundle() {
        let bundle = CertificateBundle::for_domain(Path::new("/etc/devhost/certs"), "shop.local");
        let conf = NginxEngine::new().render(&proxied().with_tls(bundle));
        assert!(conf.contains("return 301 https://$host$request_uri;"));
        assert!(conf.contains("listen 443 ssl;"));
        assert!(conf.contains("ssl_certificate /etc/devhost/certs/shop.local.crt;"));
        assert!(conf.contains("ssl_certificate_key /etc/devhost/certs/shop.local.key;"));
    }

    #[test]
    fn php_site_passes_to_fpm_socket() {
        let vhost = VhostDescriptor::new(
            "cms.local",
            "/srv/cms",
            AppBackend::PhpFpm {
                socket: "/run/php/php8.3-fpm.sock".into(),
            },
        )
        .unwrap();
        let conf = NginxEngine::new().render(&vhost);
        assert!(conf.contains("fastcgi_pass unix:/run/php/php8.3-fpm.sock;"));
        assert!(conf.contains("root /srv/cms;"));
    }
}
