use devhost_core::{
    application::{
        ActionExecutor,
        ports::{CertificateIssuer, CommandSpec},
    },
    domain::{CertificateBundle, FileMode},
    error::DevhostResult,
};

/// Lifetime of self-signed certificates, in days.
pub const VALIDITY_DAYS: u32 = 825;

/// Self-signed RSA-2048 certificate with a DNS subjectAltName.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpensslIssuer;

impl OpensslIssuer {
    pub fn command(bundle: &CertificateBundle) -> CommandSpec {
        let domain = bundle.domain();
        CommandSpec::new("openssl").args([
            "req".to_string(),
            "-x509".into(),
            "-newkey".into(),
            "rsa:2048".into(),
            "-nodes".into(),
            "-days".into(),
            VALIDITY_DAYS.to_string(),
            "-subj".into(),
            format!("/CN={domain}"),
            "-addext".into(),
            format!("subjectAltName=DNS:{domain}"),
            "-keyout".into(),
            bundle.key_path().display().to_string(),
            "-out".into(),
            bundle.cert_path().display().to_string(),
        ])
    }
}

impl CertificateIssuer for OpensslIssuer {
    fn name(&self) -> &'static str {
        "openssl"
    }

    fn is_available(&self, exec: &ActionExecutor) -> bool {
        exec.program_exists("openssl")
    }

    /// The key file is created `0600` first; openssl truncates it in place
    /// and the mode survives.
    fn issue(&self, exec: &ActionExecutor, bundle: &CertificateBundle) -> DevhostResult<()> {
        exec.write_file_with_mode(bundle.key_path(), "", FileMode::private())?;
        exec.run(&Self::command(bundle))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn command_names_both_output_files_and_san() {
        let bundle = CertificateBundle::for_domain(Path::new("/certs"), "blog.local");
        let rendered = OpensslIssuer::command(&bundle).to_string();
        assert!(rendered.starts_with("openssl req -x509 -newkey rsa:2048 -nodes -days 825"));
        assert!(rendered.contains("-subj /CN=blog.local"));
        assert!(rendered.contains("-addext subjectAltName=DNS:blog.local"));
        assert!(rendered.contains("-keyout /certs/blog.local.key -out /certs/blog.local.crt"));
    }
}
