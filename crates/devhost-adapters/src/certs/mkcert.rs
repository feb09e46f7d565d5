use devhost_core::{
    application::{
        ActionExecutor,
        ports::{CertificateIssuer, CommandSpec},
    },
    domain::CertificateBundle,
    error::DevhostResult,
};

/// Issues from mkcert's local CA, installing the CA into the trust stores
/// before the first issue.
#[derive(Debug, Clone, Copy, Default)]
pub struct MkcertIssuer;

impl CertificateIssuer for MkcertIssuer {
    fn name(&self) -> &'static str {
        "mkcert"
    }

    fn is_available(&self, exec: &ActionExecutor) -> bool {
        exec.program_exists("mkcert")
    }

    fn prepare(&self, exec: &ActionExecutor) -> DevhostResult<()> {
        exec.run(&CommandSpec::new("mkcert").arg("-install"))?;
        Ok(())
    }

    fn issue(&self, exec: &ActionExecutor, bundle: &CertificateBundle) -> DevhostResult<()> {
        let command = CommandSpec::new("mkcert")
            .arg("-key-file")
            .arg(bundle.key_path().display().to_string())
            .arg("-cert-file")
            .arg(bundle.cert_path().display().to_string())
            .arg(bundle.domain());
        exec.run(&command)?;
        Ok(())
    }
}
