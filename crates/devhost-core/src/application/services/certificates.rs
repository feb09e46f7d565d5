//! Certificate Provisioner.
//!
//! Issuers are tried in the order given: normally the local CA first, then
//! the self-signed fallback. An existing complete pair is returned without
//! consulting any issuer.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{info, instrument, warn};

use crate::{
    application::{
        ActionExecutor, ApplicationError, ports::CertificateIssuer, services::ResourceRegistry,
    },
    domain::{CertificateBundle, FileMode, ResourceKind},
    error::DevhostResult,
};

use super::{Applied, resource_for};

pub struct CertificateProvisioner {
    executor: Arc<ActionExecutor>,
    registry: Arc<ResourceRegistry>,
    cert_dir: PathBuf,
    issuers: Vec<Box<dyn CertificateIssuer>>,
    prepared: Mutex<HashSet<&'static str>>,
}

impl CertificateProvisioner {
    pub fn new(
        executor: Arc<ActionExecutor>,
        registry: Arc<ResourceRegistry>,
        cert_dir: impl Into<PathBuf>,
        issuers: Vec<Box<dyn CertificateIssuer>>,
    ) -> Self {
        Self {
            executor,
            registry,
            cert_dir: cert_dir.into(),
            issuers,
            prepared: Mutex::new(HashSet::new()),
        }
    }

    pub fn cert_dir(&self) -> &Path {
        &self.cert_dir
    }

    /// Return the existing bundle for `domain`, or issue a new one.
    #[instrument(skip(self))]
    pub fn obtain(&self, domain: &str) -> DevhostResult<Applied<CertificateBundle>> {
        let bundle = CertificateBundle::for_domain(&self.cert_dir, domain);
        let detail = Some(self.cert_dir.display().to_string());

        let has_key = self.executor.exists(bundle.key_path());
        let has_cert = self.executor.exists(bundle.cert_path());
        if has_key && has_cert {
            info!("reusing existing certificate");
            return Ok(Applied::unchanged(bundle));
        }
        if has_key || has_cert {
            self.executor
                .warn(format!("removing orphaned half of the {domain} certificate pair"));
            self.remove_files(&bundle)?;
        }

        if !self.executor.exists(&self.cert_dir) {
            self.executor.create_dir_all(&self.cert_dir)?;
        }

        let mut failures = Vec::new();
        for issuer in &self.issuers {
            if !issuer.is_available(&self.executor) {
                failures.push(format!("{}: not installed", issuer.name()));
                continue;
            }
            match self.issue_with(issuer.as_ref(), &bundle) {
                Ok(()) => {
                    self.executor.set_mode(bundle.key_path(), FileMode::private())?;
                    self.executor
                        .set_mode(bundle.cert_path(), FileMode::public_read())?;
                    self.registry
                        .record(ResourceKind::Certificate, domain, detail.clone())?;
                    info!(issuer = issuer.name(), "certificate issued");
                    return Ok(Applied::changed(
                        &self.executor,
                        bundle,
                        vec![resource_for(
                            &self.executor,
                            ResourceKind::Certificate,
                            domain,
                            detail,
                        )],
                    ));
                }
                Err(e) => {
                    warn!(issuer = issuer.name(), error = %e, "issuer failed");
                    self.remove_files(&bundle)?;
                    failures.push(format!("{}: {e}", issuer.name()));
                }
            }
        }

        Err(ApplicationError::Certificate {
            domain: domain.to_string(),
            reason: if failures.is_empty() {
                "no certificate issuer configured".into()
            } else {
                failures.join("; ")
            },
        }
        .into())
    }

    /// Delete the pair devhost issued and forget it. A pair without a
    /// registry entry is left on disk. Returns whether anything was removed.
    #[instrument(skip(self))]
    pub fn remove(&self, domain: &str) -> DevhostResult<bool> {
        if !self.registry.exists(ResourceKind::Certificate, domain)? {
            return Ok(false);
        }
        let bundle = CertificateBundle::for_domain(&self.cert_dir, domain);
        self.remove_files(&bundle)?;
        self.registry.forget(ResourceKind::Certificate, domain)
    }

    fn issue_with(
        &self,
        issuer: &dyn CertificateIssuer,
        bundle: &CertificateBundle,
    ) -> DevhostResult<()> {
        self.prepare_once(issuer)?;
        issuer.issue(&self.executor, bundle)?;

        if self.executor.is_dry_run() {
            return Ok(());
        }
        if self.executor.exists(bundle.key_path()) && self.executor.exists(bundle.cert_path()) {
            Ok(())
        } else {
            Err(ApplicationError::Certificate {
                domain: bundle.domain().to_string(),
                reason: format!("{} did not produce both files", issuer.name()),
            }
            .into())
        }
    }

    fn prepare_once(&self, issuer: &dyn CertificateIssuer) -> DevhostResult<()> {
        let already = self
            .prepared
            .lock()
            .map(|set| set.contains(issuer.name()))
            .unwrap_or(false);
        if already {
            return Ok(());
        }
        issuer.prepare(&self.executor)?;
        if let Ok(mut set) = self.prepared.lock() {
            set.insert(issuer.name());
        }
        Ok(())
    }

    fn remove_files(&self, bundle: &CertificateBundle) -> DevhostResult<bool> {
        let mut removed = false;
        for path in [bundle.key_path(), bundle.cert_path()] {
            if self.executor.exists(path) {
                self.executor.remove_file(path)?;
                removed = true;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::application::executor::test_executor_with;
    use crate::application::ports::{
        MockCertificateIssuer, MockFilesystem, MockPortProbe, MockProcessRunner,
        MockResourceStore,
    };
    use crate::domain::{ExecutionMode, StepOutcome};
    use crate::error::ErrorCategory;

    const CERT_DIR: &str = "/etc/devhost/certs";

    type Disk = Arc<Mutex<HashSet<PathBuf>>>;

    /// A filesystem mock backed by a set of existing paths.
    fn filesystem(disk: &Disk) -> MockFilesystem {
        let mut fs = MockFilesystem::new();
        let d = disk.clone();
        fs.expect_exists()
            .returning(move |path| d.lock().unwrap().contains(path));
        let d = disk.clone();
        fs.expect_create_dir_all().returning(move |path| {
            d.lock().unwrap().insert(path.to_path_buf());
            Ok(())
        });
        let d = disk.clone();
        fs.expect_remove_file().returning(move |path| {
            d.lock().unwrap().remove(path);
            Ok(())
        });
        fs.expect_set_mode().returning(|_, _| Ok(()));
        fs
    }

    fn provisioner(disk: &Disk, issuers: Vec<Box<dyn CertificateIssuer>>) -> CertificateProvisioner {
        let exec = test_executor_with(
            ExecutionMode::unattended(),
            filesystem(disk),
            MockProcessRunner::new(),
            MockPortProbe::new(),
        );
        let mut store = MockResourceStore::new();
        store.expect_load().returning(|| Ok(vec![]));
        store.expect_insert().returning(|_| Ok(true));
        let registry = Arc::new(ResourceRegistry::new(exec.clone(), Box::new(store)));
        CertificateProvisioner::new(exec, registry, CERT_DIR, issuers)
    }

    /// An issuer whose `issue` writes the given halves of the pair.
    fn issuer(name: &'static str, disk: &Disk, key: bool, cert: bool) -> MockCertificateIssuer {
        let mut issuer = MockCertificateIssuer::new();
        issuer.expect_name().return_const(name);
        issuer.expect_is_available().return_const(true);
        issuer.expect_prepare().returning(|_| Ok(()));
        let d = disk.clone();
        issuer.expect_issue().returning(move |_, bundle| {
            let mut disk = d.lock().unwrap();
            if key {
                disk.insert(bundle.key_path().to_path_buf());
            }
            if cert {
                disk.insert(bundle.cert_path().to_path_buf());
            }
            Ok(())
        });
        issuer
    }

    fn bundle() -> CertificateBundle {
        CertificateBundle::for_domain(Path::new(CERT_DIR), "blog.local")
    }

    #[test]
    fn orphaned_key_is_removed_before_issuing() {
        let disk: Disk = Arc::default();
        disk.lock().unwrap().extend([
            PathBuf::from(CERT_DIR),
            bundle().key_path().to_path_buf(),
        ]);

        let mut openssl = MockCertificateIssuer::new();
        openssl.expect_name().return_const("openssl");
        openssl.expect_is_available().return_const(true);
        openssl.expect_prepare().returning(|_| Ok(()));
        let d = disk.clone();
        openssl.expect_issue().times(1).returning(move |_, bundle| {
            let mut disk = d.lock().unwrap();
            assert!(!disk.contains(bundle.key_path()), "stale key still present");
            disk.insert(bundle.key_path().to_path_buf());
            disk.insert(bundle.cert_path().to_path_buf());
            Ok(())
        });

        let applied = provisioner(&disk, vec![Box::new(openssl)])
            .obtain("blog.local")
            .unwrap();
        assert_eq!(applied.outcome, StepOutcome::Committed);
        assert_eq!(applied.resources.len(), 1);
    }

    #[test]
    fn issuer_leaving_out_a_file_is_a_certificate_error() {
        let disk: Disk = Arc::default();
        let certs = provisioner(&disk, vec![Box::new(issuer("openssl", &disk, false, true))]);

        let err = certs.obtain("blog.local").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::External);
        assert!(err.to_string().contains("did not produce both files"), "{err}");
        // The half that was written is cleaned up again.
        assert!(!disk.lock().unwrap().contains(bundle().cert_path()));
    }

    #[test]
    fn failing_ca_setup_falls_back_to_the_next_issuer() {
        let disk: Disk = Arc::default();

        let mut mkcert = MockCertificateIssuer::new();
        mkcert.expect_name().return_const("mkcert");
        mkcert.expect_is_available().return_const(true);
        mkcert.expect_prepare().returning(|_| {
            Err(ApplicationError::ExternalTool {
                program: "mkcert".into(),
                code: Some(1),
                stderr: "cannot install CA".into(),
            }
            .into())
        });
        mkcert.expect_issue().never();

        let certs = provisioner(
            &disk,
            vec![Box::new(mkcert), Box::new(issuer("openssl", &disk, true, true))],
        );

        let applied = certs.obtain("blog.local").unwrap();
        assert_eq!(applied.outcome, StepOutcome::Committed);
        let disk = disk.lock().unwrap();
        assert!(disk.contains(bundle().key_path()));
        assert!(disk.contains(bundle().cert_path()));
    }

    #[test]
    fn complete_pair_is_reused_without_any_issuer() {
        let disk: Disk = Arc::default();
        disk.lock().unwrap().extend([
            bundle().key_path().to_path_buf(),
            bundle().cert_path().to_path_buf(),
        ]);
        let mut openssl = MockCertificateIssuer::new();
        openssl.expect_issue().never();

        let applied = provisioner(&disk, vec![Box::new(openssl)])
            .obtain("blog.local")
            .unwrap();
        assert_eq!(applied.outcome, StepOutcome::AlreadyPresent);
        assert!(applied.resources.is_empty());
    }
}
