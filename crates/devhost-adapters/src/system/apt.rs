use devhost_core::{
    application::{
        ActionExecutor,
        ports::{CommandSpec, PackageManager},
    },
    error::DevhostResult,
};
use tracing::info;

/// Debian/Ubuntu packages through `dpkg-query` and `apt-get`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AptPackageManager;

impl PackageManager for AptPackageManager {
    fn is_installed(&self, exec: &ActionExecutor, package: &str) -> bool {
        exec.query(&CommandSpec::new("dpkg-query").args(["-W", "-f=${Status}", package]))
            .is_ok_and(|out| out.is_success() && out.stdout.contains("install ok installed"))
    }

    fn ensure_installed(&self, exec: &ActionExecutor, packages: &[&str]) -> DevhostResult<()> {
        let missing: Vec<&str> = packages
            .iter()
            .copied()
            .filter(|package| !self.is_installed(exec, package))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        info!(packages = ?missing, "installing packages");
        exec.run(&CommandSpec::new("apt-get").arg("update"))?;
        exec.run(
            &CommandSpec::new("apt-get")
                .args(["install", "-y", "--no-install-recommends"])
                .args(missing),
        )?;
        Ok(())
    }
}
