use devhost_core::{
    application::{
        ActionExecutor,
        ports::{CommandSpec, ServiceManager},
    },
    error::DevhostResult,
};
use tracing::debug;

/// `systemctl`-driven daemon control.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemctlServiceManager;

impl ServiceManager for SystemctlServiceManager {
    fn is_active(&self, exec: &ActionExecutor, service: &str) -> bool {
        exec.query(&CommandSpec::new("systemctl").args(["is-active", "--quiet", service]))
            .is_ok_and(|out| out.is_success())
    }

    fn ensure_running(&self, exec: &ActionExecutor, service: &str) -> DevhostResult<()> {
        if self.is_active(exec, service) {
            debug!(service, "already active");
            return Ok(());
        }
        exec.run(&CommandSpec::new("systemctl").args(["enable", "--now", service]))?;
        Ok(())
    }

    fn reload(&self, exec: &ActionExecutor, service: &str) -> DevhostResult<()> {
        exec.run(&CommandSpec::new("systemctl").args(["reload", service]))?;
        Ok(())
    }
}
