//! Service and package managers.

mod apt;
mod systemd;

pub use apt::AptPackageManager;
pub use systemd::SystemctlServiceManager;
