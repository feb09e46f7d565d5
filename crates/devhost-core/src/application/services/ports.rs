//! Port Allocator.

use std::sync::Arc;

use tracing::debug;

use crate::{
    application::{ActionExecutor, ApplicationError},
    error::DevhostResult,
};

/// Highest port the allocator will hand out.
pub const PORT_SCAN_CEILING: u16 = 65000;

/// Where scanning starts when the request names no port.
pub const DEFAULT_START_PORT: u16 = 3000;

pub struct PortAllocator {
    executor: Arc<ActionExecutor>,
}

impl PortAllocator {
    pub fn new(executor: Arc<ActionExecutor>) -> Self {
        Self { executor }
    }

    /// First port in `preferred..=PORT_SCAN_CEILING` the probe reports free.
    ///
    /// `None` means the whole range is taken (or `preferred` lies above the
    /// ceiling). It is never a port.
    pub fn find_available_port(&self, preferred: u16) -> Option<u16> {
        let found = (preferred.max(1)..=PORT_SCAN_CEILING).find(|&port| !self.executor.port_in_use(port));
        debug!(preferred, ?found, "port scan");
        found
    }

    /// Desired port if given, else the first free one from `start`.
    pub fn allocate(&self, desired: Option<u16>, start: u16) -> DevhostResult<u16> {
        let from = desired.unwrap_or(start);
        self.find_available_port(from).ok_or_else(|| {
            ApplicationError::PortsExhausted {
                start: from,
                end: PORT_SCAN_CEILING,
            }
            .into()
        })
    }
}
