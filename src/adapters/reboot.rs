//! Device restart adapter.
//!
//! - **`target_os = "espidf"`**: `esp_restart()`, which never returns.
//! - **all other targets**: logs and returns, exercising the caller's
//!   fatal path in host tests.

use log::warn;

use crate::app::ports::RebootPort;

#[derive(Debug, Default)]
pub struct SystemReboot {
    #[cfg(not(target_os = "espidf"))]
    requests: u32,
}

impl SystemReboot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart requests seen by the simulation.
    #[cfg(not(target_os = "espidf"))]
    pub fn requests(&self) -> u32 {
        self.requests
    }
}

impl RebootPort for SystemReboot {
    #[cfg(target_os = "espidf")]
    fn restart(&mut self) {
        warn!("Reboot: esp_restart()");
        // SAFETY: esp_restart has no preconditions and does not return.
        unsafe { esp_idf_svc::sys::esp_restart() }
    }

    #[cfg(not(target_os = "espidf"))]
    fn restart(&mut self) {
        self.requests += 1;
        warn!("Reboot(sim): restart requested (#{}), returning", self.requests);
    }
}
