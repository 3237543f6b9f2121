//! Task Watchdog Timer (TWDT) driver.
//!
//! The control loop subscribes itself and feeds the TWDT on every
//! iteration. If the loop halts (the fatal reboot-returned path) or
//! stalls, the TWDT panics and the chip restarts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

use crate::adapters::wifi::JOIN_STEP_MAX_MS;

/// Default TWDT timeout for the control task. Covers the slowest blocking
/// call the loop makes, one WiFi join step, with margin.
pub const DEFAULT_TIMEOUT_MS: u32 = 4 * JOIN_STEP_MAX_MS;

pub struct Watchdog {
    timeout_ms: u32,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Reconfigure the TWDT and subscribe the calling task.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: plain ESP-IDF calls on the current task; the config
            // struct lives for the duration of the call.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!("Watchdog: reconfigure returned {} (already configured?)", ret);
                }

                let subscribed = esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK;
                if subscribed {
                    info!("Watchdog: subscribed ({}ms timeout, panic on trigger)", timeout_ms);
                } else {
                    log::warn!("Watchdog: failed to subscribe control task");
                }
                Self {
                    timeout_ms,
                    subscribed,
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("Watchdog(sim): {}ms, no-op", timeout_ms);
            Self { timeout_ms }
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Feed the watchdog. Must be called more often than `timeout_ms`.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            Self::feed_current_task();
        }
    }

    /// Feed the TWDT entry of the calling task from code that has no
    /// handle, such as a long blocking join. A no-op for tasks that never
    /// subscribed.
    pub fn feed_current_task() {
        #[cfg(target_os = "espidf")]
        // SAFETY: only touches the TWDT entry of the current task; an
        // unsubscribed task gets ESP_ERR_NOT_FOUND back and nothing changes.
        unsafe {
            esp_task_wdt_reset();
        }
    }
}
