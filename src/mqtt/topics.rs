//! Per-device topic names.
//!
//! All topics live under `vending/machine/{machine_id}/`:
//!
//! | Topic       | Direction | Payload                              |
//! |-------------|-----------|--------------------------------------|
//! | `trigger`   | inbound   | `{"action":"reset"}`                 |
//! | `status`    | outbound  | `{"status":"resetting"}`             |
//! | `health`    | outbound  | `{"status":"healthy","uptime_s":..}` |

use crate::config::validate_machine_id;
use crate::error::ConfigError;

const TOPIC_ROOT: &str = "vending/machine";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    pub client_id: String,
    pub trigger: String,
    pub status: String,
    pub health: String,
}

impl Topics {
    pub fn new(machine_id: &str) -> Result<Self, ConfigError> {
        validate_machine_id(machine_id)?;
        Ok(Self {
            client_id: format!("vending_{machine_id}"),
            trigger: format!("{TOPIC_ROOT}/{machine_id}/trigger"),
            status: format!("{TOPIC_ROOT}/{machine_id}/status"),
            health: format!("{TOPIC_ROOT}/{machine_id}/health"),
        })
    }

    /// Exact match; the device subscribes without wildcards.
    pub fn is_trigger(&self, topic: &str) -> bool {
        topic == self.trigger
    }
}
