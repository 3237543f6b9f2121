//! Device configuration.
//!
//! Provisioned as a JSON document (the `config.json` layout used by the
//! field units) and persisted in NVS. Only the four connection keys are
//! required; every tunable has a default.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default broker port (plain MQTT).
pub const DEFAULT_MQTT_PORT: u16 = 1883;
/// Default on-time of the reset indicator.
pub const DEFAULT_RESET_INDICATOR_MS: u32 = 3_000;

/// Core device configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    // --- Network ---
    pub wifi_ssid: String,
    pub wifi_password: String,

    // --- Identity / broker ---
    /// Stable unit identifier, used verbatim inside topic names.
    pub machine_id: String,
    /// Broker hostname or IP address.
    pub mqtt_broker: String,
    #[serde(default = "default_mqtt_port")]
    pub mqtt_port: u16,

    // --- Reset indicator ---
    /// How long the flash LED stays on before the reboot (milliseconds).
    #[serde(default = "default_reset_indicator_ms")]
    pub reset_indicator_ms: u32,
    /// Flash the indicator for `reset_indicator_ms` on every boot.
    #[serde(default = "default_true")]
    pub boot_indication: bool,

    // --- Timing ---
    /// Health heartbeat interval (seconds).
    #[serde(default = "default_health_interval_secs")]
    pub health_interval_secs: u32,
    /// First reconnect delay after a broker failure (seconds).
    #[serde(default = "default_reconnect_initial_secs")]
    pub reconnect_initial_secs: u32,
    /// Upper bound of the exponential reconnect delay (seconds).
    #[serde(default = "default_reconnect_max_secs")]
    pub reconnect_max_secs: u32,
}

fn default_mqtt_port() -> u16 {
    DEFAULT_MQTT_PORT
}

fn default_reset_indicator_ms() -> u32 {
    DEFAULT_RESET_INDICATOR_MS
}

fn default_true() -> bool {
    true
}

fn default_health_interval_secs() -> u32 {
    60
}

fn default_reconnect_initial_secs() -> u32 {
    2
}

fn default_reconnect_max_secs() -> u32 {
    60
}

impl DeviceConfig {
    /// Build a config with the required keys and every tunable defaulted.
    pub fn new(wifi_ssid: &str, wifi_password: &str, machine_id: &str, mqtt_broker: &str) -> Self {
        Self {
            wifi_ssid: wifi_ssid.into(),
            wifi_password: wifi_password.into(),
            machine_id: machine_id.into(),
            mqtt_broker: mqtt_broker.into(),
            mqtt_port: default_mqtt_port(),
            reset_indicator_ms: default_reset_indicator_ms(),
            boot_indication: default_true(),
            health_interval_secs: default_health_interval_secs(),
            reconnect_initial_secs: default_reconnect_initial_secs(),
            reconnect_max_secs: default_reconnect_max_secs(),
        }
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_slice(bytes).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serialise to the JSON layout accepted by [`from_json`](Self::from_json).
    pub fn to_json(&self) -> Result<Vec<u8>, ConfigError> {
        serde_json::to_vec(self).map_err(|_| ConfigError::IoError)
    }

    /// Range- and shape-check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wifi_ssid.is_empty() || self.wifi_ssid.len() > 32 {
            return Err(ConfigError::ValidationFailed("wifi_ssid must be 1-32 bytes"));
        }
        if !self.wifi_password.is_empty() && !(8..=64).contains(&self.wifi_password.len()) {
            return Err(ConfigError::ValidationFailed(
                "wifi_password must be empty or 8-64 bytes",
            ));
        }
        validate_machine_id(&self.machine_id)?;
        if self.mqtt_broker.is_empty() {
            return Err(ConfigError::ValidationFailed("mqtt_broker must not be empty"));
        }
        if self.mqtt_port == 0 {
            return Err(ConfigError::ValidationFailed("mqtt_port must be non-zero"));
        }
        if !(100..=60_000).contains(&self.reset_indicator_ms) {
            return Err(ConfigError::ValidationFailed(
                "reset_indicator_ms must be 100-60000",
            ));
        }
        if !(5..=3600).contains(&self.health_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "health_interval_secs must be 5-3600",
            ));
        }
        if self.reconnect_initial_secs == 0 || self.reconnect_initial_secs > self.reconnect_max_secs {
            return Err(ConfigError::ValidationFailed(
                "reconnect_initial_secs must be 1..=reconnect_max_secs",
            ));
        }
        if self.reconnect_max_secs > 3600 {
            return Err(ConfigError::ValidationFailed("reconnect_max_secs must be <= 3600"));
        }
        Ok(())
    }
}

/// A machine id becomes one topic level, so it must not contain level
/// separators or wildcards.
pub fn validate_machine_id(id: &str) -> Result<(), ConfigError> {
    if id.is_empty() || id.len() > 48 {
        return Err(ConfigError::ValidationFailed("machine_id must be 1-48 bytes"));
    }
    if id.bytes().any(|b| matches!(b, b'/' | b'+' | b'#') || !(0x21..=0x7E).contains(&b)) {
        return Err(ConfigError::ValidationFailed(
            "machine_id must be printable ASCII without '/', '+', '#' or spaces",
        ));
    }
    Ok(())
}
