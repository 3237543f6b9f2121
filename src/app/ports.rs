//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ResetCoordinator (domain)
//! ```
//!
//! Driven adapters (indicator output, reboot, status publisher, event sinks,
//! config storage) implement these traits. The coordinator consumes them via
//! generics, so the domain core never touches hardware or the network
//! directly and tests can substitute recording fakes.

use crate::config::DeviceConfig;
use crate::error::ConfigError;

use super::events::{AppEvent, DeviceStatus, HealthReport};

// ───────────────────────────────────────────────────────────────
// Indicator port (domain → flash LED)
// ───────────────────────────────────────────────────────────────

/// Binary visual indicator. Timing lives in
/// [`IndicatorDriver`](crate::drivers::indicator::IndicatorDriver);
/// implementations only switch the output.
pub trait IndicatorPort {
    fn set_on(&mut self);
    fn set_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Reboot port (domain → host)
// ───────────────────────────────────────────────────────────────

/// Host capability that restarts the device.
///
/// A correct implementation never returns. The coordinator treats a
/// return as the fatal [`Error::RebootReturned`](crate::error::Error::RebootReturned).
pub trait RebootPort {
    fn restart(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Status port (domain → MQTT status / health topics)
// ───────────────────────────────────────────────────────────────

/// Outbound status publication with at-least-once semantics.
///
/// Both calls are fire-and-forget from the domain's point of view: they
/// never block on broker acknowledgment and a failure never aborts the
/// caller's sequence.
pub trait StatusPort {
    /// Publish a lifecycle status. Failures are absorbed by the adapter.
    fn publish_status(&mut self, status: DeviceStatus);

    /// Publish a health heartbeat. Returns `true` if it was handed to the
    /// client, so the caller only advances its interval timer on success.
    fn publish_health(&mut self, report: &HealthReport) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Metrics port (host → domain)
// ───────────────────────────────────────────────────────────────

/// Runtime figures for the health heartbeat.
pub trait MetricsPort {
    fn health(&self) -> HealthReport;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the device configuration.
///
/// Implementations MUST validate before persisting; invalid values are
/// rejected with [`ConfigError::ValidationFailed`], not clamped.
pub trait ConfigPort {
    /// Load configuration. Returns [`ConfigError::NotFound`] on first boot.
    fn load(&self) -> Result<DeviceConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&mut self, config: &DeviceConfig) -> Result<(), ConfigError>;
}
