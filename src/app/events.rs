//! Outbound application events.
//!
//! The coordinator and service emit these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them (serial log, test recorder, ...). They are
//! diagnostics only; the status topic is driven by [`DeviceStatus`].

use crate::error::DecodeError;

use super::coordinator::ResetState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries the initial reset state).
    Started(ResetState),

    /// The reset state machine moved between states.
    StateChanged { from: ResetState, to: ResetState },

    /// A trigger payload was dropped by the decoder.
    CommandRejected(DecodeError),

    /// A reset arrived while another was in flight and was ignored.
    ResetIgnored(ResetState),

    /// The indicator was switched on for `duration_ms`.
    IndicatorOn { duration_ms: u32 },

    /// The indicator was switched off.
    IndicatorOff,

    /// A message arrived on a topic this device does not handle.
    UnexpectedTopic,
}

/// Lifecycle values published on the status topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    /// A validated reset is under way; the reboot follows the indicator phase.
    Resetting,
}

impl DeviceStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resetting => "resetting",
        }
    }
}

/// Periodic health heartbeat payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthReport {
    pub uptime_s: u64,
    pub mem_free_b: u32,
    /// Heap bytes currently allocated.
    pub mem_alloc_b: u32,
    /// Low-water mark of free heap since boot.
    pub mem_min_free_b: u32,
}
