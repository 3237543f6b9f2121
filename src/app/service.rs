//! Application service, the hexagonal core.
//!
//! [`AppService`] owns the reset coordinator and the health heartbeat and
//! routes inbound broker messages to them. All I/O flows through port
//! traits injected at call sites, making the entire service testable with
//! mock adapters.
//!
//! ```text
//!  INBOUND_CHANNEL ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                      │       AppService       │
//!   StatusPort ◀────── │ decode · coordinator   │ ──▶ RebootPort
//!   MetricsPort ─────▶ │ health heartbeat       │ ──▶ IndicatorPort
//!                      └────────────────────────┘
//! ```
//!
//! Only [`Error::RebootReturned`] ever leaves [`AppService::tick`]; every
//! other failure is logged here and the message is dropped, so the
//! subscription keeps serving future triggers.

use log::info;

use crate::config::DeviceConfig;
use crate::error::{ConfigError, Error, Result};
use crate::mqtt::channels::InboundChannel;
use crate::mqtt::codec::decode_trigger;
use crate::mqtt::topics::Topics;

use super::coordinator::{ResetCoordinator, ResetState};
use super::events::AppEvent;
use super::health::HealthMonitor;
use super::ports::{EventSink, IndicatorPort, MetricsPort, RebootPort, StatusPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService<I: IndicatorPort> {
    topics: Topics,
    coordinator: ResetCoordinator<I>,
    health: HealthMonitor,
    boot_indication: bool,
}

impl<I: IndicatorPort> AppService<I> {
    /// Construct the service from a validated configuration.
    ///
    /// Does **not** flash the boot indication; call [`start`](Self::start) next.
    pub fn new(config: &DeviceConfig, indicator: I, now_ms: u64) -> core::result::Result<Self, ConfigError> {
        config.validate()?;
        let topics = Topics::new(&config.machine_id)?;
        Ok(Self {
            topics,
            coordinator: ResetCoordinator::new(indicator, config.reset_indicator_ms),
            health: HealthMonitor::new(config.health_interval_secs, now_ms),
            boot_indication: config.boot_indication,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, now_ms: u64, sink: &mut impl EventSink) {
        let state = self.coordinator.state();
        sink.emit(&AppEvent::Started(state));
        info!("AppService started in {:?}, listening on {}", state, self.topics.trigger);
        if self.boot_indication {
            self.coordinator.indicate_boot(now_ms, sink);
        }
    }

    /// Turn the indicator off before the process goes away.
    pub fn shutdown(&mut self, sink: &mut impl EventSink) {
        self.coordinator.shutdown(sink);
    }

    // ── Inbound messages ──────────────────────────────────────

    /// Route one broker message.
    ///
    /// Errors are informational for the caller: a decode failure or an
    /// ignored reset has already been logged and changes nothing.
    pub fn handle_message(
        &mut self,
        topic: &str,
        payload: &[u8],
        now_ms: u64,
        status: &mut impl StatusPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if !self.topics.is_trigger(topic) {
            sink.emit(&AppEvent::UnexpectedTopic);
            return Ok(());
        }

        let cmd = match decode_trigger(payload) {
            Ok(cmd) => cmd,
            Err(e) => {
                sink.emit(&AppEvent::CommandRejected(e));
                return Err(Error::Decode(e));
            }
        };

        self.coordinator.handle_reset(cmd, now_ms, status, sink)
    }

    /// Handle every queued message in arrival order without blocking.
    /// Returns the number of messages consumed.
    pub fn drain(
        &mut self,
        inbound: &InboundChannel,
        now_ms: u64,
        status: &mut impl StatusPort,
        sink: &mut impl EventSink,
    ) -> usize {
        let mut handled = 0;
        while let Ok(msg) = inbound.try_receive() {
            // Non-fatal by construction; already logged in handle_message.
            let _ = self.handle_message(&msg.topic, &msg.payload, now_ms, status, sink);
            handled += 1;
        }
        handled
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Advance timers: indicator expiry (and the reboot it triggers), then
    /// the health heartbeat.
    ///
    /// `Err(Error::RebootReturned)` is the only possible error and is fatal.
    pub fn tick(
        &mut self,
        now_ms: u64,
        reboot: &mut impl RebootPort,
        metrics: &impl MetricsPort,
        status: &mut impl StatusPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.coordinator.tick(now_ms, reboot, sink)?;
        if self.coordinator.state() == ResetState::Idle {
            self.health.poll(now_ms, metrics, status);
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> ResetState {
        self.coordinator.state()
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    pub fn coordinator(&self) -> &ResetCoordinator<I> {
        &self.coordinator
    }
}
