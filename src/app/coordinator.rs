//! Remote reset state machine.
//!
//! ```text
//!   Idle ──reset──▶ Resetting ──indicator elapsed──▶ Rebooting ──▶ (chip restarts)
//!                      │  ▲                             │
//!                      └──┘ reset: ignored              └── reset: ignored
//! ```
//!
//! | Current   | Event              | Action                               | Next      |
//! |-----------|--------------------|--------------------------------------|-----------|
//! | Idle      | reset command      | publish `resetting`, indicator on D  | Resetting |
//! | Resetting | indicator elapsed  | indicator off, invoke reboot         | Rebooting |
//! | Resetting | reset command      | ignored                              | Resetting |
//! | Rebooting | reset command      | ignored                              | Rebooting |
//!
//! The coordinator is driven from the single control-loop thread, so a
//! command arriving inside the indicator window is always handled either
//! before or after the expiry transition, never concurrently with it.

use log::{error, info};

use crate::drivers::indicator::{IndicatorDriver, IndicatorPoll};
use crate::error::{Error, Result};

use super::commands::ResetCommand;
use super::events::{AppEvent, DeviceStatus};
use super::ports::{EventSink, IndicatorPort, RebootPort, StatusPort};

/// Lifecycle of a reset. A fresh process always starts `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetState {
    Idle,
    Resetting,
    Rebooting,
}

pub struct ResetCoordinator<I: IndicatorPort> {
    state: ResetState,
    indicator: IndicatorDriver<I>,
    /// Indicator on-time for an accepted reset.
    indicator_ms: u32,
    ignored: u32,
}

impl<I: IndicatorPort> ResetCoordinator<I> {
    pub fn new(indicator: I, indicator_ms: u32) -> Self {
        Self {
            state: ResetState::Idle,
            indicator: IndicatorDriver::new(indicator),
            indicator_ms,
            ignored: 0,
        }
    }

    pub fn state(&self) -> ResetState {
        self.state
    }

    /// Number of reset commands swallowed by the re-entrancy guard.
    pub fn ignored_count(&self) -> u32 {
        self.ignored
    }

    pub fn indicator(&self) -> &IndicatorDriver<I> {
        &self.indicator
    }

    /// Flash the indicator at power-up. Shares the timer with resets and
    /// does not touch the reset state.
    pub fn indicate_boot(&mut self, now_ms: u64, sink: &mut impl EventSink) {
        info!("Reset: boot indication ({}ms)", self.indicator_ms);
        self.indicator.activate(now_ms, self.indicator_ms);
        sink.emit(&AppEvent::IndicatorOn {
            duration_ms: self.indicator_ms,
        });
    }

    /// Start a reset sequence, or reject the command if one is in flight.
    ///
    /// Returns [`Error::ResetInProgress`] when ignored; callers treat that
    /// as an expected, non-error outcome.
    pub fn handle_reset(
        &mut self,
        _cmd: ResetCommand,
        now_ms: u64,
        status: &mut impl StatusPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if self.state != ResetState::Idle {
            self.ignored = self.ignored.saturating_add(1);
            sink.emit(&AppEvent::ResetIgnored(self.state));
            return Err(Error::ResetInProgress);
        }

        info!("Reset: command accepted, indicator {}ms then reboot", self.indicator_ms);
        // Announce before the LED goes on so observers see the status first.
        status.publish_status(DeviceStatus::Resetting);
        self.indicator.activate(now_ms, self.indicator_ms);
        sink.emit(&AppEvent::IndicatorOn {
            duration_ms: self.indicator_ms,
        });
        self.transition(ResetState::Resetting, sink);
        Ok(())
    }

    /// Advance the indicator timer; on expiry during a reset, reboot.
    ///
    /// `Err(Error::RebootReturned)` is fatal: the reboot capability came
    /// back instead of restarting the device.
    pub fn tick(
        &mut self,
        now_ms: u64,
        reboot: &mut impl RebootPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if self.indicator.poll(now_ms) != IndicatorPoll::Expired {
            return Ok(());
        }
        sink.emit(&AppEvent::IndicatorOff);

        if self.state == ResetState::Resetting {
            self.transition(ResetState::Rebooting, sink);
            info!("Reset: restarting device");
            reboot.restart();
            error!("Reset: reboot capability returned, no recovery path");
            return Err(Error::RebootReturned);
        }
        Ok(())
    }

    /// Cancel any pending indicator window (process shutdown).
    pub fn shutdown(&mut self, sink: &mut impl EventSink) {
        if self.indicator.cancel() {
            sink.emit(&AppEvent::IndicatorOff);
        }
    }

    fn transition(&mut self, to: ResetState, sink: &mut impl EventSink) {
        let from = self.state;
        self.state = to;
        sink.emit(&AppEvent::StateChanged { from, to });
    }
}
