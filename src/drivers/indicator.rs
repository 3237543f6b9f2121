//! Timed indicator activation.
//!
//! Wraps an [`IndicatorPort`] with a single deadline so every caller
//! (boot indication, remote reset, anything else sharing the flash LED)
//! coalesces onto one timer:
//!
//! - `activate` while idle switches the output on and arms the deadline.
//! - `activate` while active only re-arms the deadline (restart policy);
//!   no second "on" write, no second deactivation queued.
//! - `poll` past the deadline switches the output off exactly once.
//! - `cancel` and `Drop` switch the output off immediately if it is on.
//!
//! Time is supplied by the caller as monotonic milliseconds, so the wait
//! never blocks the control loop and is always cancellable.

use crate::app::ports::IndicatorPort;

/// Result of [`IndicatorDriver::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorPoll {
    /// Output is off and nothing is armed.
    Idle,
    /// Output is on and the deadline has not passed.
    Active { remaining_ms: u64 },
    /// The deadline passed during this poll; the output was just switched off.
    Expired,
}

pub struct IndicatorDriver<P: IndicatorPort> {
    port: P,
    deadline_ms: Option<u64>,
}

impl<P: IndicatorPort> IndicatorDriver<P> {
    /// Take ownership of the output and force it off.
    pub fn new(mut port: P) -> Self {
        port.set_off();
        Self {
            port,
            deadline_ms: None,
        }
    }

    /// Switch on (if not already) and (re)arm the deadline to `now + duration`.
    pub fn activate(&mut self, now_ms: u64, duration_ms: u32) {
        if self.deadline_ms.is_none() {
            self.port.set_on();
        }
        self.deadline_ms = Some(now_ms.saturating_add(u64::from(duration_ms)));
    }

    /// Advance the timer. Must be called regularly by the control loop.
    pub fn poll(&mut self, now_ms: u64) -> IndicatorPoll {
        match self.deadline_ms {
            None => IndicatorPoll::Idle,
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                self.port.set_off();
                IndicatorPoll::Expired
            }
            Some(deadline) => IndicatorPoll::Active {
                remaining_ms: deadline - now_ms,
            },
        }
    }

    /// Switch off immediately. Returns `true` if the indicator was on.
    pub fn cancel(&mut self) -> bool {
        if self.deadline_ms.take().is_some() {
            self.port.set_off();
            true
        } else {
            false
        }
    }

    pub fn is_active(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Borrow the underlying output (test inspection).
    pub fn port(&self) -> &P {
        &self.port
    }
}

impl<P: IndicatorPort> Drop for IndicatorDriver<P> {
    fn drop(&mut self) {
        self.cancel();
    }
}
