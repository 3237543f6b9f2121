//! Broker link bookkeeping: reconnect backoff and connection-state edges.

use log::{info, warn};

/// Exponential reconnect delay, doubling from `initial_ms` up to `max_ms`.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial_ms: u64,
    max_ms: u64,
    current_ms: u64,
}

impl Backoff {
    pub fn new(initial_secs: u32, max_secs: u32) -> Self {
        let initial_ms = u64::from(initial_secs.max(1)) * 1000;
        let max_ms = (u64::from(max_secs) * 1000).max(initial_ms);
        Self {
            initial_ms,
            max_ms,
            current_ms: initial_ms,
        }
    }

    /// Delay to wait before the next attempt; advances the schedule.
    pub fn next_delay_ms(&mut self) -> u64 {
        let d = self.current_ms;
        self.current_ms = (self.current_ms * 2).min(self.max_ms);
        d
    }

    /// Back to the initial delay after a successful connect.
    pub fn reset(&mut self) {
        self.current_ms = self.initial_ms;
    }
}

/// Connection edge reported by [`LinkTracker::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEdge {
    Up,
    Down,
}

/// Tracks broker connectivity and logs each transition once.
#[derive(Debug, Default)]
pub struct LinkTracker {
    connected: bool,
    connects: u32,
}

impl LinkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Number of successful connects so far.
    pub fn connects(&self) -> u32 {
        self.connects
    }

    /// Record the current state. Returns the edge if it changed.
    pub fn update(&mut self, connected: bool) -> Option<LinkEdge> {
        if connected == self.connected {
            return None;
        }
        self.connected = connected;
        if connected {
            self.connects += 1;
            if self.connects == 1 {
                info!("MQTT: connected");
            } else {
                info!("MQTT: reconnected (#{})", self.connects - 1);
            }
            Some(LinkEdge::Up)
        } else {
            warn!("MQTT: connection lost");
            Some(LinkEdge::Down)
        }
    }
}
