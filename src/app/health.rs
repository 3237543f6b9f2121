//! Periodic health heartbeat.
//!
//! The interval only restarts after a heartbeat was actually handed to the
//! broker client, so a device that is offline at the due time retries on
//! the next loop iteration instead of waiting a full interval.

use super::ports::{MetricsPort, StatusPort};

pub struct HealthMonitor {
    interval_ms: u64,
    last_sent_ms: u64,
}

impl HealthMonitor {
    /// The first heartbeat is due one interval after `now_ms`.
    pub fn new(interval_secs: u32, now_ms: u64) -> Self {
        Self {
            interval_ms: u64::from(interval_secs) * 1000,
            last_sent_ms: now_ms,
        }
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_sent_ms) >= self.interval_ms
    }

    /// Publish a heartbeat if due. Returns `true` if one was sent.
    pub fn poll(
        &mut self,
        now_ms: u64,
        metrics: &impl MetricsPort,
        status: &mut impl StatusPort,
    ) -> bool {
        if !self.is_due(now_ms) {
            return false;
        }
        let report = metrics.health();
        if status.publish_health(&report) {
            self.last_sent_ms = now_ms;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::events::{DeviceStatus, HealthReport};

    struct Fixed;

    impl MetricsPort for Fixed {
        fn health(&self) -> HealthReport {
            HealthReport {
                uptime_s: 42,
                mem_free_b: 100_000,
                mem_alloc_b: 60_000,
                mem_min_free_b: 90_000,
            }
        }
    }

    struct Flaky {
        online: bool,
        sent: Vec<HealthReport>,
    }

    impl StatusPort for Flaky {
        fn publish_status(&mut self, _status: DeviceStatus) {}

        fn publish_health(&mut self, report: &HealthReport) -> bool {
            if self.online {
                self.sent.push(*report);
            }
            self.online
        }
    }

    #[test]
    fn fires_once_per_interval() {
        let mut h = HealthMonitor::new(60, 0);
        let mut s = Flaky { online: true, sent: Vec::new() };
        assert!(!h.poll(59_999, &Fixed, &mut s));
        assert!(h.poll(60_000, &Fixed, &mut s));
        assert!(!h.poll(60_050, &Fixed, &mut s));
        assert!(h.poll(120_000, &Fixed, &mut s));
        assert_eq!(s.sent.len(), 2);
        assert_eq!(s.sent[0].uptime_s, 42);
    }

    #[test]
    fn failed_publish_retries_on_next_poll() {
        let mut h = HealthMonitor::new(60, 0);
        let mut s = Flaky { online: false, sent: Vec::new() };
        assert!(!h.poll(60_000, &Fixed, &mut s));
        assert!(h.is_due(60_100));
        s.online = true;
        assert!(h.poll(60_100, &Fixed, &mut s));
        assert!(!h.is_due(60_200));
    }
}
