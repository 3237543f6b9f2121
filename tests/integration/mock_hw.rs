//! Mock hardware adapters for integration tests.
//!
//! Records every indicator write and restart request so tests can assert
//! on the full history without touching GPIO or the ROM restart routine.

use std::cell::RefCell;
use std::rc::Rc;

use vendnode::app::events::{AppEvent, DeviceStatus, HealthReport};
use vendnode::app::ports::{EventSink, IndicatorPort, MetricsPort, RebootPort, StatusPort};

// ── Indicator ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedCall {
    On,
    Off,
}

#[derive(Debug, Default)]
pub struct MockLed {
    pub calls: Vec<LedCall>,
}

#[allow(dead_code)]
impl MockLed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self) -> bool {
        self.calls.last() == Some(&LedCall::On)
    }

    pub fn on_count(&self) -> usize {
        self.calls.iter().filter(|c| **c == LedCall::On).count()
    }
}

impl IndicatorPort for MockLed {
    fn set_on(&mut self) {
        self.calls.push(LedCall::On);
    }

    fn set_off(&mut self) {
        self.calls.push(LedCall::Off);
    }
}

// ── Reboot ────────────────────────────────────────────────────

/// Counts restart requests and records when they happened.
#[derive(Debug, Default)]
pub struct MockReboot {
    pub at_ms: Vec<u64>,
    pub now_ms: u64,
}

#[allow(dead_code)]
impl MockReboot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.at_ms.len()
    }
}

impl RebootPort for MockReboot {
    fn restart(&mut self) {
        self.at_ms.push(self.now_ms);
    }
}

// ── Metrics ───────────────────────────────────────────────────

pub struct FixedMetrics(pub HealthReport);

impl Default for FixedMetrics {
    fn default() -> Self {
        Self(HealthReport {
            uptime_s: 60,
            mem_free_b: 150_000,
            mem_alloc_b: 90_000,
            mem_min_free_b: 120_000,
        })
    }
}

impl MetricsPort for FixedMetrics {
    fn health(&self) -> HealthReport {
        self.0
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Shared call log ───────────────────────────────────────────

/// One side effect, in the order the ports saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Publish(DeviceStatus),
    LedOn,
    LedOff,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

/// Indicator writing into a log shared with [`LoggingStatus`].
pub struct LoggingLed(pub CallLog);

impl IndicatorPort for LoggingLed {
    fn set_on(&mut self) {
        self.0.borrow_mut().push(Call::LedOn);
    }

    fn set_off(&mut self) {
        self.0.borrow_mut().push(Call::LedOff);
    }
}

/// Status port writing into a log shared with [`LoggingLed`].
pub struct LoggingStatus(pub CallLog);

impl StatusPort for LoggingStatus {
    fn publish_status(&mut self, status: DeviceStatus) {
        self.0.borrow_mut().push(Call::Publish(status));
    }

    fn publish_health(&mut self, _report: &HealthReport) -> bool {
        true
    }
}
