//! Runtime diagnostics.
//!
//! Heap and uptime figures for the health heartbeat, collected on demand,
//! and a panic hook that logs the reason before the default handler
//! aborts and the chip restarts.

use crate::adapters::time::MonotonicClock;
use crate::app::events::HealthReport;
use crate::app::ports::MetricsPort;

/// Runtime diagnostics snapshot collected on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeMetrics {
    pub uptime_secs: u64,
    pub heap_free: u32,
    pub heap_alloc: u32,
    pub heap_min_free: u32,
}

impl RuntimeMetrics {
    #[cfg(target_os = "espidf")]
    pub fn collect(uptime_secs: u64) -> Self {
        use esp_idf_svc::sys::{
            MALLOC_CAP_DEFAULT, esp_get_free_heap_size, esp_get_minimum_free_heap_size,
            heap_caps_get_total_size,
        };
        // SAFETY: all three calls only read allocator counters.
        let heap_free = unsafe { esp_get_free_heap_size() };
        let heap_min_free = unsafe { esp_get_minimum_free_heap_size() };
        let heap_total = unsafe { heap_caps_get_total_size(MALLOC_CAP_DEFAULT) } as u32;
        Self {
            uptime_secs,
            heap_free,
            heap_alloc: heap_total.saturating_sub(heap_free),
            heap_min_free,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn collect(uptime_secs: u64) -> Self {
        // Synthetic values so simulation paths exercise the same code as
        // real hardware. Heap "decays" slightly over time to model
        // fragmentation.
        let heap_total: u32 = 262_144;
        let base_free: u32 = 180_224; // ~176 KB, typical after WiFi + MQTT
        let decay = (uptime_secs / 60) as u32 * 64;
        let heap_free = base_free.saturating_sub(decay);
        let heap_min_free = (heap_free as f32 * 0.85) as u32;
        Self {
            uptime_secs,
            heap_free,
            heap_alloc: heap_total - heap_free,
            heap_min_free,
        }
    }
}

impl From<RuntimeMetrics> for HealthReport {
    fn from(m: RuntimeMetrics) -> Self {
        Self {
            uptime_s: m.uptime_secs,
            mem_free_b: m.heap_free,
            mem_alloc_b: m.heap_alloc,
            mem_min_free_b: m.heap_min_free,
        }
    }
}

/// [`MetricsPort`] backed by the system clock and allocator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMetrics {
    clock: MonotonicClock,
}

impl SystemMetrics {
    pub fn new(clock: MonotonicClock) -> Self {
        Self { clock }
    }
}

impl MetricsPort for SystemMetrics {
    fn health(&self) -> HealthReport {
        RuntimeMetrics::collect(self.clock.uptime_secs()).into()
    }
}

// ───────────────────────────────────────────────────────────────
// Panic hook
// ───────────────────────────────────────────────────────────────

/// Install a panic hook that logs the reason and uptime.
///
/// Must be called once during init, after the logger.
pub fn install_panic_handler() {
    let clock = MonotonicClock::new();
    std::panic::set_hook(Box::new(move |info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };
        let at = info
            .location()
            .map(|l| (l.file(), l.line()))
            .unwrap_or(("?", 0));

        log::error!(
            "PANIC: {} at {}:{} (uptime {}s)",
            reason,
            at.0,
            at.1,
            clock.uptime_secs()
        );
    }));
}
