//! Fuzz target: inbound channel → `AppService::drain`
//!
//! Splits the input into topic/payload pairs, forwards them through the
//! bounded channel and drains them into a service. Whatever arrives, the
//! device resets at most once and never panics.
//!
//! cargo fuzz run fuzz_inbound_channel

#![no_main]

use libfuzzer_sys::fuzz_target;
use vendnode::app::events::{AppEvent, DeviceStatus, HealthReport};
use vendnode::app::ports::{EventSink, IndicatorPort, StatusPort};
use vendnode::app::service::AppService;
use vendnode::config::DeviceConfig;
use vendnode::mqtt::channels::{InboundChannel, forward_inbound};

struct Led;

impl IndicatorPort for Led {
    fn set_on(&mut self) {}
    fn set_off(&mut self) {}
}

#[derive(Default)]
struct Count(u32);

impl StatusPort for Count {
    fn publish_status(&mut self, _status: DeviceStatus) {
        self.0 += 1;
    }
    fn publish_health(&mut self, _report: &HealthReport) -> bool {
        true
    }
}

struct Quiet;

impl EventSink for Quiet {
    fn emit(&mut self, _event: &AppEvent) {}
}

const TRIGGER: &str = "vending/machine/FUZZ/trigger";

fuzz_target!(|data: &[u8]| {
    let cfg = DeviceConfig::new("fuzz", "", "FUZZ", "broker");
    let Ok(mut app) = AppService::new(&cfg, Led, 0) else {
        return;
    };
    let ch = InboundChannel::new();
    let mut status = Count::default();

    // 0x00 separates messages; a leading 0x01 sends to a foreign topic.
    for chunk in data.split(|b| *b == 0) {
        let (topic, payload) = match chunk.split_first() {
            Some((&1, rest)) => ("vending/machine/OTHER/trigger", rest),
            _ => (TRIGGER, chunk),
        };
        if forward_inbound(&ch, topic, payload).is_err() {
            app.drain(&ch, 0, &mut status, &mut Quiet);
        }
    }
    app.drain(&ch, 0, &mut status, &mut Quiet);

    assert!(status.0 <= 1, "more than one reset accepted");
});
