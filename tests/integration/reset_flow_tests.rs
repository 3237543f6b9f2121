//! End-to-end reset scenarios: inbound channel → AppService → coordinator
//! → status publisher (simulated MQTT client) → indicator → reboot.
//!
//! Time is driven explicitly so every deadline is checked to the millisecond.

use std::cell::RefCell;
use std::rc::Rc;

use super::mock_hw::{
    Call, CallLog, FixedMetrics, LedCall, LoggingLed, LoggingStatus, MockLed, MockReboot,
    RecordingSink,
};

use vendnode::app::coordinator::ResetState;
use vendnode::app::events::{AppEvent, DeviceStatus};
use vendnode::app::service::AppService;
use vendnode::config::DeviceConfig;
use vendnode::error::{DecodeError, Error};
use vendnode::mqtt::channels::{InboundChannel, forward_inbound};
use vendnode::mqtt::client::MqttClient;
use vendnode::mqtt::publisher::StatusPublisher;

const TRIGGER: &str = "vending/machine/VENDING_001/trigger";
const STATUS: &str = "vending/machine/VENDING_001/status";
const RESET: &[u8] = br#"{"action":"reset"}"#;

/// One simulated unit, wired the way `main` wires the real one.
struct Node {
    app: AppService<MockLed>,
    status: StatusPublisher<MqttClient>,
    reboot: MockReboot,
    metrics: FixedMetrics,
    sink: RecordingSink,
    inbound: InboundChannel,
}

impl Node {
    fn new(boot_indication: bool) -> Self {
        let mut cfg = DeviceConfig::new("Shop", "password1", "VENDING_001", "10.0.0.5");
        cfg.boot_indication = boot_indication;
        let app = AppService::new(&cfg, MockLed::new(), 0).unwrap();
        let mut client = MqttClient::start(&cfg, app.topics());
        client.set_online(true);
        let status = StatusPublisher::new(client, app.topics());
        let mut node = Self {
            app,
            status,
            reboot: MockReboot::new(),
            metrics: FixedMetrics::default(),
            sink: RecordingSink::new(),
            inbound: InboundChannel::new(),
        };
        node.app.start(0, &mut node.sink);
        node
    }

    fn deliver(&mut self, topic: &str, payload: &[u8]) {
        forward_inbound(&self.inbound, topic, payload).unwrap();
    }

    /// One control-loop iteration at `now_ms`.
    fn step(&mut self, now_ms: u64) -> Result<(), Error> {
        self.reboot.now_ms = now_ms;
        self.status.client_mut().service();
        self.app
            .drain(&self.inbound, now_ms, &mut self.status, &mut self.sink);
        self.app.tick(
            now_ms,
            &mut self.reboot,
            &self.metrics,
            &mut self.status,
            &mut self.sink,
        )
    }

    fn led(&self) -> &MockLed {
        self.app.coordinator().indicator().port()
    }

    fn status_payloads(&self) -> Vec<&[u8]> {
        self.status
            .client()
            .published()
            .iter()
            .filter(|p| p.topic == STATUS)
            .map(|p| p.payload.as_slice())
            .collect()
    }
}

// ── Accepted reset ────────────────────────────────────────────

#[test]
fn reset_publishes_lights_for_three_seconds_then_reboots() {
    let mut node = Node::new(false);
    node.step(500).unwrap();

    node.deliver(TRIGGER, RESET);
    node.step(1_000).unwrap();

    assert_eq!(node.app.state(), ResetState::Resetting);
    assert_eq!(node.status_payloads(), vec![br#"{"status":"resetting"}"#.as_slice()]);
    assert!(node.led().is_on());

    node.step(3_999).unwrap();
    assert_eq!(node.reboot.count(), 0);
    assert!(node.led().is_on());

    assert_eq!(node.step(4_000), Err(Error::RebootReturned));
    assert_eq!(node.reboot.at_ms, vec![4_000]);
    assert_eq!(node.led().calls.last(), Some(&LedCall::Off));
    assert_eq!(node.app.state(), ResetState::Rebooting);
}

#[test]
fn accepted_reset_event_sequence() {
    let mut node = Node::new(false);
    node.deliver(TRIGGER, RESET);
    node.step(0).unwrap();
    let _ = node.step(3_000);

    assert_eq!(
        node.sink.events,
        vec![
            AppEvent::Started(ResetState::Idle),
            AppEvent::IndicatorOn { duration_ms: 3_000 },
            AppEvent::StateChanged {
                from: ResetState::Idle,
                to: ResetState::Resetting,
            },
            AppEvent::IndicatorOff,
            AppEvent::StateChanged {
                from: ResetState::Resetting,
                to: ResetState::Rebooting,
            },
        ]
    );
}

#[test]
fn status_goes_out_before_the_indicator_lights() {
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let mut cfg = DeviceConfig::new("Shop", "password1", "VENDING_001", "10.0.0.5");
    cfg.boot_indication = false;
    let mut app = AppService::new(&cfg, LoggingLed(log.clone()), 0).unwrap();
    let mut status = LoggingStatus(log.clone());
    let (mut reboot, mut sink) = (MockReboot::new(), RecordingSink::new());
    log.borrow_mut().clear();

    app.handle_message(TRIGGER, RESET, 0, &mut status, &mut sink)
        .unwrap();
    assert_eq!(
        *log.borrow(),
        vec![Call::Publish(DeviceStatus::Resetting), Call::LedOn]
    );

    let _ = app.tick(3_000, &mut reboot, &FixedMetrics::default(), &mut status, &mut sink);
    assert_eq!(
        *log.borrow(),
        vec![Call::Publish(DeviceStatus::Resetting), Call::LedOn, Call::LedOff]
    );
    assert_eq!(reboot.count(), 1);
}

// ── Rejected or ignored input ─────────────────────────────────

#[test]
fn unrecognized_action_does_nothing() {
    let mut node = Node::new(false);
    node.deliver(TRIGGER, br#"{"action":"unplug"}"#);
    node.step(0).unwrap();

    assert_eq!(node.app.state(), ResetState::Idle);
    assert!(node.status_payloads().is_empty());
    assert!(!node.led().is_on());
    assert!(node
        .sink
        .contains(&AppEvent::CommandRejected(DecodeError::UnrecognizedAction)));

    // Still listening afterwards.
    node.deliver(TRIGGER, RESET);
    node.step(100).unwrap();
    assert_eq!(node.app.state(), ResetState::Resetting);
}

#[test]
fn malformed_payloads_are_dropped() {
    let mut node = Node::new(false);
    for bad in [
        b"not json".as_slice(),
        b"",
        br#"{"action":5}"#,
        br#"["reset"]"#,
        br#"{"cmd":"reset"}"#,
    ] {
        node.deliver(TRIGGER, bad);
        node.step(0).unwrap();
    }
    assert_eq!(node.app.state(), ResetState::Idle);
    assert!(node.status_payloads().is_empty());
    let rejected = node
        .sink
        .events
        .iter()
        .filter(|e| **e == AppEvent::CommandRejected(DecodeError::Malformed))
        .count();
    assert_eq!(rejected, 5);
}

#[test]
fn other_machines_trigger_is_ignored() {
    let mut node = Node::new(false);
    node.deliver("vending/machine/VENDING_002/trigger", RESET);
    node.step(0).unwrap();
    assert_eq!(node.app.state(), ResetState::Idle);
    assert!(node.sink.contains(&AppEvent::UnexpectedTopic));
}

#[test]
fn second_reset_within_window_is_ignored() {
    let mut node = Node::new(false);
    node.deliver(TRIGGER, RESET);
    node.step(0).unwrap();
    node.deliver(TRIGGER, RESET);
    node.step(500).unwrap();

    assert_eq!(node.status_payloads().len(), 1);
    assert_eq!(node.led().on_count(), 1);
    assert_eq!(node.app.coordinator().ignored_count(), 1);

    // Deadline still counts from the first command.
    assert_eq!(node.step(3_000), Err(Error::RebootReturned));
    assert_eq!(node.reboot.count(), 1);
}

#[test]
fn burst_of_resets_in_one_drain_reboots_once() {
    let mut node = Node::new(false);
    for _ in 0..5 {
        node.deliver(TRIGGER, RESET);
    }
    node.step(0).unwrap();
    assert_eq!(node.app.coordinator().ignored_count(), 4);
    assert_eq!(node.step(3_000), Err(Error::RebootReturned));
    assert_eq!(node.reboot.count(), 1);
}

// ── Boot indication ───────────────────────────────────────────

#[test]
fn boot_indication_lights_without_rebooting() {
    let mut node = Node::new(true);
    assert!(node.led().is_on());

    node.step(2_999).unwrap();
    assert!(node.led().is_on());
    node.step(3_000).unwrap();
    assert!(!node.led().is_on());
    node.step(10_000).unwrap();
    assert_eq!(node.reboot.count(), 0);
    assert_eq!(node.app.state(), ResetState::Idle);
}

#[test]
fn reset_during_boot_indication_gets_full_window() {
    let mut node = Node::new(true);
    node.deliver(TRIGGER, RESET);
    node.step(2_000).unwrap();
    assert_eq!(node.led().on_count(), 1);

    node.step(4_999).unwrap();
    assert_eq!(node.reboot.count(), 0);
    assert_eq!(node.step(5_000), Err(Error::RebootReturned));
}

// ── Broker unavailable ────────────────────────────────────────

#[test]
fn reset_proceeds_when_status_publish_fails() {
    let mut node = Node::new(false);
    node.status.client_mut().set_online(false);

    node.deliver(TRIGGER, RESET);
    node.step(0).unwrap();
    assert_eq!(node.status.failures(), 1);
    assert!(node.led().is_on());

    assert_eq!(node.step(3_000), Err(Error::RebootReturned));
    assert_eq!(node.reboot.count(), 1);
}

// ── Shutdown ──────────────────────────────────────────────────

#[test]
fn shutdown_mid_reset_turns_indicator_off_and_cancels_reboot() {
    let mut node = Node::new(false);
    node.deliver(TRIGGER, RESET);
    node.step(0).unwrap();

    node.app.shutdown(&mut node.sink);
    assert!(!node.led().is_on());
    node.step(10_000).unwrap();
    assert_eq!(node.reboot.count(), 0);
}
