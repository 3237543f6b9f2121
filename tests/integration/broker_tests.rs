//! Broker-side plumbing: inbound channel limits, session loss and the
//! health heartbeat going out through the simulated MQTT client.

use super::mock_hw::{FixedMetrics, MockLed, MockReboot, RecordingSink};

use vendnode::app::coordinator::ResetState;
use vendnode::app::service::AppService;
use vendnode::config::DeviceConfig;
use vendnode::mqtt::channels::{
    DropReason, INBOUND_DEPTH, InboundChannel, MAX_PAYLOAD_LEN, forward_inbound,
};
use vendnode::mqtt::client::MqttClient;
use vendnode::mqtt::publisher::StatusPublisher;
use vendnode::mqtt::topics::Topics;

const TRIGGER: &str = "vending/machine/VENDING_001/trigger";
const HEALTH: &str = "vending/machine/VENDING_001/health";

fn config() -> DeviceConfig {
    let mut cfg = DeviceConfig::new("Shop", "password1", "VENDING_001", "10.0.0.5");
    cfg.boot_indication = false;
    cfg
}

fn publisher(cfg: &DeviceConfig, topics: &Topics) -> StatusPublisher<MqttClient> {
    StatusPublisher::new(MqttClient::start(cfg, topics), topics)
}

#[test]
fn topics_follow_machine_id() {
    let t = Topics::new("VENDING_001").unwrap();
    assert_eq!(t.client_id, "vending_VENDING_001");
    assert_eq!(t.trigger, TRIGGER);
    assert_eq!(t.status, "vending/machine/VENDING_001/status");
    assert_eq!(t.health, HEALTH);
}

#[test]
fn oversized_payload_never_reaches_the_service() {
    let ch = InboundChannel::new();
    let big = vec![b' '; MAX_PAYLOAD_LEN + 1];
    assert_eq!(
        forward_inbound(&ch, TRIGGER, &big),
        Err(DropReason::PayloadTooLarge(MAX_PAYLOAD_LEN + 1))
    );

    let cfg = config();
    let mut app = AppService::new(&cfg, MockLed::new(), 0).unwrap();
    let mut status = publisher(&cfg, app.topics());
    let mut sink = RecordingSink::new();
    assert_eq!(app.drain(&ch, 0, &mut status, &mut sink), 0);
    assert_eq!(app.state(), ResetState::Idle);
}

#[test]
fn full_queue_drops_newest() {
    let ch = InboundChannel::new();
    for _ in 0..INBOUND_DEPTH {
        forward_inbound(&ch, TRIGGER, br#"{"action":"unplug"}"#).unwrap();
    }
    assert_eq!(
        forward_inbound(&ch, TRIGGER, br#"{"action":"reset"}"#),
        Err(DropReason::QueueFull)
    );
}

#[test]
fn resubscribes_after_reconnect() {
    let cfg = config();
    let topics = Topics::new(&cfg.machine_id).unwrap();
    let mut client = MqttClient::start(&cfg, &topics);

    client.set_online(true);
    client.service();
    assert!(client.is_subscribed());

    client.set_online(false);
    client.service();
    assert!(!client.is_subscribed());

    client.set_online(true);
    client.service();
    assert!(client.is_subscribed());
}

#[test]
fn heartbeat_is_published_on_health_topic() {
    let cfg = config();
    let mut app = AppService::new(&cfg, MockLed::new(), 0).unwrap();
    let mut status = publisher(&cfg, app.topics());
    status.client_mut().set_online(true);
    let (mut reboot, mut sink) = (MockReboot::new(), RecordingSink::new());
    let metrics = FixedMetrics::default();

    app.tick(59_950, &mut reboot, &metrics, &mut status, &mut sink)
        .unwrap();
    assert!(status.client().published().is_empty());

    app.tick(60_000, &mut reboot, &metrics, &mut status, &mut sink)
        .unwrap();
    let sent = status.client().published();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].topic, HEALTH);
    assert_eq!(
        sent[0].payload,
        br#"{"status":"healthy","uptime_s":60,"mem_free_b":150000,"mem_alloc_b":90000,"mem_min_free_b":120000}"#
    );
}

#[test]
fn heartbeat_retries_after_outage() {
    let cfg = config();
    let mut app = AppService::new(&cfg, MockLed::new(), 0).unwrap();
    let mut status = publisher(&cfg, app.topics());
    let (mut reboot, mut sink) = (MockReboot::new(), RecordingSink::new());
    let metrics = FixedMetrics::default();

    // Offline at the due time: counted as a failure, not rescheduled.
    app.tick(60_000, &mut reboot, &metrics, &mut status, &mut sink)
        .unwrap();
    assert_eq!(status.failures(), 1);

    status.client_mut().set_online(true);
    app.tick(60_050, &mut reboot, &metrics, &mut status, &mut sink)
        .unwrap();
    assert_eq!(status.client().published().len(), 1);

    app.tick(60_100, &mut reboot, &metrics, &mut status, &mut sink)
        .unwrap();
    assert_eq!(status.client().published().len(), 1);
}
