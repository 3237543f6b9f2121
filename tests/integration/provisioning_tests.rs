//! First-boot provisioning: NVS simulation backend → `load_or_provision`
//! → `AppService`, including the MAC-derived machine id.

use super::mock_hw::MockLed;

use vendnode::adapters::device_id;
use vendnode::adapters::log_sink::LogEventSink;
use vendnode::adapters::nvs::{NvsConfigStore, load_or_provision};
use vendnode::adapters::wifi::{ConnectivityPort, WifiAdapter, connect_with_backoff};
use vendnode::app::ports::ConfigPort;
use vendnode::app::service::AppService;
use vendnode::config::DeviceConfig;
use vendnode::error::ConfigError;
use vendnode::mqtt::link::Backoff;

fn factory_defaults() -> DeviceConfig {
    let id = device_id::machine_id(&device_id::read_mac());
    DeviceConfig::new("Shop", "password1", id.as_str(), "10.0.0.5")
}

#[test]
fn first_boot_uses_mac_derived_topics() {
    let mut nvs = NvsConfigStore::new().unwrap();
    let cfg = load_or_provision(&mut nvs, factory_defaults).unwrap();
    assert_eq!(cfg.machine_id, "VENDING-EFCAFE");

    let app = AppService::new(&cfg, MockLed::new(), 0).unwrap();
    assert_eq!(app.topics().trigger, "vending/machine/VENDING-EFCAFE/trigger");
    assert_eq!(app.topics().client_id, "vending_VENDING-EFCAFE");
}

#[test]
fn second_boot_reads_persisted_config() {
    let mut nvs = NvsConfigStore::new().unwrap();
    let mut stored = factory_defaults();
    stored.machine_id = "VENDING_001".into();
    stored.reset_indicator_ms = 1_000;
    nvs.save(&stored).unwrap();

    let cfg = load_or_provision(&mut nvs, factory_defaults).unwrap();
    assert_eq!(cfg, stored);
}

#[test]
fn unusable_fallback_reports_error() {
    let mut nvs = NvsConfigStore::new().unwrap();
    // No SSID baked in and nothing stored.
    let r = load_or_provision(&mut nvs, || DeviceConfig::new("", "", "VENDING_001", ""));
    assert!(matches!(r, Err(ConfigError::ValidationFailed(_))));
    assert_eq!(nvs.load(), Err(ConfigError::NotFound));
}

#[test]
fn bring_up_with_log_sink_and_wifi() {
    let cfg = load_or_provision(&mut NvsConfigStore::new().unwrap(), factory_defaults).unwrap();

    let mut wifi = WifiAdapter::new(&cfg.wifi_ssid, &cfg.wifi_password).unwrap();
    let mut backoff = Backoff::new(cfg.reconnect_initial_secs, cfg.reconnect_max_secs);
    connect_with_backoff(&mut wifi, &mut backoff, 3, |_| {}).unwrap();
    assert!(wifi.is_connected());

    let mut sink = LogEventSink::new();
    let mut app = AppService::new(&cfg, MockLed::new(), 0).unwrap();
    app.start(0, &mut sink);
    // Started plus the boot indication.
    assert_eq!(sink.emitted(), 2);
}
