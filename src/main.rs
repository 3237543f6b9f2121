//! Vending Node Firmware: main entry point
//!
//! Hexagonal architecture with a single-threaded control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  FlashLed          LogEventSink   NvsConfigStore  SystemReboot │
//! │  (IndicatorPort)   (EventSink)    (ConfigPort)    (RebootPort) │
//! │  StatusPublisher   SystemMetrics  WifiAdapter                  │
//! │  (StatusPort)      (MetricsPort)  (ConnectivityPort)           │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  decode · ResetCoordinator · HealthMonitor             │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  mqtt-rx thread ──INBOUND_CHANNEL──▶ control loop (50 ms)      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::thread;
use std::time::Duration;

use anyhow::{Result, anyhow};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::gpio::PinDriver;
use esp_idf_svc::hal::peripherals::Peripherals;
use log::{error, info, warn};

use vendnode::adapters::device_id;
use vendnode::adapters::log_sink::LogEventSink;
use vendnode::adapters::nvs::{NvsConfigStore, load_or_provision};
use vendnode::adapters::reboot::SystemReboot;
use vendnode::adapters::time::MonotonicClock;
use vendnode::adapters::wifi::{ConnectivityPort, WifiAdapter, connect_with_backoff};
use vendnode::app::coordinator::ResetState;
use vendnode::app::ports::RebootPort;
use vendnode::app::service::AppService;
use vendnode::config::DeviceConfig;
use vendnode::diagnostics::{self, SystemMetrics};
use vendnode::drivers::flash_led::FlashLed;
use vendnode::drivers::watchdog::{DEFAULT_TIMEOUT_MS, Watchdog};
use vendnode::mqtt::channels::INBOUND_CHANNEL;
use vendnode::mqtt::client::MqttClient;
use vendnode::mqtt::link::Backoff;
use vendnode::mqtt::publisher::StatusPublisher;
use vendnode::pins;

/// Control loop period.
const LOOP_PERIOD_MS: u64 = 50;
/// Join attempts at boot before restarting the chip.
const WIFI_BOOT_ATTEMPTS: u32 = 10;
/// Pause before restarting after an unrecoverable bring-up failure.
const FATAL_RESTART_DELAY_MS: u64 = 10_000;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  VendNode v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    diagnostics::install_panic_handler();
    let clock = MonotonicClock::new();
    let mut reboot = SystemReboot::new();

    // ── 2. Load config from NVS (or provision build-time defaults) ──
    let mut nvs = NvsConfigStore::new().map_err(|e| anyhow!("NVS init: {e}"))?;
    let config = match load_or_provision(&mut nvs, build_time_config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("No usable configuration ({}), restarting in {}s", e, FATAL_RESTART_DELAY_MS / 1000);
            thread::sleep(Duration::from_millis(FATAL_RESTART_DELAY_MS));
            reboot.restart();
            halt();
        }
    };
    info!(
        "Machine '{}', broker {}:{}",
        config.machine_id, config.mqtt_broker, config.mqtt_port
    );

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;

    info!("Indicator: flash LED on GPIO {}", pins::FLASH_LED_GPIO);
    let indicator = FlashLed::new(PinDriver::output(peripherals.pins.gpio4)?);

    // ── 4. App service (validates config, derives topics) ─────
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(&config, indicator, clock.uptime_ms())
        .map_err(|e| anyhow!("config: {e}"))?;

    // ── 5. WiFi ───────────────────────────────────────────────
    let mut wifi = WifiAdapter::new(
        peripherals.modem,
        sysloop,
        &config.wifi_ssid,
        &config.wifi_password,
    )?;
    let mut wifi_backoff = Backoff::new(config.reconnect_initial_secs, config.reconnect_max_secs);
    if let Err(e) = connect_with_backoff(&mut wifi, &mut wifi_backoff, WIFI_BOOT_ATTEMPTS, |ms| {
        thread::sleep(Duration::from_millis(ms));
    }) {
        error!("WiFi unavailable ({}), restarting", e);
        reboot.restart();
        halt();
    }

    // ── 6. MQTT ───────────────────────────────────────────────
    let client = MqttClient::start(&config, app.topics(), &INBOUND_CHANNEL)?;
    let mut status = StatusPublisher::new(client, app.topics());
    let metrics = SystemMetrics::new(clock);

    // ── 7. Watchdog + start ───────────────────────────────────
    let watchdog = Watchdog::new(DEFAULT_TIMEOUT_MS);
    app.start(clock.uptime_ms(), &mut sink);

    info!("System ready. Entering control loop.");

    // ── 8. Control loop ───────────────────────────────────────
    let mut wifi_retry_at_ms: u64 = 0;
    loop {
        watchdog.feed();
        let now_ms = clock.uptime_ms();

        status.client_mut().service();
        app.drain(&INBOUND_CHANNEL, now_ms, &mut status, &mut sink);

        if let Err(e) = app.tick(now_ms, &mut reboot, &metrics, &mut status, &mut sink) {
            if e.is_fatal() {
                error!("Fatal: {} (halting, watchdog will reset)", e);
                halt();
            }
            warn!("Tick: {}", e);
        }

        // WiFi rejoin blocks, so only attempt it while no reset is running.
        if !wifi.is_connected() && app.state() == ResetState::Idle && now_ms >= wifi_retry_at_ms {
            watchdog.feed();
            match wifi.connect() {
                Ok(()) => wifi_backoff.reset(),
                Err(e) => {
                    let delay = wifi_backoff.next_delay_ms();
                    warn!("WiFi: rejoin failed ({}), next attempt in {}ms", e, delay);
                    wifi_retry_at_ms = clock.uptime_ms() + delay;
                }
            }
        }

        thread::sleep(Duration::from_millis(LOOP_PERIOD_MS));
    }
}

/// Connection settings baked in at build time, used on first boot.
///
/// Without `VENDNODE_MACHINE_ID` the id is derived from the factory MAC.
fn build_time_config() -> DeviceConfig {
    let mac_id = device_id::machine_id(&device_id::read_mac());
    DeviceConfig::new(
        option_env!("VENDNODE_WIFI_SSID").unwrap_or(""),
        option_env!("VENDNODE_WIFI_PASSWORD").unwrap_or(""),
        option_env!("VENDNODE_MACHINE_ID").unwrap_or(mac_id.as_str()),
        option_env!("VENDNODE_MQTT_BROKER").unwrap_or(""),
    )
}

/// Stop making progress. The subscribed control task no longer feeds the
/// TWDT, which then resets the chip.
fn halt() -> ! {
    #[allow(clippy::empty_loop)]
    loop {}
}
