//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the boundary the bring-up code uses to
//! join the configured network before the broker session starts.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `BlockingWifi<EspWifi>` from `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Reconnection policy
//!
//! [`connect_with_backoff`] retries a failed join after an exponential
//! backoff (2 s → 4 s → 8 s … capped at the configured maximum).

use log::{error, info, warn};

use crate::error::ConnectionError;
use crate::mqtt::link::Backoff;

/// Longest a single blocking join step (associate, then DHCP) may take
/// before `BlockingWifi` gives up on it.
pub const JOIN_STEP_MAX_MS: u32 = 15_000;

/// WPA2-Personal passphrases are 8 to 63 characters.
#[cfg(not(target_os = "espidf"))]
const WPA2_MIN_PASSPHRASE: usize = 8;

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

pub trait ConnectivityPort {
    /// Join the network and wait for an IP address.
    fn connect(&mut self) -> Result<(), ConnectionError>;
    fn is_connected(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    ssid: heapless::String<32>,
    password: heapless::String<64>,

    #[cfg(target_os = "espidf")]
    wifi: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,

    #[cfg(not(target_os = "espidf"))]
    reachable: bool,
    #[cfg(not(target_os = "espidf"))]
    connected: bool,
    #[cfg(not(target_os = "espidf"))]
    attempts: u32,
}

impl WifiAdapter {
    /// Take the modem and prepare the station interface (not yet connected).
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: esp_idf_svc::hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        ssid: &str,
        password: &str,
    ) -> Result<Self, ConnectionError> {
        use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

        let (ssid, password) = credentials(ssid, password)?;
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), None).map_err(|e| {
            error!("WiFi: driver init failed: {:?}", e);
            ConnectionError::WifiConnectFailed
        })?;
        let wifi = BlockingWifi::wrap(esp_wifi, sysloop).map_err(|e| {
            error!("WiFi: event loop wrap failed: {:?}", e);
            ConnectionError::WifiConnectFailed
        })?;
        Ok(Self {
            ssid,
            password,
            wifi,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConnectionError> {
        let (ssid, password) = credentials(ssid, password)?;
        Ok(Self {
            ssid,
            password,
            reachable: true,
            connected: false,
            attempts: 0,
        })
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Simulation: make the access point (un)reachable.
    #[cfg(not(target_os = "espidf"))]
    pub fn set_reachable(&mut self, reachable: bool) {
        self.reachable = reachable;
        if !reachable {
            self.connected = false;
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectionError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        use crate::drivers::watchdog::Watchdog;

        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let conf = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.clone(),
            password: self.password.clone(),
            auth_method,
            ..Default::default()
        });

        let fail = |step: &str, e: esp_idf_svc::sys::EspError| {
            warn!("WiFi: {} failed: {:?}", step, e);
            ConnectionError::WifiConnectFailed
        };
        self.wifi
            .set_configuration(&conf)
            .map_err(|e| fail("configure", e))?;
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi.start().map_err(|e| fail("start", e))?;
        }
        self.wifi.connect().map_err(|e| fail("connect", e))?;
        // Each step may block for up to JOIN_STEP_MAX_MS.
        Watchdog::feed_current_task();
        self.wifi.wait_netif_up().map_err(|e| fail("netif up", e))?;

        if let Ok(ip) = self.wifi.wifi().sta_netif().get_ip_info() {
            info!("WiFi: IP {}", ip.ip);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectionError> {
        self.attempts += 1;
        if !self.reachable {
            return Err(ConnectionError::WifiConnectFailed);
        }
        // The AP refuses the handshake for a passphrase WPA2 can't carry.
        if !self.password.is_empty() && self.password.len() < WPA2_MIN_PASSPHRASE {
            warn!("WiFi(sim): passphrase too short for WPA2");
            return Err(ConnectionError::WifiConnectFailed);
        }
        self.connected = true;
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), ConnectionError> {
        info!("WiFi: connecting to '{}'", self.ssid);
        self.platform_connect()?;
        info!("WiFi: connected to '{}'", self.ssid);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_connected(&self) -> bool {
        self.connected
    }
}

// ───────────────────────────────────────────────────────────────
// Helpers
// ───────────────────────────────────────────────────────────────

type Credentials = (heapless::String<32>, heapless::String<64>);

fn credentials(ssid: &str, password: &str) -> Result<Credentials, ConnectionError> {
    let s = heapless::String::try_from(ssid).map_err(|()| ConnectionError::WifiConnectFailed)?;
    let p =
        heapless::String::try_from(password).map_err(|()| ConnectionError::WifiConnectFailed)?;
    Ok((s, p))
}

/// Try to join the network up to `max_attempts` times, sleeping the
/// backoff delay between attempts via `sleep_ms`.
pub fn connect_with_backoff(
    link: &mut impl ConnectivityPort,
    backoff: &mut Backoff,
    max_attempts: u32,
    mut sleep_ms: impl FnMut(u64),
) -> Result<(), ConnectionError> {
    let mut last = ConnectionError::WifiConnectFailed;
    for attempt in 1..=max_attempts {
        match link.connect() {
            Ok(()) => {
                backoff.reset();
                return Ok(());
            }
            Err(e) => {
                last = e;
                if attempt < max_attempts {
                    let delay = backoff.next_delay_ms();
                    warn!(
                        "WiFi: attempt {}/{} failed ({}), retrying in {}ms",
                        attempt, max_attempts, e, delay
                    );
                    sleep_ms(delay);
                }
            }
        }
    }
    error!("WiFi: giving up after {} attempts", max_attempts);
    Err(last)
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
