//! Device identity derived from the ESP32 factory MAC address.
//!
//! Produces a stable machine id in the form `VENDING-XXYYZZ` (last 3 bytes
//! of the 6-byte MAC in uppercase hex). Used when no machine id has been
//! provisioned, so an unconfigured unit still gets unique topics.

use core::fmt::Write;

/// Fixed-size device ID string: "VENDING-XXYYZZ" (14 chars).
pub type DeviceIdString = heapless::String<16>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: `mac` is a valid 6-byte buffer, as esp_efuse_mac_get_default requires.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Derive the default machine id from the last 3 MAC bytes.
pub fn machine_id(mac: &MacAddress) -> DeviceIdString {
    let mut id = DeviceIdString::new();
    let _ = write!(id, "VENDING-{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5]);
    id
}
