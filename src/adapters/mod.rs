//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `device_id`    | -                  | eFuse factory MAC        |
//! | `log_sink`     | EventSink          | Serial log output        |
//! | `nvs`          | ConfigPort         | NVS / in-memory store    |
//! | `reboot`       | RebootPort         | `esp_restart()`          |
//! | `time`         | -                  | ESP32 system timer       |
//! | `wifi`         | ConnectivityPort   | ESP-IDF WiFi STA         |
//!
//! The status publisher (`StatusPort`) lives with the MQTT stack in
//! [`crate::mqtt::publisher`]; the flash LED (`IndicatorPort`) in
//! [`crate::drivers::flash_led`].

pub mod device_id;
pub mod log_sink;
pub mod nvs;
pub mod reboot;
pub mod time;
pub mod wifi;
