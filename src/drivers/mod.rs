//! Output drivers and peripheral helpers.

pub mod flash_led;
pub mod indicator;
pub mod watchdog;
