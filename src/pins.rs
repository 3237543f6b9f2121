//! GPIO assignments for the ESP32-CAM vending node board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Reset indicator
// ---------------------------------------------------------------------------

/// On-board camera flash LED, active HIGH. Shared with the SD card's
/// DATA1 line, so the SD slot must stay unused on this board.
pub const FLASH_LED_GPIO: i32 = 4;
