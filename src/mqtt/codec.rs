//! JSON payload codec.
//!
//! Inbound (`trigger` topic):
//! ```text
//! {"action": "reset"}          → Ok(ResetCommand)
//! {"action": "unplug"}         → Err(UnrecognizedAction)
//! {"action": 5} / [..] / junk  → Err(Malformed)
//! ```
//! Matching is exact and case-sensitive. Unknown extra fields are ignored
//! so newer controllers can add fields without breaking older units.
//!
//! Outbound payloads are small fixed-shape objects built with `serde`.

use serde::Serialize;
use serde_json::Value;

use crate::app::commands::ResetCommand;
use crate::app::events::{DeviceStatus, HealthReport};
use crate::error::DecodeError;

/// Decode a trigger payload into a command.
pub fn decode_trigger(payload: &[u8]) -> Result<ResetCommand, DecodeError> {
    let value: Value = serde_json::from_slice(payload).map_err(|_| DecodeError::Malformed)?;
    let action = value
        .as_object()
        .and_then(|obj| obj.get("action"))
        .and_then(Value::as_str)
        .ok_or(DecodeError::Malformed)?;

    if action == ResetCommand::ACTION {
        Ok(ResetCommand)
    } else {
        Err(DecodeError::UnrecognizedAction)
    }
}

#[derive(Serialize)]
struct StatusPayload<'a> {
    status: &'a str,
}

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    uptime_s: u64,
    mem_free_b: u32,
    mem_alloc_b: u32,
    mem_min_free_b: u32,
}

/// `{"status":"resetting"}`
pub fn encode_status(status: DeviceStatus) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&StatusPayload {
        status: status.as_str(),
    })
}

/// `{"status":"healthy","uptime_s":..,"mem_free_b":..,"mem_alloc_b":..,"mem_min_free_b":..}`
pub fn encode_health(report: &HealthReport) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&HealthPayload {
        status: "healthy",
        uptime_s: report.uptime_s,
        mem_free_b: report.mem_free_b,
        mem_alloc_b: report.mem_alloc_b,
        mem_min_free_b: report.mem_min_free_b,
    })
}
