//! Inbound commands to the application core.
//!
//! Produced by the [trigger decoder](crate::mqtt::codec::decode_trigger)
//! from MQTT payloads and consumed by the
//! [`ResetCoordinator`](super::coordinator::ResetCoordinator).

/// The one instruction this firmware acts on.
///
/// Carries no identifier: duplicate deliveries are absorbed by the
/// coordinator's re-entrancy guard, not by command identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetCommand;

impl ResetCommand {
    /// Wire value of the `action` field.
    pub const ACTION: &'static str = "reset";
}
