//! Inbound message channel.
//!
//! Uses an `embassy-sync` bounded channel to hand received MQTT messages
//! from the client's receiver thread to the single-threaded control loop.
//! The control loop drains it without blocking on every iteration.
//!
//! ```text
//! ┌──────────────┐  InboundMsg  ┌──────────────┐
//! │  mqtt-rx     │────────────▶│ Control Loop │
//! │  (thread)    │              │ (sync)       │
//! └──────────────┘              └──────────────┘
//! ```

use core::fmt;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::{String, Vec};

/// Largest payload accepted on the trigger topic (bytes).
pub const MAX_PAYLOAD_LEN: usize = 512;

/// Largest topic name accepted (bytes).
pub const MAX_TOPIC_LEN: usize = 128;

/// Queue depth between the receiver thread and the control loop.
pub const INBOUND_DEPTH: usize = 8;

/// A complete message received from the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMsg {
    pub topic: String<MAX_TOPIC_LEN>,
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
}

pub type InboundChannel = Channel<CriticalSectionRawMutex, InboundMsg, INBOUND_DEPTH>;

/// Broker → control loop.
pub static INBOUND_CHANNEL: InboundChannel = Channel::new();

/// Why an inbound message was not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    PayloadTooLarge(usize),
    TopicTooLong(usize),
    QueueFull,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PayloadTooLarge(n) => write!(f, "payload too large ({n} bytes)"),
            Self::TopicTooLong(n) => write!(f, "topic too long ({n} bytes)"),
            Self::QueueFull => write!(f, "inbound queue full"),
        }
    }
}

/// Copy a received message into the channel without blocking.
pub fn forward_inbound(
    channel: &InboundChannel,
    topic: &str,
    data: &[u8],
) -> Result<(), DropReason> {
    let mut t = String::new();
    t.push_str(topic)
        .map_err(|()| DropReason::TopicTooLong(topic.len()))?;
    let payload =
        Vec::from_slice(data).map_err(|()| DropReason::PayloadTooLarge(data.len()))?;

    channel
        .try_send(InboundMsg { topic: t, payload })
        .map_err(|_| DropReason::QueueFull)
}
