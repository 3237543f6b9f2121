//! MQTT message channel.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        MQTT Stack                            │
//! │                                                              │
//! │  ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌───────────┐  │
//! │  │  Client  │──▶│ Channels │──▶│  Codec   │──▶│ AppService│  │
//! │  │ (mqtt-rx)│   │ (FIFO)   │   │ (decode) │   │           │  │
//! │  └──────────┘   └──────────┘   └──────────┘   └───────────┘  │
//! │       ▲                                             │        │
//! │       │          ┌──────────┐                       │        │
//! │       └──────────│Publisher │◀──────────────────────┘        │
//! │                  │(status)  │                                │
//! │                  └──────────┘                                │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod channels;
pub mod client;
pub mod codec;
pub mod link;
pub mod publisher;
pub mod topics;
