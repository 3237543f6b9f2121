//! Unified error types for the vending node firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! control loop's error handling uniform. All variants are `Copy` so they
//! can be passed through the coordinator and logged without allocation.
//!
//! | Kind                    | Severity  | Handling                           |
//! |-------------------------|-----------|------------------------------------|
//! | [`ConnectionError`]     | transient | retried with backoff               |
//! | [`DecodeError`]         | transient | message dropped, warn logged       |
//! | `ResetInProgress`       | expected  | message dropped, debug logged      |
//! | `RebootReturned`        | fatal     | control loop halts, TWDT resets    |

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The broker (or the network below it) is unreachable.
    Connection(ConnectionError),
    /// An inbound payload could not be turned into a command.
    Decode(DecodeError),
    /// A reset sequence is already running; the trigger was ignored.
    ResetInProgress,
    /// The reboot capability returned instead of restarting the chip.
    RebootReturned,
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl Error {
    /// Only a returning reboot call is unrecoverable.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::RebootReturned)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "connection: {e}"),
            Self::Decode(e) => write!(f, "decode: {e}"),
            Self::ResetInProgress => write!(f, "reset already in progress"),
            Self::RebootReturned => write!(f, "reboot capability returned"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Connection errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionError {
    WifiConnectFailed,
    BrokerUnreachable,
    SubscribeFailed,
    PublishFailed,
    /// The client has not (yet) established a session.
    NotConnected,
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::BrokerUnreachable => write!(f, "MQTT broker unreachable"),
            Self::SubscribeFailed => write!(f, "MQTT subscribe failed"),
            Self::PublishFailed => write!(f, "MQTT publish failed"),
            Self::NotConnected => write!(f, "not connected"),
        }
    }
}

impl core::error::Error for ConnectionError {}

impl From<ConnectionError> for Error {
    fn from(e: ConnectionError) -> Self {
        Self::Connection(e)
    }
}

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

/// Why an inbound trigger payload was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Not UTF-8, not JSON, not an object, or `action` missing / not a string.
    Malformed,
    /// Structurally valid, but `action` names something this firmware does not do.
    UnrecognizedAction,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed payload"),
            Self::UnrecognizedAction => write!(f, "unrecognized action"),
        }
    }
}

impl core::error::Error for DecodeError {}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config is not valid JSON for [`DeviceConfig`](crate::config::DeviceConfig).
    Corrupted,
    /// A field failed validation. The string names the field and the rule.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
