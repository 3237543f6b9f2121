//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the rules for the remote reset: command types,
//! the reset state machine, the health heartbeat and the service that
//! routes inbound messages. All interaction with hardware and the network
//! happens through **port traits** defined in [`ports`], keeping this
//! layer fully testable without real peripherals.

pub mod commands;
pub mod coordinator;
pub mod events;
pub mod health;
pub mod ports;
pub mod service;
