//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters and the host simulation backends. All tests run
//! on the host (x86_64) with no real hardware required.

#![cfg(not(target_os = "espidf"))]

mod broker_tests;
mod mock_hw;
mod provisioning_tests;
mod reset_flow_tests;
