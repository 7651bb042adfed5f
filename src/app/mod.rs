//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the freezer monitor:
//! sample intake, power-reset gating and connection scheduling.  All
//! interaction with the radio, the network and the clock happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
