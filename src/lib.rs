//! Fridgemon firmware library.
//!
//! Exposes the pure-logic modules for integration testing and the
//! adapters the firmware binary wires together.  All ESP-IDF-specific code
//! is guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod history;
pub mod metrics;
pub mod reset;
pub mod runtime;
pub mod session;
pub mod status;
pub mod timestamp;
pub mod trigger;

pub mod adapters;
