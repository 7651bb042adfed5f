//! Status snapshot published by the duty loop and served over HTTP.
//!
//! The duty loop builds a [`StatusSnapshot`] at the end of every tick and
//! replaces the one held by the [`StatusBoard`].  HTTP handlers clone the
//! latest snapshot, so a reader never sees a half-updated tick.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::timestamp::Timestamp;

/// Body of `GET /sensor_state`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub sensor_state: SensorState,
    pub state: LoopState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorState {
    /// Stored temperatures (°F), oldest first.
    pub temps: Vec<f32>,
    pub battery: Option<u8>,
    /// Time of the latest sample, or of startup before the first one.
    pub last_updated: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopState {
    pub connecting: bool,
    /// A reading has arrived that the next tick will record.
    pub got_data: bool,
    /// Idle ticks since the last sample.
    pub wait_count: u32,
    pub trigger_temp: f32,
    pub trigger_minutes: u32,
    pub cooldown_min: u32,
    pub power_cycle_wait_time: u32,
    pub last_power_reset: Timestamp,
    pub reset_history: Vec<Timestamp>,
}

impl StatusSnapshot {
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Latest-value cell shared between the duty loop and the HTTP server.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    inner: Arc<Mutex<StatusSnapshot>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, snapshot: StatusSnapshot) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    pub fn read(&self) -> StatusSnapshot {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
