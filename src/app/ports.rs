//! Port traits: the boundary between domain logic and the outside world.
//!
//! ```text
//!   SensorDevice ──▶ MonitorService ──▶ OutletPort
//!      ClockPort ──▶                ──▶ EventSink
//! ```
//!
//! Driven adapters (BLE sensor, outlet worker, wall clock, log sink)
//! implement these traits.  The [`MonitorService`](super::service::MonitorService)
//! consumes them via generics, so the domain core never touches the radio
//! or the network directly.

use core::time::Duration;
use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::timestamp::Timestamp;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: radio → domain)
// ───────────────────────────────────────────────────────────────

/// One decoded sensor sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Degrees Fahrenheit.
    pub temperature_f: f32,
    /// Battery charge, percent.
    pub battery: u8,
}

/// Single-completion handle for one sensor session.
///
/// Written from the radio stack's callback context, read by the tick.
pub type SampleSignal = Signal<CriticalSectionRawMutex, SensorReading>;

/// A sensor that pushes realtime samples to a subscriber.
///
/// The device completes the signal at most once per subscription and ends
/// the subscription itself when it does.
pub trait SensorDevice {
    /// Start delivering samples into `completion`.
    fn subscribe_realtime(&mut self, completion: Arc<SampleSignal>);

    /// Stop delivering samples.  Idempotent.
    fn unsubscribe_realtime(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Outlet port (driven adapter: domain → smart outlet)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutletState {
    On,
    Off,
}

impl OutletState {
    /// Wire value of the `powerState` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

/// Fire-and-forget outlet control.
///
/// Neither call reports the outcome; the adapter logs it.  A deferred
/// request cannot be cancelled once issued.
pub trait OutletPort {
    /// Request `state` now.
    fn request(&mut self, state: OutletState);

    /// Request `state` once `delay` has elapsed.
    fn request_after(&mut self, delay: Duration, state: OutletState);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    fn now(&self) -> Timestamp;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
