//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.

use crate::fsm::StateId;
use crate::timestamp::Timestamp;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries initial state).
    Started(StateId),

    /// A sensor session completed and the sample was stored.
    SampleRecorded {
        temperature_f: f32,
        battery: u8,
        at: Timestamp,
    },

    /// A new sensor subscription was opened.
    ConnectStarted,

    /// The connection state machine moved.
    StateChanged { from: StateId, to: StateId },

    /// The trailing window is over threshold and the reset gates are open.
    OverTemperature {
        trigger_temp_f: f32,
        trigger_minutes: u32,
    },

    /// The outlet was switched off; re-power is scheduled.
    ResetFired {
        at: Timestamp,
        previous: Timestamp,
        power_cycle_wait_minutes: u32,
    },
}
