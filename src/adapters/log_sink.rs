//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::SampleRecorded {
                temperature_f,
                battery,
                at,
            } => {
                debug!("SAMPLE | T={:.3}F battery={}% at={}", temperature_f, battery, at);
            }
            AppEvent::ConnectStarted => {
                debug!("SENSOR | connecting");
            }
            AppEvent::StateChanged { from, to } => {
                debug!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::OverTemperature {
                trigger_temp_f,
                trigger_minutes,
            } => {
                info!(
                    "Freezer has been over trigger temp of ({}F) for at least ({}) minutes.",
                    trigger_temp_f, trigger_minutes
                );
            }
            AppEvent::ResetFired {
                previous,
                power_cycle_wait_minutes,
                ..
            } => {
                info!(
                    "Resetting fridge power, last reset was at ({}); back on in {} minutes",
                    previous, power_cycle_wait_minutes
                );
            }
        }
    }
}
