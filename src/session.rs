//! One-shot sensor session.
//!
//! Wraps a [`SensorDevice`] so that each subscription yields exactly one
//! reading.  The completion is an `embassy-sync` [`Signal`] shared with the
//! device; the tick polls it with `try_take`, so the radio callback never
//! blocks on the duty loop.
//!
//! [`Signal`]: embassy_sync::signal::Signal

use std::sync::Arc;

use log::debug;

use crate::app::ports::{SampleSignal, SensorDevice, SensorReading};

pub struct SensorSession<D: SensorDevice> {
    device: D,
    completion: Arc<SampleSignal>,
    subscribed: bool,
}

impl<D: SensorDevice> SensorSession<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            completion: Arc::new(SampleSignal::new()),
            subscribed: false,
        }
    }

    /// Open a subscription.  Any stale completion is discarded first.
    pub fn begin_sample(&mut self) {
        self.completion.reset();
        self.device.subscribe_realtime(Arc::clone(&self.completion));
        self.subscribed = true;
        debug!("sensor subscription opened");
    }

    /// Take the reading if the device has delivered one, ending the
    /// subscription.  Returns `None` on every later call until the next
    /// [`begin_sample`](Self::begin_sample).
    pub fn take_sample(&mut self) -> Option<SensorReading> {
        let reading = self.completion.try_take()?;
        if self.subscribed {
            self.device.unsubscribe_realtime();
            self.subscribed = false;
        }
        Some(reading)
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// The open subscription has delivered a reading that the next
    /// [`take_sample`](Self::take_sample) will return.
    pub fn has_pending(&self) -> bool {
        self.subscribed && self.completion.signaled()
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}
