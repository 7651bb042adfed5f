//! Mock port implementations for integration tests.
//!
//! Every outlet request and emitted event is recorded so tests can assert
//! on the full history.

use std::cell::Cell;
use std::sync::Arc;
use std::time::Duration;

use fridgemon::app::events::AppEvent;
use fridgemon::app::ports::{
    ClockPort, EventSink, OutletPort, OutletState, SampleSignal, SensorDevice, SensorReading,
};
use fridgemon::timestamp::Timestamp;

// ── Sensor ────────────────────────────────────────────────────

/// Sensor that delivers only when the test says so.
#[derive(Default)]
pub struct MockSensor {
    target: Option<Arc<SampleSignal>>,
    pub subscribes: u32,
    pub unsubscribes: u32,
}

#[allow(dead_code)]
impl MockSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_listening(&self) -> bool {
        self.target.is_some()
    }

    /// Complete the open subscription.  Returns `false` if none is open.
    pub fn deliver(&mut self, temperature_f: f32, battery: u8) -> bool {
        match self.target.take() {
            Some(sig) => {
                sig.signal(SensorReading {
                    temperature_f,
                    battery,
                });
                true
            }
            None => false,
        }
    }
}

impl SensorDevice for MockSensor {
    fn subscribe_realtime(&mut self, completion: Arc<SampleSignal>) {
        self.subscribes += 1;
        self.target = Some(completion);
    }

    fn unsubscribe_realtime(&mut self) {
        self.unsubscribes += 1;
        self.target = None;
    }
}

// ── Outlet ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutletCall {
    /// `None` for an immediate request.
    pub delay: Option<Duration>,
    pub state: OutletState,
    pub issued_at: Timestamp,
}

/// Records outlet requests.  `issued_at` is stamped from the shared clock.
pub struct MockOutlet {
    pub calls: Vec<OutletCall>,
    now: Timestamp,
}

#[allow(dead_code)]
impl MockOutlet {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            now: Timestamp::EPOCH,
        }
    }

    pub fn sync_time(&mut self, now: Timestamp) {
        self.now = now;
    }

    pub fn offs(&self) -> Vec<Timestamp> {
        self.calls
            .iter()
            .filter(|c| c.state == OutletState::Off && c.delay.is_none())
            .map(|c| c.issued_at)
            .collect()
    }
}

impl OutletPort for MockOutlet {
    fn request(&mut self, state: OutletState) {
        self.calls.push(OutletCall {
            delay: None,
            state,
            issued_at: self.now,
        });
    }

    fn request_after(&mut self, delay: Duration, state: OutletState) {
        self.calls.push(OutletCall {
            delay: Some(delay),
            state,
            issued_at: self.now,
        });
    }
}

// ── Clock ─────────────────────────────────────────────────────

pub struct ManualClock {
    now: Cell<Timestamp>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn at(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, d: Duration) {
        self.now.set(self.now.get().saturating_add(d));
    }

    pub fn set(&self, t: Timestamp) {
        self.now.set(t);
    }
}

impl ClockPort for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
