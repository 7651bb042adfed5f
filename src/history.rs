//! Rolling temperature history.
//!
//! A fixed-capacity ring of the most recent samples (one per completed
//! sensor session, nominally one per minute) plus the battery level and
//! timestamp of the latest sample.  Oldest samples are evicted first.

use heapless::HistoryBuffer;
use serde::Serialize;

use crate::config::SAMPLE_CAPACITY;
use crate::timestamp::Timestamp;

/// One temperature reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureSample {
    /// Degrees Fahrenheit.
    pub value_f: f32,
    pub captured_at: Timestamp,
}

pub struct SampleHistory {
    samples: HistoryBuffer<TemperatureSample, SAMPLE_CAPACITY>,
    battery: Option<u8>,
    last_updated: Option<Timestamp>,
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleHistory {
    pub const CAPACITY: usize = SAMPLE_CAPACITY;

    pub const fn new() -> Self {
        Self {
            samples: HistoryBuffer::new(),
            battery: None,
            last_updated: None,
        }
    }

    /// Append a sample, evicting the oldest when full.
    pub fn record(&mut self, value_f: f32, battery: u8, now: Timestamp) {
        self.samples.write(TemperatureSample {
            value_f,
            captured_at: now,
        });
        self.battery = Some(battery);
        self.last_updated = Some(now);
    }

    /// Stamp the start time so `last_updated` is set before the first
    /// sample arrives.
    pub fn mark_started(&mut self, now: Timestamp) {
        self.last_updated = Some(now);
    }

    /// The last `n` samples, oldest first.  Shorter when the history holds
    /// fewer than `n`.
    pub fn recent_window(&self, n: usize) -> impl Iterator<Item = &TemperatureSample> + '_ {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.oldest_ordered().skip(skip)
    }

    pub fn latest(&self) -> Option<&TemperatureSample> {
        self.samples.recent()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.len() == 0
    }

    /// All stored temperatures, oldest first.
    pub fn temperatures(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.oldest_ordered().map(|s| s.value_f)
    }

    pub fn battery(&self) -> Option<u8> {
        self.battery
    }

    pub fn last_updated(&self) -> Option<Timestamp> {
        self.last_updated
    }
}
