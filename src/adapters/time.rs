//! Wall-clock adapter.
//!
//! Implements [`ClockPort`] from the system time.  On the device
//! `SystemTime` is backed by `gettimeofday`, which reads 1970 until SNTP
//! has synced; callers treat that as "recently after the epoch".

use std::time::{SystemTime, UNIX_EPOCH};

use crate::app::ports::ClockPort;
use crate::timestamp::Timestamp;

/// First second of 2020; anything earlier means SNTP has not synced yet.
const EPOCH_2020_SECS: u64 = 1_577_836_800;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }

    /// Whether the wall clock looks like it has been set.
    pub fn is_synced(&self) -> bool {
        is_synced_at(self.now())
    }
}

fn is_synced_at(t: Timestamp) -> bool {
    t.as_millis() / 1000 >= EPOCH_2020_SECS
}

impl ClockPort for SystemClock {
    fn now(&self) -> Timestamp {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Timestamp::from_millis(ms)
    }
}
