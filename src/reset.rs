//! Power-reset controller.
//!
//! Decides, once per tick, whether the freezer outlet should be power
//! cycled.  Three gates apply in order:
//!
//! 1. **Cooldown**: nothing happens until more than `cooldown_minutes` have
//!    passed since the last reset.
//! 2. **Trigger**: the trailing sample window must be over threshold.
//! 3. **Debounce**: more than `trigger_minutes` (read as minutes) must have
//!    passed since the last reset.
//!
//! When all three pass the reset is recorded, the outlet is switched off
//! and an uncancellable "on" request is scheduled `power_cycle_wait_minutes`
//! later.  The outlet outcome never rolls back the recorded reset.

use std::collections::VecDeque;

use log::debug;

use crate::app::ports::{OutletPort, OutletState};
use crate::config::{MonitorConfig, RESET_HISTORY_CAPACITY};
use crate::history::SampleHistory;
use crate::timestamp::Timestamp;
use crate::trigger::is_sustained_over_temp;

// ───────────────────────────────────────────────────────────────
// Reset history
// ───────────────────────────────────────────────────────────────

/// Bounded log of reset times, oldest first.
///
/// Never empty: seeded with [`Timestamp::EPOCH`] so "last reset" is always
/// defined.  Entries are non-decreasing because they are appended with the
/// tick time and a backwards clock step cannot pass the cooldown gate.
#[derive(Debug, Clone)]
pub struct ResetHistory {
    events: VecDeque<Timestamp>,
}

impl Default for ResetHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ResetHistory {
    pub const CAPACITY: usize = RESET_HISTORY_CAPACITY;

    pub fn new() -> Self {
        let mut events = VecDeque::with_capacity(Self::CAPACITY);
        events.push_back(Timestamp::EPOCH);
        Self { events }
    }

    fn push(&mut self, at: Timestamp) {
        if self.events.len() == Self::CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back(at);
    }

    pub fn last(&self) -> Timestamp {
        self.events.back().copied().unwrap_or(Timestamp::EPOCH)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.events.iter().copied()
    }
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

/// Which gate a tick's evaluation stopped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetDecision {
    /// Within the cooldown after the previous reset.
    CoolingDown,
    /// The trailing window is not over threshold.
    Clear,
    /// Over threshold but too soon after the previous reset.
    Debounced,
    /// Reset issued; `previous` is the reset it superseded.
    Fired { previous: Timestamp },
}

pub struct PowerResetController {
    config: MonitorConfig,
    history: ResetHistory,
}

impl PowerResetController {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            history: ResetHistory::new(),
        }
    }

    /// Run the three gates and fire the reset if they all pass.
    pub fn evaluate(
        &mut self,
        now: Timestamp,
        samples: &SampleHistory,
        outlet: &mut impl OutletPort,
    ) -> ResetDecision {
        let previous = self.history.last();
        let since_last = now.saturating_since(previous);

        if since_last <= self.config.cooldown() {
            return ResetDecision::CoolingDown;
        }

        if !is_sustained_over_temp(samples, self.config.trigger_temp_f, self.config.trigger_minutes) {
            return ResetDecision::Clear;
        }

        if since_last <= self.config.trigger_duration() {
            debug!("reset debounced, last reset {}s ago", since_last.as_secs());
            return ResetDecision::Debounced;
        }

        self.history.push(now);
        outlet.request(OutletState::Off);
        outlet.request_after(self.config.power_cycle_wait(), OutletState::On);
        ResetDecision::Fired { previous }
    }

    pub fn last_reset(&self) -> Timestamp {
        self.history.last()
    }

    pub fn history(&self) -> &ResetHistory {
        &self.history
    }
}
