//! Sustained over-temperature detection.

use crate::history::SampleHistory;

/// `true` when each of the last `trigger_minutes` samples is strictly above
/// `trigger_temp_f`.
///
/// A history holding fewer than `trigger_minutes` samples never triggers.
/// A window of zero holds vacuously.
pub fn is_sustained_over_temp(history: &SampleHistory, trigger_temp_f: f32, trigger_minutes: u32) -> bool {
    let window = trigger_minutes as usize;
    let over = history
        .recent_window(window)
        .filter(|s| s.value_f > trigger_temp_f)
        .count();
    over >= window
}
