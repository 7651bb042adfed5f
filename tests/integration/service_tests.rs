//! Integration tests for the MonitorService → session / reset / outlet
//! pipeline.
//!
//! These drive the service tick by tick against mock ports and a manual
//! clock, so minutes of wall time cost nothing.

use std::sync::Arc;
use std::time::Duration;

use crate::mock_ports::{ManualClock, MockOutlet, MockSensor, RecordingSink};

use fridgemon::app::events::AppEvent;
use fridgemon::app::ports::{ClockPort, OutletState};
use fridgemon::app::service::MonitorService;
use fridgemon::config::MonitorConfig;
use fridgemon::fsm::StateId;
use fridgemon::metrics::Metrics;
use fridgemon::session::SensorSession;
use fridgemon::timestamp::Timestamp;

const MINUTE: Duration = Duration::from_secs(60);

/// 2026-09-22, well after SNTP would have synced.
const SYNCED: Timestamp = Timestamp::from_millis(1_790_000_000_000);

struct Rig {
    svc: MonitorService,
    session: SensorSession<MockSensor>,
    outlet: MockOutlet,
    clock: ManualClock,
    sink: RecordingSink,
    metrics: Arc<Metrics>,
}

impl Rig {
    fn new(config: MonitorConfig, start: Timestamp) -> Self {
        let metrics = Arc::new(Metrics::new());
        let mut svc = MonitorService::new(config, Arc::clone(&metrics));
        let clock = ManualClock::at(start);
        let mut sink = RecordingSink::new();
        svc.start(&clock, &mut sink);
        Self {
            svc,
            session: SensorSession::new(MockSensor::new()),
            outlet: MockOutlet::new(),
            clock,
            sink,
            metrics,
        }
    }

    /// Reconnect on every Idle tick, so one sample costs two ticks.
    fn fast(start: Timestamp) -> Self {
        let config = MonitorConfig {
            connect_threshold_ticks: 0,
            ..MonitorConfig::default()
        };
        Self::new(config, start)
    }

    fn tick(&mut self) {
        self.outlet.sync_time(self.clock.now());
        self.svc
            .tick(&mut self.session, &mut self.outlet, &self.clock, &mut self.sink);
    }

    fn sensor(&mut self) -> &mut MockSensor {
        self.session.device_mut()
    }

    /// Advance the clock by `step`, connect if needed, deliver one reading
    /// and run the tick that records it.
    fn sample_after(&mut self, step: Duration, temperature_f: f32) {
        self.clock.advance(step);
        for _ in 0..200 {
            if self.sensor().is_listening() {
                break;
            }
            self.tick();
        }
        assert!(self.sensor().deliver(temperature_f, 90), "no open subscription");
        self.tick();
    }
}

// ── Connection cycle ──────────────────────────────────────────

#[test]
fn first_tick_opens_a_session() {
    let mut rig = Rig::new(MonitorConfig::default(), SYNCED);
    assert_eq!(rig.svc.state(), StateId::Idle);

    rig.tick();

    assert_eq!(rig.svc.state(), StateId::Connecting);
    assert_eq!(rig.sensor().subscribes, 1);
    assert!(rig.sink.events.contains(&AppEvent::ConnectStarted));
    assert!(rig.sink.events.contains(&AppEvent::StateChanged {
        from: StateId::Idle,
        to: StateId::Connecting,
    }));
}

#[test]
fn reconnects_after_threshold_idle_ticks() {
    let mut rig = Rig::new(MonitorConfig::default(), SYNCED);
    rig.tick();
    rig.sensor().deliver(-4.0, 90);
    rig.tick();
    assert_eq!(rig.svc.state(), StateId::Idle);
    assert_eq!(rig.sensor().unsubscribes, 1);

    let mut idle_ticks = 0;
    while !rig.sensor().is_listening() {
        rig.tick();
        idle_ticks += 1;
        assert!(idle_ticks <= 100, "never reconnected");
    }
    assert_eq!(idle_ticks, 61);
    assert_eq!(rig.sensor().subscribes, 2);
}

#[test]
fn silent_sensor_keeps_connecting() {
    let mut rig = Rig::new(MonitorConfig::default(), SYNCED);
    for _ in 0..500 {
        rig.tick();
    }
    assert_eq!(rig.svc.state(), StateId::Connecting);
    assert_eq!(rig.sensor().subscribes, 1);
    assert!(rig.svc.history().is_empty());
}

// ── Sample intake ─────────────────────────────────────────────

#[test]
fn last_updated_is_the_start_time_before_any_sample() {
    let mut rig = Rig::new(MonitorConfig::default(), SYNCED);
    rig.clock.advance(MINUTE);
    rig.tick();

    let snap = rig.svc.snapshot();
    assert!(snap.sensor_state.temps.is_empty());
    assert_eq!(snap.sensor_state.last_updated, Some(SYNCED));

    rig.sensor().deliver(-1.0, 90);
    rig.tick();
    assert_eq!(
        rig.svc.snapshot().sensor_state.last_updated,
        Some(SYNCED.saturating_add(MINUTE))
    );
}

#[test]
fn sample_is_stored_and_published() {
    let mut rig = Rig::fast(SYNCED);
    rig.sample_after(Duration::ZERO, 33.5);

    assert_eq!(rig.svc.history().len(), 1);
    assert_eq!(rig.metrics.temperature_points_captured.get(), 1);
    assert!((rig.metrics.current_temperature.get() - 33.5).abs() < f32::EPSILON);
    assert!((rig.metrics.sensor_battery_percent.get() - 90.0).abs() < f32::EPSILON);

    let snap = rig.svc.snapshot();
    assert_eq!(snap.sensor_state.temps, vec![33.5]);
    assert_eq!(snap.sensor_state.battery, Some(90));
    assert_eq!(snap.sensor_state.last_updated, Some(SYNCED));
    assert!(!snap.state.connecting);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::SampleRecorded { .. })),
        1
    );
}

#[test]
fn history_keeps_only_the_newest_sixty() {
    let mut rig = Rig::fast(SYNCED);
    for i in 0..75 {
        rig.sample_after(Duration::from_secs(1), i as f32);
    }
    let temps = rig.svc.snapshot().sensor_state.temps;
    assert_eq!(temps.len(), 60);
    assert_eq!(temps.first().copied(), Some(15.0));
    assert_eq!(temps.last().copied(), Some(74.0));
    assert_eq!(rig.metrics.temperature_points_captured.get(), 75);
}

// ── Power reset ───────────────────────────────────────────────

#[test]
fn five_hot_minutes_power_cycle_once() {
    let mut rig = Rig::fast(SYNCED);
    for _ in 0..5 {
        rig.sample_after(MINUTE, 25.0);
    }
    let fired_at = rig.clock.now();

    assert_eq!(rig.outlet.calls.len(), 2);
    assert_eq!(rig.outlet.calls[0].state, OutletState::Off);
    assert_eq!(rig.outlet.calls[0].delay, None);
    assert_eq!(rig.outlet.calls[1].state, OutletState::On);
    assert_eq!(rig.outlet.calls[1].delay, Some(15 * MINUTE));
    assert_eq!(rig.outlet.offs(), vec![fired_at]);

    // Cooling back down changes nothing already issued.
    rig.sample_after(MINUTE, 19.0);
    assert_eq!(rig.outlet.calls.len(), 2);

    assert_eq!(rig.metrics.fridge_resets.get(), 1);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::OverTemperature { .. })),
        1
    );
    assert!(rig.sink.events.contains(&AppEvent::ResetFired {
        at: fired_at,
        previous: Timestamp::EPOCH,
        power_cycle_wait_minutes: 15,
    }));

    let snap = rig.svc.snapshot();
    assert_eq!(snap.state.last_power_reset, fired_at);
    assert_eq!(snap.state.reset_history, vec![Timestamp::EPOCH, fired_at]);
}

#[test]
fn debounced_heat_still_raises_the_alert() {
    let config = MonitorConfig {
        connect_threshold_ticks: 0,
        cooldown_minutes: 1,
        ..MonitorConfig::default()
    };
    let mut rig = Rig::new(config, SYNCED);
    for _ in 0..5 {
        rig.sample_after(MINUTE, 25.0);
    }
    assert_eq!(rig.outlet.offs().len(), 1);

    // One minute on: still cooling down, so no alert.
    rig.sample_after(MINUTE, 25.0);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::OverTemperature { .. })),
        1
    );

    // Two minutes on: past the cooldown but inside the trigger window.
    // Both ticks of the session alert without cycling power.
    rig.sample_after(MINUTE, 25.0);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::OverTemperature { .. })),
        3
    );
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::ResetFired { .. })), 1);
    assert_eq!(rig.outlet.offs().len(), 1);
    assert_eq!(rig.metrics.fridge_resets.get(), 1);
}

#[test]
fn four_hot_then_cool_never_resets() {
    let mut rig = Rig::fast(SYNCED);
    for _ in 0..4 {
        rig.sample_after(MINUTE, 25.0);
    }
    rig.sample_after(MINUTE, 19.0);
    for _ in 0..4 {
        rig.sample_after(MINUTE, 25.0);
    }
    assert!(rig.outlet.calls.is_empty());
    assert_eq!(rig.metrics.fridge_resets.get(), 0);
}

#[test]
fn threshold_is_strictly_greater_than() {
    let mut rig = Rig::fast(SYNCED);
    for _ in 0..10 {
        rig.sample_after(MINUTE, 20.0);
    }
    assert!(rig.outlet.calls.is_empty());
}

#[test]
fn unsynced_clock_waits_out_cooldown_from_epoch() {
    let mut rig = Rig::fast(Timestamp::EPOCH);
    for _ in 0..130 {
        rig.sample_after(MINUTE, 25.0);
    }
    // Nothing before the 60th minute; then once per cooldown.
    assert_eq!(rig.outlet.offs(), vec![
        Timestamp::EPOCH.saturating_add(61 * MINUTE),
        Timestamp::EPOCH.saturating_add(122 * MINUTE),
    ]);
    assert_eq!(rig.metrics.fridge_resets.get(), 2);
}

#[test]
fn sustained_heat_resets_once_per_cooldown() {
    let mut rig = Rig::fast(SYNCED);
    for _ in 0..(3 * 60 + 10) {
        rig.sample_after(MINUTE, 30.0);
    }
    let offs = rig.outlet.offs();
    assert_eq!(offs.len(), 4);
    for pair in offs.windows(2) {
        assert!(pair[1].saturating_since(pair[0]) > 60 * MINUTE);
    }
}

#[test]
fn reset_is_evaluated_while_connecting() {
    let mut rig = Rig::new(MonitorConfig::default(), SYNCED);
    // Five hot readings, each followed by the full idle wait.
    for _ in 0..5 {
        rig.sample_after(MINUTE, 28.0);
    }
    assert_eq!(rig.outlet.offs().len(), 1);

    // Sensor goes silent mid-session; the clock moves past the cooldown.
    while !rig.sensor().is_listening() {
        rig.tick();
    }
    rig.clock.advance(61 * MINUTE);
    rig.tick();

    assert_eq!(rig.svc.state(), StateId::Connecting);
    assert_eq!(rig.outlet.offs().len(), 2);
}

#[test]
fn clock_stepping_back_stays_in_cooldown() {
    let mut rig = Rig::fast(SYNCED);
    for _ in 0..5 {
        rig.sample_after(MINUTE, 25.0);
    }
    assert_eq!(rig.outlet.offs().len(), 1);

    rig.clock.set(Timestamp::from_millis(SYNCED.as_millis() - 3_600_000 * 24));
    for _ in 0..10 {
        rig.sample_after(MINUTE, 25.0);
    }
    assert_eq!(rig.outlet.offs().len(), 1);
}
