//! Duty-loop tests: the tick → snapshot → status board path the HTTP
//! server reads from.

use std::sync::Arc;

use crate::mock_ports::{ManualClock, MockOutlet, RecordingSink};

use fridgemon::adapters::ble_sensor::BleSensor;
use fridgemon::adapters::http_server::HttpApi;
use fridgemon::app::ports::SensorReading;
use fridgemon::app::service::MonitorService;
use fridgemon::config::MonitorConfig;
use fridgemon::metrics::Metrics;
use fridgemon::runtime::DutyLoop;
use fridgemon::session::SensorSession;
use fridgemon::status::StatusBoard;
use fridgemon::timestamp::Timestamp;

fn duty_loop(
    reading: SensorReading,
) -> (DutyLoop<BleSensor, MockOutlet, ManualClock, RecordingSink>, Arc<Metrics>) {
    let metrics = Arc::new(Metrics::new());
    let mut ble = BleSensor::new();
    ble.start().unwrap();
    ble.set_sim_reading(reading);
    let clock = ManualClock::at(Timestamp::from_millis(1_790_000_000_000));
    let mut sink = RecordingSink::new();
    let mut service = MonitorService::new(MonitorConfig::default(), Arc::clone(&metrics));
    service.start(&clock, &mut sink);

    let duty = DutyLoop {
        service,
        session: SensorSession::new(ble),
        outlet: MockOutlet::new(),
        clock,
        sink,
        board: StatusBoard::new(),
    };
    (duty, metrics)
}

#[test]
fn each_tick_publishes_a_snapshot() {
    let (mut duty, _) = duty_loop(SensorReading {
        temperature_f: -2.5,
        battery: 64,
    });

    duty.tick_once();
    let snap = duty.board.read();
    assert!(snap.state.connecting);
    assert!(snap.sensor_state.temps.is_empty());

    // The simulated sensor answers as soon as it is subscribed.
    duty.tick_once();
    let snap = duty.board.read();
    assert!(!snap.state.connecting);
    assert_eq!(snap.sensor_state.temps, vec![-2.5]);
    assert_eq!(snap.sensor_state.battery, Some(64));
    assert_eq!(snap.state.wait_count, 0);
}

#[test]
fn http_bodies_follow_the_duty_loop() {
    let (mut duty, metrics) = duty_loop(SensorReading {
        temperature_f: 7.0,
        battery: 50,
    });
    let api = HttpApi::new(duty.board.clone(), Arc::clone(&metrics));

    duty.tick_once();
    duty.tick_once();

    let v: serde_json::Value = serde_json::from_slice(&api.sensor_state_body().unwrap()).unwrap();
    assert_eq!(v["sensorState"]["temps"][0], 7.0);
    assert_eq!(v["sensorState"]["battery"], 50);
    assert_eq!(v["state"]["triggerTemp"], 20.0);
    assert_eq!(v["state"]["resetHistory"].as_array().map(Vec::len), Some(1));

    let text = api.metrics_body();
    assert!(text.contains("temperature_points_captured 1\n"));
    assert!(text.contains("current_temperature 7\n"));
}

#[test]
fn got_data_marks_a_reading_awaiting_the_next_tick() {
    let (mut duty, _) = duty_loop(SensorReading {
        temperature_f: 3.0,
        battery: 80,
    });
    assert!(!duty.board.read().state.got_data);

    // Subscribed this tick; the simulated sensor has already answered.
    duty.tick_once();
    let snap = duty.board.read();
    assert!(snap.state.connecting);
    assert!(snap.state.got_data);

    // Recorded and consumed.
    duty.tick_once();
    let snap = duty.board.read();
    assert!(!snap.state.got_data);
    assert_eq!(snap.sensor_state.temps, vec![3.0]);
}
