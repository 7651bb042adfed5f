//! Fridgemon firmware, main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  BleSensor        LogEventSink   SystemClock   ExecutorOutlet  │
//! │  (SensorDevice)   (EventSink)    (ClockPort)   (OutletPort)    │
//! │  HttpApi          OutletWorker   WiFi + SNTP                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            MonitorService (pure logic)                 │    │
//! │  │  FSM · SampleHistory · PowerResetController            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Runtime: LocalExecutor duty loop · outlet worker thread       │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::sntp::EspSntp;

use fridgemon::adapters::ble_sensor::BleSensor;
use fridgemon::adapters::http_server::{self, HttpApi};
use fridgemon::adapters::log_sink::LogEventSink;
use fridgemon::adapters::outlet::{HttpOutletClient, OUTLET_CHANNEL, OutletWorker};
use fridgemon::adapters::task_pin::{self, Core};
use fridgemon::adapters::time::SystemClock;
use fridgemon::adapters::wifi;
use fridgemon::app::service::MonitorService;
use fridgemon::config::{HTTP_PORT, MonitorConfig, OutletConfig, WifiCredentials};
use fridgemon::metrics::Metrics;
use fridgemon::runtime;
use fridgemon::session::SensorSession;
use fridgemon::status::StatusBoard;

/// Outlet worker: 8 KB stack for the TLS handshake.
const OUTLET_TASK_STACK_KB: usize = 8;
const OUTLET_TASK_PRIORITY: u8 = 5;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Fridgemon v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = MonitorConfig::default();
    config.validate()?;

    // ── 2. Network: WiFi station + SNTP ───────────────────────
    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = match EspDefaultNvsPartition::take() {
        Ok(p) => Some(p),
        Err(e) => {
            warn!("NVS partition unavailable ({}), WiFi runs without calibration cache", e);
            None
        }
    };

    let creds = WifiCredentials::from_build_env()?;
    let _wifi = wifi::connect_station(peripherals.modem, sys_loop, nvs, &creds)?;
    let sntp = EspSntp::new_default()?;
    info!("SNTP: started ({:?})", sntp.get_sync_status());
    let clock = SystemClock::new();
    if !clock.is_synced() {
        warn!("Wall clock not synced yet; the first reset waits out the cooldown from the epoch");
    }

    // ── 3. Shared state + HTTP server ─────────────────────────
    let metrics = Arc::new(Metrics::new());
    let board = StatusBoard::new();
    let _server = http_server::start(HttpApi::new(board.clone(), Arc::clone(&metrics)), HTTP_PORT)?;

    // ── 4. Outlet worker (core 0) ─────────────────────────────
    let outlet_config = OutletConfig::from_env();
    let worker = OutletWorker::new(
        HttpOutletClient::new(outlet_config),
        &OUTLET_CHANNEL,
        Arc::clone(&metrics),
    );
    task_pin::spawn_on_core(
        Core::Pro,
        OUTLET_TASK_PRIORITY,
        OUTLET_TASK_STACK_KB,
        "outlet\0",
        move || worker.run(),
    )?;

    // ── 5. Sensor + service ───────────────────────────────────
    let mut ble = BleSensor::new();
    ble.start()?;
    let session = SensorSession::new(ble);
    let service = MonitorService::new(config, metrics);

    info!(
        "Monitoring: trigger {}°F for {} min, cooldown {} min, off for {} min",
        config.trigger_temp_f,
        config.trigger_minutes,
        config.cooldown_minutes,
        config.power_cycle_wait_minutes
    );

    // ── 6. Duty loop (never returns) ──────────────────────────
    runtime::run(
        service,
        session,
        clock,
        LogEventSink::new(),
        board,
        &OUTLET_CHANNEL,
    );

    Ok(())
}
