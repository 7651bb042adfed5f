//! Application service, the core of the monitor.
//!
//! [`MonitorService`] owns the connection FSM, the temperature history and
//! the power-reset controller.  All I/O flows through port traits injected
//! at call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  SensorSession ──▶ ┌──────────────────────────┐ ──▶ OutletPort
//!      ClockPort ──▶ │      MonitorService      │ ──▶ EventSink
//!                    │  History · Reset · FSM   │ ──▶ Metrics
//!                    └──────────────────────────┘
//! ```

use std::sync::Arc;

use log::info;

use crate::config::MonitorConfig;
use crate::fsm::context::MonitorContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::history::SampleHistory;
use crate::metrics::Metrics;
use crate::reset::{PowerResetController, ResetDecision};
use crate::session::SensorSession;
use crate::status::{LoopState, SensorState, StatusSnapshot};

use super::events::AppEvent;
use super::ports::{ClockPort, EventSink, OutletPort, SensorDevice};

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

pub struct MonitorService {
    fsm: Fsm,
    ctx: MonitorContext,
    history: SampleHistory,
    reset: PowerResetController,
    metrics: Arc<Metrics>,
    sample_pending: bool,
}

impl MonitorService {
    /// Construct the service.  Does **not** start the FSM; call
    /// [`start`](Self::start) next.
    pub fn new(config: MonitorConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Idle),
            ctx: MonitorContext::new(config),
            history: SampleHistory::new(),
            reset: PowerResetController::new(config),
            metrics,
            sample_pending: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, clock: &impl ClockPort, sink: &mut impl EventSink) {
        self.history.mark_started(clock.now());
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("MonitorService started in {:?}", self.fsm.current_state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one duty-loop tick:
    ///
    /// 1. store a sample if the open session delivered one
    /// 2. evaluate the power-reset gates
    /// 3. advance the connection FSM and apply its commands
    ///
    /// The reset evaluation always completes before the connection
    /// transition, whatever the connection state.
    pub fn tick<D: SensorDevice>(
        &mut self,
        session: &mut SensorSession<D>,
        outlet: &mut impl OutletPort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        let now = clock.now();
        let prev_state = self.fsm.current_state();

        // 1. Sample intake
        if let Some(reading) = session.take_sample() {
            self.history.record(reading.temperature_f, reading.battery, now);
            self.ctx.got_data = true;
            self.metrics.temperature_points_captured.inc();
            self.metrics.current_temperature.set(reading.temperature_f);
            self.metrics.sensor_battery_percent.set(f32::from(reading.battery));
            sink.emit(&AppEvent::SampleRecorded {
                temperature_f: reading.temperature_f,
                battery: reading.battery,
                at: now,
            });
        }

        // 2. Power-reset evaluation
        let decision = self.reset.evaluate(now, &self.history, outlet);
        let config = &self.ctx.config;
        if matches!(decision, ResetDecision::Debounced | ResetDecision::Fired { .. }) {
            sink.emit(&AppEvent::OverTemperature {
                trigger_temp_f: config.trigger_temp_f,
                trigger_minutes: config.trigger_minutes,
            });
        }
        if let ResetDecision::Fired { previous } = decision {
            self.metrics.fridge_resets.inc();
            sink.emit(&AppEvent::ResetFired {
                at: now,
                previous,
                power_cycle_wait_minutes: config.power_cycle_wait_minutes,
            });
        }

        // 3. Connection FSM
        self.fsm.tick(&mut self.ctx);
        if self.ctx.take_commands().begin_sample {
            session.begin_sample();
            sink.emit(&AppEvent::ConnectStarted);
        }
        self.sample_pending = session.has_pending();

        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build the status snapshot served by `GET /sensor_state`.
    pub fn snapshot(&self) -> StatusSnapshot {
        let config = &self.ctx.config;
        StatusSnapshot {
            sensor_state: SensorState {
                temps: self.history.temperatures().collect(),
                battery: self.history.battery(),
                last_updated: self.history.last_updated(),
            },
            state: LoopState {
                connecting: self.fsm.current_state() == StateId::Connecting,
                got_data: self.sample_pending,
                wait_count: self.ctx.idle_ticks,
                trigger_temp: config.trigger_temp_f,
                trigger_minutes: config.trigger_minutes,
                cooldown_min: config.cooldown_minutes,
                power_cycle_wait_time: config.power_cycle_wait_minutes,
                last_power_reset: self.reset.last_reset(),
                reset_history: self.reset.history().iter().collect(),
            },
        }
    }

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn history(&self) -> &SampleHistory {
        &self.history
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.ctx.config
    }
}
