//! Cooperative runtime for the duty loop.
//!
//! One `edge-executor` [`LocalExecutor`] drives everything on the main
//! task, with `async-io-mini` timers for wake-ups (no busy-spinning):
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────┐
//!  │  Main task                                               │
//!  │  ┌────────────────────────────────────────────────────┐  │
//!  │  │  futures_lite::future::block_on                    │  │
//!  │  │  ┌──────────────────────────────────────────────┐  │  │
//!  │  │  │  edge_executor::LocalExecutor                │  │  │
//!  │  │  │  ┌────────────┐  ┌─────────────────────────┐ │  │  │
//!  │  │  │  │ Duty loop  │  │ Deferred outlet request │ │  │  │
//!  │  │  │  │ 1 s ⏱      │  │ N min ⏱ (detached)      │ │  │  │
//!  │  │  │  └────────────┘  └─────────────────────────┘ │  │  │
//!  │  │  └──────────────────────────────────────────────┘  │  │
//!  │  └────────────────────────────────────────────────────┘  │
//!  └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Outlet HTTP calls leave this task through the outlet channel, so a
//! slow outlet never delays a tick.

use core::time::Duration;

use async_io_mini::Timer;
use edge_executor::LocalExecutor;
use log::info;

use crate::adapters::outlet::{self, OutletChannel};
use crate::app::ports::{ClockPort, EventSink, OutletPort, OutletState, SensorDevice};
use crate::app::service::MonitorService;
use crate::session::SensorSession;
use crate::status::StatusBoard;

/// Executor task-queue depth.
pub const EXECUTOR_QUEUE: usize = 8;

pub type Executor<'a> = LocalExecutor<'a, EXECUTOR_QUEUE>;

// ── Outlet port over the executor ────────────────────────────

/// [`OutletPort`] that enqueues immediate requests for the outlet worker
/// and parks deferred ones as detached timer tasks.
pub struct ExecutorOutlet<'a> {
    executor: &'a Executor<'a>,
    channel: &'static OutletChannel,
}

impl<'a> ExecutorOutlet<'a> {
    pub fn new(executor: &'a Executor<'a>, channel: &'static OutletChannel) -> Self {
        Self { executor, channel }
    }
}

impl OutletPort for ExecutorOutlet<'_> {
    fn request(&mut self, state: OutletState) {
        outlet::enqueue(self.channel, state);
    }

    fn request_after(&mut self, delay: Duration, state: OutletState) {
        let channel = self.channel;
        self.executor
            .spawn(async move {
                Timer::after(delay).await;
                if state == OutletState::On {
                    info!("Powering fridge back on after ({}) minutes...", delay.as_secs() / 60);
                }
                outlet::enqueue(channel, state);
            })
            .detach();
    }
}

// ── Duty loop ────────────────────────────────────────────────

pub struct DutyLoop<D, O, C, S>
where
    D: SensorDevice,
    O: OutletPort,
    C: ClockPort,
    S: EventSink,
{
    pub service: MonitorService,
    pub session: SensorSession<D>,
    pub outlet: O,
    pub clock: C,
    pub sink: S,
    pub board: StatusBoard,
}

impl<D, O, C, S> DutyLoop<D, O, C, S>
where
    D: SensorDevice,
    O: OutletPort,
    C: ClockPort,
    S: EventSink,
{
    /// One tick, then publish the resulting snapshot.
    pub fn tick_once(&mut self) {
        self.service
            .tick(&mut self.session, &mut self.outlet, &self.clock, &mut self.sink);
        self.board.publish(self.service.snapshot());
    }

    /// Tick forever, one tick per configured period.
    pub async fn run(mut self) {
        let period = self.service.config().tick_period();
        self.service.start(&self.clock, &mut self.sink);
        self.board.publish(self.service.snapshot());
        loop {
            self.tick_once();
            Timer::after(period).await;
        }
    }
}

// ── Entry point ──────────────────────────────────────────────

/// Leak an executor, spawn the duty loop and drive it on the calling
/// thread.  Does not return.
pub fn run<D, C, S>(
    service: MonitorService,
    session: SensorSession<D>,
    clock: C,
    sink: S,
    board: StatusBoard,
    channel: &'static OutletChannel,
) where
    D: SensorDevice + 'static,
    C: ClockPort + 'static,
    S: EventSink + 'static,
{
    let executor: &'static Executor<'static> = Box::leak(Box::new(LocalExecutor::new()));

    let duty = DutyLoop {
        service,
        session,
        outlet: ExecutorOutlet::new(executor, channel),
        clock,
        sink,
        board,
    };
    executor.spawn(duty.run()).detach();

    info!("Runtime started (duty loop on local executor)");
    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
}
