//! Shared mutable context threaded through every FSM handler.
//!
//! `MonitorContext` is the blackboard the connection states read from and
//! write to: the idle counter, the "sample arrived" flag set by the service
//! before each tick, and the commands the service applies afterwards.

use crate::config::MonitorConfig;

// ---------------------------------------------------------------------------
// Session commands (written by state handlers; applied by the service)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCommands {
    /// Open a new sensor subscription after this tick.
    pub begin_sample: bool,
}

// ---------------------------------------------------------------------------
// MonitorContext
// ---------------------------------------------------------------------------

pub struct MonitorContext {
    // -- Connection lifecycle --
    /// Idle ticks since the last completed sample.  Starts at the connect
    /// threshold so the first tick connects immediately.
    pub idle_ticks: u32,
    /// A sample was received since the last tick.
    pub got_data: bool,

    // -- Outputs --
    pub commands: SessionCommands,

    // -- Configuration --
    pub config: MonitorConfig,
}

impl MonitorContext {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            idle_ticks: config.connect_threshold_ticks,
            got_data: false,
            commands: SessionCommands::default(),
            config,
        }
    }

    /// Take and clear the pending commands.
    pub fn take_commands(&mut self) -> SessionCommands {
        core::mem::take(&mut self.commands)
    }
}
