//! Connection state handlers and table builder.
//!
//! ```text
//!  IDLE ──[idle_ticks >= threshold]──▶ CONNECTING
//!    ▲                                    │
//!    └────────[sample received]───────────┘
//! ```
//!
//! Connecting has no timeout: a session that never completes keeps the
//! machine there until the device delivers.

use log::debug;

use super::context::MonitorContext;
use super::{StateDescriptor, StateId};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: None,
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: Connecting
        StateDescriptor {
            id: StateId::Connecting,
            name: "Connecting",
            on_enter: Some(connecting_enter),
            on_exit: None,
            on_update: connecting_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_update(ctx: &mut MonitorContext) -> Option<StateId> {
    if ctx.idle_ticks >= ctx.config.connect_threshold_ticks {
        return Some(StateId::Connecting);
    }
    ctx.idle_ticks += 1;
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONNECTING state (one sensor subscription open)
// ═══════════════════════════════════════════════════════════════════════════

fn connecting_enter(ctx: &mut MonitorContext) {
    ctx.commands.begin_sample = true;
    debug!("CONNECTING: opening sensor session after {} idle ticks", ctx.idle_ticks);
}

fn connecting_update(ctx: &mut MonitorContext) -> Option<StateId> {
    if ctx.got_data {
        ctx.got_data = false;
        ctx.idle_ticks = 0;
        return Some(StateId::Idle);
    }
    None
}
