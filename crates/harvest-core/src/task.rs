//! Explicit farming task state threaded through every tick.
//!
//! Everything the task remembers between ticks lives in [`FarmTaskState`]:
//! whether it is active, the free-running tick counter that gates
//! rescans, the deposit sub-machine, and the current run id. The tick
//! processor reads and updates it explicitly, so tests can build a state
//! by hand and step it without a full host.

use harvest_types::FarmRunId;
use serde::{Deserialize, Serialize};

use crate::deposit::DepositMachine;

/// Why the farming task stopped itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortReason {
    /// The pathfinder could not find a route to any target.
    PathingFailed,
    /// The inventory is full and stash deposits are disabled.
    InventoryFull,
    /// The inventory is full and the stash has no room left either.
    StashFull,
}

impl AbortReason {
    /// The status line shown to the user.
    pub const fn message(self) -> &'static str {
        match self {
            Self::PathingFailed => "Farm failed",
            Self::InventoryFull => "Inventory full, stopping farm",
            Self::StashFull => "Inventory and stash are full, stopping farm",
        }
    }
}

/// Per-task state owned by the tick loop.
#[derive(Debug, Clone, Default)]
pub struct FarmTaskState {
    /// Whether the task is running.
    active: bool,
    /// Free-running, wrapping tick counter.
    tick_counter: u32,
    /// Deposit sub-machine.
    pub deposit: DepositMachine,
    /// Id of the current run, set on start.
    run_id: Option<FarmRunId>,
}

impl FarmTaskState {
    /// A new, inactive task.
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate the task under a fresh run id.
    ///
    /// The tick counter restarts at zero so the first tick scans, and any
    /// half-finished deposit cycle is forgotten.
    pub fn start(&mut self) -> FarmRunId {
        let run_id = FarmRunId::new();
        self.active = true;
        self.tick_counter = 0;
        self.deposit = DepositMachine::default();
        self.run_id = Some(run_id);
        run_id
    }

    /// Deactivate the task.
    pub fn stop(&mut self) {
        self.active = false;
        self.deposit = DepositMachine::default();
    }

    /// Whether the task is running.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// The current counter value.
    pub const fn tick_counter(&self) -> u32 {
        self.tick_counter
    }

    /// The run id, once started.
    pub const fn run_id(&self) -> Option<FarmRunId> {
        self.run_id
    }

    /// Return the counter value and advance it, wrapping at the top.
    pub const fn advance_counter(&mut self) -> u32 {
        let current = self.tick_counter;
        self.tick_counter = current.wrapping_add(1);
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deposit::DepositState;

    #[test]
    fn new_task_is_inactive() {
        let state = FarmTaskState::new();
        assert!(!state.is_active());
        assert!(state.run_id().is_none());
    }

    #[test]
    fn start_assigns_a_fresh_run() {
        let mut state = FarmTaskState::new();
        let first = state.start();
        assert!(state.is_active());
        state.stop();
        let second = state.start();
        assert_ne!(first, second);
        assert_eq!(state.run_id(), Some(second));
    }

    #[test]
    fn counter_reports_pre_increment_value_and_wraps() {
        let mut state = FarmTaskState::new();
        assert_eq!(state.advance_counter(), 0);
        assert_eq!(state.advance_counter(), 1);
        state.tick_counter = u32::MAX;
        assert_eq!(state.advance_counter(), u32::MAX);
        assert_eq!(state.tick_counter(), 0);
    }

    #[test]
    fn stop_resets_deposit_cycle() {
        let mut state = FarmTaskState::new();
        let _ = state.start();
        state.deposit = DepositMachine::in_state(DepositState::Transferring);
        state.stop();
        assert_eq!(state.deposit.state(), DepositState::Idle);
    }

    #[test]
    fn abort_messages() {
        assert_eq!(AbortReason::PathingFailed.message(), "Farm failed");
        assert!(AbortReason::StashFull.message().contains("stash"));
    }
}
