//! Progress reporting for the sandbox run.
//!
//! [`ProgressCallback`] tallies what each tick decided and logs a summary
//! line every `report_every` ticks, plus a final one at shutdown.

use harvest_core::{FarmTaskState, TickAction, TickCallback, TickOutput};
use tracing::{debug, info};

/// Per-action counts over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionTally {
    /// Ticks spent breaking ripe crops.
    pub breaks: u64,
    /// Ticks spent planting.
    pub plants: u64,
    /// Ticks spent applying bone meal.
    pub bone_meal: u64,
    /// Ticks spent travelling.
    pub travel: u64,
    /// Ticks taken by the deposit cycle.
    pub deposit: u64,
    /// Ticks with nothing to do, including ticks waiting on the first scan.
    pub idle: u64,
}

impl ActionTally {
    /// Count one tick's action.
    pub const fn record(&mut self, action: TickAction) {
        let counter = match action {
            TickAction::Break(_) => &mut self.breaks,
            TickAction::Plant(_) => &mut self.plants,
            TickAction::BoneMeal(_) => &mut self.bone_meal,
            TickAction::Travel { .. } => &mut self.travel,
            TickAction::Deposit => &mut self.deposit,
            TickAction::Idle | TickAction::AwaitingScan => &mut self.idle,
            TickAction::Inactive | TickAction::Aborted(_) => return,
        };
        *counter = counter.saturating_add(1);
    }
}

/// Tick callback that logs farming progress.
#[derive(Debug)]
pub struct ProgressCallback {
    report_every: u64,
    tally: ActionTally,
}

impl ProgressCallback {
    /// Create a callback that reports every `report_every` ticks (0 never).
    pub fn new(report_every: u64) -> Self {
        Self {
            report_every,
            tally: ActionTally::default(),
        }
    }

    /// Counts so far.
    pub const fn tally(&self) -> ActionTally {
        self.tally
    }

    /// Log the current counts.
    pub fn report(&self, tick: u64) {
        let t = &self.tally;
        info!(
            tick,
            breaks = t.breaks,
            plants = t.plants,
            bone_meal = t.bone_meal,
            travel = t.travel,
            deposit = t.deposit,
            idle = t.idle,
            "Farm progress"
        );
    }
}

impl TickCallback for ProgressCallback {
    fn on_tick(&mut self, tick: u64, output: &TickOutput, state: &FarmTaskState) {
        self.tally.record(output.action);
        debug!(tick, action = ?output.action, active = state.is_active(), "Tick");
        if tick.checked_rem(self.report_every) == Some(0) {
            self.report(tick);
        }
    }
}
