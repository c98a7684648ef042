//! The per-tick farming decision.
//!
//! [`FarmTickProcessor::tick`] turns the task state, the last pathing
//! status, and live host queries into exactly one [`Directive`]. Each tick
//! runs these steps in order and stops at the first that decides:
//!
//! 1. **Deposit** -- with inventory checks on, the deposit machine may
//!    preempt farming or abort the task.
//! 2. **Snapshot** -- maybe start a rescan; with no snapshot yet, pause.
//! 3. **Classify** -- split the snapshot into action buckets.
//! 4. **Break** -- the first reachable ripe crop is aimed at and broken.
//! 5. **Plant** -- the first reachable open soil whose top face the aim
//!    ray hits gets the matching seed.
//! 6. **Bone meal** -- the first reachable growing crop gets bone meal.
//! 7. **Pathing failure** -- abort the task.
//! 8. **Travel** -- a composite goal over every remaining target, or a
//!    pause when there is nothing left to go to.
//!
//! Steps 4 to 6 only act while the player is safe to cancel movement, and
//! each returns [`Directive::Pause`] after one attempt.

use std::sync::Arc;

use harvest_types::{Directive, Face, Goal, Input, Position, ScanId};
use harvest_world::{ItemFilter, classify, scan_targets};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::HarvestConfig;
use crate::deposit::DepositOutcome;
use crate::host::{FarmHost, PathingStatus};
use crate::scan::{ScanRequest, SnapshotSource, scan_due};
use crate::task::{AbortReason, FarmTaskState};

/// Settings the tick processor reads every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmSettings {
    /// Replant farmland and keep the bottom of column crops.
    pub replant_crops: bool,
    /// Also replant nether wart on soul sand.
    pub replant_nether_wart: bool,
    /// Ticks between rescans; 0 disables them.
    pub scan_interval_ticks: u32,
    /// Horizontal scan radius.
    pub scan_horizontal_radius: i32,
    /// Vertical scan radius.
    pub scan_vertical_radius: i32,
    /// Maximum positions per scan.
    pub scan_max_positions: usize,
    /// Run the deposit machine ahead of farming.
    pub check_inventory: bool,
    /// Deposit into the stash instead of stopping when full.
    pub put_drops_in_stash: bool,
}

impl Default for FarmSettings {
    fn default() -> Self {
        Self::from(&HarvestConfig::default())
    }
}

impl From<&HarvestConfig> for FarmSettings {
    fn from(config: &HarvestConfig) -> Self {
        Self {
            replant_crops: config.farm.replant_crops,
            replant_nether_wart: config.farm.replant_nether_wart,
            scan_interval_ticks: config.farm.scan_interval_ticks,
            scan_horizontal_radius: config.farm.scan_horizontal_radius,
            scan_vertical_radius: config.farm.scan_vertical_radius,
            scan_max_positions: config.farm.scan_max_positions,
            check_inventory: config.inventory.check_inventory,
            put_drops_in_stash: config.inventory.put_drops_in_stash,
        }
    }
}

/// What the tick decided, for logging and callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickAction {
    /// The task is not running.
    Inactive,
    /// The deposit cycle took the tick.
    Deposit,
    /// No snapshot has been published yet.
    AwaitingScan,
    /// Aimed at a ripe crop.
    Break(Position),
    /// Aimed at open soil to plant it.
    Plant(Position),
    /// Aimed at a growing crop with bone meal.
    BoneMeal(Position),
    /// The task stopped itself this tick.
    Aborted(AbortReason),
    /// Nothing to act on or travel to.
    Idle,
    /// Travelling towards `goals` targets.
    Travel {
        /// Number of leaf goals in the composite.
        goals: usize,
    },
}

/// The result of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutput {
    /// The directive for the pathfinder.
    pub directive: Directive,
    /// What the tick decided.
    pub action: TickAction,
}

impl TickOutput {
    const fn pause(action: TickAction) -> Self {
        Self {
            directive: Directive::Pause,
            action,
        }
    }

    /// The abort reason, if the task stopped itself this tick.
    pub const fn abort(&self) -> Option<AbortReason> {
        match self.action {
            TickAction::Aborted(reason) => Some(reason),
            _ => None,
        }
    }
}

/// The farming task's tick function and its collaborators.
pub struct FarmTickProcessor {
    settings: FarmSettings,
    scans: Arc<dyn SnapshotSource>,
}

impl core::fmt::Debug for FarmTickProcessor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FarmTickProcessor")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl FarmTickProcessor {
    /// Create a processor reading snapshots from `scans`.
    pub fn new(settings: FarmSettings, scans: Arc<dyn SnapshotSource>) -> Self {
        Self { settings, scans }
    }

    /// The settings in use.
    pub const fn settings(&self) -> &FarmSettings {
        &self.settings
    }

    /// Start farming: activate the task and drop any old snapshot.
    pub fn start(&self, state: &mut FarmTaskState) {
        self.scans.restart();
        let run_id = state.start();
        info!(%run_id, "Farm started");
    }

    /// Stop farming, for example when control is taken away.
    ///
    /// Scan results still in flight will be discarded.
    pub fn stop(&self, state: &mut FarmTaskState) {
        if state.is_active() {
            info!(run_id = ?state.run_id(), "Farm stopped");
        }
        state.stop();
        self.scans.stop();
    }

    fn abort<H: FarmHost + ?Sized>(
        &self,
        state: &mut FarmTaskState,
        host: &mut H,
        reason: AbortReason,
    ) -> TickOutput {
        host.emit(reason.message());
        info!(?reason, run_id = ?state.run_id(), "Farm aborted");
        self.stop(state);
        TickOutput::pause(TickAction::Aborted(reason))
    }

    /// Decide this tick's directive.
    pub fn tick<H: FarmHost>(
        &self,
        state: &mut FarmTaskState,
        status: &PathingStatus,
        host: &mut H,
    ) -> TickOutput {
        if !state.is_active() {
            return TickOutput::pause(TickAction::Inactive);
        }

        if self.settings.check_inventory {
            match state
                .deposit
                .step(self.settings.put_drops_in_stash, host, status)
            {
                DepositOutcome::PassThrough => {}
                DepositOutcome::Directive(directive) => {
                    return TickOutput {
                        directive,
                        action: TickAction::Deposit,
                    };
                }
                DepositOutcome::Abort(reason) => return self.abort(state, host, reason),
            }
        }

        let counter = state.advance_counter();
        if scan_due(counter, self.settings.scan_interval_ticks) {
            let _started = self.scans.request_scan(ScanRequest {
                scan_id: ScanId::new(),
                origin: status.player_feet,
                targets: scan_targets(
                    self.settings.replant_crops,
                    self.settings.replant_nether_wart,
                ),
                horizontal_radius: self.settings.scan_horizontal_radius,
                vertical_radius: self.settings.scan_vertical_radius,
                max_positions: self.settings.scan_max_positions,
                requested_at_tick: u64::from(counter),
            });
        }
        let Some(snapshot) = self.scans.current() else {
            return TickOutput::pause(TickAction::AwaitingScan);
        };

        let buckets = classify(&snapshot, &*host, self.settings.replant_crops);
        host.clear_all();
        let safe = status.safe_to_cancel;

        for &pos in &buckets.to_break {
            let Some(rotation) = host.reachable(pos).filter(|_| safe) else {
                continue;
            };
            host.look(rotation);
            let block = host.block_at(pos);
            host.select_best_tool_for(block);
            if host.is_looking_at(pos) {
                host.set_input(Input::Primary, true);
            }
            debug!(%pos, "Breaking crop");
            return TickOutput::pause(TickAction::Break(pos));
        }

        let soil = buckets
            .open_farmland
            .iter()
            .map(|&pos| (pos, ItemFilter::Plantable))
            .chain(
                buckets
                    .open_soul_sand
                    .iter()
                    .map(|&pos| (pos, ItemFilter::NetherWart)),
            );
        for (pos, seed) in soil {
            let Some(rotation) = host.reachable_offset(pos, pos.top_center()).filter(|_| safe)
            else {
                continue;
            };
            if !host.carrying(seed, true) {
                continue;
            }
            let hits_top = host
                .ray_trace(rotation)
                .is_some_and(|hit| hit.block == pos && hit.face == Face::Up);
            if hits_top {
                host.look(rotation);
                if host.is_looking_at(pos) {
                    host.set_input(Input::Secondary, true);
                }
                debug!(%pos, ?seed, "Planting");
                return TickOutput::pause(TickAction::Plant(pos));
            }
        }

        for &pos in &buckets.bonemealable {
            let Some(rotation) = host.reachable(pos).filter(|_| safe) else {
                continue;
            };
            if !host.carrying(ItemFilter::BoneMeal, true) {
                continue;
            }
            host.look(rotation);
            if host.is_looking_at(pos) {
                host.set_input(Input::Secondary, true);
            }
            debug!(%pos, "Applying bone meal");
            return TickOutput::pause(TickAction::BoneMeal(pos));
        }

        if status.calc_failed {
            return self.abort(state, host, AbortReason::PathingFailed);
        }

        let mut goals: Vec<Goal> = buckets.to_break.iter().map(|&p| Goal::Break(p)).collect();
        if host.carrying(ItemFilter::Plantable, false) {
            goals.extend(buckets.open_farmland.iter().map(|p| Goal::StandOn(p.up())));
        }
        if host.carrying(ItemFilter::NetherWart, false) {
            goals.extend(buckets.open_soul_sand.iter().map(|p| Goal::StandOn(p.up())));
        }
        if host.carrying(ItemFilter::BoneMeal, false) {
            goals.extend(buckets.bonemealable.iter().map(|&p| Goal::StandOn(p)));
        }
        goals.extend(
            host.dropped_items()
                .iter()
                .filter(|drop| drop.on_ground && ItemFilter::PickupDrop.matches(drop.item))
                .map(|drop| Goal::StandOn(drop.standing_block())),
        );

        if goals.is_empty() {
            return TickOutput::pause(TickAction::Idle);
        }
        let count = goals.len();
        debug!(goals = count, snapshot = snapshot.len(), "Travelling");
        TickOutput {
            directive: Directive::SetGoalAndPath(Goal::Composite(goals)),
            action: TickAction::Travel { goals: count },
        }
    }
}
