//! The deposit cycle: inventory full, walk to the stash, empty produce into it.
//!
//! The machine runs ahead of all farming logic while inventory checks are
//! enabled. It changes state at most once per tick:
//!
//! ```text
//! Idle --full + valid stash--> TravelingToStash --stash opened--> Transferring
//!  ^                                 |                                 |
//!  +---------- no longer full -------+------ nothing left, not full ---+
//! ```
//!
//! A transferring step that finds nothing left to move while the
//! inventory is still full aborts the task. A full inventory with stash
//! deposits disabled aborts immediately. Missing or mismatched stash
//! waypoints only pause the task and report the problem once.
//!
//! Stash selection ([`select_stash`]) records the waypoint pair this cycle
//! relies on.

use harvest_inventory::is_inventory_full;
use harvest_types::{Directive, Goal, Input, Position, WaypointTag};
use harvest_world::ItemFilter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::host::{FarmHost, PathingStatus};
use crate::task::AbortReason;

/// The stash and its use point must be closer than this many blocks.
pub const STASH_MAX_DISTANCE: i64 = 6;

/// Where the deposit cycle stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepositState {
    /// Farming normally.
    #[default]
    Idle,
    /// Walking to the stash use point and opening the stash.
    TravelingToStash,
    /// Moving one stack per tick into the open stash.
    Transferring,
}

/// The result of one deposit step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositOutcome {
    /// Nothing to do; continue with farming this tick.
    PassThrough,
    /// Farming is preempted; emit this directive.
    Directive(Directive),
    /// The task must stop.
    Abort(AbortReason),
}

/// The deposit sub-machine carried in the task state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepositMachine {
    /// Current state.
    state: DepositState,
    /// The current misconfiguration streak has been reported.
    misconfig_reported: bool,
}

impl DepositMachine {
    /// A machine already in `state`.
    pub const fn in_state(state: DepositState) -> Self {
        Self {
            state,
            misconfig_reported: false,
        }
    }

    /// Current state.
    pub const fn state(&self) -> DepositState {
        self.state
    }

    fn transition(&mut self, next: DepositState) {
        if self.state != next {
            info!(from = ?self.state, to = ?next, "Deposit state change");
            self.state = next;
        }
    }

    fn report_misconfig<H: FarmHost + ?Sized>(&mut self, host: &mut H, message: &str) {
        if !self.misconfig_reported {
            warn!(diagnostic = message, "Stash misconfigured");
            host.emit(message);
            self.misconfig_reported = true;
        }
    }

    /// Run one deposit step.
    ///
    /// `put_drops_in_stash` selects between depositing and aborting when
    /// the inventory fills up.
    pub fn step<H: FarmHost + ?Sized>(
        &mut self,
        put_drops_in_stash: bool,
        host: &mut H,
        status: &PathingStatus,
    ) -> DepositOutcome {
        let full = is_inventory_full(&host.main_slots());

        if self.state == DepositState::Transferring {
            if host.transfer_one_matching(ItemFilter::PickupDrop) {
                return DepositOutcome::Directive(Directive::Pause);
            }
            host.close_active_interface();
            self.transition(DepositState::Idle);
            if full {
                return DepositOutcome::Abort(AbortReason::StashFull);
            }
            return DepositOutcome::Directive(Directive::Pause);
        }

        if !full {
            self.misconfig_reported = false;
            self.transition(DepositState::Idle);
            return DepositOutcome::PassThrough;
        }

        if !put_drops_in_stash {
            return DepositOutcome::Abort(AbortReason::InventoryFull);
        }

        let use_point = host.most_recent_by_tag(WaypointTag::StashUse);
        let stash = host.most_recent_by_tag(WaypointTag::Stash);
        let (Some(use_point), Some(stash)) = (use_point, stash) else {
            self.report_misconfig(host, "No stash set, select one with select_stash");
            return DepositOutcome::Directive(Directive::Pause);
        };
        if !use_point.is_within(stash, STASH_MAX_DISTANCE) {
            self.report_misconfig(host, "Stash not set properly, select it again");
            return DepositOutcome::Directive(Directive::Pause);
        }
        self.misconfig_reported = false;

        let goal = Goal::StandOn(use_point);
        if self.state == DepositState::Idle {
            self.transition(DepositState::TravelingToStash);
            return DepositOutcome::Directive(Directive::SetGoalAndPath(goal));
        }

        if !(goal.is_in_goal(status.player_feet) && goal.is_in_goal(status.path_start)) {
            return DepositOutcome::Directive(Directive::SetGoalAndPath(goal));
        }

        let rotation = host.reachable(stash).filter(|_| status.safe_to_cancel);
        if let Some(rotation) = rotation {
            host.look(rotation);
            if host.is_looking_at(stash) {
                if host.is_stash_open() {
                    host.clear_all();
                    self.transition(DepositState::Transferring);
                } else {
                    debug!(%stash, "Opening stash");
                    host.set_input(Input::Secondary, true);
                }
            }
        }
        DepositOutcome::Directive(Directive::Pause)
    }
}

/// The outcome of [`select_stash`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StashSelection {
    /// Both waypoints were recorded.
    Selected {
        /// The stash block.
        stash: Position,
        /// Where the player stood, recorded as the use point.
        use_point: Position,
    },
    /// The looked-at block is not a chest.
    NotAChest,
    /// The looked-at block is too far from the player.
    OutOfRange,
    /// The player is not looking at any block.
    NothingSelected,
}

/// Record the chest under the crosshair as the stash.
///
/// On success the chest becomes the `Stash` waypoint and the player's feet
/// the `StashUse` waypoint. Failures are reported through diagnostics.
pub fn select_stash<H: FarmHost + ?Sized>(host: &mut H, feet: Position) -> StashSelection {
    let Some(block) = host.selected_block() else {
        host.emit("Please look at a chest");
        return StashSelection::NothingSelected;
    };
    if !feet.is_within(block, STASH_MAX_DISTANCE) {
        host.emit("Block is not in range");
        return StashSelection::OutOfRange;
    }
    let kind = host.block_at(block).kind;
    if !kind.is_chest() {
        debug!(?kind, %block, "Selected block is not a chest");
        host.emit("Block is not a chest");
        return StashSelection::NotAChest;
    }
    host.add(WaypointTag::Stash, block);
    host.add(WaypointTag::StashUse, feet);
    info!(stash = %block, use_point = %feet, chest = ?kind, "Stash selected");
    StashSelection::Selected {
        stash: block,
        use_point: feet,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use harvest_types::{BlockKind, BlockState, ItemKind, ItemStack};

    use super::*;
    use crate::host::{InventoryOracle, Pathfinder, ReachabilitySolver, WaypointStore};
    use crate::sandbox::{SandboxHost, farmland_field};

    const USE_POINT: Position = Position::new(0, 65, 0);
    const CHEST: Position = Position::new(1, 65, 0);

    /// Player at the use point beside a chest, no waypoints yet.
    fn host_at_stash() -> SandboxHost {
        let mut host = SandboxHost::new(farmland_field(4), USE_POINT, 3);
        host.set_growth_chance(0);
        host.with_world_mut(|w| w.set_block(CHEST, BlockState::of(BlockKind::Chest)));
        host
    }

    fn with_waypoints(mut host: SandboxHost) -> SandboxHost {
        host.add(WaypointTag::Stash, CHEST);
        host.add(WaypointTag::StashUse, USE_POINT);
        host
    }

    fn fill_inventory(host: &mut SandboxHost) {
        let slots = host.player().len();
        let count = u32::try_from(slots).unwrap().saturating_mul(64);
        host.player_mut().add(ItemKind::Wheat, count);
    }

    fn idle() -> PathingStatus {
        PathingStatus::idle_at(USE_POINT)
    }

    #[test]
    fn passes_through_when_not_full() {
        let mut host = with_waypoints(host_at_stash());
        let mut machine = DepositMachine::default();
        assert_eq!(machine.step(true, &mut host, &idle()), DepositOutcome::PassThrough);
        assert_eq!(machine.state(), DepositState::Idle);
    }

    #[test]
    fn full_without_stash_deposits_aborts() {
        let mut host = with_waypoints(host_at_stash());
        fill_inventory(&mut host);
        let mut machine = DepositMachine::default();
        assert_eq!(
            machine.step(false, &mut host, &idle()),
            DepositOutcome::Abort(AbortReason::InventoryFull)
        );
    }

    #[test]
    fn missing_stash_pauses_and_reports_once() {
        let mut host = host_at_stash();
        fill_inventory(&mut host);
        let mut machine = DepositMachine::default();
        for _ in 0..3 {
            assert_eq!(
                machine.step(true, &mut host, &idle()),
                DepositOutcome::Directive(Directive::Pause)
            );
        }
        let message = "No stash set, select one with select_stash";
        assert_eq!(host.diagnostics().count_of(message), 1);
        assert_eq!(machine.state(), DepositState::Idle);

        // A new streak reports again.
        let _stack = host.player_mut().take(0).unwrap();
        assert_eq!(machine.step(true, &mut host, &idle()), DepositOutcome::PassThrough);
        host.player_mut().add(ItemKind::Wheat, 64);
        let _outcome = machine.step(true, &mut host, &idle());
        assert_eq!(host.diagnostics().count_of(message), 2);
    }

    #[test]
    fn stash_too_far_from_use_point_pauses() {
        let mut host = host_at_stash();
        host.add(WaypointTag::Stash, CHEST);
        host.add(WaypointTag::StashUse, Position::new(7, 65, 0));
        fill_inventory(&mut host);
        let mut machine = DepositMachine::default();
        assert_eq!(
            machine.step(true, &mut host, &idle()),
            DepositOutcome::Directive(Directive::Pause)
        );
        assert_eq!(
            host.diagnostics().count_of("Stash not set properly, select it again"),
            1
        );
    }

    #[test]
    fn idle_full_heads_to_use_point() {
        let mut host = with_waypoints(host_at_stash());
        fill_inventory(&mut host);
        let mut machine = DepositMachine::default();
        let far = PathingStatus::idle_at(Position::new(-3, 65, -3));
        let expected =
            DepositOutcome::Directive(Directive::SetGoalAndPath(Goal::StandOn(USE_POINT)));

        assert_eq!(machine.step(true, &mut host, &far), expected);
        assert_eq!(machine.state(), DepositState::TravelingToStash);

        // Still walking: the same goal again.
        assert_eq!(machine.step(true, &mut host, &far), expected);
        assert_eq!(machine.state(), DepositState::TravelingToStash);
    }

    #[test]
    fn arrival_opens_stash_then_transfers_until_not_full() {
        let mut host = with_waypoints(host_at_stash());
        fill_inventory(&mut host);
        let mut machine = DepositMachine::in_state(DepositState::TravelingToStash);
        let pause = DepositOutcome::Directive(Directive::Pause);

        assert_eq!(machine.step(true, &mut host, &idle()), pause);
        assert!(host.is_looking_at(CHEST));
        assert!(host.is_input_forced(Input::Secondary));
        assert_eq!(machine.state(), DepositState::TravelingToStash);

        host.submit(&Directive::Pause);
        assert!(host.is_stash_open());

        assert_eq!(machine.step(true, &mut host, &idle()), pause);
        assert_eq!(machine.state(), DepositState::Transferring);

        for _ in 0..27 {
            assert_eq!(machine.step(true, &mut host, &idle()), pause);
        }
        assert_eq!(host.stash().count_of(ItemKind::Wheat), 1728);

        // Stash full, inventory no longer full: back to farming.
        assert_eq!(machine.step(true, &mut host, &idle()), pause);
        assert_eq!(machine.state(), DepositState::Idle);
        assert!(!host.is_stash_open());
        assert_eq!(machine.step(true, &mut host, &idle()), DepositOutcome::PassThrough);
    }

    #[test]
    fn unsafe_arrival_waits() {
        let mut host = with_waypoints(host_at_stash());
        fill_inventory(&mut host);
        let mut machine = DepositMachine::in_state(DepositState::TravelingToStash);
        let moving = PathingStatus {
            safe_to_cancel: false,
            ..idle()
        };
        assert_eq!(
            machine.step(true, &mut host, &moving),
            DepositOutcome::Directive(Directive::Pause)
        );
        assert!(!host.is_input_forced(Input::Secondary));
    }

    #[test]
    fn full_stash_and_full_inventory_aborts() {
        let mut host = with_waypoints(host_at_stash());
        fill_inventory(&mut host);
        for slot in 0..27 {
            host.stash_mut()
                .set(slot, Some(ItemStack::new(ItemKind::Cobblestone, 64)))
                .unwrap();
        }
        let mut machine = DepositMachine::in_state(DepositState::Transferring);
        assert_eq!(
            machine.step(true, &mut host, &idle()),
            DepositOutcome::Abort(AbortReason::StashFull)
        );
        assert_eq!(machine.state(), DepositState::Idle);
    }

    #[test]
    fn select_stash_records_both_waypoints() {
        let mut host = host_at_stash();
        let rotation = host.reachable(CHEST).unwrap();
        host.look(rotation);
        assert_eq!(
            select_stash(&mut host, USE_POINT),
            StashSelection::Selected {
                stash: CHEST,
                use_point: USE_POINT
            }
        );
        assert_eq!(host.most_recent_by_tag(WaypointTag::Stash), Some(CHEST));
        assert_eq!(host.most_recent_by_tag(WaypointTag::StashUse), Some(USE_POINT));
    }

    #[test]
    fn select_stash_rejects_bad_targets() {
        let mut host = host_at_stash();

        host.look(harvest_types::Rotation::new(0.0, -90.0));
        assert_eq!(select_stash(&mut host, USE_POINT), StashSelection::NothingSelected);
        assert_eq!(host.diagnostics().count_of("Please look at a chest"), 1);

        let rotation = host.reachable(CHEST).unwrap();
        host.look(rotation);
        assert_eq!(
            select_stash(&mut host, Position::new(9, 65, 0)),
            StashSelection::OutOfRange
        );
        assert_eq!(host.diagnostics().count_of("Block is not in range"), 1);

        let soil = Position::new(0, 64, 1);
        let rotation = host.reachable(soil).unwrap();
        host.look(rotation);
        assert_eq!(select_stash(&mut host, USE_POINT), StashSelection::NotAChest);
        assert_eq!(host.diagnostics().count_of("Block is not a chest"), 1);
        assert_eq!(host.most_recent_by_tag(WaypointTag::Stash), None);
    }
}
