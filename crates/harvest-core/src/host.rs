//! Host interfaces the farming core drives.
//!
//! The core never touches the game directly. Each tick it reads the world
//! through [`WorldView`], aims through a [`ReachabilitySolver`], forces
//! inputs through an [`InteractionDispatcher`], asks an
//! [`InventoryOracle`] what the player carries, looks up stash and home
//! points in a [`WaypointStore`], and reports user-facing status text to a
//! [`DiagnosticsSink`]. The resulting [`Directive`] is handed to a
//! [`Pathfinder`].
//!
//! [`FarmHost`] bundles every per-tick interface so the tick processor can
//! take a single `&mut H`.

use harvest_types::{
    BlockState, Directive, Input, ItemStack, Position, RayHit, Rotation, Vec3, WaypointTag,
};
use harvest_world::{ItemFilter, WorldView};
use serde::{Deserialize, Serialize};

/// What the pathfinder reports back after a directive is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathingStatus {
    /// The last path calculation found no route to the goal.
    pub calc_failed: bool,
    /// The player is not mid-movement and may act in place.
    pub safe_to_cancel: bool,
    /// The block the player's feet are in.
    pub player_feet: Position,
    /// Where the current path starts.
    pub path_start: Position,
}

impl PathingStatus {
    /// A settled status with the player standing at `feet`.
    pub const fn idle_at(feet: Position) -> Self {
        Self {
            calc_failed: false,
            safe_to_cancel: true,
            player_feet: feet,
            path_start: feet,
        }
    }
}

/// The external movement engine.
pub trait Pathfinder {
    /// Hand this tick's directive to the pathfinder.
    fn submit(&mut self, directive: &Directive) -> PathingStatus;

    /// The current status without submitting anything.
    fn status(&self) -> PathingStatus;
}

/// Aim solving and ray tracing from the player's eyes.
pub trait ReachabilitySolver {
    /// A rotation that hits `pos` within reach, if one exists.
    fn reachable(&self, pos: Position) -> Option<Rotation>;

    /// A rotation aimed at `point` that hits `pos` within reach, if one exists.
    fn reachable_offset(&self, pos: Position, point: Vec3) -> Option<Rotation>;

    /// Trace a ray along `rotation` and report the first block it hits.
    fn ray_trace(&self, rotation: Rotation) -> Option<RayHit>;

    /// Turn the player to `rotation`.
    fn look(&mut self, rotation: Rotation);

    /// Whether the crosshair currently rests on `pos`.
    fn is_looking_at(&self, pos: Position) -> bool;

    /// The block under the crosshair, if any.
    fn selected_block(&self) -> Option<Position>;
}

/// Simulated input.
pub trait InteractionDispatcher {
    /// Force `input` on or off.
    fn set_input(&mut self, input: Input, active: bool);

    /// Release every forced input.
    fn clear_all(&mut self);

    /// Close whatever container screen is open.
    fn close_active_interface(&mut self);
}

/// What the player carries and the stash container mechanics.
pub trait InventoryOracle {
    /// The main inventory slots, hotbar first.
    fn main_slots(&self) -> Vec<Option<ItemStack>>;

    /// Whether an item matching `filter` is carried; selects it when `select` is set.
    fn carrying(&mut self, filter: ItemFilter, select: bool) -> bool;

    /// Switch to the best tool for breaking `state`.
    fn select_best_tool_for(&mut self, state: BlockState);

    /// Whether the stash container screen is open.
    fn is_stash_open(&self) -> bool;

    /// Move one stack matching `filter` into the open stash.
    ///
    /// Returns whether anything moved.
    fn transfer_one_matching(&mut self, filter: ItemFilter) -> bool;
}

/// Persistent named positions.
pub trait WaypointStore {
    /// The most recently recorded position with `tag`.
    fn most_recent_by_tag(&self, tag: WaypointTag) -> Option<Position>;

    /// Record a position under `tag`.
    fn add(&mut self, tag: WaypointTag, pos: Position);
}

/// Fire-and-forget user-facing status text.
pub trait DiagnosticsSink {
    /// Report a message to the user.
    fn emit(&mut self, message: &str);
}

/// Every interface the tick processor uses within a tick.
pub trait FarmHost:
    WorldView + ReachabilitySolver + InteractionDispatcher + InventoryOracle + WaypointStore + DiagnosticsSink
{
}

impl<T> FarmHost for T where
    T: WorldView
        + ReachabilitySolver
        + InteractionDispatcher
        + InventoryOracle
        + WaypointStore
        + DiagnosticsSink
{
}
