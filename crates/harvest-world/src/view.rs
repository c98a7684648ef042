//! The read-only world interface the farming core queries every tick.

use harvest_types::{BlockState, DroppedItem, Position};

/// Growth capability of a block that accepts bone meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Growable {
    /// The block can still advance its growth.
    pub can_grow: bool,
    /// Applying bone meal would currently have an effect.
    pub accepts_bone_meal: bool,
}

impl Growable {
    /// Whether the block is a bone-meal target right now.
    pub const fn is_bonemealable(self) -> bool {
        self.can_grow && self.accepts_bone_meal
    }
}

/// Live, read-only access to world state.
///
/// Implementations answer from the current world, not from any cached
/// snapshot. None of these queries may mutate the world.
pub trait WorldView {
    /// The block at `pos`. Unloaded positions report air.
    fn block_at(&self, pos: Position) -> BlockState;

    /// Whether the block directly above `pos` is air.
    fn is_air_above(&self, pos: Position) -> bool {
        self.block_at(pos.up()).kind.is_air()
    }

    /// The growth capability of the block at `pos`, if it has one.
    fn growable(&self, pos: Position) -> Option<Growable>;

    /// Item entities currently loaded in the world.
    fn dropped_items(&self) -> Vec<DroppedItem>;
}
