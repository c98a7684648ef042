//! Error types for the `harvest-world` crate.
//!
//! Read-only queries through [`WorldView`](crate::WorldView) never fail.
//! Mutations of a [`GridWorld`](crate::GridWorld) return [`WorldError`].

use harvest_types::{BlockKind, ItemKind, Position};

/// Errors that can occur when mutating a grid world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// There is no block to break at the position.
    #[error("nothing to break at {0}")]
    NothingToBreak(Position),

    /// The space above a soil block is already taken.
    #[error("position {0} is occupied")]
    Occupied(Position),

    /// The item cannot be planted on the soil block.
    #[error("cannot plant {item:?} on {soil:?} at {position}")]
    CannotPlant {
        /// The soil block's position.
        position: Position,
        /// The soil block's kind.
        soil: BlockKind,
        /// The item that was offered.
        item: ItemKind,
    },

    /// The block at the position does not accept bone meal.
    #[error("block at {0} does not accept bone meal")]
    NotGrowable(Position),
}
