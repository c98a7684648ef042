//! Shared type definitions for the Harvest farming core.
//!
//! This crate is the single source of truth for the plain data that flows
//! between the world model, the inventory model, and the tick processor.
//! Nothing here performs I/O or holds behaviour beyond small geometric
//! helpers.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for farm runs and scans
//! - [`enums`] -- Block kinds, item kinds, inputs, waypoint tags, faces
//! - [`structs`] -- Positions, block states, item stacks, aim types, snapshots
//! - [`goals`] -- Pathfinding goals and the per-tick [`Directive`]

pub mod enums;
pub mod goals;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{BlockKind, Face, Input, ItemKind, PathingMode, WaypointTag};
pub use goals::{Directive, Goal};
pub use ids::{FarmRunId, ScanId};
pub use structs::{
    BlockState, DroppedItem, ItemStack, Position, RayHit, Rotation, Snapshot, Vec3,
};
