//! World view, crop catalog, and block classification for the Harvest core.
//!
//! This crate models everything the farming task reads from the world: the
//! [`WorldView`] interface it queries, the fixed table of harvestable crops
//! and their readiness predicates, the item tables that decide what to
//! plant and what to pick up, and the per-tick classification of scanned
//! positions into action buckets.
//!
//! # Modules
//!
//! - [`catalog`] -- Crop variants, readiness predicates, and scan targets.
//! - [`classifier`] -- Partition of a snapshot into disjoint action buckets.
//! - [`error`] -- Error types for grid-world mutations.
//! - [`grid`] -- [`GridWorld`], an in-memory world with crop growth.
//! - [`items`] -- Plantable and pickup item tables, [`ItemFilter`].
//! - [`view`] -- The [`WorldView`] trait and growable capability.

pub mod catalog;
pub mod classifier;
pub mod error;
pub mod grid;
pub mod items;
pub mod view;

// Re-export primary types at crate root.
pub use catalog::{CROP_CATALOG, CropContext, CropFamily, CropVariant, ready_for_harvest, scan_targets};
pub use classifier::{Classification, classify};
pub use error::WorldError;
pub use grid::GridWorld;
pub use items::ItemFilter;
pub use view::{Growable, WorldView};
