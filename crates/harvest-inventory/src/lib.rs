//! Slot inventory model for the Harvest farming core.
//!
//! This crate holds everything the farming task needs to know about what
//! the player carries: a fixed-size [`SlotInventory`] with a selected
//! hotbar slot, the inventory-fullness rule that triggers a deposit cycle,
//! and the one-stack-per-call transfer into an open stash.
//!
//! # Modules
//!
//! - [`error`] -- Error types for slot operations ([`InventoryError`]).
//! - [`fullness`] -- The fullness rule ([`is_inventory_full`]).
//! - [`inventory`] -- [`SlotInventory`] and stack transfers.

pub mod error;
pub mod fullness;
pub mod inventory;

// Re-export primary types at crate root for convenience.
pub use error::InventoryError;
pub use fullness::is_inventory_full;
pub use inventory::{HOTBAR_SLOTS, MAIN_INVENTORY_SLOTS, SlotInventory, transfer_one_matching};
