//! Error types for the `harvest-inventory` crate.
//!
//! Slot operations return typed errors rather than panicking on a bad
//! index or an empty slot.

use harvest_types::ItemKind;

/// Errors that can occur during inventory operations.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// A slot index past the end of the inventory.
    #[error("slot {slot} out of range (inventory has {size} slots)")]
    SlotOutOfRange {
        /// The requested slot.
        slot: usize,
        /// The inventory's slot count.
        size: usize,
    },

    /// The slot holds nothing.
    #[error("slot {0} is empty")]
    EmptySlot(usize),

    /// There is no free slot left for the item.
    #[error("no free slot for {item:?}")]
    NoFreeSlot {
        /// The item that did not fit.
        item: ItemKind,
    },
}
