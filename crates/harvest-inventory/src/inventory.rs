//! Slot-based inventories for the player and for stash containers.
//!
//! A [`SlotInventory`] is a fixed number of optional [`ItemStack`]s. The
//! player's inventory additionally has a selected hotbar slot (the first
//! [`HOTBAR_SLOTS`] slots); planting and bone meal consume from it.
//! All counts use checked or saturating arithmetic.

use harvest_types::{BlockKind, ItemKind, ItemStack};
use harvest_world::ItemFilter;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::InventoryError;

/// Number of main inventory slots, hotbar included.
pub const MAIN_INVENTORY_SLOTS: usize = 36;

/// Number of hotbar slots at the front of the main inventory.
pub const HOTBAR_SLOTS: usize = 9;

/// A fixed-size container of item stacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInventory {
    /// Slot contents; `None` is an empty slot.
    slots: Vec<Option<ItemStack>>,
    /// Selected hotbar slot.
    selected: usize,
}

impl SlotInventory {
    /// Create an empty inventory with `size` slots.
    pub fn with_size(size: usize) -> Self {
        Self {
            slots: vec![None; size],
            selected: 0,
        }
    }

    /// Create an empty player main inventory.
    pub fn main() -> Self {
        Self::with_size(MAIN_INVENTORY_SLOTS)
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the inventory has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Read-only view of every slot.
    pub fn slots(&self) -> &[Option<ItemStack>] {
        &self.slots
    }

    /// The stack in `slot`, if any.
    pub fn get(&self, slot: usize) -> Option<ItemStack> {
        self.slots.get(slot).copied().flatten()
    }

    /// Overwrite `slot` with `stack`.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::SlotOutOfRange`] for a bad index.
    pub fn set(&mut self, slot: usize, stack: Option<ItemStack>) -> Result<(), InventoryError> {
        let size = self.slots.len();
        let entry = self
            .slots
            .get_mut(slot)
            .ok_or(InventoryError::SlotOutOfRange { slot, size })?;
        *entry = stack.filter(|s| s.count > 0);
        Ok(())
    }

    /// Total count of `item` across all slots.
    pub fn count_of(&self, item: ItemKind) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.item == item)
            .fold(0u32, |acc, s| acc.saturating_add(s.count))
    }

    /// Index of the first empty slot.
    pub fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Index of the first slot whose item satisfies `filter`.
    pub fn find(&self, filter: ItemFilter) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.is_some_and(|s| filter.matches(s.item)))
    }

    /// Add `count` items, topping up existing stacks before empty slots.
    ///
    /// Returns the number of items that did not fit.
    pub fn add(&mut self, item: ItemKind, count: u32) -> u32 {
        let max = item.max_stack_size();
        let mut left = count;

        for stack in self.slots.iter_mut().flatten() {
            if left == 0 {
                break;
            }
            if stack.item == item && stack.count < max {
                let room = max.saturating_sub(stack.count);
                let moved = room.min(left);
                stack.count = stack.count.saturating_add(moved);
                left = left.saturating_sub(moved);
            }
        }

        for slot in &mut self.slots {
            if left == 0 {
                break;
            }
            if slot.is_none() {
                let moved = max.min(left);
                *slot = Some(ItemStack::new(item, moved));
                left = left.saturating_sub(moved);
            }
        }

        left
    }

    /// Remove and return the whole stack in `slot`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is bad or the slot is empty.
    pub fn take(&mut self, slot: usize) -> Result<ItemStack, InventoryError> {
        let size = self.slots.len();
        let entry = self
            .slots
            .get_mut(slot)
            .ok_or(InventoryError::SlotOutOfRange { slot, size })?;
        entry.take().ok_or(InventoryError::EmptySlot(slot))
    }

    /// Place `stack` in the first empty slot and return its index.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::NoFreeSlot`] if every slot is taken.
    pub fn put(&mut self, stack: ItemStack) -> Result<usize, InventoryError> {
        let slot = self
            .first_empty()
            .ok_or(InventoryError::NoFreeSlot { item: stack.item })?;
        self.set(slot, Some(stack))?;
        Ok(slot)
    }

    // -------------------------------------------------------------------
    // Hotbar selection
    // -------------------------------------------------------------------

    /// The selected hotbar slot index.
    pub const fn selected(&self) -> usize {
        self.selected
    }

    /// The stack in the selected hotbar slot, if any.
    pub fn selected_stack(&self) -> Option<ItemStack> {
        self.get(self.selected)
    }

    /// Select hotbar slot `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::SlotOutOfRange`] if `slot` is not a
    /// hotbar slot of this inventory.
    pub fn select(&mut self, slot: usize) -> Result<(), InventoryError> {
        let size = HOTBAR_SLOTS.min(self.slots.len());
        if slot >= size {
            return Err(InventoryError::SlotOutOfRange { slot, size });
        }
        self.selected = slot;
        Ok(())
    }

    /// Whether an item matching `filter` is available, optionally selecting it.
    ///
    /// The hotbar is searched first. An item found only in the rest of
    /// the inventory is swapped into the selected hotbar slot when
    /// `select` is set.
    pub fn carrying(&mut self, filter: ItemFilter, select: bool) -> bool {
        let hotbar = HOTBAR_SLOTS.min(self.slots.len());
        let in_hotbar = self
            .slots
            .iter()
            .take(hotbar)
            .position(|slot| slot.is_some_and(|s| filter.matches(s.item)));

        if let Some(slot) = in_hotbar {
            if select {
                self.selected = slot;
            }
            return true;
        }

        let Some(slot) = self.find(filter) else {
            return false;
        };
        if select {
            self.slots.swap(slot, self.selected);
        }
        true
    }

    /// Select the hotbar tool best suited to breaking `block`.
    ///
    /// Pumpkins and melons prefer an axe, other crops a hoe. Returns
    /// whether a preferred tool was selected; the selection is unchanged
    /// otherwise.
    pub fn select_best_tool_for(&mut self, block: BlockKind) -> bool {
        let tool = match block {
            BlockKind::Pumpkin | BlockKind::Melon => ItemKind::Axe,
            _ => ItemKind::Hoe,
        };
        let hotbar = HOTBAR_SLOTS.min(self.slots.len());
        let found = self
            .slots
            .iter()
            .take(hotbar)
            .position(|slot| slot.is_some_and(|s| s.item == tool));
        if let Some(slot) = found {
            self.selected = slot;
            true
        } else {
            false
        }
    }

    /// Use up one item from the selected slot and return its kind.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::EmptySlot`] if nothing is selected.
    pub fn consume_selected(&mut self) -> Result<ItemKind, InventoryError> {
        let slot = self.selected;
        let stack = self.get(slot).ok_or(InventoryError::EmptySlot(slot))?;
        let remaining = stack.count.saturating_sub(1);
        let next = (remaining > 0).then(|| ItemStack::new(stack.item, remaining));
        self.set(slot, next)?;
        Ok(stack.item)
    }
}

/// Move the first stack in `from` matching `filter` into an empty slot of `to`.
///
/// Moves at most one stack per call. Returns the moved stack, or `None`
/// when no stack matches or `to` has no empty slot.
pub fn transfer_one_matching(
    from: &mut SlotInventory,
    to: &mut SlotInventory,
    filter: ItemFilter,
) -> Result<Option<ItemStack>, InventoryError> {
    let Some(slot) = from.find(filter) else {
        return Ok(None);
    };
    if to.first_empty().is_none() {
        return Ok(None);
    }
    let stack = from.take(slot)?;
    to.put(stack)?;
    debug!(item = ?stack.item, count = stack.count, slot, "Moved stack into stash");
    Ok(Some(stack))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn add_tops_up_before_using_new_slots() {
        let mut inv = SlotInventory::with_size(3);
        inv.set(1, Some(ItemStack::new(ItemKind::Wheat, 60))).unwrap();
        let left = inv.add(ItemKind::Wheat, 10);
        assert_eq!(left, 0);
        assert_eq!(inv.get(1), Some(ItemStack::new(ItemKind::Wheat, 64)));
        assert_eq!(inv.get(0), Some(ItemStack::new(ItemKind::Wheat, 6)));
        assert_eq!(inv.count_of(ItemKind::Wheat), 70);
    }

    #[test]
    fn add_reports_overflow() {
        let mut inv = SlotInventory::with_size(1);
        assert_eq!(inv.add(ItemKind::Carrot, 100), 36);
        assert_eq!(inv.count_of(ItemKind::Carrot), 64);
    }

    #[test]
    fn tools_do_not_stack() {
        let mut inv = SlotInventory::with_size(2);
        assert_eq!(inv.add(ItemKind::Hoe, 2), 0);
        assert_eq!(inv.get(0).map(|s| s.count), Some(1));
        assert_eq!(inv.get(1).map(|s| s.count), Some(1));
    }

    #[test]
    fn out_of_range_slots_are_errors() {
        let mut inv = SlotInventory::with_size(2);
        assert!(matches!(
            inv.set(5, None),
            Err(InventoryError::SlotOutOfRange { slot: 5, size: 2 })
        ));
        assert!(matches!(inv.take(0), Err(InventoryError::EmptySlot(0))));
        assert!(inv.select(2).is_err());
    }

    #[test]
    fn carrying_prefers_hotbar_and_selects() {
        let mut inv = SlotInventory::main();
        inv.set(4, Some(ItemStack::new(ItemKind::WheatSeeds, 3))).unwrap();
        assert!(inv.carrying(ItemFilter::Plantable, false));
        assert_eq!(inv.selected(), 0);
        assert!(inv.carrying(ItemFilter::Plantable, true));
        assert_eq!(inv.selected(), 4);
        assert!(!inv.carrying(ItemFilter::BoneMeal, true));
    }

    #[test]
    fn carrying_swaps_from_main_inventory() {
        let mut inv = SlotInventory::main();
        inv.set(20, Some(ItemStack::new(ItemKind::BoneMeal, 5))).unwrap();
        assert!(inv.carrying(ItemFilter::BoneMeal, true));
        assert_eq!(inv.selected_stack(), Some(ItemStack::new(ItemKind::BoneMeal, 5)));
        assert_eq!(inv.get(20), None);
    }

    #[test]
    fn consume_selected_empties_the_slot() {
        let mut inv = SlotInventory::main();
        inv.set(0, Some(ItemStack::new(ItemKind::Potato, 1))).unwrap();
        assert_eq!(inv.consume_selected().unwrap(), ItemKind::Potato);
        assert_eq!(inv.selected_stack(), None);
        assert!(inv.consume_selected().is_err());
    }

    #[test]
    fn best_tool_selection() {
        let mut inv = SlotInventory::main();
        inv.set(2, Some(ItemStack::new(ItemKind::Hoe, 1))).unwrap();
        inv.set(6, Some(ItemStack::new(ItemKind::Axe, 1))).unwrap();
        assert!(inv.select_best_tool_for(BlockKind::Wheat));
        assert_eq!(inv.selected(), 2);
        assert!(inv.select_best_tool_for(BlockKind::Melon));
        assert_eq!(inv.selected(), 6);
    }

    #[test]
    fn transfer_moves_one_pickup_stack() {
        let mut player = SlotInventory::main();
        let mut stash = SlotInventory::with_size(27);
        player.set(0, Some(ItemStack::new(ItemKind::Hoe, 1))).unwrap();
        player.set(1, Some(ItemStack::new(ItemKind::Wheat, 64))).unwrap();
        player.set(2, Some(ItemStack::new(ItemKind::Carrot, 5))).unwrap();

        let moved = transfer_one_matching(&mut player, &mut stash, ItemFilter::PickupDrop).unwrap();
        assert_eq!(moved, Some(ItemStack::new(ItemKind::Wheat, 64)));
        assert_eq!(player.get(1), None);
        assert_eq!(player.get(2), Some(ItemStack::new(ItemKind::Carrot, 5)));
        assert_eq!(stash.count_of(ItemKind::Wheat), 64);
    }

    #[test]
    fn transfer_stops_when_stash_is_full_or_nothing_matches() {
        let mut player = SlotInventory::main();
        let mut stash = SlotInventory::with_size(1);
        player.set(0, Some(ItemStack::new(ItemKind::Cactus, 8))).unwrap();
        stash.set(0, Some(ItemStack::new(ItemKind::Dirt, 64))).unwrap();
        assert_eq!(
            transfer_one_matching(&mut player, &mut stash, ItemFilter::PickupDrop).unwrap(),
            None
        );

        let mut empty_stash = SlotInventory::with_size(1);
        let mut tools_only = SlotInventory::main();
        tools_only.set(0, Some(ItemStack::new(ItemKind::Hoe, 1))).unwrap();
        assert_eq!(
            transfer_one_matching(&mut tools_only, &mut empty_stash, ItemFilter::PickupDrop)
                .unwrap(),
            None
        );
    }

    #[test]
    fn serializes_to_json() {
        let mut inv = SlotInventory::with_size(2);
        inv.set(0, Some(ItemStack::new(ItemKind::Wheat, 3))).unwrap();
        let json = serde_json::to_string(&inv).unwrap();
        let back: SlotInventory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inv);
    }
}
