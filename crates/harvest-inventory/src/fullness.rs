//! The inventory-fullness rule that starts a deposit cycle.
//!
//! An inventory is full only when every slot holds something *and* at
//! least one pickup item kind has its smallest stack at maximum size. If
//! every pickup kind still has a stack with room, more drops can be
//! absorbed and the inventory counts as not full. An inventory holding no
//! pickup items at all is therefore never full.

use std::collections::BTreeMap;

use harvest_types::{ItemKind, ItemStack};
use harvest_world::ItemFilter;

/// Whether `slots` count as full under the farming rule.
pub fn is_inventory_full(slots: &[Option<ItemStack>]) -> bool {
    let mut smallest: BTreeMap<ItemKind, u32> = BTreeMap::new();

    for slot in slots {
        let Some(stack) = slot else {
            return false;
        };
        if ItemFilter::PickupDrop.matches(stack.item) {
            smallest
                .entry(stack.item)
                .and_modify(|count| *count = (*count).min(stack.count))
                .or_insert(stack.count);
        }
    }

    smallest
        .iter()
        .any(|(item, count)| *count >= item.max_stack_size())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(stack: ItemStack, n: usize) -> Vec<Option<ItemStack>> {
        vec![Some(stack); n]
    }

    #[test]
    fn any_empty_slot_means_not_full() {
        let mut slots = filled(ItemStack::new(ItemKind::Wheat, 64), 36);
        if let Some(last) = slots.last_mut() {
            *last = None;
        }
        assert!(!is_inventory_full(&slots));
    }

    #[test]
    fn all_slots_at_max_pickup_is_full() {
        let slots = filled(ItemStack::new(ItemKind::Wheat, 64), 36);
        assert!(is_inventory_full(&slots));
    }

    #[test]
    fn a_partial_stack_of_the_only_pickup_kind_clears_fullness() {
        let mut slots = filled(ItemStack::new(ItemKind::Carrot, 64), 36);
        if let Some(first) = slots.first_mut() {
            *first = Some(ItemStack::new(ItemKind::Carrot, 10));
        }
        assert!(!is_inventory_full(&slots));
    }

    #[test]
    fn one_maxed_pickup_kind_is_enough() {
        let mut slots = filled(ItemStack::new(ItemKind::Wheat, 12), 36);
        if let Some(first) = slots.first_mut() {
            *first = Some(ItemStack::new(ItemKind::Potato, 64));
        }
        assert!(is_inventory_full(&slots));
    }

    #[test]
    fn no_pickup_items_is_never_full() {
        let slots = filled(ItemStack::new(ItemKind::Cobblestone, 64), 36);
        assert!(!is_inventory_full(&slots));
    }

    #[test]
    fn empty_slot_list_is_not_full() {
        assert!(!is_inventory_full(&[]));
    }
}
