//! Item tables: what can be planted, what is worth picking up, and the
//! [`ItemFilter`] used to ask the inventory for a matching item.

use harvest_types::ItemKind;
use serde::{Deserialize, Serialize};

/// Items that can be planted on farmland.
pub const FARMLAND_PLANTABLE: [ItemKind; 6] = [
    ItemKind::BeetrootSeeds,
    ItemKind::MelonSeeds,
    ItemKind::WheatSeeds,
    ItemKind::PumpkinSeeds,
    ItemKind::Potato,
    ItemKind::Carrot,
];

/// Items the farm produces; these are collected from the ground and are the
/// only items moved into the stash.
pub const PICKUP_DROPPED: [ItemKind; 14] = [
    ItemKind::BeetrootSeeds,
    ItemKind::Beetroot,
    ItemKind::MelonSeeds,
    ItemKind::MelonSlice,
    ItemKind::MelonBlock,
    ItemKind::WheatSeeds,
    ItemKind::Wheat,
    ItemKind::PumpkinSeeds,
    ItemKind::Pumpkin,
    ItemKind::Potato,
    ItemKind::Carrot,
    ItemKind::NetherWart,
    ItemKind::SugarCane,
    ItemKind::Cactus,
];

/// A named predicate over item kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemFilter {
    /// Anything in [`FARMLAND_PLANTABLE`].
    Plantable,
    /// Nether wart, the only thing soul sand accepts.
    NetherWart,
    /// Bone meal.
    BoneMeal,
    /// Anything in [`PICKUP_DROPPED`].
    PickupDrop,
}

impl ItemFilter {
    /// Whether `item` satisfies this filter.
    pub fn matches(self, item: ItemKind) -> bool {
        match self {
            Self::Plantable => FARMLAND_PLANTABLE.contains(&item),
            Self::NetherWart => item == ItemKind::NetherWart,
            Self::BoneMeal => item == ItemKind::BoneMeal,
            Self::PickupDrop => PICKUP_DROPPED.contains(&item),
        }
    }
}
