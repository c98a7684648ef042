//! Enumeration types for the Harvest farming core.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// The kind of a block occupying one world position.
///
/// Only the kinds the farming task reasons about are named; everything else
/// collapses into [`BlockKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Empty space.
    Air,
    /// Tilled soil that accepts seeds.
    Farmland,
    /// Soil that accepts nether wart.
    SoulSand,
    /// Plain dirt.
    Dirt,
    /// Sand (cactus and sugar cane ground).
    Sand,
    /// Still or flowing water.
    Water,
    /// Wheat crop, age 0-7.
    Wheat,
    /// Carrot crop, age 0-7.
    Carrots,
    /// Potato crop, age 0-7.
    Potatoes,
    /// Beetroot crop, age 0-3.
    Beetroots,
    /// A formed pumpkin fruit.
    Pumpkin,
    /// A formed melon fruit.
    Melon,
    /// The stem a pumpkin grows from.
    PumpkinStem,
    /// The stem a melon grows from.
    MelonStem,
    /// Nether wart, age 0-3.
    NetherWart,
    /// One segment of a sugar cane column.
    SugarCane,
    /// One segment of a cactus column.
    Cactus,
    /// A regular chest.
    Chest,
    /// An ender chest.
    EnderChest,
    /// A trapped chest.
    TrappedChest,
    /// Any block the farming task does not care about.
    Other,
}

impl BlockKind {
    /// Whether this block is empty space.
    pub const fn is_air(self) -> bool {
        matches!(self, Self::Air)
    }

    /// Whether this block can act as a stash container.
    pub const fn is_chest(self) -> bool {
        matches!(self, Self::Chest | Self::EnderChest | Self::TrappedChest)
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// The kind of an item held in an inventory slot or lying on the ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Seeds that grow into wheat.
    WheatSeeds,
    /// Harvested wheat.
    Wheat,
    /// Seeds that grow into beetroot.
    BeetrootSeeds,
    /// Harvested beetroot.
    Beetroot,
    /// Seeds that grow a melon stem.
    MelonSeeds,
    /// A slice dropped by a melon block.
    MelonSlice,
    /// A whole melon block item.
    MelonBlock,
    /// Seeds that grow a pumpkin stem.
    PumpkinSeeds,
    /// A pumpkin block item.
    Pumpkin,
    /// A potato (plantable and harvested).
    Potato,
    /// A carrot (plantable and harvested).
    Carrot,
    /// Nether wart (plantable on soul sand and harvested).
    NetherWart,
    /// Sugar cane.
    SugarCane,
    /// A cactus block item.
    Cactus,
    /// Growth accelerant.
    BoneMeal,
    /// A hoe.
    Hoe,
    /// An axe.
    Axe,
    /// A dirt block item.
    Dirt,
    /// A cobblestone block item.
    Cobblestone,
}

impl ItemKind {
    /// Maximum number of items of this kind a single slot can hold.
    pub const fn max_stack_size(self) -> u32 {
        match self {
            Self::Hoe | Self::Axe => 1,
            _ => 64,
        }
    }
}

// ---------------------------------------------------------------------------
// Interaction and pathing
// ---------------------------------------------------------------------------

/// A simulated input the core can force on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Input {
    /// Primary interaction: break the targeted block.
    Primary,
    /// Secondary interaction: place, use, or open.
    Secondary,
}

/// How the pathfinder should treat a submitted directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathingMode {
    /// Replace the current goal and start pathing towards it.
    SetGoalAndPath,
    /// Stop pathing and hold still this tick.
    RequestPause,
}

/// Tag attached to a stored waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointTag {
    /// The stash container itself.
    Stash,
    /// Where the player stands to use the stash.
    StashUse,
    /// The player's home, used for return-home navigation.
    Home,
}

/// The face of a block hit by an aim ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    /// Top face (+y).
    Up,
    /// Bottom face (-y).
    Down,
    /// -z face.
    North,
    /// +z face.
    South,
    /// -x face.
    West,
    /// +x face.
    East,
}
