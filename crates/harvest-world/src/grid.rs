//! In-memory block grid with simple crop growth.
//!
//! The [`GridWorld`] stores only non-air blocks in a `BTreeMap`, so scan
//! results come back in a deterministic order. It implements
//! [`WorldView`] and adds the mutations a host needs to play out the
//! farming task's interactions: breaking blocks into item drops, planting,
//! bone meal, and per-tick random growth.

use std::collections::BTreeMap;

use harvest_types::{BlockKind, BlockState, DroppedItem, ItemKind, Position, Vec3};
use rand::Rng;

use crate::catalog::{STEM_MAX_AGE, WART_READY_AGE, grain_max_age};
use crate::error::WorldError;
use crate::view::{Growable, WorldView};

/// Tallest column a sugar cane or cactus grows to on its own.
pub const MAX_COLUMN_HEIGHT: u8 = 3;

/// How far a dropped item falls looking for ground.
pub const MAX_FALL: u8 = 16;

/// The world grid: blocks by position plus loose item entities.
#[derive(Debug, Clone, Default)]
pub struct GridWorld {
    /// Non-air blocks indexed by position.
    blocks: BTreeMap<Position, BlockState>,
    /// Item entities lying in the world.
    drops: Vec<DroppedItem>,
}

impl GridWorld {
    /// Create an empty world.
    pub const fn new() -> Self {
        Self {
            blocks: BTreeMap::new(),
            drops: Vec::new(),
        }
    }

    // -------------------------------------------------------------------
    // Blocks
    // -------------------------------------------------------------------

    /// Set the block at `pos`. Setting air removes the entry.
    pub fn set_block(&mut self, pos: Position, state: BlockState) {
        if state.kind.is_air() {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, state);
        }
    }

    /// Number of non-air blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Count blocks of `kind`.
    pub fn count_of(&self, kind: BlockKind) -> usize {
        self.blocks.values().filter(|s| s.kind == kind).count()
    }

    /// Positions of blocks whose kind is in `kinds`, inside the box spanned
    /// by the two radii around `origin`.
    ///
    /// Results are ordered nearest first (ties by position) and truncated
    /// to `max`.
    pub fn positions_of(
        &self,
        kinds: &[BlockKind],
        origin: Position,
        horizontal_radius: i32,
        vertical_radius: i32,
        max: usize,
    ) -> Vec<Position> {
        let h = i64::from(horizontal_radius);
        let v = i64::from(vertical_radius);
        let mut found: Vec<Position> = self
            .blocks
            .iter()
            .filter(|(_, state)| kinds.contains(&state.kind))
            .map(|(pos, _)| *pos)
            .filter(|pos| {
                let dx = i64::from(pos.x).saturating_sub(i64::from(origin.x)).abs();
                let dy = i64::from(pos.y).saturating_sub(i64::from(origin.y)).abs();
                let dz = i64::from(pos.z).saturating_sub(i64::from(origin.z)).abs();
                dx <= h && dz <= h && dy <= v
            })
            .collect();
        found.sort_by_key(|pos| (pos.distance_squared(origin), *pos));
        found.truncate(max);
        found
    }

    /// Break the block at `pos`, spawning its drops on the ground.
    ///
    /// Breaking a column segment also breaks every segment of the same
    /// kind stacked above it. Returns the dropped items.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NothingToBreak`] if `pos` is air.
    pub fn break_block(&mut self, pos: Position) -> Result<Vec<ItemKind>, WorldError> {
        let state = self.block_at(pos);
        if state.kind.is_air() {
            return Err(WorldError::NothingToBreak(pos));
        }

        let mut broken = vec![pos];
        if matches!(state.kind, BlockKind::SugarCane | BlockKind::Cactus) {
            let mut above = pos.up();
            while self.block_at(above).kind == state.kind {
                broken.push(above);
                above = above.up();
            }
        }

        let mut items = Vec::new();
        for at in broken {
            let removed = self.blocks.remove(&at).unwrap_or(BlockState::AIR);
            for item in drops_for(removed) {
                self.spawn_drop(item, at);
                items.push(item);
            }
        }
        Ok(items)
    }

    /// Plant `item` on the soil block at `soil`.
    ///
    /// Returns the crop kind that was placed above the soil.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Occupied`] if the space above is taken, or
    /// [`WorldError::CannotPlant`] if the soil does not accept the item.
    pub fn plant(&mut self, soil: Position, item: ItemKind) -> Result<BlockKind, WorldError> {
        let soil_kind = self.block_at(soil).kind;
        let crop = match (soil_kind, item) {
            (BlockKind::Farmland, ItemKind::WheatSeeds) => BlockKind::Wheat,
            (BlockKind::Farmland, ItemKind::BeetrootSeeds) => BlockKind::Beetroots,
            (BlockKind::Farmland, ItemKind::Carrot) => BlockKind::Carrots,
            (BlockKind::Farmland, ItemKind::Potato) => BlockKind::Potatoes,
            (BlockKind::Farmland, ItemKind::MelonSeeds) => BlockKind::MelonStem,
            (BlockKind::Farmland, ItemKind::PumpkinSeeds) => BlockKind::PumpkinStem,
            (BlockKind::SoulSand, ItemKind::NetherWart) => BlockKind::NetherWart,
            _ => {
                return Err(WorldError::CannotPlant {
                    position: soil,
                    soil: soil_kind,
                    item,
                });
            }
        };
        if !self.is_air_above(soil) {
            return Err(WorldError::Occupied(soil.up()));
        }
        self.set_block(soil.up(), BlockState::of(crop));
        Ok(crop)
    }

    /// Apply bone meal to the block at `pos`, advancing it two to five stages.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotGrowable`] if the block cannot take bone meal.
    pub fn apply_bone_meal<R: Rng + ?Sized>(
        &mut self,
        pos: Position,
        rng: &mut R,
    ) -> Result<u8, WorldError> {
        let Some(growable) = self.growable(pos) else {
            return Err(WorldError::NotGrowable(pos));
        };
        if !growable.is_bonemealable() {
            return Err(WorldError::NotGrowable(pos));
        }
        let state = self.block_at(pos);
        let max = max_age(state.kind).unwrap_or(0);
        let boost: u8 = rng.random_range(2..=5);
        let age = state.age.saturating_add(boost).min(max);
        self.set_block(pos, BlockState::aged(state.kind, age));
        Ok(age)
    }

    /// Advance growth for one tick.
    ///
    /// Each growing block advances with probability `chance_percent`/100:
    /// aging crops gain one stage, ripe stems try to set a fruit beside
    /// them, and short columns gain a segment. Returns the number of
    /// blocks that changed.
    pub fn grow<R: Rng + ?Sized>(&mut self, rng: &mut R, chance_percent: u32) -> usize {
        let candidates: Vec<(Position, BlockState)> =
            self.blocks.iter().map(|(p, s)| (*p, *s)).collect();
        let mut changed: usize = 0;

        for (pos, state) in candidates {
            if rng.random_range(0..100) >= chance_percent {
                continue;
            }
            let grew = match state.kind {
                BlockKind::SugarCane | BlockKind::Cactus => self.grow_column(pos, state.kind),
                BlockKind::PumpkinStem | BlockKind::MelonStem if state.age >= STEM_MAX_AGE => {
                    self.set_fruit(pos, state.kind)
                }
                kind => match max_age(kind) {
                    Some(max) if state.age < max => {
                        self.set_block(pos, BlockState::aged(kind, state.age.saturating_add(1)));
                        true
                    }
                    _ => false,
                },
            };
            if grew {
                changed = changed.saturating_add(1);
            }
        }
        changed
    }

    fn grow_column(&mut self, pos: Position, kind: BlockKind) -> bool {
        // Only the top segment grows.
        if self.block_at(pos.up()).kind == kind || !self.is_air_above(pos) {
            return false;
        }
        let mut height: u8 = 1;
        let mut below = pos.down();
        while self.block_at(below).kind == kind {
            height = height.saturating_add(1);
            below = below.down();
        }
        if height >= MAX_COLUMN_HEIGHT {
            return false;
        }
        self.set_block(pos.up(), BlockState::of(kind));
        true
    }

    fn set_fruit(&mut self, stem: Position, stem_kind: BlockKind) -> bool {
        let fruit = if stem_kind == BlockKind::PumpkinStem {
            BlockKind::Pumpkin
        } else {
            BlockKind::Melon
        };
        let neighbours = [
            stem.offset(1, 0, 0),
            stem.offset(-1, 0, 0),
            stem.offset(0, 0, 1),
            stem.offset(0, 0, -1),
        ];
        for spot in neighbours {
            if self.block_at(spot).kind.is_air() && !self.block_at(spot.down()).kind.is_air() {
                self.set_block(spot, BlockState::of(fruit));
                return true;
            }
        }
        false
    }

    // -------------------------------------------------------------------
    // Item entities
    // -------------------------------------------------------------------

    /// Drop one `item` at `at`; it falls onto the first solid block below.
    ///
    /// An item with no ground within [`MAX_FALL`] blocks stays where it
    /// was dropped.
    pub fn spawn_drop(&mut self, item: ItemKind, at: Position) {
        let mut landed = at;
        for _ in 0..MAX_FALL {
            if !self.block_at(landed.down()).kind.is_air() {
                break;
            }
            landed = landed.down();
        }
        if self.block_at(landed.down()).kind.is_air() {
            landed = at;
        }
        let center = landed.center();
        self.drops.push(DroppedItem {
            item,
            position: Vec3::new(center.x, f64::from(landed.y), center.z),
            on_ground: true,
        });
    }

    /// Item entities currently in the world.
    pub fn drops(&self) -> &[DroppedItem] {
        &self.drops
    }

    /// Remove and return every item a player standing at `feet` picks up.
    pub fn collect_drops_at(&mut self, feet: Position) -> Vec<ItemKind> {
        let mut collected = Vec::new();
        self.drops.retain(|drop| {
            if drop.standing_block() == feet {
                collected.push(drop.item);
                false
            } else {
                true
            }
        });
        collected
    }
}

impl WorldView for GridWorld {
    fn block_at(&self, pos: Position) -> BlockState {
        self.blocks.get(&pos).copied().unwrap_or(BlockState::AIR)
    }

    fn growable(&self, pos: Position) -> Option<Growable> {
        let state = self.block_at(pos);
        let max = match state.kind {
            BlockKind::PumpkinStem | BlockKind::MelonStem => STEM_MAX_AGE,
            kind => grain_max_age(kind)?,
        };
        Some(Growable {
            can_grow: state.age < max,
            accepts_bone_meal: true,
        })
    }

    fn dropped_items(&self) -> Vec<DroppedItem> {
        self.drops.clone()
    }
}

/// Maximum age of an aging block, if it ages at all.
const fn max_age(kind: BlockKind) -> Option<u8> {
    match kind {
        BlockKind::PumpkinStem | BlockKind::MelonStem => Some(STEM_MAX_AGE),
        BlockKind::NetherWart => Some(WART_READY_AGE),
        other => grain_max_age(other),
    }
}

/// Items a block yields when broken.
fn drops_for(state: BlockState) -> Vec<ItemKind> {
    let ripe = max_age(state.kind).is_some_and(|max| state.age >= max);
    match state.kind {
        BlockKind::Wheat if ripe => vec![ItemKind::Wheat, ItemKind::WheatSeeds],
        BlockKind::Wheat => vec![ItemKind::WheatSeeds],
        BlockKind::Beetroots if ripe => vec![ItemKind::Beetroot, ItemKind::BeetrootSeeds],
        BlockKind::Beetroots => vec![ItemKind::BeetrootSeeds],
        BlockKind::Carrots if ripe => vec![ItemKind::Carrot, ItemKind::Carrot],
        BlockKind::Carrots => vec![ItemKind::Carrot],
        BlockKind::Potatoes if ripe => vec![ItemKind::Potato, ItemKind::Potato],
        BlockKind::Potatoes => vec![ItemKind::Potato],
        BlockKind::NetherWart if ripe => vec![ItemKind::NetherWart, ItemKind::NetherWart],
        BlockKind::NetherWart => vec![ItemKind::NetherWart],
        BlockKind::Pumpkin => vec![ItemKind::Pumpkin],
        BlockKind::Melon => vec![ItemKind::MelonSlice; 3],
        BlockKind::PumpkinStem => vec![ItemKind::PumpkinSeeds],
        BlockKind::MelonStem => vec![ItemKind::MelonSeeds],
        BlockKind::SugarCane => vec![ItemKind::SugarCane],
        BlockKind::Cactus => vec![ItemKind::Cactus],
        BlockKind::Farmland | BlockKind::Dirt => vec![ItemKind::Dirt],
        _ => Vec::new(),
    }
}
