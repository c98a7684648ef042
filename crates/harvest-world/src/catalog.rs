//! The crop catalog: which blocks are harvestable and when they are ready.
//!
//! Each [`CropVariant`] is a plain data record carrying its readiness
//! predicate as a function value. Variants that depend on configuration
//! (the column crops and replant mode) read it from the [`CropContext`]
//! rather than overriding behaviour per type.
//!
//! Readiness rules:
//!
//! | Family         | Kinds                              | Ready when                      |
//! |----------------|------------------------------------|---------------------------------|
//! | Grain          | wheat, carrots, potatoes, beetroot | age at the kind's maximum       |
//! | Attached fruit | pumpkin, melon                     | always                          |
//! | Wart           | nether wart                        | age >= 3                        |
//! | Column         | sugar cane, cactus                 | replant off, or same kind below |

use harvest_types::{BlockKind, BlockState, Position};

use crate::view::WorldView;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum age of wheat, carrots, and potatoes.
pub const GRAIN_MAX_AGE: u8 = 7;

/// Maximum age of beetroot, which has a shorter growth table.
pub const BEETROOT_MAX_AGE: u8 = 3;

/// Age at which nether wart is harvestable.
pub const WART_READY_AGE: u8 = 3;

/// Maximum age of pumpkin and melon stems.
pub const STEM_MAX_AGE: u8 = 7;

// ---------------------------------------------------------------------------
// Variant records
// ---------------------------------------------------------------------------

/// Everything a readiness predicate may look at.
pub struct CropContext<'a> {
    /// Live world access, for neighbour queries.
    pub world: &'a dyn WorldView,
    /// Where the crop is.
    pub position: Position,
    /// The crop's current block state.
    pub state: BlockState,
    /// Whether replant mode is enabled.
    pub replant: bool,
}

/// A pure readiness predicate.
pub type ReadinessPredicate = fn(&CropContext<'_>) -> bool;

/// How a crop grows, which decides its readiness rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropFamily {
    /// Age-staged crop, ready at its maximum age.
    Grain {
        /// The kind's maximum age.
        max_age: u8,
    },
    /// Fruit body grown from a stem; ready as soon as it exists.
    AttachedFruit,
    /// Nether wart.
    Wart,
    /// Vertically growing column.
    Column,
}

/// One entry in the crop catalog.
#[derive(Clone, Copy)]
pub struct CropVariant {
    /// Display name.
    pub name: &'static str,
    /// The block kind this variant matches.
    pub kind: BlockKind,
    /// Growth family.
    pub family: CropFamily,
    ready: ReadinessPredicate,
}

impl core::fmt::Debug for CropVariant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CropVariant")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

impl CropVariant {
    /// Whether this variant describes blocks of `kind`.
    pub fn matches(&self, kind: BlockKind) -> bool {
        self.kind == kind
    }

    /// Evaluate this variant's readiness predicate.
    pub fn is_ready(&self, ctx: &CropContext<'_>) -> bool {
        (self.ready)(ctx)
    }
}

/// The fixed, ordered crop catalog.
pub static CROP_CATALOG: [CropVariant; 9] = [
    grain("wheat", BlockKind::Wheat, GRAIN_MAX_AGE),
    grain("carrots", BlockKind::Carrots, GRAIN_MAX_AGE),
    grain("potatoes", BlockKind::Potatoes, GRAIN_MAX_AGE),
    grain("beetroot", BlockKind::Beetroots, BEETROOT_MAX_AGE),
    CropVariant {
        name: "pumpkin",
        kind: BlockKind::Pumpkin,
        family: CropFamily::AttachedFruit,
        ready: always_ready,
    },
    CropVariant {
        name: "melon",
        kind: BlockKind::Melon,
        family: CropFamily::AttachedFruit,
        ready: always_ready,
    },
    CropVariant {
        name: "nether_wart",
        kind: BlockKind::NetherWart,
        family: CropFamily::Wart,
        ready: wart_ready,
    },
    CropVariant {
        name: "sugar_cane",
        kind: BlockKind::SugarCane,
        family: CropFamily::Column,
        ready: column_ready,
    },
    CropVariant {
        name: "cactus",
        kind: BlockKind::Cactus,
        family: CropFamily::Column,
        ready: column_ready,
    },
];

const fn grain(name: &'static str, kind: BlockKind, max_age: u8) -> CropVariant {
    CropVariant {
        name,
        kind,
        family: CropFamily::Grain { max_age },
        ready: grain_ready,
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Maximum age for a grain-family crop kind.
pub const fn grain_max_age(kind: BlockKind) -> Option<u8> {
    match kind {
        BlockKind::Wheat | BlockKind::Carrots | BlockKind::Potatoes => Some(GRAIN_MAX_AGE),
        BlockKind::Beetroots => Some(BEETROOT_MAX_AGE),
        _ => None,
    }
}

fn grain_ready(ctx: &CropContext<'_>) -> bool {
    grain_max_age(ctx.state.kind).is_some_and(|max| ctx.state.age >= max)
}

const fn always_ready(_ctx: &CropContext<'_>) -> bool {
    true
}

const fn wart_ready(ctx: &CropContext<'_>) -> bool {
    ctx.state.age >= WART_READY_AGE
}

/// With replant on, only segments standing on the same crop are taken, so
/// the bottom segment always stays to regrow.
fn column_ready(ctx: &CropContext<'_>) -> bool {
    if !ctx.replant {
        return true;
    }
    ctx.world.block_at(ctx.position.down()).kind == ctx.state.kind
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Find the catalog variant matching `kind`, if any.
pub fn classify(kind: BlockKind) -> Option<&'static CropVariant> {
    CROP_CATALOG.iter().find(|variant| variant.matches(kind))
}

/// Whether the block `state` at `pos` is a catalog crop ready to harvest.
///
/// Blocks with no catalog entry are never ready.
pub fn ready_for_harvest(
    world: &dyn WorldView,
    pos: Position,
    state: BlockState,
    replant: bool,
) -> bool {
    classify(state.kind).is_some_and(|variant| {
        variant.is_ready(&CropContext {
            world,
            position: pos,
            state,
            replant,
        })
    })
}

/// Block kinds a world scan should look for.
///
/// All catalog kinds, plus farmland when replanting, plus soul sand when
/// nether wart replanting is also enabled.
pub fn scan_targets(replant: bool, replant_nether_wart: bool) -> Vec<BlockKind> {
    let mut kinds: Vec<BlockKind> = CROP_CATALOG.iter().map(|variant| variant.kind).collect();
    if replant {
        kinds.push(BlockKind::Farmland);
        if replant_nether_wart {
            kinds.push(BlockKind::SoulSand);
        }
    }
    kinds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridWorld;

    fn ready(world: &GridWorld, pos: Position, replant: bool) -> bool {
        ready_for_harvest(world, pos, world.block_at(pos), replant)
    }

    #[test]
    fn grain_ready_exactly_at_max() {
        let at = Position::new(0, 65, 0);
        for (kind, max) in [
            (BlockKind::Wheat, 7),
            (BlockKind::Carrots, 7),
            (BlockKind::Potatoes, 7),
            (BlockKind::Beetroots, 3),
        ] {
            let mut world = GridWorld::new();
            for age in 0..max {
                world.set_block(at, BlockState::aged(kind, age));
                assert!(!ready(&world, at, true), "{kind:?} age {age} must not be ready");
            }
            world.set_block(at, BlockState::aged(kind, max));
            assert!(ready(&world, at, true), "{kind:?} at max age {max} must be ready");
        }
    }

    #[test]
    fn beetroot_does_not_share_the_grain_constant() {
        let at = Position::new(0, 65, 0);
        let mut world = GridWorld::new();
        world.set_block(at, BlockState::aged(BlockKind::Beetroots, 3));
        assert!(ready(&world, at, true));
        world.set_block(at, BlockState::aged(BlockKind::Wheat, 3));
        assert!(!ready(&world, at, true));
    }

    #[test]
    fn nether_wart_ready_from_age_three() {
        let at = Position::new(0, 65, 0);
        let mut world = GridWorld::new();
        for age in 0..=3 {
            world.set_block(at, BlockState::aged(BlockKind::NetherWart, age));
            assert_eq!(ready(&world, at, true), age >= 3);
        }
    }

    #[test]
    fn fruit_is_always_ready() {
        let at = Position::new(0, 65, 0);
        let mut world = GridWorld::new();
        world.set_block(at, BlockState::of(BlockKind::Pumpkin));
        assert!(ready(&world, at, true));
        world.set_block(at, BlockState::of(BlockKind::Melon));
        assert!(ready(&world, at, false));
    }

    #[test]
    fn stems_are_not_harvested() {
        let at = Position::new(0, 65, 0);
        let mut world = GridWorld::new();
        world.set_block(at, BlockState::aged(BlockKind::PumpkinStem, 7));
        assert!(!ready(&world, at, true));
    }

    #[test]
    fn column_crops_respect_replant_mode() {
        let base = Position::new(0, 64, 0);
        for kind in [BlockKind::SugarCane, BlockKind::Cactus] {
            let mut world = GridWorld::new();
            world.set_block(base, BlockState::of(BlockKind::Sand));
            world.set_block(base.up(), BlockState::of(kind));
            world.set_block(base.up().up(), BlockState::of(kind));

            // Bottom segment stands on sand.
            assert!(!ready(&world, base.up(), true));
            assert!(ready(&world, base.up(), false));
            // Second segment stands on the same crop.
            assert!(ready(&world, base.up().up(), true));
            assert!(ready(&world, base.up().up(), false));
        }
    }

    #[test]
    fn column_crops_of_a_different_kind_below_are_not_ready() {
        let at = Position::new(0, 66, 0);
        let mut world = GridWorld::new();
        world.set_block(at.down(), BlockState::of(BlockKind::Cactus));
        world.set_block(at, BlockState::of(BlockKind::SugarCane));
        assert!(!ready(&world, at, true));
    }

    #[test]
    fn unknown_blocks_are_never_ready() {
        let at = Position::new(0, 64, 0);
        let mut world = GridWorld::new();
        world.set_block(at, BlockState::of(BlockKind::Farmland));
        assert!(!ready(&world, at, false));
        assert!(classify(BlockKind::Farmland).is_none());
    }

    #[test]
    fn catalog_kinds_are_unique() {
        for (i, a) in CROP_CATALOG.iter().enumerate() {
            for b in CROP_CATALOG.iter().skip(i.saturating_add(1)) {
                assert_ne!(a.kind, b.kind);
            }
        }
    }

    #[test]
    fn scan_targets_follow_replant_settings() {
        let plain = scan_targets(false, true);
        assert_eq!(plain.len(), CROP_CATALOG.len());
        assert!(!plain.contains(&BlockKind::Farmland));

        let replant = scan_targets(true, false);
        assert!(replant.contains(&BlockKind::Farmland));
        assert!(!replant.contains(&BlockKind::SoulSand));

        let wart = scan_targets(true, true);
        assert!(wart.contains(&BlockKind::SoulSand));
    }
}
