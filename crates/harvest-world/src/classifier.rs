//! Per-tick partition of a scan snapshot into action buckets.
//!
//! Every position is routed to at most one bucket, checked in this order:
//!
//! 1. farmland with air above -> [`Classification::open_farmland`]
//! 2. soul sand with air above -> [`Classification::open_soul_sand`]
//! 3. a ready catalog crop -> [`Classification::to_break`]
//! 4. a growable block that accepts bone meal -> [`Classification::bonemealable`]
//!
//! Farmland and soul sand that are covered are dropped outright; they are
//! never harvest or bone meal candidates. Buckets are rebuilt on every call
//! from live world queries, never carried over between ticks.

use harvest_types::{BlockKind, Position, Snapshot};

use crate::catalog::ready_for_harvest;
use crate::view::WorldView;

/// Disjoint action buckets for one tick, each in snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Ready crops to break.
    pub to_break: Vec<Position>,
    /// Farmland with nothing planted on it.
    pub open_farmland: Vec<Position>,
    /// Soul sand with nothing planted on it.
    pub open_soul_sand: Vec<Position>,
    /// Growing blocks that would take bone meal.
    pub bonemealable: Vec<Position>,
}

impl Classification {
    /// Total number of classified positions across all buckets.
    pub fn total(&self) -> usize {
        self.to_break
            .len()
            .saturating_add(self.open_farmland.len())
            .saturating_add(self.open_soul_sand.len())
            .saturating_add(self.bonemealable.len())
    }

    /// Whether no position landed in any bucket.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Classify every position in `snapshot` against the live world.
pub fn classify(snapshot: &Snapshot, world: &dyn WorldView, replant: bool) -> Classification {
    let mut result = Classification::default();

    for &pos in snapshot.positions() {
        let state = world.block_at(pos);
        match state.kind {
            BlockKind::Farmland => {
                if world.is_air_above(pos) {
                    result.open_farmland.push(pos);
                }
            }
            BlockKind::SoulSand => {
                if world.is_air_above(pos) {
                    result.open_soul_sand.push(pos);
                }
            }
            _ => {
                if ready_for_harvest(world, pos, state, replant) {
                    result.to_break.push(pos);
                } else if world
                    .growable(pos)
                    .is_some_and(crate::view::Growable::is_bonemealable)
                {
                    result.bonemealable.push(pos);
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use harvest_types::{BlockState, ScanId};

    use super::*;
    use crate::grid::GridWorld;

    fn snapshot(positions: Vec<Position>) -> Snapshot {
        Snapshot::new(ScanId::new(), 0, positions)
    }

    /// A small plot touching every bucket plus a few dropped positions.
    fn mixed_world() -> (GridWorld, Vec<Position>) {
        let mut world = GridWorld::new();
        let mut positions = Vec::new();

        let open = Position::new(0, 64, 0);
        world.set_block(open, BlockState::of(BlockKind::Farmland));
        positions.push(open);

        let covered = Position::new(1, 64, 0);
        world.set_block(covered, BlockState::of(BlockKind::Farmland));
        world.set_block(covered.up(), BlockState::aged(BlockKind::Wheat, 2));
        positions.push(covered);
        positions.push(covered.up());

        let ripe = Position::new(2, 65, 0);
        world.set_block(ripe.down(), BlockState::of(BlockKind::Farmland));
        world.set_block(ripe, BlockState::aged(BlockKind::Carrots, 7));
        positions.push(ripe);

        let sand = Position::new(3, 64, 0);
        world.set_block(sand, BlockState::of(BlockKind::SoulSand));
        positions.push(sand);

        let wart = Position::new(4, 65, 0);
        world.set_block(wart.down(), BlockState::of(BlockKind::SoulSand));
        world.set_block(wart, BlockState::aged(BlockKind::NetherWart, 1));
        positions.push(wart);
        positions.push(wart.down());

        (world, positions)
    }

    #[test]
    fn routes_each_position_to_its_bucket() {
        let (world, positions) = mixed_world();
        let result = classify(&snapshot(positions), &world, true);

        assert_eq!(result.open_farmland, vec![Position::new(0, 64, 0)]);
        assert_eq!(result.open_soul_sand, vec![Position::new(3, 64, 0)]);
        assert_eq!(result.to_break, vec![Position::new(2, 65, 0)]);
        // Young wheat takes bone meal; young nether wart does not.
        assert_eq!(result.bonemealable, vec![Position::new(1, 65, 0)]);
    }

    #[test]
    fn buckets_are_disjoint_and_within_snapshot() {
        let (world, positions) = mixed_world();
        let input: BTreeSet<Position> = positions.iter().copied().collect();
        let result = classify(&snapshot(positions), &world, true);

        let buckets = [
            &result.to_break,
            &result.open_farmland,
            &result.open_soul_sand,
            &result.bonemealable,
        ];
        let mut seen = BTreeSet::new();
        for bucket in buckets {
            for pos in bucket {
                assert!(input.contains(pos));
                assert!(seen.insert(*pos), "{pos} appears in two buckets");
            }
        }
        assert_eq!(seen.len(), result.total());
    }

    #[test]
    fn empty_snapshot_yields_empty_buckets() {
        let world = GridWorld::new();
        let result = classify(&snapshot(Vec::new()), &world, true);
        assert!(result.is_empty());
    }

    #[test]
    fn stale_positions_are_dropped() {
        // The scan saw a crop that has since been harvested.
        let world = GridWorld::new();
        let result = classify(&snapshot(vec![Position::new(9, 65, 9)]), &world, true);
        assert!(result.is_empty());
    }

    #[test]
    fn mature_crop_is_not_bonemealable() {
        let mut world = GridWorld::new();
        let pos = Position::new(0, 65, 0);
        world.set_block(pos, BlockState::aged(BlockKind::Wheat, 7));
        let result = classify(&snapshot(vec![pos]), &world, true);
        assert_eq!(result.to_break, vec![pos]);
        assert!(result.bonemealable.is_empty());
    }
}
