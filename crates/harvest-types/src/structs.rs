//! Core value types: positions, block states, item stacks, aim geometry,
//! dropped items, and scan snapshots.

use serde::{Deserialize, Serialize};

use crate::enums::{BlockKind, Face, ItemKind};
use crate::ids::ScanId;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// An integer block position in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// East-west coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
    /// North-south coordinate.
    pub z: i32,
}

impl Position {
    /// Create a position from its coordinates.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The position directly above.
    pub const fn up(self) -> Self {
        Self::new(self.x, self.y.saturating_add(1), self.z)
    }

    /// The position directly below.
    pub const fn down(self) -> Self {
        Self::new(self.x, self.y.saturating_sub(1), self.z)
    }

    /// Offset this position by the given deltas, saturating at the `i32` bounds.
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.z.saturating_add(dz),
        )
    }

    /// Squared euclidean distance to `other`.
    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = i64::from(self.x).saturating_sub(i64::from(other.x));
        let dy = i64::from(self.y).saturating_sub(i64::from(other.y));
        let dz = i64::from(self.z).saturating_sub(i64::from(other.z));
        dx.saturating_mul(dx)
            .saturating_add(dy.saturating_mul(dy))
            .saturating_add(dz.saturating_mul(dz))
    }

    /// Whether `other` lies strictly closer than `distance` blocks.
    pub fn is_within(self, other: Self, distance: i64) -> bool {
        self.distance_squared(other) < distance.saturating_mul(distance)
    }

    /// Manhattan distance to `other`.
    pub fn manhattan(self, other: Self) -> i64 {
        let dx = i64::from(self.x).saturating_sub(i64::from(other.x)).abs();
        let dy = i64::from(self.y).saturating_sub(i64::from(other.y)).abs();
        let dz = i64::from(self.z).saturating_sub(i64::from(other.z)).abs();
        dx.saturating_add(dy).saturating_add(dz)
    }

    /// The block centre.
    pub fn center(self) -> Vec3 {
        Vec3::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y) + 0.5,
            f64::from(self.z) + 0.5,
        )
    }

    /// The centre of the block's top face, where placements aim.
    pub fn top_center(self) -> Vec3 {
        Vec3::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y) + 1.0,
            f64::from(self.z) + 0.5,
        )
    }

    /// The block position containing the point `v`.
    pub fn containing(v: Vec3) -> Self {
        Self::new(floor_to_i32(v.x), floor_to_i32(v.y), floor_to_i32(v.z))
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Floor a coordinate into the `i32` range.
#[allow(clippy::cast_possible_truncation)]
fn floor_to_i32(v: f64) -> i32 {
    if v.is_nan() {
        return 0;
    }
    // Clamped into range first, so the cast cannot truncate.
    v.floor().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

// ---------------------------------------------------------------------------
// Continuous geometry
// ---------------------------------------------------------------------------

/// A point in continuous world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// East-west coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// North-south coordinate.
    pub z: f64,
}

impl Vec3 {
    /// Create a point from its coordinates.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dz.mul_add(dz, dx.mul_add(dx, dy * dy)).sqrt()
    }
}

/// A look direction in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// Horizontal angle.
    pub yaw: f32,
    /// Vertical angle, positive looking down.
    pub pitch: f32,
}

impl Rotation {
    /// Tolerance used when comparing two rotations.
    pub const EPSILON: f32 = 0.01;

    /// Create a rotation from yaw and pitch.
    pub const fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }

    /// Whether two rotations point the same way within [`Self::EPSILON`].
    pub fn approx_eq(self, other: Self) -> bool {
        (self.yaw - other.yaw).abs() < Self::EPSILON
            && (self.pitch - other.pitch).abs() < Self::EPSILON
    }
}

/// The result of tracing an aim ray into the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RayHit {
    /// The block the ray hit.
    pub block: Position,
    /// The face of that block the ray entered through.
    pub face: Face,
}

// ---------------------------------------------------------------------------
// Blocks and items
// ---------------------------------------------------------------------------

/// The state of the block at one position.
///
/// `age` is the growth stage for crops and zero for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockState {
    /// The block kind.
    pub kind: BlockKind,
    /// Growth stage.
    pub age: u8,
}

impl BlockState {
    /// A block of `kind` at age zero.
    pub const fn of(kind: BlockKind) -> Self {
        Self { kind, age: 0 }
    }

    /// A crop of `kind` at the given growth stage.
    pub const fn aged(kind: BlockKind, age: u8) -> Self {
        Self { kind, age }
    }

    /// Empty space.
    pub const AIR: Self = Self::of(BlockKind::Air);
}

/// A stack of identical items in one inventory slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// The item kind.
    pub item: ItemKind,
    /// Number of items in the stack (at least 1 for a stored stack).
    pub count: u32,
}

impl ItemStack {
    /// Create a stack of `count` items.
    pub const fn new(item: ItemKind, count: u32) -> Self {
        Self { item, count }
    }

    /// Maximum size of a stack of this item.
    pub const fn max_size(&self) -> u32 {
        self.item.max_stack_size()
    }

    /// Whether the stack has reached its maximum size.
    pub const fn is_full(&self) -> bool {
        self.count >= self.max_size()
    }
}

/// An item entity lying in the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DroppedItem {
    /// What the entity carries.
    pub item: ItemKind,
    /// Where the entity is.
    pub position: Vec3,
    /// Whether the entity has settled on the ground.
    pub on_ground: bool,
}

impl DroppedItem {
    /// The block a player should stand in to collect this item.
    ///
    /// Lifted by 0.1 so items resting on farmland (0.9375 high) resolve to
    /// the block above the farmland.
    pub fn standing_block(&self) -> Position {
        Position::containing(Vec3::new(
            self.position.x,
            self.position.y + 0.1,
            self.position.z,
        ))
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The ordered positions found by one completed world scan.
///
/// A snapshot is immutable once built; newer scans replace it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    scan_id: ScanId,
    requested_at_tick: u64,
    positions: Vec<Position>,
}

impl Snapshot {
    /// Build a snapshot from the positions a scan returned.
    pub const fn new(scan_id: ScanId, requested_at_tick: u64, positions: Vec<Position>) -> Self {
        Self {
            scan_id,
            requested_at_tick,
            positions,
        }
    }

    /// The scan that produced this snapshot.
    pub const fn scan_id(&self) -> ScanId {
        self.scan_id
    }

    /// The task tick on which the scan was requested.
    pub const fn requested_at_tick(&self) -> u64 {
        self.requested_at_tick
    }

    /// Positions in scan order.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the scan found nothing.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
