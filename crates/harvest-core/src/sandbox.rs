//! An in-memory host for running the farming task without a game client.
//!
//! [`SandboxHost`] implements every host interface over a shared
//! [`GridWorld`], a player [`SlotInventory`], and a stash container. It
//! plays out what the core asks for, one [`Pathfinder::submit`] at a time:
//!
//! 1. Forced inputs fire once against the block under the crosshair
//!    (break, plant, bone meal, or open the stash).
//! 2. The player steps one block towards the nearest goal leaf.
//! 3. Items lying in the player's block are picked up.
//! 4. Crops grow.
//!
//! Every non-air block is a full cube for aiming. Rays start at the
//! player's eyes ([`EYE_HEIGHT`] above the feet) and end at [`REACH`].
//!
//! [`SandboxScanner`] searches the same shared world from the scan
//! worker, and [`demo_farm`] lays out a small mixed farm with a stash.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use harvest_inventory::{SlotInventory, transfer_one_matching};
use harvest_types::{
    BlockKind, BlockState, Directive, DroppedItem, Face, Goal, Input, ItemKind, ItemStack,
    Position, RayHit, Rotation, Vec3, WaypointTag,
};
use harvest_world::{GridWorld, Growable, ItemFilter, WorldView};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::host::{
    DiagnosticsSink, InteractionDispatcher, InventoryOracle, PathingStatus, Pathfinder,
    ReachabilitySolver, WaypointStore,
};
use crate::scan::{BlockScanner, ScanError, ScanRequest};

/// Eye height above the bottom of the feet block.
pub const EYE_HEIGHT: f64 = 1.62;

/// How far the player can reach.
pub const REACH: f64 = 4.5;

/// Slots in the stash container.
pub const STASH_SLOTS: usize = 27;

/// Default per-block growth chance per tick, in percent.
pub const DEFAULT_GROWTH_CHANCE: u32 = 5;

const RAY_STEP: f64 = 0.05;
const RAY_STEPS: u32 = 90;

/// A world shared between the host and the scan worker.
pub type SharedWorld = Arc<RwLock<GridWorld>>;

fn read_world(world: &SharedWorld) -> RwLockReadGuard<'_, GridWorld> {
    world.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_world(world: &SharedWorld) -> RwLockWriteGuard<'_, GridWorld> {
    world.write().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// One user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// When it was emitted.
    pub at: DateTime<Utc>,
    /// The message text.
    pub message: String,
}

/// A diagnostics sink that keeps every message and forwards it to tracing.
#[derive(Debug, Clone, Default)]
pub struct RecordingDiagnostics {
    entries: Vec<Diagnostic>,
}

impl RecordingDiagnostics {
    /// Every message, oldest first.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Number of messages emitted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many times `message` was emitted.
    pub fn count_of(&self, message: &str) -> usize {
        self.entries.iter().filter(|d| d.message == message).count()
    }
}

impl DiagnosticsSink for RecordingDiagnostics {
    fn emit(&mut self, message: &str) {
        info!(diagnostic = message, "Farm status");
        self.entries.push(Diagnostic {
            at: Utc::now(),
            message: message.to_owned(),
        });
    }
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Scans the shared sandbox world.
#[derive(Debug, Clone)]
pub struct SandboxScanner {
    world: SharedWorld,
}

impl SandboxScanner {
    /// A scanner over `world`.
    pub const fn new(world: SharedWorld) -> Self {
        Self { world }
    }
}

impl BlockScanner for SandboxScanner {
    fn scan(&self, request: &ScanRequest) -> Result<Vec<Position>, ScanError> {
        Ok(read_world(&self.world).positions_of(
            &request.targets,
            request.origin,
            request.horizontal_radius,
            request.vertical_radius,
            request.max_positions,
        ))
    }
}

// ---------------------------------------------------------------------------
// Aim geometry
// ---------------------------------------------------------------------------

/// The rotation that looks from `from` straight at `to`.
#[allow(clippy::cast_possible_truncation)]
fn rotation_towards(from: Vec3, to: Vec3) -> Rotation {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let dz = to.z - from.z;
    let horizontal = dx.hypot(dz);
    let yaw = (-dx).atan2(dz).to_degrees();
    let pitch = -dy.atan2(horizontal).to_degrees();
    // Degrees always fit in f32.
    Rotation::new(yaw as f32, pitch as f32)
}

/// Unit look vector for `rotation`.
fn direction(rotation: Rotation) -> Vec3 {
    let yaw = f64::from(rotation.yaw).to_radians();
    let pitch = f64::from(rotation.pitch).to_radians();
    Vec3::new(-yaw.sin() * pitch.cos(), -pitch.sin(), yaw.cos() * pitch.cos())
}

/// The face of `into` a ray crosses when stepping out of `from`.
fn entered_face(from: Position, into: Position) -> Face {
    match (from.y.cmp(&into.y), from.x.cmp(&into.x), from.z.cmp(&into.z)) {
        (Ordering::Greater, _, _) => Face::Up,
        (Ordering::Less, _, _) => Face::Down,
        (_, Ordering::Less, _) => Face::West,
        (_, Ordering::Greater, _) => Face::East,
        (_, _, Ordering::Less) => Face::North,
        _ => Face::South,
    }
}

/// One block closer to `target`, moving x first, then z, then y.
fn step_once(from: Position, target: Position) -> Position {
    match (
        target.x.cmp(&from.x),
        target.z.cmp(&from.z),
        target.y.cmp(&from.y),
    ) {
        (Ordering::Greater, _, _) => from.offset(1, 0, 0),
        (Ordering::Less, _, _) => from.offset(-1, 0, 0),
        (_, Ordering::Greater, _) => from.offset(0, 0, 1),
        (_, Ordering::Less, _) => from.offset(0, 0, -1),
        (_, _, Ordering::Greater) => from.up(),
        (_, _, Ordering::Less) => from.down(),
        _ => from,
    }
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// A simulated player in a [`GridWorld`].
#[derive(Debug)]
pub struct SandboxHost {
    world: SharedWorld,
    player: SlotInventory,
    stash: SlotInventory,
    stash_open: bool,
    waypoints: Vec<(WaypointTag, Position)>,
    feet: Position,
    rotation: Rotation,
    inputs: BTreeSet<Input>,
    calc_failed: bool,
    safe_to_cancel: bool,
    rng: StdRng,
    growth_chance_percent: u32,
    diagnostics: RecordingDiagnostics,
}

impl SandboxHost {
    /// A player standing at `feet` in `world` with an empty inventory.
    ///
    /// `seed` drives crop growth and bone meal.
    pub fn new(world: GridWorld, feet: Position, seed: u64) -> Self {
        Self {
            world: Arc::new(RwLock::new(world)),
            player: SlotInventory::main(),
            stash: SlotInventory::with_size(STASH_SLOTS),
            stash_open: false,
            waypoints: Vec::new(),
            feet,
            rotation: Rotation::new(0.0, 0.0),
            inputs: BTreeSet::new(),
            calc_failed: false,
            safe_to_cancel: true,
            rng: StdRng::seed_from_u64(seed),
            growth_chance_percent: DEFAULT_GROWTH_CHANCE,
            diagnostics: RecordingDiagnostics::default(),
        }
    }

    /// The demo farm with the stash and home recorded and a starter kit.
    pub fn demo(seed: u64) -> Self {
        let farm = demo_farm();
        let mut host = Self::new(farm.world, farm.home, seed);
        host.waypoints.push((WaypointTag::Home, farm.home));
        host.waypoints.push((WaypointTag::Stash, farm.stash));
        host.waypoints.push((WaypointTag::StashUse, farm.stash_use));
        for (item, count) in [
            (ItemKind::Hoe, 1),
            (ItemKind::Axe, 1),
            (ItemKind::WheatSeeds, 32),
            (ItemKind::Carrot, 16),
            (ItemKind::NetherWart, 8),
            (ItemKind::BoneMeal, 16),
        ] {
            let _leftover = host.player.add(item, count);
        }
        host
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// A handle to the shared world.
    pub fn world(&self) -> SharedWorld {
        Arc::clone(&self.world)
    }

    /// A scanner over this host's world.
    pub fn scanner(&self) -> SandboxScanner {
        SandboxScanner::new(self.world())
    }

    /// Run `f` against the world.
    pub fn with_world<R>(&self, f: impl FnOnce(&GridWorld) -> R) -> R {
        f(&read_world(&self.world))
    }

    /// Run `f` against the world mutably.
    pub fn with_world_mut<R>(&self, f: impl FnOnce(&mut GridWorld) -> R) -> R {
        f(&mut write_world(&self.world))
    }

    /// The player's inventory.
    pub const fn player(&self) -> &SlotInventory {
        &self.player
    }

    /// The player's inventory, mutably.
    pub const fn player_mut(&mut self) -> &mut SlotInventory {
        &mut self.player
    }

    /// The stash contents.
    pub const fn stash(&self) -> &SlotInventory {
        &self.stash
    }

    /// The stash contents, mutably.
    pub const fn stash_mut(&mut self) -> &mut SlotInventory {
        &mut self.stash
    }

    /// Where the player's feet are.
    pub const fn feet(&self) -> Position {
        self.feet
    }

    /// Move the player to `feet` without pathing.
    pub const fn teleport(&mut self, feet: Position) {
        self.feet = feet;
        self.safe_to_cancel = true;
    }

    /// The current look direction.
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Whether `input` is currently forced.
    pub fn is_input_forced(&self, input: Input) -> bool {
        self.inputs.contains(&input)
    }

    /// Set the growth chance per block per tick, in percent.
    pub const fn set_growth_chance(&mut self, percent: u32) {
        self.growth_chance_percent = percent;
    }

    /// Messages emitted so far.
    pub const fn diagnostics(&self) -> &RecordingDiagnostics {
        &self.diagnostics
    }

    fn eye(&self) -> Vec3 {
        let center = self.feet.center();
        Vec3::new(center.x, f64::from(self.feet.y) + EYE_HEIGHT, center.z)
    }

    fn trace(&self, rotation: Rotation) -> Option<RayHit> {
        let eye = self.eye();
        let dir = direction(rotation);
        let world = read_world(&self.world);
        let mut previous = Position::containing(eye);
        for step in 1..=RAY_STEPS {
            let t = f64::from(step) * RAY_STEP;
            let point = Vec3::new(
                dir.x.mul_add(t, eye.x),
                dir.y.mul_add(t, eye.y),
                dir.z.mul_add(t, eye.z),
            );
            let block = Position::containing(point);
            if block == previous {
                continue;
            }
            if !world.block_at(block).kind.is_air() {
                return Some(RayHit {
                    block,
                    face: entered_face(previous, block),
                });
            }
            previous = block;
        }
        None
    }

    // -------------------------------------------------------------------
    // Submit phases
    // -------------------------------------------------------------------

    fn fire_inputs(&mut self) {
        let inputs = std::mem::take(&mut self.inputs);
        if inputs.is_empty() {
            return;
        }
        let Some(hit) = self.trace(self.rotation) else {
            return;
        };
        if inputs.contains(&Input::Primary) {
            match write_world(&self.world).break_block(hit.block) {
                Ok(items) => debug!(block = %hit.block, drops = items.len(), "Broke block"),
                Err(error) => debug!(%error, "Break had no effect"),
            }
        }
        if inputs.contains(&Input::Secondary) {
            self.use_item_on(hit);
        }
    }

    fn use_item_on(&mut self, hit: RayHit) {
        if self.block_at(hit.block).kind.is_chest() {
            if self.most_recent_by_tag(WaypointTag::Stash) == Some(hit.block) {
                self.stash_open = true;
            } else {
                debug!(block = %hit.block, "Opened a chest that is not the stash");
            }
            return;
        }
        let Some(stack) = self.player.selected_stack() else {
            return;
        };
        let used = if stack.item == ItemKind::BoneMeal {
            write_world(&self.world)
                .apply_bone_meal(hit.block, &mut self.rng)
                .map(|_age| ())
        } else if hit.face == Face::Up {
            write_world(&self.world)
                .plant(hit.block, stack.item)
                .map(|_crop| ())
        } else {
            return;
        };
        match used {
            Ok(()) => {
                if let Err(error) = self.player.consume_selected() {
                    warn!(%error, "Used an item that was not there");
                }
            }
            Err(error) => debug!(%error, "Use had no effect"),
        }
    }

    /// Where the player would stand to satisfy `leaf`.
    fn standing_spot(leaf: &Goal) -> Option<Position> {
        match leaf {
            Goal::Break(pos) | Goal::StandOn(pos) => Some(*pos),
            Goal::Composite(_) => None,
        }
    }

    fn step_towards(&mut self, goal: &Goal) -> bool {
        if goal.is_in_goal(self.feet) {
            self.calc_failed = false;
            return false;
        }
        let feet = self.feet;
        let target = goal
            .leaves()
            .into_iter()
            .filter_map(Self::standing_spot)
            .min_by_key(|spot| (spot.manhattan(feet), *spot));
        let Some(target) = target else {
            self.calc_failed = true;
            return false;
        };
        self.calc_failed = false;
        self.feet = step_once(feet, target);
        true
    }

    fn pick_up_drops(&mut self) {
        let collected = write_world(&self.world).collect_drops_at(self.feet);
        for item in collected {
            if self.player.add(item, 1) > 0 {
                write_world(&self.world).spawn_drop(item, self.feet);
            }
        }
    }
}

impl WorldView for SandboxHost {
    fn block_at(&self, pos: Position) -> BlockState {
        read_world(&self.world).block_at(pos)
    }

    fn growable(&self, pos: Position) -> Option<Growable> {
        read_world(&self.world).growable(pos)
    }

    fn dropped_items(&self) -> Vec<DroppedItem> {
        read_world(&self.world).dropped_items()
    }
}

impl ReachabilitySolver for SandboxHost {
    fn reachable(&self, pos: Position) -> Option<Rotation> {
        self.reachable_offset(pos, pos.center())
    }

    fn reachable_offset(&self, pos: Position, point: Vec3) -> Option<Rotation> {
        let eye = self.eye();
        if eye.distance(point) > REACH {
            return None;
        }
        let rotation = rotation_towards(eye, point);
        self.trace(rotation)
            .filter(|hit| hit.block == pos)
            .map(|_hit| rotation)
    }

    fn ray_trace(&self, rotation: Rotation) -> Option<RayHit> {
        self.trace(rotation)
    }

    fn look(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    fn is_looking_at(&self, pos: Position) -> bool {
        self.selected_block() == Some(pos)
    }

    fn selected_block(&self) -> Option<Position> {
        self.trace(self.rotation).map(|hit| hit.block)
    }
}

impl InteractionDispatcher for SandboxHost {
    fn set_input(&mut self, input: Input, active: bool) {
        if active {
            self.inputs.insert(input);
        } else {
            self.inputs.remove(&input);
        }
    }

    fn clear_all(&mut self) {
        self.inputs.clear();
    }

    fn close_active_interface(&mut self) {
        self.stash_open = false;
    }
}

impl InventoryOracle for SandboxHost {
    fn main_slots(&self) -> Vec<Option<ItemStack>> {
        self.player.slots().to_vec()
    }

    fn carrying(&mut self, filter: ItemFilter, select: bool) -> bool {
        self.player.carrying(filter, select)
    }

    fn select_best_tool_for(&mut self, state: BlockState) {
        let _found = self.player.select_best_tool_for(state.kind);
    }

    fn is_stash_open(&self) -> bool {
        self.stash_open
    }

    fn transfer_one_matching(&mut self, filter: ItemFilter) -> bool {
        if !self.stash_open {
            return false;
        }
        match transfer_one_matching(&mut self.player, &mut self.stash, filter) {
            Ok(moved) => moved.is_some(),
            Err(error) => {
                warn!(%error, "Stash transfer failed");
                false
            }
        }
    }
}

impl WaypointStore for SandboxHost {
    fn most_recent_by_tag(&self, tag: WaypointTag) -> Option<Position> {
        self.waypoints
            .iter()
            .rev()
            .find(|(t, _)| *t == tag)
            .map(|(_, pos)| *pos)
    }

    fn add(&mut self, tag: WaypointTag, pos: Position) {
        self.waypoints.push((tag, pos));
    }
}

impl DiagnosticsSink for SandboxHost {
    fn emit(&mut self, message: &str) {
        self.diagnostics.emit(message);
    }
}

impl Pathfinder for SandboxHost {
    fn submit(&mut self, directive: &Directive) -> PathingStatus {
        self.fire_inputs();
        let moved = match directive.goal() {
            Some(goal) => self.step_towards(goal),
            None => {
                self.calc_failed = false;
                false
            }
        };
        self.safe_to_cancel = !moved;
        self.pick_up_drops();
        let chance = self.growth_chance_percent;
        let _grown = write_world(&self.world).grow(&mut self.rng, chance);
        self.status()
    }

    fn status(&self) -> PathingStatus {
        PathingStatus {
            calc_failed: self.calc_failed,
            safe_to_cancel: self.safe_to_cancel,
            player_feet: self.feet,
            path_start: self.feet,
        }
    }
}

// ---------------------------------------------------------------------------
// Demo farm
// ---------------------------------------------------------------------------

/// Ground level of the demo farm; crops sit one block above.
pub const DEMO_GROUND_Y: i32 = 64;

/// Key positions of the demo farm.
#[derive(Debug, Clone)]
pub struct DemoFarm {
    /// The world.
    pub world: GridWorld,
    /// Where the player starts and returns to.
    pub home: Position,
    /// The stash chest.
    pub stash: Position,
    /// Where the player stands to open the stash.
    pub stash_use: Position,
}

/// A bare square of farmland at [`DEMO_GROUND_Y`], `radius` blocks each way
/// from the origin column.
pub fn farmland_field(radius: i32) -> GridWorld {
    let mut world = GridWorld::new();
    for x in radius.saturating_neg()..=radius {
        for z in radius.saturating_neg()..=radius {
            world.set_block(
                Position::new(x, DEMO_GROUND_Y, z),
                BlockState::of(BlockKind::Farmland),
            );
        }
    }
    world
}

/// Lay out a small mixed farm.
///
/// A dirt floor at [`DEMO_GROUND_Y`] carries a 6x6 field of grain on
/// farmland (some ripe, some growing, one row bare), a soul sand strip
/// of nether wart, sugar cane and cactus columns on sand, a pumpkin and a
/// melon beside their stems, and a chest stash west of home.
pub fn demo_farm() -> DemoFarm {
    let mut world = GridWorld::new();
    let ground = DEMO_GROUND_Y;
    let crop = ground.saturating_add(1);

    for x in -3..=9 {
        for z in -3..=8 {
            world.set_block(Position::new(x, ground, z), BlockState::of(BlockKind::Dirt));
        }
    }

    // Grain field: one kind per row, the last row left bare.
    let rows = [
        (BlockKind::Wheat, 7),
        (BlockKind::Carrots, 7),
        (BlockKind::Potatoes, 3),
        (BlockKind::Beetroots, 3),
        (BlockKind::Wheat, 2),
    ];
    for x in 0..6 {
        for z in 0..6 {
            let soil = Position::new(x, ground, z);
            world.set_block(soil, BlockState::of(BlockKind::Farmland));
            let row = usize::try_from(z).ok().and_then(|i| rows.get(i));
            if let Some(&(kind, age)) = row {
                world.set_block(soil.up(), BlockState::aged(kind, age));
            }
        }
    }

    // Nether wart on soul sand, alternating ripe and young.
    for x in 0..6 {
        let soil = Position::new(x, ground, 7);
        world.set_block(soil, BlockState::of(BlockKind::SoulSand));
        let age = if x.rem_euclid(2) == 0 { 3 } else { 1 };
        world.set_block(soil.up(), BlockState::aged(BlockKind::NetherWart, age));
    }

    // Column crops on sand.
    for (z, kind, height) in [(0, BlockKind::SugarCane, 2), (3, BlockKind::Cactus, 3)] {
        world.set_block(Position::new(8, ground, z), BlockState::of(BlockKind::Sand));
        for dy in 0..height {
            world.set_block(Position::new(8, crop.saturating_add(dy), z), BlockState::of(kind));
        }
    }

    // Stems with their fruit.
    for (x, stem, fruit) in [
        (0, BlockKind::PumpkinStem, BlockKind::Pumpkin),
        (3, BlockKind::MelonStem, BlockKind::Melon),
    ] {
        let soil = Position::new(x, ground, -2);
        world.set_block(soil, BlockState::of(BlockKind::Farmland));
        world.set_block(soil.up(), BlockState::aged(stem, 7));
        world.set_block(Position::new(x.saturating_add(1), crop, -2), BlockState::of(fruit));
    }

    let stash = Position::new(-3, crop, 3);
    world.set_block(stash, BlockState::of(BlockKind::Chest));

    DemoFarm {
        world,
        home: Position::new(-1, crop, 0),
        stash,
        stash_use: Position::new(-2, crop, 3),
    }
}
