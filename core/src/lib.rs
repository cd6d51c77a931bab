#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the dungeon sentinel engine.
//!
//! This crate defines the geometry and message surface that connects the
//! level generator, the authoritative level state, and the pure systems that
//! drive sentinels. Once a level exists, adapters and systems submit
//! [`Command`] values describing desired mutations, the level executes them
//! through its `apply` entry point, and then broadcasts [`Event`] values for
//! systems to react to deterministically.

use std::{
    ops::{Add, Mul, Sub},
    time::Duration,
};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Frame rate that [`Body`] velocities are expressed against.
pub const REFERENCE_TICK_RATE: u32 = 30;

/// Immutable two dimensional vector measured in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    x: f32,
    y: f32,
}

impl Vector2 {
    /// Vector with both components set to zero.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a new vector from its components.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component. Grows downward, matching tile rows.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean length of the vector.
    #[must_use]
    pub fn magnitude(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Returns a unit vector pointing in the same direction.
    ///
    /// A vector without a usable length (zero or non-finite) normalizes to
    /// [`Vector2::ZERO`] instead of producing NaN components.
    #[must_use]
    pub fn normalize(self) -> Self {
        let magnitude = self.magnitude();
        if magnitude == 0.0 || !magnitude.is_finite() {
            return Self::ZERO;
        }

        Self::new(self.x / magnitude, self.y / magnitude)
    }

    /// Component-wise sum.
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Component-wise difference.
    #[must_use]
    pub fn subtract(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Multiplies both components by `scalar`.
    #[must_use]
    pub fn scale(self, scalar: f32) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }

    /// Component-wise product.
    #[must_use]
    pub fn component_multiply(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(a: Self, b: Self) -> f32 {
        a.x * b.x + a.y * b.y
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Vector2::add(self, rhs)
    }
}

impl Sub for Vector2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.subtract(rhs)
    }
}

impl Mul<f32> for Vector2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        self.scale(rhs)
    }
}

impl Mul for Vector2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.component_multiply(rhs)
    }
}

/// Classification of a single level tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Solid rock that has not been carved.
    #[default]
    Empty,
    /// Walkable floor carved by a room or a corridor.
    Floor,
    /// Wall inferred around carved floor.
    Wall,
    /// Floor tile occupied by a sentinel.
    EnemySpawn,
}

impl TileKind {
    /// Numeric code used by the textual grid dump.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Floor => 1,
            Self::Wall => 2,
            Self::EnemySpawn => 3,
        }
    }

    /// Reports whether the tile was carved out by generation.
    #[must_use]
    pub const fn is_carved(self) -> bool {
        matches!(self, Self::Floor | Self::EnemySpawn)
    }
}

/// Location of a single tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    column: u32,
    row: u32,
}

impl TilePos {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the tile displaced by the provided offsets, if it stays non-negative.
    #[must_use]
    pub fn offset(self, columns: i32, rows: i32) -> Option<Self> {
        let column = self.column.checked_add_signed(columns)?;
        let row = self.row.checked_add_signed(rows)?;
        Some(Self::new(column, row))
    }

    /// World coordinate of the tile's upper-left corner.
    #[must_use]
    pub fn world_origin(self, tile_size: f32) -> Vector2 {
        Vector2::new(self.column as f32 * tile_size, self.row as f32 * tile_size)
    }

    /// World coordinate of the tile's center.
    #[must_use]
    pub fn world_center(self, tile_size: f32) -> Vector2 {
        let half = tile_size / 2.0;
        self.world_origin(tile_size) + Vector2::new(half, half)
    }
}

/// Size of a [`TileRect`] measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRectSize {
    width: u32,
    height: u32,
}

impl TileRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Axis-aligned rectangle expressed in tile coordinates. Rooms are tile rectangles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    origin: TilePos,
    size: TileRectSize,
}

impl TileRect {
    /// Constructs a rectangle from an origin tile and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: TilePos, size: TileRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left tile that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> TilePos {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole tiles.
    #[must_use]
    pub const fn size(&self) -> TileRectSize {
        self.size
    }

    /// Returns a rectangle of the same size anchored at `origin`.
    #[must_use]
    pub const fn with_origin(self, origin: TilePos) -> Self {
        Self {
            origin,
            size: self.size,
        }
    }

    /// First column covered by the rectangle.
    #[must_use]
    pub const fn left(&self) -> u32 {
        self.origin.column
    }

    /// First row covered by the rectangle.
    #[must_use]
    pub const fn top(&self) -> u32 {
        self.origin.row
    }

    /// Last column covered by the rectangle.
    ///
    /// Zero-width rectangles report their origin column.
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.origin.column + self.size.width.saturating_sub(1)
    }

    /// Last row covered by the rectangle.
    ///
    /// Zero-height rectangles report their origin row.
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.origin.row + self.size.height.saturating_sub(1)
    }

    /// Integer center tile, rounded toward the origin.
    #[must_use]
    pub const fn center(&self) -> TilePos {
        TilePos::new(
            self.origin.column + self.size.width / 2,
            self.origin.row + self.size.height / 2,
        )
    }

    /// Reports whether `tile` lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, tile: TilePos) -> bool {
        tile.column >= self.origin.column
            && tile.column < self.origin.column + self.size.width
            && tile.row >= self.origin.row
            && tile.row < self.origin.row + self.size.height
    }

    /// Reports whether two rectangles share at least one tile.
    ///
    /// Rectangles that merely touch along an edge do not overlap.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.origin.column < other.origin.column + other.size.width
            && other.origin.column < self.origin.column + self.size.width
            && self.origin.row < other.origin.row + other.size.height
            && other.origin.row < self.origin.row + self.size.height
    }

    /// Iterates over every covered tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = TilePos> {
        let columns = self.origin.column..self.origin.column + self.size.width;
        let rows = self.origin.row..self.origin.row + self.size.height;
        rows.flat_map(move |row| columns.clone().map(move |column| TilePos::new(column, row)))
    }
}

/// Axis-aligned rectangle measured in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl WorldRect {
    /// Creates a rectangle from its upper-left corner and extent.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle of the given extent centered on `center`.
    #[must_use]
    pub fn centered(center: Vector2, width: f32, height: f32) -> Self {
        Self::new(
            center.x() - width / 2.0,
            center.y() - height / 2.0,
            width,
            height,
        )
    }

    /// World-space footprint of a tile.
    #[must_use]
    pub fn from_tile(tile: TilePos, tile_size: f32) -> Self {
        let origin = tile.world_origin(tile_size);
        Self::new(origin.x(), origin.y(), tile_size, tile_size)
    }

    /// Left edge.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Top edge.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Horizontal extent.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Geometric center.
    #[must_use]
    pub fn center(&self) -> Vector2 {
        Vector2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Returns the same rectangle moved so its upper-left corner sits at `origin`.
    #[must_use]
    pub fn moved_to(self, origin: Vector2) -> Self {
        Self::new(origin.x(), origin.y(), self.width, self.height)
    }

    /// Reports whether the interiors of two rectangles intersect.
    ///
    /// Shared edges do not count as an intersection.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Origin of a blocking collider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderKind {
    /// Wall tile inferred around carved floor.
    Wall,
    /// Tile occupied by a sentinel.
    EnemySpawn,
}

/// World-space blocking rectangle derived from a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    kind: ColliderKind,
    tile: TilePos,
    rect: WorldRect,
}

impl Collider {
    /// Creates the collider covering `tile`.
    #[must_use]
    pub fn new(kind: ColliderKind, tile: TilePos, tile_size: f32) -> Self {
        Self {
            kind,
            tile,
            rect: WorldRect::from_tile(tile, tile_size),
        }
    }

    /// Reason the collider exists.
    #[must_use]
    pub const fn kind(&self) -> ColliderKind {
        self.kind
    }

    /// Tile the collider was derived from.
    #[must_use]
    pub const fn tile(&self) -> TilePos {
        self.tile
    }

    /// World-space rectangle covered by the collider.
    #[must_use]
    pub const fn rect(&self) -> &WorldRect {
        &self.rect
    }
}

/// Unique identifier assigned to a sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SentinelId(u32);

impl SentinelId {
    /// Creates a new sentinel identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Remaining hit points of a sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric hit points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether no hit points remain.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Subtracts damage, stopping at zero.
    #[must_use]
    pub const fn saturating_sub(self, amount: u32) -> Self {
        Self(self.0.saturating_sub(amount))
    }
}

/// Position and footprint of the moving target for a single tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetSnapshot {
    center: Vector2,
    bounds: WorldRect,
}

impl TargetSnapshot {
    /// Captures a target of the given extent centered on `center`.
    #[must_use]
    pub fn centered(center: Vector2, width: f32, height: f32) -> Self {
        Self {
            center,
            bounds: WorldRect::centered(center, width, height),
        }
    }

    /// Captures a target from its bounding box.
    #[must_use]
    pub fn from_bounds(bounds: WorldRect) -> Self {
        Self {
            center: bounds.center(),
            bounds,
        }
    }

    /// Center of the target in world coordinates.
    #[must_use]
    pub const fn center(&self) -> Vector2 {
        self.center
    }

    /// Bounding box of the target in world coordinates.
    #[must_use]
    pub const fn bounds(&self) -> &WorldRect {
        &self.bounds
    }
}

/// Tuning knobs for sentinel attack cadence and sight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelTuning {
    /// Shortest countdown before a sentinel re-evaluates its target, in milliseconds.
    pub threshold_min_ms: u64,
    /// Longest countdown before a sentinel re-evaluates its target, in milliseconds.
    pub threshold_max_ms: u64,
    /// Sight range measured in tiles.
    pub range_tiles: f32,
    /// Distance advanced by the sight probe per step, in world units.
    pub probe_step: f32,
    /// Projectile speed in world units per reference frame.
    pub projectile_speed: f32,
}

impl Default for SentinelTuning {
    fn default() -> Self {
        Self {
            threshold_min_ms: 900,
            threshold_max_ms: 1_500,
            range_tiles: 14.0,
            probe_step: 24.0,
            projectile_speed: 8.0,
        }
    }
}

impl SentinelTuning {
    /// Sight range converted to world units.
    #[must_use]
    pub fn max_range(&self, tile_size: f32) -> f32 {
        self.range_tiles * tile_size
    }

    /// Draws a fresh countdown threshold uniformly from the configured range.
    ///
    /// An inverted range collapses to its lower bound.
    pub fn draw_threshold<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let low = self.threshold_min_ms;
        let high = self.threshold_max_ms.max(low);
        Duration::from_millis(rng.gen_range(low..=high))
    }
}

/// Capability shared by everything that occupies a position and advances with time.
pub trait Actor {
    /// Current upper-left position in world coordinates.
    fn position(&self) -> Vector2;

    /// Current bounding box in world coordinates.
    fn bounds(&self) -> WorldRect;

    /// Advances internal state by `dt`.
    fn update(&mut self, dt: Duration);
}

/// Kinematic state integrated at the reference tick rate.
///
/// Velocity is expressed in world units per reference frame, so a body moving
/// at `v` covers `v * 30` units per second regardless of the real tick rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Upper-left corner in world coordinates.
    pub position: Vector2,
    /// Displacement per reference frame.
    pub velocity: Vector2,
    /// Extent of the body's bounding box.
    pub size: Vector2,
}

impl Body {
    /// Creates a body at rest.
    #[must_use]
    pub const fn at_rest(position: Vector2, size: Vector2) -> Self {
        Self {
            position,
            velocity: Vector2::ZERO,
            size,
        }
    }

    /// Center of the bounding box.
    #[must_use]
    pub fn center(&self) -> Vector2 {
        self.position + self.size.scale(0.5)
    }

    /// Moves the body so its center sits at `center`.
    pub fn center_on(&mut self, center: Vector2) {
        self.position = center - self.size.scale(0.5);
    }

    /// Advances the position by `dt` worth of reference frames and returns the displacement.
    pub fn integrate(&mut self, dt: Duration) -> Vector2 {
        let frames = REFERENCE_TICK_RATE as f32 * dt.as_secs_f32();
        let displacement = self.velocity.scale(frames);
        self.position = self.position + displacement;
        displacement
    }
}

impl Actor for Body {
    fn position(&self) -> Vector2 {
        self.position
    }

    fn bounds(&self) -> WorldRect {
        WorldRect::new(
            self.position.x(),
            self.position.y(),
            self.size.x(),
            self.size.y(),
        )
    }

    fn update(&mut self, dt: Duration) {
        let _ = self.integrate(dt);
    }
}

/// Immutable representation of a single sentinel's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SentinelSnapshot {
    /// Identifier allocated during generation.
    pub id: SentinelId,
    /// Tile occupied by the sentinel.
    pub tile: TilePos,
    /// Upper-left corner of the occupied tile in world coordinates.
    pub position: Vector2,
    /// Footprint of the occupied tile in world coordinates.
    pub bounds: WorldRect,
    /// Remaining hit points.
    pub health: Health,
    /// Time accumulated toward the current threshold.
    pub timer: Duration,
    /// Countdown the timer must reach before the sentinel evaluates its target.
    pub threshold: Duration,
}

impl SentinelSnapshot {
    /// Center of the occupied tile, used as the origin of sight checks.
    #[must_use]
    pub fn center(&self) -> Vector2 {
        self.bounds.center()
    }
}

/// Read-only snapshot describing all living sentinels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SentinelView {
    snapshots: Vec<SentinelSnapshot>,
}

impl SentinelView {
    /// Creates a new sentinel view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<SentinelSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &SentinelSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot for `id`.
    #[must_use]
    pub fn get(&self, id: SentinelId) -> Option<&SentinelSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured sentinels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<SentinelSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an in-flight projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated when the projectile was fired.
    pub id: ProjectileId,
    /// Sentinel that fired the projectile.
    pub source: SentinelId,
    /// Current bounding box in world coordinates.
    pub bounds: WorldRect,
    /// Displacement per reference frame.
    pub velocity: Vector2,
    /// Distance covered since firing.
    pub travelled: f32,
}

/// Reasons a projectile leaves the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpiryReason {
    /// The projectile struck a wall collider.
    HitWall,
    /// The projectile travelled past the sentinel sight range.
    OutOfRange,
    /// The consumer removed the projectile, typically after resolving a hit.
    Removed,
}

/// Commands that express all permissible level mutations after generation.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a sentinel launch a projectile.
    FireAttack {
        /// Sentinel performing the attack.
        sentinel: SentinelId,
        /// Unit direction of travel.
        direction: Vector2,
    },
    /// Restarts a sentinel's countdown with a new threshold.
    RearmSentinel {
        /// Sentinel whose timer restarts.
        sentinel: SentinelId,
        /// Countdown to install.
        threshold: Duration,
    },
    /// Applies damage to a sentinel.
    DamageSentinel {
        /// Sentinel receiving the damage.
        sentinel: SentinelId,
        /// Hit points to subtract.
        amount: u32,
    },
    /// Removes a projectile whose hit the consumer resolved.
    RemoveProjectile {
        /// Projectile to discard.
        projectile: ProjectileId,
    },
}

/// Events broadcast by the level after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// A sentinel's timer reached its threshold and awaits a targeting decision.
    SentinelReady {
        /// Sentinel that became ready.
        sentinel: SentinelId,
    },
    /// A sentinel restarted its countdown.
    SentinelRearmed {
        /// Sentinel that was rearmed.
        sentinel: SentinelId,
        /// Newly installed countdown.
        threshold: Duration,
    },
    /// A sentinel launched a projectile.
    AttackFired {
        /// Sentinel that attacked.
        sentinel: SentinelId,
        /// Projectile created by the attack.
        projectile: ProjectileId,
        /// Center the projectile was launched from.
        origin: Vector2,
        /// Unit direction of travel.
        direction: Vector2,
    },
    /// A projectile left the simulation.
    ProjectileExpired {
        /// Projectile that expired.
        projectile: ProjectileId,
        /// Why it expired.
        reason: ExpiryReason,
    },
    /// A sentinel ran out of health and was removed.
    SentinelDefeated {
        /// Sentinel that was removed.
        sentinel: SentinelId,
        /// Tile the sentinel occupied.
        tile: TilePos,
    },
}
