#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state for the dungeon sentinel engine.
//!
//! A [`Level`] is assembled once from a finished [`LevelLayout`]. Its grid,
//! room list and collider list never change afterwards; only sentinels and
//! projectiles evolve, and only through [`apply`].

mod grid;
mod projectiles;
mod sentinels;

use std::time::Duration;

use dungeon_sentinel_core::{
    Actor, Collider, Command, Event, ExpiryReason, Health, ProjectileId, SentinelId,
    SentinelTuning, TilePos, TileRect, Vector2,
};
use tracing::{debug, trace};

pub use grid::{glyph, TileGrid};

use projectiles::ProjectileState;
use sentinels::SentinelState;

/// Sentinel placement produced by level generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SentinelSeed {
    /// Tile the sentinel occupies.
    pub tile: TilePos,
    /// Starting hit points.
    pub health: Health,
    /// Countdown for the sentinel's first targeting decision.
    pub threshold: Duration,
}

/// Fully generated level contents handed over to [`Level::from_layout`].
#[derive(Clone, Debug)]
pub struct LevelLayout {
    /// Finished tile grid.
    pub grid: TileGrid,
    /// Side length of a tile in world units.
    pub tile_size: f32,
    /// Rooms in placement order.
    pub rooms: Vec<TileRect>,
    /// Colliders for every inferred wall tile.
    pub wall_colliders: Vec<Collider>,
    /// Colliders for every sentinel tile.
    pub enemy_colliders: Vec<Collider>,
    /// World position where the target starts.
    pub spawn_point: Vector2,
    /// World position of the secondary goal.
    pub goal_point: Vector2,
    /// Sentinels in placement order.
    pub sentinels: Vec<SentinelSeed>,
    /// Sight and cadence tuning shared by every sentinel.
    pub tuning: SentinelTuning,
}

/// Represents a generated level and the units living in it.
#[derive(Clone, Debug)]
pub struct Level {
    grid: TileGrid,
    tile_size: f32,
    rooms: Vec<TileRect>,
    colliders: Vec<Collider>,
    enemy_collider_count: usize,
    spawn_point: Vector2,
    goal_point: Vector2,
    tuning: SentinelTuning,
    sentinels: Vec<SentinelState>,
    projectiles: Vec<ProjectileState>,
    next_projectile_id: u32,
    tick_index: u64,
}

impl Level {
    /// Freezes a generated layout into a level. Sentinel identifiers follow seed order.
    #[must_use]
    pub fn from_layout(layout: LevelLayout) -> Self {
        let LevelLayout {
            grid,
            tile_size,
            rooms,
            wall_colliders,
            enemy_colliders,
            spawn_point,
            goal_point,
            sentinels,
            tuning,
        } = layout;

        let enemy_collider_count = enemy_colliders.len();
        let mut colliders = enemy_colliders;
        colliders.extend(wall_colliders);

        let sentinels = sentinels
            .into_iter()
            .enumerate()
            .map(|(index, seed)| {
                SentinelState::new(
                    SentinelId::new(index as u32),
                    seed.tile,
                    tile_size,
                    seed.health,
                    seed.threshold,
                )
            })
            .collect();

        Self {
            grid,
            tile_size,
            rooms,
            colliders,
            enemy_collider_count,
            spawn_point,
            goal_point,
            tuning,
            sentinels,
            projectiles: Vec::new(),
            next_projectile_id: 0,
            tick_index: 0,
        }
    }

    fn wall_colliders(&self) -> &[Collider] {
        &self.colliders[self.enemy_collider_count..]
    }

    fn sentinel_index(&self, id: SentinelId) -> Option<usize> {
        self.sentinels
            .binary_search_by_key(&id, |sentinel| sentinel.id)
            .ok()
    }

    fn allocate_projectile_id(&mut self) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
        id
    }

    fn advance_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.projectiles.is_empty() {
            return;
        }

        let max_range = self.tuning.max_range(self.tile_size);
        let walls = &self.colliders[self.enemy_collider_count..];
        let mut expired: Vec<(ProjectileId, ExpiryReason)> = Vec::new();
        for projectile in &mut self.projectiles {
            projectile.update(dt);
            if let Some(reason) = projectile.expiry(walls, max_range) {
                expired.push((projectile.id, reason));
            }
        }

        if expired.is_empty() {
            return;
        }

        self.projectiles
            .retain(|projectile| !expired.iter().any(|(id, _)| *id == projectile.id));
        for (projectile, reason) in expired {
            trace!(projectile = projectile.get(), ?reason, "projectile expired");
            out_events.push(Event::ProjectileExpired { projectile, reason });
        }
    }

    fn sweep_defeated(&mut self, out_events: &mut Vec<Event>) {
        let defeated: Vec<(SentinelId, TilePos)> = self
            .sentinels
            .iter()
            .filter(|sentinel| sentinel.health.is_zero())
            .map(|sentinel| (sentinel.id, sentinel.tile))
            .collect();
        if defeated.is_empty() {
            return;
        }

        self.sentinels.retain(|sentinel| !sentinel.health.is_zero());
        for (sentinel, tile) in defeated {
            debug!(
                sentinel = sentinel.get(),
                column = tile.column(),
                row = tile.row(),
                "sentinel defeated"
            );
            out_events.push(Event::SentinelDefeated { sentinel, tile });
        }
    }
}

/// Applies the provided command to the level, mutating state deterministically.
pub fn apply(level: &mut Level, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            level.tick_index = level.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });

            for sentinel in &mut level.sentinels {
                sentinel.update(dt);
                if sentinel.take_ready() {
                    out_events.push(Event::SentinelReady {
                        sentinel: sentinel.id,
                    });
                }
            }

            level.advance_projectiles(dt, out_events);
        }
        Command::FireAttack {
            sentinel,
            direction,
        } => {
            let Some(index) = level.sentinel_index(sentinel) else {
                return;
            };
            let direction = direction.normalize();
            if direction == Vector2::ZERO {
                return;
            }

            let origin = level.sentinels[index].center();
            let projectile = level.allocate_projectile_id();
            level.projectiles.push(ProjectileState::launch(
                projectile,
                sentinel,
                origin,
                direction,
                level.tuning.projectile_speed,
            ));
            out_events.push(Event::AttackFired {
                sentinel,
                projectile,
                origin,
                direction,
            });
        }
        Command::RearmSentinel {
            sentinel,
            threshold,
        } => {
            if let Some(index) = level.sentinel_index(sentinel) {
                level.sentinels[index].rearm(threshold);
                out_events.push(Event::SentinelRearmed {
                    sentinel,
                    threshold,
                });
            }
        }
        Command::DamageSentinel { sentinel, amount } => {
            if let Some(index) = level.sentinel_index(sentinel) {
                let state = &mut level.sentinels[index];
                state.health = state.health.saturating_sub(amount);
            }
            level.sweep_defeated(out_events);
        }
        Command::RemoveProjectile { projectile } => {
            let Some(index) = level
                .projectiles
                .iter()
                .position(|state| state.id == projectile)
            else {
                return;
            };
            let _ = level.projectiles.remove(index);
            out_events.push(Event::ProjectileExpired {
                projectile,
                reason: ExpiryReason::Removed,
            });
        }
    }
}

/// Query functions that provide read-only access to the level state.
pub mod query {
    use super::{Level, TileGrid};
    use dungeon_sentinel_core::{
        Collider, ProjectileSnapshot, SentinelTuning, SentinelView, TileKind, TilePos, TileRect,
        Vector2,
    };

    /// Provides read-only access to the level's tile grid.
    #[must_use]
    pub fn grid(level: &Level) -> &TileGrid {
        &level.grid
    }

    /// Returns the kind of the tile at `tile`, or `None` outside the grid.
    #[must_use]
    pub fn tile(level: &Level, tile: TilePos) -> Option<TileKind> {
        level.grid.get(tile)
    }

    /// Side length of a tile in world units.
    #[must_use]
    pub fn tile_size(level: &Level) -> f32 {
        level.tile_size
    }

    /// Rooms in placement order.
    #[must_use]
    pub fn rooms(level: &Level) -> &[TileRect] {
        &level.rooms
    }

    /// Every blocking collider: sentinel tiles first, then walls.
    #[must_use]
    pub fn colliders(level: &Level) -> &[Collider] {
        &level.colliders
    }

    /// Colliders inferred around carved floor.
    #[must_use]
    pub fn wall_colliders(level: &Level) -> &[Collider] {
        level.wall_colliders()
    }

    /// Colliders covering sentinel tiles.
    #[must_use]
    pub fn enemy_colliders(level: &Level) -> &[Collider] {
        &level.colliders[..level.enemy_collider_count]
    }

    /// World position where the target starts.
    #[must_use]
    pub fn spawn_point(level: &Level) -> Vector2 {
        level.spawn_point
    }

    /// World position of the secondary goal.
    #[must_use]
    pub fn goal_point(level: &Level) -> Vector2 {
        level.goal_point
    }

    /// Sight and cadence tuning shared by every sentinel.
    #[must_use]
    pub fn tuning(level: &Level) -> &SentinelTuning {
        &level.tuning
    }

    /// Captures a read-only view of the living sentinels.
    #[must_use]
    pub fn sentinel_view(level: &Level) -> SentinelView {
        SentinelView::from_snapshots(
            level
                .sentinels
                .iter()
                .map(|sentinel| sentinel.snapshot())
                .collect(),
        )
    }

    /// Captures the projectiles currently in flight.
    #[must_use]
    pub fn projectiles(level: &Level) -> Vec<ProjectileSnapshot> {
        level
            .projectiles
            .iter()
            .map(|projectile| projectile.snapshot())
            .collect()
    }

    /// Number of ticks processed since the level was created.
    #[must_use]
    pub fn tick_index(level: &Level) -> u64 {
        level.tick_index
    }

    /// Textual dump of the grid, one character per cell.
    #[must_use]
    pub fn grid_dump(level: &Level) -> String {
        level.grid.to_string()
    }
}
