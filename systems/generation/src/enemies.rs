//! Sentinel placement inside finished rooms.

use std::collections::HashSet;

use dungeon_sentinel_core::{
    Collider, ColliderKind, Health, SentinelTuning, TileKind, TilePos, TileRect,
};
use dungeon_sentinel_world::{SentinelSeed, TileGrid};
use rand::Rng;
use tracing::trace;

use crate::GeneratorConfig;

const ORTHOGONAL_OFFSETS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Sentinels and their blocking colliders produced by [`EnemyPlacer::place`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnemyPlacement {
    /// Sentinels in placement order.
    pub sentinels: Vec<SentinelSeed>,
    /// One collider per sentinel tile, in the same order.
    pub colliders: Vec<Collider>,
}

/// Scatters sentinels over room floors with a fixed per-tile probability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyPlacer {
    probability: f64,
    health: Health,
    tile_size: f32,
    tuning: SentinelTuning,
}

impl EnemyPlacer {
    /// Creates a placer for an already validated configuration.
    #[must_use]
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            probability: config.enemy_probability,
            health: Health::new(config.sentinel_health),
            tile_size: config.tile_size,
            tuning: config.sentinel,
        }
    }

    /// Visits every floor tile of every room except `spawn_room` and turns it
    /// into a sentinel tile with the configured probability.
    ///
    /// `reserved` is never occupied. A drawn tile is also skipped when
    /// occupying it would split the floor around it, so floor that was
    /// connected before placement stays connected through floor alone.
    pub fn place<R: Rng + ?Sized>(
        &self,
        rooms: &[TileRect],
        spawn_room: usize,
        reserved: TilePos,
        grid: &mut TileGrid,
        rng: &mut R,
    ) -> EnemyPlacement {
        let mut placement = EnemyPlacement::default();

        for (index, room) in rooms.iter().enumerate() {
            if index == spawn_room {
                continue;
            }

            for tile in room.tiles() {
                if tile == reserved || grid.kind(tile) != TileKind::Floor {
                    continue;
                }
                if !rng.gen_bool(self.probability) {
                    continue;
                }
                if !keeps_floor_connected(grid, tile) {
                    trace!(
                        column = tile.column(),
                        row = tile.row(),
                        "skipped sentinel on floor chokepoint"
                    );
                    continue;
                }

                grid.set(tile, TileKind::EnemySpawn);
                placement.colliders.push(Collider::new(
                    ColliderKind::EnemySpawn,
                    tile,
                    self.tile_size,
                ));
                placement.sentinels.push(SentinelSeed {
                    tile,
                    health: self.health,
                    threshold: self.tuning.draw_threshold(rng),
                });
            }
        }

        placement
    }
}

/// Reports whether the floor neighbours of `tile` still reach each other over
/// floor once `tile` itself stops being walkable.
fn keeps_floor_connected(grid: &TileGrid, tile: TilePos) -> bool {
    let neighbors = floor_neighbors(grid, tile);
    let Some((&first, rest)) = neighbors.split_first() else {
        return true;
    };

    let mut pending: HashSet<TilePos> = rest.iter().copied().collect();
    let mut seen = HashSet::from([tile, first]);
    let mut stack = vec![first];

    while let Some(current) = stack.pop() {
        let _ = pending.remove(&current);
        if pending.is_empty() {
            return true;
        }
        for next in floor_neighbors(grid, current) {
            if seen.insert(next) {
                stack.push(next);
            }
        }
    }

    false
}

fn floor_neighbors(grid: &TileGrid, tile: TilePos) -> Vec<TilePos> {
    ORTHOGONAL_OFFSETS
        .iter()
        .filter_map(|&(columns, rows)| tile.offset(columns, rows))
        .filter(|&neighbor| grid.get(neighbor) == Some(TileKind::Floor))
        .collect()
}
