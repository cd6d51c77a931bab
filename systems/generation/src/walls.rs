//! Wall inference around carved floor.

use dungeon_sentinel_core::{Collider, ColliderKind, TileKind, TilePos};
use dungeon_sentinel_world::TileGrid;

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Surrounds every carved tile with walls and emits their colliders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallInferencer {
    tile_size: f32,
}

impl WallInferencer {
    /// Creates an inferencer emitting colliders for tiles of `tile_size` world units.
    #[must_use]
    pub const fn new(tile_size: f32) -> Self {
        Self { tile_size }
    }

    /// Converts every empty tile 8-adjacent to a floor or sentinel tile into a
    /// wall, returning one collider per new wall in row-major discovery order.
    ///
    /// Only interior tiles are used as sources, so every neighbour visited is
    /// inside the grid. Walls never act as sources, which keeps the result
    /// independent of traversal order.
    pub fn infer(&self, grid: &mut TileGrid) -> Vec<Collider> {
        let mut colliders = Vec::new();
        if grid.columns() < 3 || grid.rows() < 3 {
            return colliders;
        }

        for row in 1..grid.rows() - 1 {
            for column in 1..grid.columns() - 1 {
                let tile = TilePos::new(column, row);
                if !grid.kind(tile).is_carved() {
                    continue;
                }

                for (columns, rows) in NEIGHBOR_OFFSETS {
                    let Some(neighbor) = tile.offset(columns, rows) else {
                        continue;
                    };
                    if grid.get(neighbor) != Some(TileKind::Empty) {
                        continue;
                    }

                    grid.set(neighbor, TileKind::Wall);
                    colliders.push(Collider::new(ColliderKind::Wall, neighbor, self.tile_size));
                }
            }
        }

        colliders
    }
}
