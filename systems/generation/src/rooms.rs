//! Random placement of non-overlapping rooms.

use dungeon_sentinel_core::{TileKind, TilePos, TileRect, TileRectSize};
use dungeon_sentinel_world::TileGrid;
use rand::Rng;
use tracing::trace;

use crate::{GenerationError, GeneratorConfig};

/// Places randomly sized rooms inside the grid, keeping a one tile margin
/// from the outer edge so walls can always be inferred around them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomPlacer {
    columns: u32,
    rows: u32,
    min_size: u32,
    max_size: u32,
    max_attempts: u32,
}

impl RoomPlacer {
    /// Creates a placer for an already validated configuration.
    #[must_use]
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            columns: config.columns,
            rows: config.rows,
            min_size: config.min_room_size,
            max_size: config.max_room_size,
            max_attempts: config.max_placement_attempts,
        }
    }

    /// Generates `count` rooms and separates them until none overlap.
    ///
    /// Rooms keep their generation order, which later decides corridor order
    /// and the spawn and goal rooms.
    pub fn place<R: Rng + ?Sized>(
        &self,
        count: u32,
        rng: &mut R,
    ) -> Result<Vec<TileRect>, GenerationError> {
        let mut rooms: Vec<TileRect> = (0..count).map(|_| self.random_room(rng)).collect();
        self.resolve_overlaps(&mut rooms, rng)?;
        Ok(rooms)
    }

    /// Moves rooms, in index order, until no room overlaps another.
    ///
    /// Only positions are re-drawn, sizes stay fixed. Each room may be moved at
    /// most `max_attempts` times before placement gives up.
    pub fn resolve_overlaps<R: Rng + ?Sized>(
        &self,
        rooms: &mut [TileRect],
        rng: &mut R,
    ) -> Result<(), GenerationError> {
        for index in 0..rooms.len() {
            let mut attempts = 0;
            while overlaps_any(rooms, index) {
                if attempts == self.max_attempts {
                    return Err(GenerationError::PlacementExhausted {
                        room: index,
                        attempts,
                    });
                }
                attempts += 1;
                let origin = self.random_origin(rooms[index].size(), rng);
                rooms[index] = rooms[index].with_origin(origin);
            }

            if attempts > 0 {
                trace!(room = index, attempts, "moved overlapping room");
            }
        }
        Ok(())
    }

    /// Marks every tile covered by `rooms` as floor.
    pub fn carve(rooms: &[TileRect], grid: &mut TileGrid) {
        for room in rooms {
            for tile in room.tiles() {
                grid.set(tile, TileKind::Floor);
            }
        }
    }

    fn random_room<R: Rng + ?Sized>(&self, rng: &mut R) -> TileRect {
        let size = TileRectSize::new(
            rng.gen_range(self.min_size..=self.max_size),
            rng.gen_range(self.min_size..=self.max_size),
        );
        TileRect::from_origin_and_size(self.random_origin(size, rng), size)
    }

    fn random_origin<R: Rng + ?Sized>(&self, size: TileRectSize, rng: &mut R) -> TilePos {
        let max_column = self.columns - size.width() - 1;
        let max_row = self.rows - size.height() - 1;
        TilePos::new(rng.gen_range(1..=max_column), rng.gen_range(1..=max_row))
    }
}

fn overlaps_any(rooms: &[TileRect], index: usize) -> bool {
    let room = &rooms[index];
    rooms
        .iter()
        .enumerate()
        .any(|(other, candidate)| other != index && candidate.overlaps(room))
}
