//! L-shaped corridors linking consecutive rooms.

use dungeon_sentinel_core::{TileKind, TilePos, TileRect};
use dungeon_sentinel_world::TileGrid;

/// Elbow-shaped run of floor tiles carved between two rooms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Corridor {
    /// Edge tile of the source room where the first leg begins.
    pub start: TilePos,
    /// Tile where the first leg ends and the second begins.
    pub elbow: TilePos,
    /// Center tile of the destination room.
    pub end: TilePos,
}

/// Connects every room to its successor in placement order.
///
/// The resulting corridor graph is a simple path over the rooms rather than a
/// spanning tree over nearest neighbours.
#[derive(Clone, Copy, Debug, Default)]
pub struct CorridorCarver;

impl CorridorCarver {
    /// Carves one corridor per consecutive room pair and reports them in order.
    pub fn carve(rooms: &[TileRect], grid: &mut TileGrid) -> Vec<Corridor> {
        rooms
            .windows(2)
            .map(|pair| Self::connect(&pair[0], &pair[1], grid))
            .collect()
    }

    /// Computes the corridors [`CorridorCarver::carve`] would produce, without
    /// touching a grid.
    #[must_use]
    pub fn route(rooms: &[TileRect]) -> Vec<Corridor> {
        rooms
            .windows(2)
            .map(|pair| Self::plan(&pair[0], &pair[1]))
            .collect()
    }

    /// Carves a single corridor from `from` to the center of `to`.
    pub fn connect(from: &TileRect, to: &TileRect, grid: &mut TileGrid) -> Corridor {
        let corridor = Self::plan(from, to);
        carve_leg(grid, corridor.start, corridor.elbow);
        carve_leg(grid, corridor.elbow, corridor.end);
        corridor
    }

    /// Lays out the corridor from `from` to the center of `to`.
    ///
    /// When the rooms' centers are further apart horizontally than `from` is
    /// wide, the first leg leaves through the left or right edge of `from` on
    /// its center row; otherwise it leaves through the top or bottom edge on its
    /// center column. The second leg finishes on the other axis.
    #[must_use]
    pub fn plan(from: &TileRect, to: &TileRect) -> Corridor {
        let source = from.center();
        let target = to.center();
        let dx = i64::from(target.column()) - i64::from(source.column());
        let dy = i64::from(target.row()) - i64::from(source.row());

        let (start, elbow) = if dx.unsigned_abs() > u64::from(from.size().width()) {
            let column = if dx > 0 { from.right() } else { from.left() };
            (
                TilePos::new(column, source.row()),
                TilePos::new(target.column(), source.row()),
            )
        } else {
            let row = if dy > 0 { from.bottom() } else { from.top() };
            (
                TilePos::new(source.column(), row),
                TilePos::new(source.column(), target.row()),
            )
        };

        Corridor {
            start,
            elbow,
            end: target,
        }
    }
}

/// Carves the straight run between two tiles sharing a row or a column.
fn carve_leg(grid: &mut TileGrid, from: TilePos, to: TilePos) {
    if from.row() == to.row() {
        let row = from.row();
        for column in from.column().min(to.column())..=from.column().max(to.column()) {
            grid.set(TilePos::new(column, row), TileKind::Floor);
        }
    } else {
        let column = from.column();
        for row in from.row().min(to.row())..=from.row().max(to.row()) {
            grid.set(TilePos::new(column, row), TileKind::Floor);
        }
    }
}
