//! Dense tile storage backing a level.

use std::fmt::{self, Write as _};

use dungeon_sentinel_core::{TileKind, TilePos};

/// Fixed-size grid of tile kinds addressed by column and row.
///
/// The grid performs no interpretation of its contents. Positions outside the
/// configured dimensions are programming errors: [`TileGrid::get`] reports them
/// as `None`, while [`TileGrid::kind`] and [`TileGrid::set`] panic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    tiles: Vec<TileKind>,
}

impl TileGrid {
    /// Creates a grid of the given dimensions filled with [`TileKind::Empty`].
    ///
    /// # Panics
    ///
    /// Panics when the cell count does not fit in `usize`.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let cells = u64::from(columns) * u64::from(rows);
        let Ok(capacity) = usize::try_from(cells) else {
            panic!(
                "a {columns}x{rows} grid holds {cells} cells, more than this platform can address"
            );
        };
        Self {
            columns,
            rows,
            tiles: vec![TileKind::Empty; capacity],
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether `tile` addresses a cell of this grid.
    #[must_use]
    pub const fn contains(&self, tile: TilePos) -> bool {
        tile.column() < self.columns && tile.row() < self.rows
    }

    /// Returns the kind stored at `tile`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, tile: TilePos) -> Option<TileKind> {
        self.index(tile)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Returns the kind stored at `tile`.
    ///
    /// # Panics
    ///
    /// Panics when `tile` lies outside the grid.
    #[must_use]
    pub fn kind(&self, tile: TilePos) -> TileKind {
        self.tiles[self.checked_index(tile)]
    }

    /// Overwrites the kind stored at `tile`.
    ///
    /// # Panics
    ///
    /// Panics when `tile` lies outside the grid.
    pub fn set(&mut self, tile: TilePos, kind: TileKind) {
        let index = self.checked_index(tile);
        self.tiles[index] = kind;
    }

    /// Iterates over every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TilePos, TileKind)> + '_ {
        let columns = self.columns.max(1);
        self.tiles.iter().enumerate().map(move |(index, kind)| {
            let index = index as u32;
            (TilePos::new(index % columns, index / columns), *kind)
        })
    }

    /// Counts the cells holding `kind`.
    #[must_use]
    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|tile| **tile == kind).count()
    }

    fn index(&self, tile: TilePos) -> Option<usize> {
        if !self.contains(tile) {
            return None;
        }

        let row = usize::try_from(tile.row()).ok()?;
        let column = usize::try_from(tile.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }

    fn checked_index(&self, tile: TilePos) -> usize {
        match self.index(tile) {
            Some(index) => index,
            None => panic!(
                "tile ({}, {}) lies outside the {}x{} grid",
                tile.column(),
                tile.row(),
                self.columns,
                self.rows
            ),
        }
    }
}

/// Character used for `kind` in the textual dump.
#[must_use]
pub fn glyph(kind: TileKind) -> char {
    match kind {
        TileKind::Floor => '.',
        TileKind::Empty => ' ',
        other => char::from(b'0' + other.code()),
    }
}

impl fmt::Display for TileGrid {
    /// Writes one character per cell, row-major, each row terminated by a newline.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(width) = usize::try_from(self.columns) else {
            return Ok(());
        };
        if width == 0 {
            return Ok(());
        }

        for row in self.tiles.chunks(width) {
            for kind in row {
                f.write_char(glyph(*kind))?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_matches_dimensions() {
        let grid = TileGrid::new(7, 5);
        assert_eq!(grid.iter().count(), 35);
        assert_eq!(grid.iter().last(), Some((TilePos::new(6, 4), TileKind::Empty)));
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    #[should_panic(expected = "more than this platform can address")]
    fn oversized_grid_panics() {
        let _ = TileGrid::new(u32::MAX, u32::MAX);
    }

    #[test]
    fn new_grid_is_empty() {
        let grid = TileGrid::new(4, 3);
        assert_eq!(grid.count(TileKind::Empty), 12);
        assert_eq!(grid.get(TilePos::new(3, 2)), Some(TileKind::Empty));
        assert_eq!(grid.get(TilePos::new(4, 0)), None);
        assert_eq!(grid.get(TilePos::new(0, 3)), None);
    }

    #[test]
    fn set_then_read_back() {
        let mut grid = TileGrid::new(5, 5);
        grid.set(TilePos::new(2, 4), TileKind::Wall);
        assert_eq!(grid.kind(TilePos::new(2, 4)), TileKind::Wall);
        assert_eq!(grid.count(TileKind::Wall), 1);
    }

    #[test]
    #[should_panic(expected = "outside the 5x5 grid")]
    fn out_of_range_write_panics() {
        let mut grid = TileGrid::new(5, 5);
        grid.set(TilePos::new(5, 0), TileKind::Floor);
    }

    #[test]
    fn iteration_is_row_major() {
        let grid = TileGrid::new(3, 2);
        let tiles: Vec<_> = grid.iter().map(|(tile, _)| tile).collect();
        assert_eq!(tiles[0], TilePos::new(0, 0));
        assert_eq!(tiles[2], TilePos::new(2, 0));
        assert_eq!(tiles[3], TilePos::new(0, 1));
        assert_eq!(tiles.len(), 6);
    }

    #[test]
    fn dump_uses_markers_and_codes() {
        let mut grid = TileGrid::new(4, 2);
        grid.set(TilePos::new(0, 0), TileKind::Wall);
        grid.set(TilePos::new(1, 0), TileKind::Floor);
        grid.set(TilePos::new(2, 0), TileKind::EnemySpawn);
        assert_eq!(grid.to_string(), "2.3 \n    \n");
    }
}
