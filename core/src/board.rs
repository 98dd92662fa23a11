use std::collections::{BTreeMap, BTreeSet};

use crate::{CellCoord, Jelly, TileColor, TileId, TileKind};

/// The atomic game entity occupying a board cell.
///
/// Tiles are owned by the cell that holds them; the stored position is kept
/// in sync by every [`Board`] primitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    id: TileId,
    kind: TileKind,
    color: Option<TileColor>,
    locked: bool,
    jelly: Option<Jelly>,
    position: CellCoord,
}

impl Tile {
    /// Identifier assigned by the board when the tile was spawned.
    #[must_use]
    pub const fn id(&self) -> TileId {
        self.id
    }

    /// Base kind of the tile.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Palette color, absent for Magic tiles and obstacles.
    #[must_use]
    pub const fn color(&self) -> Option<TileColor> {
        self.color
    }

    /// Reports whether a lock modifier pins the tile in place.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Jelly coating on the tile, if any.
    #[must_use]
    pub const fn jelly(&self) -> Option<Jelly> {
        self.jelly
    }

    /// Cell currently holding the tile.
    #[must_use]
    pub const fn position(&self) -> CellCoord {
        self.position
    }

    /// Reports whether the tile takes part in color-run matching.
    #[must_use]
    pub fn is_matchable(&self) -> bool {
        self.kind == TileKind::Normal
    }

    /// Reports whether the tile can be swapped by the player or flow under
    /// gravity.
    #[must_use]
    pub fn is_movable(&self) -> bool {
        !self.locked && self.jelly.is_none() && !self.kind.is_obstacle()
    }

    /// Reports whether the tile is a Rocket, Bomb or Magic tile.
    #[must_use]
    pub const fn is_special(&self) -> bool {
        self.kind.is_special()
    }

    /// Color used for matching, present only for Normal tiles.
    #[must_use]
    pub fn match_color(&self) -> Option<TileColor> {
        if self.is_matchable() {
            self.color
        } else {
            None
        }
    }

    /// Reports whether the tile is free of lock and jelly modifiers.
    #[must_use]
    pub const fn is_bare(&self) -> bool {
        !self.locked && self.jelly.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Cell {
    tile: Option<Tile>,
    ice: bool,
}

/// Fixed `rows × columns` grid of cells, each holding at most one tile.
///
/// Cells live in a flat row-major array (`row * columns + column`), so
/// neighborhood queries are index arithmetic rather than stored links. The
/// board enforces no game rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    rows: u32,
    columns: u32,
    cells: Vec<Cell>,
    next_id: u32,
}

impl Board {
    /// Creates an empty board with the provided dimensions.
    #[must_use]
    pub fn new(rows: u32, columns: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            rows,
            columns,
            cells: vec![Cell::default(); capacity],
            next_id: 0,
        }
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Flat row-major index of the cell, or `None` when outside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Every cell of the grid in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = CellCoord> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |column| CellCoord::new(row, column)))
    }

    /// Tile occupying the cell, if any.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<&Tile> {
        self.index(cell)
            .and_then(|index| self.cells.get(index))
            .and_then(|slot| slot.tile.as_ref())
    }

    /// Every live tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter().filter_map(|slot| slot.tile.as_ref())
    }

    /// Reports whether the cell is inside the grid and holds no tile.
    #[must_use]
    pub fn is_empty(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index))
            .map_or(false, |slot| slot.tile.is_none())
    }

    /// Cells that hold no tile, in row-major order.
    #[must_use]
    pub fn empty_cells(&self) -> Vec<CellCoord> {
        self.coords().filter(|cell| self.is_empty(*cell)).collect()
    }

    /// Cells whose tile is movable, in row-major order.
    #[must_use]
    pub fn movable_cells(&self) -> Vec<CellCoord> {
        self.tiles()
            .filter(|tile| tile.is_movable())
            .map(Tile::position)
            .collect()
    }

    /// Reports whether an ice layer covers the cell.
    #[must_use]
    pub fn has_ice(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index))
            .map_or(false, |slot| slot.ice)
    }

    /// Adds or removes the ice layer of a cell.
    pub fn set_ice(&mut self, cell: CellCoord, ice: bool) {
        if let Some(slot) = self.slot_mut(cell) {
            slot.ice = ice;
        }
    }

    /// Removes the ice layer of a cell, reporting whether there was one.
    pub fn crack_ice(&mut self, cell: CellCoord) -> bool {
        self.slot_mut(cell)
            .map_or(false, |slot| std::mem::replace(&mut slot.ice, false))
    }

    /// Creates a new unmodified tile in an empty cell.
    ///
    /// Returns `None` when the cell is outside the grid or already occupied.
    pub fn spawn(
        &mut self,
        cell: CellCoord,
        kind: TileKind,
        color: Option<TileColor>,
    ) -> Option<TileId> {
        let id = TileId::new(self.next_id);
        let slot = self.slot_mut(cell)?;
        if slot.tile.is_some() {
            return None;
        }
        slot.tile = Some(Tile {
            id,
            kind,
            color,
            locked: false,
            jelly: None,
            position: cell,
        });
        self.next_id = self.next_id.wrapping_add(1);
        Some(id)
    }

    /// Detaches the tile occupying the cell.
    pub fn remove(&mut self, cell: CellCoord) -> Option<Tile> {
        self.slot_mut(cell).and_then(|slot| slot.tile.take())
    }

    /// Places a previously detached tile into an empty cell, updating its
    /// stored position. The tile is handed back when the cell is unavailable.
    pub fn put(&mut self, cell: CellCoord, mut tile: Tile) -> Result<(), Tile> {
        let Some(slot) = self.slot_mut(cell) else {
            return Err(tile);
        };
        if slot.tile.is_some() {
            return Err(tile);
        }
        tile.position = cell;
        slot.tile = Some(tile);
        Ok(())
    }

    /// Moves the tile at `from` into the empty cell `to`.
    pub fn move_tile(&mut self, from: CellCoord, to: CellCoord) -> bool {
        if from == to || !self.is_empty(to) {
            return false;
        }
        let Some(tile) = self.remove(from) else {
            return false;
        };
        match self.put(to, tile) {
            Ok(()) => true,
            Err(tile) => {
                let _ = self.put(from, tile);
                false
            }
        }
    }

    /// Exchanges the contents of two cells. Ice layers stay with their cells.
    pub fn swap(&mut self, first: CellCoord, second: CellCoord) -> bool {
        let (Some(first_index), Some(second_index)) = (self.index(first), self.index(second))
        else {
            return false;
        };
        if first_index == second_index {
            return false;
        }

        let first_tile = self.cells[first_index].tile.take();
        let second_tile = self.cells[second_index].tile.take();
        self.cells[first_index].tile = second_tile.map(|mut tile| {
            tile.position = first;
            tile
        });
        self.cells[second_index].tile = first_tile.map(|mut tile| {
            tile.position = second;
            tile
        });
        true
    }

    /// Overwrites the kind and color of the tile in place, keeping its
    /// identity and modifiers.
    pub fn transform(&mut self, cell: CellCoord, kind: TileKind, color: Option<TileColor>) -> bool {
        match self.tile_mut(cell) {
            Some(tile) => {
                tile.kind = kind;
                tile.color = color;
                true
            }
            None => false,
        }
    }

    /// Sets or clears the lock modifier of the tile in the cell.
    pub fn set_locked(&mut self, cell: CellCoord, locked: bool) {
        if let Some(tile) = self.tile_mut(cell) {
            tile.locked = locked;
        }
    }

    /// Sets or clears the jelly coating of the tile in the cell.
    pub fn set_jelly(&mut self, cell: CellCoord, jelly: Option<Jelly>) {
        if let Some(tile) = self.tile_mut(cell) {
            tile.jelly = jelly;
        }
    }

    /// Removes the lock of the tile in the cell, reporting whether it had one.
    pub fn unlock(&mut self, cell: CellCoord) -> bool {
        self.tile_mut(cell)
            .map_or(false, |tile| std::mem::replace(&mut tile.locked, false))
    }

    /// Removes the jelly of the tile in the cell, returning the removed variant.
    pub fn strip_jelly(&mut self, cell: CellCoord) -> Option<Jelly> {
        self.tile_mut(cell).and_then(|tile| tile.jelly.take())
    }

    /// Edge neighbors inside the grid, in row-major order.
    #[must_use]
    pub fn neighbors(&self, cell: CellCoord) -> Vec<CellCoord> {
        [(-1, 0), (0, -1), (0, 1), (1, 0)]
            .into_iter()
            .filter_map(|(rows, columns)| cell.offset(rows, columns))
            .filter(|neighbor| self.contains(*neighbor))
            .collect()
    }

    /// Cells within Chebyshev distance `radius` of the center, center included,
    /// in row-major order.
    #[must_use]
    pub fn area(&self, center: CellCoord, radius: u32) -> Vec<CellCoord> {
        let top = center.row().saturating_sub(radius);
        let bottom = center.row().saturating_add(radius).min(self.rows.saturating_sub(1));
        let left = center.column().saturating_sub(radius);
        let right = center
            .column()
            .saturating_add(radius)
            .min(self.columns.saturating_sub(1));
        if !self.contains(center) {
            return Vec::new();
        }
        (top..=bottom)
            .flat_map(|row| (left..=right).map(move |column| CellCoord::new(row, column)))
            .collect()
    }

    /// Every cell of the row, left to right.
    #[must_use]
    pub fn row_cells(&self, row: u32) -> Vec<CellCoord> {
        if row >= self.rows {
            return Vec::new();
        }
        (0..self.columns)
            .map(|column| CellCoord::new(row, column))
            .collect()
    }

    /// Every cell of the column, top to bottom.
    #[must_use]
    pub fn column_cells(&self, column: u32) -> Vec<CellCoord> {
        if column >= self.columns {
            return Vec::new();
        }
        (0..self.rows)
            .map(|row| CellCoord::new(row, column))
            .collect()
    }

    /// Cells holding a Normal tile of the provided color, in row-major order.
    #[must_use]
    pub fn cells_of_color(&self, color: TileColor) -> Vec<CellCoord> {
        self.tiles()
            .filter(|tile| tile.match_color() == Some(color))
            .map(Tile::position)
            .collect()
    }

    /// Most frequent color among live Normal tiles, ties resolved toward the
    /// lowest palette index. Computed fresh on every call.
    #[must_use]
    pub fn most_common_color(&self) -> Option<TileColor> {
        let mut counts: BTreeMap<TileColor, usize> = BTreeMap::new();
        for color in self.tiles().filter_map(Tile::match_color) {
            *counts.entry(color).or_insert(0) += 1;
        }

        let mut best: Option<(TileColor, usize)> = None;
        for (color, count) in counts {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((color, count));
            }
        }
        best.map(|(color, _)| color)
    }

    /// Number of live tiles of the provided kind.
    #[must_use]
    pub fn count_kind(&self, kind: TileKind) -> usize {
        self.tiles().filter(|tile| tile.kind == kind).count()
    }

    /// Checks that every live tile's stored position matches the cell holding
    /// it and that no tile identity appears twice.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let mut seen = BTreeSet::new();
        for (cell, slot) in self.coords().zip(self.cells.iter()) {
            if let Some(tile) = &slot.tile {
                if tile.position != cell || !seen.insert(tile.id) {
                    return false;
                }
            }
        }
        true
    }

    fn slot_mut(&mut self, cell: CellCoord) -> Option<&mut Cell> {
        let index = self.index(cell)?;
        self.cells.get_mut(index)
    }

    fn tile_mut(&mut self, cell: CellCoord) -> Option<&mut Tile> {
        self.slot_mut(cell).and_then(|slot| slot.tile.as_mut())
    }
}
