#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Area effects of special tiles and the direct-combo table.
//!
//! [`resolve`] expands a set of trigger cells to a fixed point: every live
//! special reached by the expansion fires its own area, which may reach more
//! specials. The final set is partitioned into cells that lose a lock, cells
//! that lose jelly and tiles that are removed. Obstacles next to a removed
//! tile break as a side effect. Nothing here mutates the board; the caller
//! applies the returned [`Blast`].

use std::collections::{BTreeSet, VecDeque};

use gem_cascade_core::{Axis, Board, CellCoord, Combo, TileColor, TileId, TileKind};
use rand::Rng;

/// Tiles with special treatment during one resolution step.
///
/// Protected tiles were created by the step itself and are never destroyed
/// or fired. Spent tiles are destroyed without firing their own effect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolutionScope {
    protected: BTreeSet<TileId>,
    spent: BTreeSet<TileId>,
}

impl ResolutionScope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shields a tile from this resolution step.
    pub fn protect(&mut self, tile: TileId) {
        let _ = self.protected.insert(tile);
    }

    /// Marks a tile as consumed without firing.
    pub fn spend(&mut self, tile: TileId) {
        let _ = self.spent.insert(tile);
    }

    /// Reports whether the tile is protected.
    #[must_use]
    pub fn is_protected(&self, tile: TileId) -> bool {
        self.protected.contains(&tile)
    }

    /// Reports whether the tile is spent.
    #[must_use]
    pub fn is_spent(&self, tile: TileId) -> bool {
        self.spent.contains(&tile)
    }
}

/// Final outcome of one resolution step, every list in row-major order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Blast {
    /// Cells whose tile is removed.
    pub destroyed: Vec<CellCoord>,
    /// Cells whose tile only loses its lock.
    pub unlocked: Vec<CellCoord>,
    /// Cells whose tile only loses its jelly.
    pub stripped: Vec<CellCoord>,
    /// Cells whose special tile fired its area effect.
    pub detonated: Vec<CellCoord>,
}

impl Blast {
    /// Reports whether the step changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.destroyed.is_empty() && self.unlocked.is_empty() && self.stripped.is_empty()
    }
}

/// In-place change of a tile's kind requested by a combo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Conversion {
    /// Cell whose tile changes.
    pub cell: CellCoord,
    /// New kind.
    pub kind: TileKind,
    /// Color the tile keeps.
    pub color: Option<TileColor>,
}

/// What a direct combo does before the regular expansion runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComboPlan {
    /// Cells handed to [`resolve`] as triggers. The two participants come first.
    pub triggers: Vec<CellCoord>,
    /// Tiles converted in place without being destroyed.
    pub conversions: Vec<Conversion>,
}

/// Expands the triggers to a fixed point and partitions the result.
#[must_use]
pub fn resolve(board: &Board, triggers: &[CellCoord], scope: &ResolutionScope) -> Blast {
    let mut reached = BTreeSet::new();
    let mut frontier = VecDeque::new();
    let mut detonated = Vec::new();

    for cell in triggers {
        if admit(board, *cell, scope) && reached.insert(*cell) {
            frontier.push_back(*cell);
        }
    }

    while let Some(cell) = frontier.pop_front() {
        let Some(tile) = board.tile(cell) else {
            continue;
        };
        if scope.is_spent(tile.id()) || !tile.is_bare() {
            continue;
        }
        let area = match tile.kind() {
            TileKind::Rocket(Axis::Horizontal) => board.row_cells(cell.row()),
            TileKind::Rocket(Axis::Vertical) => board.column_cells(cell.column()),
            TileKind::Bomb => board.area(cell, 1),
            TileKind::Magic => board
                .most_common_color()
                .map(|color| board.cells_of_color(color))
                .unwrap_or_default(),
            TileKind::Normal | TileKind::Wood | TileKind::Stone => continue,
        };
        detonated.push(cell);
        for target in area {
            if admit(board, target, scope) && reached.insert(target) {
                frontier.push_back(target);
            }
        }
    }

    let mut destroyed = BTreeSet::new();
    let mut unlocked = BTreeSet::new();
    let mut stripped = BTreeSet::new();
    for cell in reached {
        let Some(tile) = board.tile(cell) else {
            continue;
        };
        let _ = if tile.is_locked() {
            unlocked.insert(cell)
        } else if tile.jelly().is_some() {
            stripped.insert(cell)
        } else {
            destroyed.insert(cell)
        };
    }

    let mut broken = BTreeSet::new();
    for cell in &destroyed {
        for neighbor in board.neighbors(*cell) {
            if destroyed.contains(&neighbor) || unlocked.contains(&neighbor) {
                continue;
            }
            let Some(tile) = board.tile(neighbor) else {
                continue;
            };
            if scope.is_protected(tile.id()) {
                continue;
            }
            if tile.kind() == TileKind::Wood {
                let _ = broken.insert(neighbor);
            } else if tile.jelly().is_some() {
                let _ = stripped.insert(neighbor);
            }
        }
    }
    destroyed.extend(broken);
    detonated.sort_unstable();

    let blast = Blast {
        destroyed: destroyed.into_iter().collect(),
        unlocked: unlocked.into_iter().collect(),
        stripped: stripped.into_iter().collect(),
        detonated,
    };
    tracing::trace!(
        triggers = triggers.len(),
        destroyed = blast.destroyed.len(),
        unlocked = blast.unlocked.len(),
        stripped = blast.stripped.len(),
        detonated = blast.detonated.len(),
        "resolved blast"
    );
    blast
}

/// Plans a direct combo between the tile at `primary` and the tile at
/// `partner`. Areas are centered on `primary`.
pub fn plan_combo<R>(
    board: &Board,
    combo: Combo,
    primary: CellCoord,
    partner: CellCoord,
    rng: &mut R,
) -> ComboPlan
where
    R: Rng + ?Sized,
{
    let mut plan = ComboPlan {
        triggers: vec![primary, partner],
        conversions: Vec::new(),
    };

    match combo {
        Combo::DoubleMagic => plan.triggers.extend(board.coords()),
        Combo::MagicColor { color } => plan.triggers.extend(board.cells_of_color(color)),
        Combo::MagicBomb { color } => {
            plan.conversions.extend(
                converted_cells(board, color, primary, partner).map(|cell| Conversion {
                    cell,
                    kind: TileKind::Bomb,
                    color: Some(color),
                }),
            );
        }
        Combo::MagicRocket { color } => {
            for cell in converted_cells(board, color, primary, partner) {
                let axis = if rng.gen_bool(0.5) {
                    Axis::Horizontal
                } else {
                    Axis::Vertical
                };
                plan.conversions.push(Conversion {
                    cell,
                    kind: TileKind::Rocket(axis),
                    color: Some(color),
                });
            }
        }
        Combo::DoubleBomb => plan.triggers.extend(board.area(primary, 2)),
        Combo::BombRocket => {
            for offset in -1..=1 {
                plan.triggers.extend(band(board, primary, offset));
            }
        }
        Combo::DoubleRocket => {
            plan.triggers.extend(board.row_cells(primary.row()));
            plan.triggers.extend(board.column_cells(primary.column()));
        }
    }

    tracing::trace!(
        ?combo,
        %primary,
        triggers = plan.triggers.len(),
        conversions = plan.conversions.len(),
        "planned combo"
    );
    plan
}

fn band(board: &Board, primary: CellCoord, offset: i32) -> Vec<CellCoord> {
    let mut cells = Vec::new();
    if let Some(row) = primary.offset(offset, 0) {
        if row.row() < board.rows() {
            cells.extend(board.row_cells(row.row()));
        }
    }
    if let Some(column) = primary.offset(0, offset) {
        if column.column() < board.columns() {
            cells.extend(board.column_cells(column.column()));
        }
    }
    cells
}

fn converted_cells(
    board: &Board,
    color: TileColor,
    primary: CellCoord,
    partner: CellCoord,
) -> impl Iterator<Item = CellCoord> {
    board
        .cells_of_color(color)
        .into_iter()
        .filter(move |cell| *cell != primary && *cell != partner)
}

fn admit(board: &Board, cell: CellCoord, scope: &ResolutionScope) -> bool {
    board
        .tile(cell)
        .is_some_and(|tile| tile.kind() != TileKind::Stone && !scope.is_protected(tile.id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_tracks_protected_and_spent_tiles() {
        let mut scope = ResolutionScope::new();
        scope.protect(TileId::new(3));
        scope.spend(TileId::new(4));
        assert!(scope.is_protected(TileId::new(3)));
        assert!(!scope.is_protected(TileId::new(4)));
        assert!(scope.is_spent(TileId::new(4)));
    }

    #[test]
    fn empty_blast_reports_empty() {
        assert!(Blast::default().is_empty());
    }
}
