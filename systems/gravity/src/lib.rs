#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Refills empty cells by letting tiles fall and spawning new ones at the top.

use std::collections::BTreeSet;

use gem_cascade_core::{Board, CellCoord, TileColor, TileId, TileKind};
use rand::Rng;

/// Single change made by the gravity engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GravityMove {
    /// An existing tile dropped into a lower cell.
    Fall {
        /// Identifier of the moving tile.
        tile: TileId,
        /// Cell the tile left.
        from: CellCoord,
        /// Cell the tile entered.
        to: CellCoord,
    },
    /// A new Normal tile entered the board from above.
    Spawn {
        /// Identifier of the new tile.
        tile: TileId,
        /// Top-row cell the tile entered.
        cell: CellCoord,
        /// Color of the new tile.
        color: TileColor,
    },
}

/// Every move performed while settling, in application order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settlement {
    /// Applied moves.
    pub moves: Vec<GravityMove>,
    /// Passes that produced at least one move.
    pub passes: u32,
}

/// Runs gravity passes until one produces no move.
///
/// `colors` is the palette size used for spawned tiles.
///
/// A hole takes at most one tile per pass and a claimed tile leaves its own
/// hole for the next pass, so a column can need up to `2 * rows` passes
/// rather than `rows`.
pub fn settle<R>(board: &mut Board, colors: u8, rng: &mut R) -> Settlement
where
    R: Rng + ?Sized,
{
    let mut settlement = Settlement::default();
    let limit = pass_limit(board);

    loop {
        let moves = pass(board, colors, rng);
        if moves.is_empty() {
            break;
        }
        settlement.moves.extend(moves);
        settlement.passes += 1;
        if settlement.passes >= limit {
            tracing::warn!(passes = settlement.passes, "gravity did not settle");
            break;
        }
    }

    tracing::trace!(
        passes = settlement.passes,
        moves = settlement.moves.len(),
        "gravity settled"
    );
    settlement
}

/// Runs a single gravity pass.
///
/// Empty cells are serviced top to bottom, then left to right, and every
/// move is applied immediately. A tile moves at most once per pass.
pub fn pass<R>(board: &mut Board, colors: u8, rng: &mut R) -> Vec<GravityMove>
where
    R: Rng + ?Sized,
{
    let mut claimed = BTreeSet::new();
    let mut moves = Vec::new();
    let cells: Vec<CellCoord> = board.coords().collect();

    for cell in cells {
        if !board.is_empty(cell) {
            continue;
        }

        let Some(above) = cell.offset(-1, 0) else {
            let color = TileColor::new(rng.gen_range(0..colors.max(1)));
            if let Some(tile) = board.spawn(cell, TileKind::Normal, Some(color)) {
                let _ = claimed.insert(tile);
                moves.push(GravityMove::Spawn { tile, cell, color });
            }
            continue;
        };

        let source = match board.tile(above) {
            Some(tile) if tile.is_movable() => {
                if claimed.contains(&tile.id()) {
                    None
                } else {
                    Some(above)
                }
            }
            Some(_) | None => diagonal_source(board, cell, &claimed),
        };

        let Some(source) = source else {
            continue;
        };
        let Some(tile) = board.tile(source).map(|tile| tile.id()) else {
            continue;
        };
        if board.move_tile(source, cell) {
            let _ = claimed.insert(tile);
            moves.push(GravityMove::Fall {
                tile,
                from: source,
                to: cell,
            });
        }
    }

    moves
}

fn diagonal_source(
    board: &Board,
    cell: CellCoord,
    claimed: &BTreeSet<TileId>,
) -> Option<CellCoord> {
    [-1, 1].into_iter().find_map(|columns| {
        let source = cell.offset(-1, columns)?;
        let tile = board.tile(source)?;
        if !tile.is_movable() || claimed.contains(&tile.id()) {
            return None;
        }
        // A tile that can still drop straight down does not slide.
        let beneath = source.offset(1, 0)?;
        if board.is_empty(beneath) {
            return None;
        }
        Some(source)
    })
}

fn pass_limit(board: &Board) -> u32 {
    board
        .rows()
        .saturating_mul(board.columns())
        .saturating_add(board.rows())
        .max(1)
        .saturating_mul(2)
}
