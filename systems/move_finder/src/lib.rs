#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Search for swaps that would produce a match or a direct combo.

use gem_cascade_core::{Board, Combo, SwapMove};
use gem_cascade_system_match_finder::forms_run;

/// Returns the first productive swap in row-major order, if any.
///
/// Each cell is paired with its right neighbor and then its lower neighbor.
/// The board itself is never mutated; swaps are tried on a scratch copy.
#[must_use]
pub fn find_move(board: &Board) -> Option<SwapMove> {
    let mut scratch = board.clone();
    candidates(board).find(|swap| productive_on(&mut scratch, *swap))
}

/// Every productive swap on the board, in the order [`find_move`] visits them.
#[must_use]
pub fn legal_moves(board: &Board) -> Vec<SwapMove> {
    let mut scratch = board.clone();
    candidates(board)
        .filter(|swap| productive_on(&mut scratch, *swap))
        .collect()
}

/// Reports whether a single swap would produce a match or a combo.
///
/// Non-adjacent pairs and pairs involving an immovable or missing tile are
/// never productive.
#[must_use]
pub fn is_productive(board: &Board, swap: SwapMove) -> bool {
    if !swap.from.is_adjacent(swap.to) {
        return false;
    }
    let mut scratch = board.clone();
    productive_on(&mut scratch, swap)
}

fn candidates(board: &Board) -> impl Iterator<Item = SwapMove> + '_ {
    board.coords().flat_map(move |cell| {
        [(0, 1), (1, 0)]
            .into_iter()
            .filter_map(move |(rows, columns)| cell.offset(rows, columns))
            .filter(move |neighbor| board.contains(*neighbor))
            .map(move |neighbor| SwapMove::new(cell, neighbor))
    })
}

fn productive_on(scratch: &mut Board, swap: SwapMove) -> bool {
    let (Some(first), Some(second)) = (scratch.tile(swap.from), scratch.tile(swap.to)) else {
        return false;
    };
    if !first.is_movable() || !second.is_movable() {
        return false;
    }
    if Combo::classify(first, second).is_some() {
        return true;
    }

    let _ = scratch.swap(swap.from, swap.to);
    let productive = forms_run(scratch, swap.from) || forms_run(scratch, swap.to);
    let _ = scratch.swap(swap.from, swap.to);
    productive
}
