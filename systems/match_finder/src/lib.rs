#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Run scanning and flood-fill grouping of same-colored Normal tiles.

use std::collections::{BTreeMap, VecDeque};

use gem_cascade_core::{Board, CellCoord, MatchGroup, TileColor, MIN_RUN};

/// Finds every match group currently present on the board.
///
/// Rows are scanned left to right and columns top to bottom; every run of at
/// least [`MIN_RUN`] equal-colored Normal tiles marks its cells. Marked cells
/// are then grouped by a 4-neighbor flood fill restricted to marked cells of
/// the same color, so L, T and plus shapes collapse into a single group.
/// Groups are returned in row-major order of their first member.
#[must_use]
pub fn find_matches(board: &Board) -> Vec<MatchGroup> {
    let matched = mark_runs(board);
    let mut visited = vec![false; matched.len()];
    let mut groups = Vec::new();

    for start in board.coords() {
        let Some(index) = board.index(start) else {
            continue;
        };
        if !matched[index] || visited[index] {
            continue;
        }
        let Some(color) = color_at(board, start) else {
            continue;
        };

        visited[index] = true;
        let mut cells = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(cell) = queue.pop_front() {
            cells.push(cell);
            for neighbor in board.neighbors(cell) {
                let Some(next) = board.index(neighbor) else {
                    continue;
                };
                if matched[next] && !visited[next] && color_at(board, neighbor) == Some(color) {
                    visited[next] = true;
                    queue.push_back(neighbor);
                }
            }
        }

        groups.push(describe(color, cells));
    }

    groups
}

/// Reports whether the board holds at least one pending match.
#[must_use]
pub fn has_matches(board: &Board) -> bool {
    board.coords().any(|cell| forms_run(board, cell))
}

/// Reports whether the tile at `cell` sits in a horizontal or vertical run
/// of at least [`MIN_RUN`] equal-colored Normal tiles.
#[must_use]
pub fn forms_run(board: &Board, cell: CellCoord) -> bool {
    let Some(color) = color_at(board, cell) else {
        return false;
    };
    let horizontal = 1 + stretch(board, cell, color, 0, -1) + stretch(board, cell, color, 0, 1);
    let vertical = 1 + stretch(board, cell, color, -1, 0) + stretch(board, cell, color, 1, 0);
    horizontal >= MIN_RUN || vertical >= MIN_RUN
}

fn stretch(board: &Board, from: CellCoord, color: TileColor, rows: i32, columns: i32) -> u32 {
    let mut length = 0;
    let mut cursor = from;
    while let Some(next) = cursor.offset(rows, columns) {
        if color_at(board, next) != Some(color) {
            break;
        }
        length += 1;
        cursor = next;
    }
    length
}

fn color_at(board: &Board, cell: CellCoord) -> Option<TileColor> {
    board.tile(cell).and_then(|tile| tile.match_color())
}

fn mark_runs(board: &Board) -> Vec<bool> {
    let capacity = usize::try_from(board.rows() * board.columns()).unwrap_or(0);
    let mut matched = vec![false; capacity];
    for row in 0..board.rows() {
        mark_line(board, &board.row_cells(row), &mut matched);
    }
    for column in 0..board.columns() {
        mark_line(board, &board.column_cells(column), &mut matched);
    }
    matched
}

fn mark_line(board: &Board, line: &[CellCoord], matched: &mut [bool]) {
    let mut run: Vec<CellCoord> = Vec::new();
    let mut run_color = None;

    for &cell in line {
        let color = color_at(board, cell);
        if color.is_some() && color == run_color {
            run.push(cell);
            continue;
        }
        flush(board, &run, matched);
        run.clear();
        run_color = color;
        if color.is_some() {
            run.push(cell);
        }
    }
    flush(board, &run, matched);
}

fn flush(board: &Board, run: &[CellCoord], matched: &mut [bool]) {
    if run.len() < MIN_RUN as usize {
        return;
    }
    for cell in run {
        if let Some(index) = board.index(*cell) {
            matched[index] = true;
        }
    }
}

fn describe(color: TileColor, cells: Vec<CellCoord>) -> MatchGroup {
    let mut by_row: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    let mut by_column: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    for cell in &cells {
        by_row.entry(cell.row()).or_default().push(cell.column());
        by_column.entry(cell.column()).or_default().push(cell.row());
    }

    MatchGroup {
        color,
        rows: u32::try_from(by_row.len()).unwrap_or(u32::MAX),
        columns: u32::try_from(by_column.len()).unwrap_or(u32::MAX),
        longest_horizontal: by_row.into_values().map(longest_run).max().unwrap_or(0),
        longest_vertical: by_column.into_values().map(longest_run).max().unwrap_or(0),
        cells,
    }
}

fn longest_run(mut indices: Vec<u32>) -> u32 {
    indices.sort_unstable();
    let mut best = 0;
    let mut current = 0;
    let mut previous: Option<u32> = None;
    for index in indices {
        current = match previous {
            Some(last) if last + 1 == index => current + 1,
            _ => 1,
        };
        best = best.max(current);
        previous = Some(index);
    }
    best
}
