use gem_cascade_core::{Board, CellCoord, Layout, TileColor};
use gem_cascade_system_match_finder::{find_matches, forms_run, has_matches};

fn board(text: &str) -> Board {
    Layout::parse(text)
        .expect("layout parses")
        .build(|_, _| TileColor::new(0))
}

#[test]
fn finds_single_horizontal_run() {
    let board = board(
        "1 1 1 2
         2 3 2 3
         3 2 3 2",
    );
    let groups = find_matches(&board);
    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.color, TileColor::new(1));
    assert_eq!(
        group.cells,
        vec![
            CellCoord::new(0, 0),
            CellCoord::new(0, 1),
            CellCoord::new(0, 2),
        ]
    );
    assert_eq!(group.rows, 1);
    assert_eq!(group.columns, 3);
    assert_eq!(group.longest_horizontal, 3);
    assert_eq!(group.longest_vertical, 1);
}

#[test]
fn l_shape_collapses_into_one_group() {
    let board = board(
        "0 1 2 3
         0 2 3 1
         0 0 0 2",
    );
    let groups = find_matches(&board);
    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.len(), 5);
    assert_eq!(group.rows, 3);
    assert_eq!(group.columns, 3);
    assert_eq!(group.longest_horizontal, 3);
    assert_eq!(group.longest_vertical, 3);
    assert_eq!(group.middle(), Some(CellCoord::new(2, 0)));
}

#[test]
fn obstacles_specials_and_gaps_terminate_runs() {
    let board = board(
        "1 1 W 1 1
         2 2 H3 2 2
         3 3 _ 3 3
         4 4 3 4 4",
    );
    assert!(find_matches(&board).is_empty());
    assert!(!has_matches(&board));
}

#[test]
fn same_color_runs_that_do_not_touch_stay_separate() {
    let board = board(
        "2 2 2 1 2 2 2
         1 3 1 3 1 3 1",
    );
    let groups = find_matches(&board);
    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|group| group.len() == 3));
    assert!(groups[0].contains(CellCoord::new(0, 0)));
    assert!(groups[1].contains(CellCoord::new(0, 6)));
}

#[test]
fn adjacent_non_run_tiles_are_not_absorbed() {
    let board = board(
        "1 1 1
         1 2 3
         2 3 2",
    );
    let groups = find_matches(&board);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);
    assert!(!groups[0].contains(CellCoord::new(1, 0)));
}

#[test]
fn locked_and_jellied_tiles_still_match() {
    let board = board(
        "1l 1a 1b
         2  3  2",
    );
    let groups = find_matches(&board);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);
}

#[test]
fn matching_a_stable_board_twice_is_empty_both_times() {
    let board = board(
        "0 1 2 0
         1 2 0 1
         2 0 1 2",
    );
    assert!(find_matches(&board).is_empty());
    assert!(find_matches(&board).is_empty());
}

#[test]
fn forms_run_checks_both_axes_through_the_cell() {
    let board = board(
        "0 4 2
         0 3 1
         0 3 3",
    );
    assert!(forms_run(&board, CellCoord::new(1, 0)));
    assert!(!forms_run(&board, CellCoord::new(1, 1)));
    assert!(!forms_run(&board, CellCoord::new(2, 2)));
    assert!(has_matches(&board));
}
