use gem_cascade_core::{Board, CellCoord, Layout, TileColor, TileKind};
use gem_cascade_system_match_finder::find_matches;
use gem_cascade_system_synthesis::{SpecialSpawn, SpecialSynthesizer};

fn board(text: &str) -> Board {
    Layout::parse(text)
        .expect("layout parses")
        .build(|_, _| TileColor::new(0))
}

#[test]
fn four_run_creates_rocket_under_the_swapped_tile() {
    let board = board(
        "1 1 1 1
         2 3 2 3",
    );
    let groups = find_matches(&board);
    let plans = SpecialSynthesizer::new().plan(&groups, &[CellCoord::new(0, 1)]);

    assert_eq!(plans.len(), 1);
    assert_eq!(
        plans[0].spawn,
        Some(SpecialSpawn {
            cell: CellCoord::new(0, 1),
            kind: TileKind::ROCKET_H,
            color: Some(TileColor::new(1)),
        })
    );
    assert_eq!(
        plans[0].consumed,
        vec![
            CellCoord::new(0, 0),
            CellCoord::new(0, 2),
            CellCoord::new(0, 3),
        ]
    );
}

#[test]
fn vertical_run_without_swap_uses_middle_member() {
    let board = board(
        "1 2
         1 3
         1 2
         1 3",
    );
    let groups = find_matches(&board);
    let plans = SpecialSynthesizer::new().plan(&groups, &[]);
    let spawn = plans[0].spawn.expect("rocket spawn");
    assert_eq!(spawn.cell, CellCoord::new(2, 0));
    assert_eq!(spawn.kind, TileKind::ROCKET_V);
    assert_eq!(plans[0].consumed.len(), 3);
}

#[test]
fn five_run_creates_colorless_magic() {
    let board = board(
        "2 2 2 2 2
         1 3 1 3 1",
    );
    let plans = SpecialSynthesizer::new().plan(&find_matches(&board), &[]);
    assert_eq!(
        plans[0].spawn,
        Some(SpecialSpawn {
            cell: CellCoord::new(0, 2),
            kind: TileKind::Magic,
            color: None,
        })
    );
}

#[test]
fn t_shape_creates_bomb_at_the_swapped_cell() {
    let board = board(
        "1 1 1
         2 1 3
         3 1 2",
    );
    let groups = find_matches(&board);
    assert_eq!(groups.len(), 1);

    let plans =
        SpecialSynthesizer::new().plan(&groups, &[CellCoord::new(2, 1), CellCoord::new(2, 2)]);
    let spawn = plans[0].spawn.expect("bomb spawn");
    assert_eq!(spawn.kind, TileKind::Bomb);
    assert_eq!(spawn.cell, CellCoord::new(2, 1));
    assert!(!plans[0].consumed.contains(&CellCoord::new(2, 1)));
    assert_eq!(plans[0].consumed.len(), 4);
}

#[test]
fn disabled_synthesizer_consumes_whole_groups() {
    let board = board(
        "2 2 2 2 2
         1 3 1 3 1",
    );
    let mut synthesizer = SpecialSynthesizer::default();
    synthesizer.set_enabled(false);
    assert!(!synthesizer.is_enabled());

    let plans = synthesizer.plan(&find_matches(&board), &[CellCoord::new(0, 0)]);
    assert_eq!(plans[0].spawn, None);
    assert_eq!(plans[0].consumed.len(), 5);
}
