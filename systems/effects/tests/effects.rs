use gem_cascade_core::{Board, CellCoord, Combo, Layout, TileColor, TileKind};
use gem_cascade_system_effects::{plan_combo, resolve, ResolutionScope};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn board(text: &str) -> Board {
    Layout::parse(text)
        .expect("layout parses")
        .build(|_, _| TileColor::new(0))
}

fn cell(row: u32, column: u32) -> CellCoord {
    CellCoord::new(row, column)
}

fn spent_participants(board: &Board, cells: &[CellCoord]) -> ResolutionScope {
    let mut scope = ResolutionScope::new();
    for cell in cells {
        if let Some(tile) = board.tile(*cell) {
            scope.spend(tile.id());
        }
    }
    scope
}

#[test]
fn horizontal_rocket_clears_its_row_but_not_stone() {
    let board = board(
        "1 2 H3 S 2
         2 1 3  1 3",
    );
    let blast = resolve(&board, &[cell(0, 2)], &ResolutionScope::new());
    assert_eq!(
        blast.destroyed,
        vec![cell(0, 0), cell(0, 1), cell(0, 2), cell(0, 4)]
    );
    assert_eq!(blast.detonated, vec![cell(0, 2)]);
    assert!(blast.unlocked.is_empty());
    assert!(blast.stripped.is_empty());
}

#[test]
fn specials_reached_by_a_blast_chain_their_own_effect() {
    let board = board(
        "B1 V2 1
         2  3  2
         3  1  3
         1  2  1",
    );
    let blast = resolve(&board, &[cell(0, 0)], &ResolutionScope::new());
    assert_eq!(
        blast.destroyed,
        vec![
            cell(0, 0),
            cell(0, 1),
            cell(1, 0),
            cell(1, 1),
            cell(2, 1),
            cell(3, 1),
        ]
    );
    assert_eq!(blast.detonated, vec![cell(0, 0), cell(0, 1)]);
}

#[test]
fn locks_absorb_the_hit_and_locked_specials_do_not_fire() {
    let board = board(
        "H1 2l Bl 3
         2  3a 1  2",
    );
    let blast = resolve(&board, &[cell(0, 0)], &ResolutionScope::new());
    assert_eq!(blast.destroyed, vec![cell(0, 0), cell(0, 3)]);
    assert_eq!(blast.unlocked, vec![cell(0, 1), cell(0, 2)]);
    assert!(blast.stripped.is_empty(), "unlocking does not break neighbors");
    assert_eq!(blast.detonated, vec![cell(0, 0)]);
}

#[test]
fn removal_breaks_adjacent_wood_and_jelly_but_not_stone() {
    let board = board(
        "W 1  1 1 S
         2 2a 3 W 2",
    );
    let triggers = [cell(0, 1), cell(0, 2), cell(0, 3)];
    let blast = resolve(&board, &triggers, &ResolutionScope::new());
    assert_eq!(
        blast.destroyed,
        vec![cell(0, 0), cell(0, 1), cell(0, 2), cell(0, 3), cell(1, 3)]
    );
    assert_eq!(blast.stripped, vec![cell(1, 1)]);
    assert!(!blast.destroyed.contains(&cell(0, 4)));
}

#[test]
fn standalone_magic_targets_most_common_color() {
    let board = board(
        "M 1 2 1
         1 3 1 2",
    );
    let blast = resolve(&board, &[cell(0, 0)], &ResolutionScope::new());
    assert_eq!(
        blast.destroyed,
        vec![cell(0, 0), cell(0, 1), cell(0, 3), cell(1, 0), cell(1, 2)]
    );
}

#[test]
fn protected_tiles_survive_and_spent_tiles_do_not_fire() {
    let board = board(
        "1 H2 1 B3
         2 3  2 1",
    );
    let mut scope = ResolutionScope::new();
    let protected = board.tile(cell(0, 1)).expect("rocket").id();
    scope.protect(protected);
    let spent = board.tile(cell(0, 3)).expect("bomb").id();
    scope.spend(spent);

    let blast = resolve(&board, &[cell(0, 0), cell(0, 1), cell(0, 3)], &scope);
    assert_eq!(blast.destroyed, vec![cell(0, 0), cell(0, 3)]);
    assert!(blast.detonated.is_empty());
}

#[test]
fn bomb_rocket_combo_clears_three_rows_and_three_columns() {
    let board = board(
        "S ? ? ? ? ? ?
         ? ? ? ? ? ? ?
         ? ? S ? ? ? ?
         ? ? ? B0 H1 ? ?
         ? ? ? ? ? ? ?
         ? ? ? ? ? ? ?
         ? ? ? ? ? ? ?",
    );
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let plan = plan_combo(&board, Combo::BombRocket, cell(3, 3), cell(3, 4), &mut rng);
    assert!(plan.conversions.is_empty());
    assert_eq!(&plan.triggers[..2], &[cell(3, 3), cell(3, 4)]);

    let scope = spent_participants(&board, &[cell(3, 3), cell(3, 4)]);
    let blast = resolve(&board, &plan.triggers, &scope);

    let expected: Vec<CellCoord> = board
        .coords()
        .filter(|c| (2..=4).contains(&c.row()) || (2..=4).contains(&c.column()))
        .filter(|c| *c != cell(2, 2))
        .collect();
    assert_eq!(blast.destroyed, expected);
    assert_eq!(blast.destroyed.len(), 32);
    assert!(blast.detonated.is_empty());
}

#[test]
fn double_bomb_combo_covers_a_five_by_five_area() {
    let board = board(
        "? ? ? ? ? ?
         ? ? ? ? ? ?
         ? ? B1 B2 ? ?
         ? ? ? ? ? ?
         ? ? ? ? ? ?
         ? ? ? ? ? ?",
    );
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let plan = plan_combo(&board, Combo::DoubleBomb, cell(2, 2), cell(2, 3), &mut rng);
    let scope = spent_participants(&board, &[cell(2, 2), cell(2, 3)]);
    let blast = resolve(&board, &plan.triggers, &scope);
    assert_eq!(blast.destroyed.len(), 25);
    assert!(blast.destroyed.iter().all(|c| c.row() <= 4 && c.column() <= 4));
}

#[test]
fn double_rocket_combo_clears_row_and_column_of_primary() {
    let board = board(
        "? ? ? ?
         ? V1 H2 ?
         ? ? ? ?",
    );
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let plan = plan_combo(&board, Combo::DoubleRocket, cell(1, 1), cell(1, 2), &mut rng);
    let scope = spent_participants(&board, &[cell(1, 1), cell(1, 2)]);
    let blast = resolve(&board, &plan.triggers, &scope);
    assert_eq!(
        blast.destroyed,
        vec![cell(0, 1), cell(1, 0), cell(1, 1), cell(1, 2), cell(1, 3), cell(2, 1)]
    );
}

#[test]
fn magic_bomb_converts_color_in_place() {
    let board = board(
        "M 2  2 1
         2 B2 2 2l",
    );
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let plan = plan_combo(
        &board,
        Combo::MagicBomb {
            color: TileColor::new(2),
        },
        cell(0, 0),
        cell(1, 1),
        &mut rng,
    );
    assert_eq!(plan.triggers, vec![cell(0, 0), cell(1, 1)]);
    let converted: Vec<CellCoord> = plan.conversions.iter().map(|c| c.cell).collect();
    assert_eq!(
        converted,
        vec![cell(0, 1), cell(0, 2), cell(1, 0), cell(1, 2), cell(1, 3)]
    );
    assert!(plan
        .conversions
        .iter()
        .all(|c| c.kind == TileKind::Bomb && c.color == Some(TileColor::new(2))));
}

#[test]
fn magic_rocket_picks_an_axis_per_tile() {
    let board = board(
        "M H1 1 1 1 1 1 1 1 1 1 1
         1 1  1 1 1 1 1 1 1 1 1 1",
    );
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let plan = plan_combo(
        &board,
        Combo::MagicRocket {
            color: TileColor::new(1),
        },
        cell(0, 0),
        cell(0, 1),
        &mut rng,
    );
    assert_eq!(plan.conversions.len(), 22);
    assert!(plan
        .conversions
        .iter()
        .all(|c| matches!(c.kind, TileKind::Rocket(_))));
    let horizontal = plan
        .conversions
        .iter()
        .filter(|c| c.kind == TileKind::ROCKET_H)
        .count();
    assert!(horizontal > 0 && horizontal < 22, "axis chosen independently");
}

#[test]
fn magic_color_combo_targets_partner_color() {
    let board = board(
        "M 3 1 3
         3 2 3l 1",
    );
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let plan = plan_combo(
        &board,
        Combo::MagicColor {
            color: TileColor::new(3),
        },
        cell(0, 0),
        cell(0, 1),
        &mut rng,
    );
    let scope = spent_participants(&board, &[cell(0, 0), cell(0, 1)]);
    let blast = resolve(&board, &plan.triggers, &scope);
    assert_eq!(blast.destroyed, vec![cell(0, 0), cell(0, 1), cell(0, 3), cell(1, 0)]);
    assert_eq!(blast.unlocked, vec![cell(1, 2)]);
}

#[test]
fn double_magic_combo_reaches_the_whole_board() {
    let board = board(
        "M 0l 1 S
         M 2a 1 0
         1 2  0 1",
    );
    let participants = [cell(0, 0), cell(1, 0)];
    let scope = spent_participants(&board, &participants);
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let plan = plan_combo(&board, Combo::DoubleMagic, cell(0, 0), cell(1, 0), &mut rng);
    assert!(plan.conversions.is_empty());
    let blast = resolve(&board, &plan.triggers, &scope);

    let expected: Vec<CellCoord> = board
        .coords()
        .filter(|at| ![cell(0, 1), cell(0, 3), cell(1, 1)].contains(at))
        .collect();
    assert_eq!(blast.destroyed, expected);
    assert!(blast.destroyed.contains(&cell(0, 0)));
    assert!(blast.destroyed.contains(&cell(1, 0)));
    assert_eq!(blast.unlocked, vec![cell(0, 1)]);
    assert_eq!(blast.stripped, vec![cell(1, 1)]);
    assert!(blast.detonated.is_empty());
    assert!(!blast.destroyed.contains(&cell(0, 3)));
}
