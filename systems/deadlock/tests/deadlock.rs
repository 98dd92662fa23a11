use gem_cascade_core::{Board, CellCoord, Layout, TileColor, TileKind};
use gem_cascade_system_deadlock::{DeadlockGuard, DEFAULT_SHUFFLE_ATTEMPTS};
use gem_cascade_system_match_finder::has_matches;
use gem_cascade_system_move_finder::find_move;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn board(text: &str) -> Board {
    Layout::parse(text)
        .expect("layout parses")
        .build(|_, _| TileColor::new(0))
}

fn specials(board: &Board) -> usize {
    board.tiles().filter(|tile| tile.is_special()).count()
}

const DEADLOCKED: &str = "0 1 2 0
                          1 2 0 1
                          2 0 1 2
                          S 1l 2 0";

#[test]
fn playable_board_is_left_alone() {
    let mut board = board(
        "0 1 2 0
         1 2 0 1
         2 0 1 2
         0 1 1 0",
    );
    let before = board.clone();
    let guard = DeadlockGuard::default();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    assert!(!guard.is_deadlocked(&board));
    assert_eq!(guard.ensure_playable(&mut board, 3, &mut rng), None);
    assert_eq!(board, before);
}

#[test]
fn deadlocked_board_is_shuffled_and_granted_one_bonus() {
    let mut board = board(DEADLOCKED);
    let guard = DeadlockGuard::default();
    assert_eq!(guard.shuffle_attempts(), DEFAULT_SHUFFLE_ATTEMPTS);
    assert!(guard.is_deadlocked(&board));

    let stone = board.tile(CellCoord::new(3, 0)).expect("stone").id();
    let locked = board.tile(CellCoord::new(3, 1)).expect("locked").id();
    let mut rng = ChaCha8Rng::seed_from_u64(21);

    let repair = guard
        .ensure_playable(&mut board, 3, &mut rng)
        .expect("deadlock repaired");

    assert!(!repair.relocations.is_empty());
    for relocation in &repair.relocations {
        assert_ne!(relocation.tile, stone);
        assert_ne!(relocation.tile, locked);
        assert_eq!(
            board.tile(relocation.to).map(|tile| tile.id()),
            Some(relocation.tile)
        );
    }
    assert_eq!(board.tile(CellCoord::new(3, 0)).map(|t| t.id()), Some(stone));
    assert_eq!(board.tile(CellCoord::new(3, 1)).map(|t| t.id()), Some(locked));

    let bonus = repair.bonus.expect("bonus granted");
    assert!(!bonus.spawned);
    assert_eq!(specials(&board), 1);
    assert_eq!(board.tile(bonus.cell).map(|tile| tile.kind()), Some(bonus.kind));
    assert_eq!(bonus.color.is_none(), bonus.kind == TileKind::Magic);

    assert!(find_move(&board).is_some() || has_matches(&board));
    assert!(board.is_consistent());
}

#[test]
fn bonus_prefers_an_empty_cell() {
    let mut board = board(
        "0 1 2 0
         1 2 0 1
         2 0 1 2
         _ 1l 2 0",
    );
    let guard = DeadlockGuard::new(8);
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let repair = guard
        .ensure_playable(&mut board, 3, &mut rng)
        .expect("deadlock repaired");
    let bonus = repair.bonus.expect("bonus granted");
    assert!(bonus.spawned);
    assert_eq!(bonus.cell, CellCoord::new(3, 0));
    assert!(board.empty_cells().is_empty());
    assert_eq!(specials(&board), 1);
}

#[test]
fn repairs_are_deterministic_for_a_seed() {
    let run = |seed| {
        let mut board = board(DEADLOCKED);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let repair = DeadlockGuard::default().ensure_playable(&mut board, 3, &mut rng);
        (board, repair)
    };
    assert_eq!(run(77), run(77));
}
