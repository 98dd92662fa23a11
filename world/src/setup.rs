use gem_cascade_core::{
    Board, CellCoord, Event, Level, LevelStatus, TileColor, TileKind, TurnPhase, MIN_RUN,
};
use gem_cascade_system_synthesis::SpecialSynthesizer;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{targets::TargetLedger, turn::Turn, World};

impl World {
    /// Discards all level state and builds the board for `level`.
    ///
    /// Cells without an explicit tile are filled first, then the board is
    /// stabilized exactly like the end of a turn, except that nothing scores.
    #[tracing::instrument(level = "debug", skip_all, fields(seed = level.seed()))]
    pub(crate) fn load(&mut self, level: Level, out: &mut Vec<Event>) {
        let mut rng = ChaCha8Rng::seed_from_u64(level.seed());
        self.board = build_board(&level, &mut rng);
        self.rng = rng;
        self.score = 0;
        self.moves_left = level.moves();
        self.status = LevelStatus::Playing;
        self.phase = TurnPhase::Resolving;
        self.targets = TargetLedger::new(level.targets());
        self.synthesizer = SpecialSynthesizer::new();
        self.level = level;

        tracing::info!(
            rows = self.level.rows(),
            columns = self.level.columns(),
            colors = self.level.colors(),
            moves = self.moves_left,
            "level configured"
        );
        out.push(Event::LevelConfigured {
            rows: self.level.rows(),
            columns: self.level.columns(),
        });

        let mut turn = Turn::setup();
        self.cascade(&mut turn, out);
        self.stabilize(&mut turn, out);
        self.phase = TurnPhase::Idle;
        out.push(self.state_event());
    }
}

fn build_board<R>(level: &Level, rng: &mut R) -> Board
where
    R: Rng + ?Sized,
{
    let colors = level.colors();
    if let Some(layout) = level.layout() {
        return layout.build(|board, cell| fill_color(board, cell, colors, &mut *rng));
    }

    let mut board = Board::new(level.rows(), level.columns());
    let cells: Vec<CellCoord> = board.coords().collect();
    for cell in cells {
        let color = fill_color(&board, cell, colors, &mut *rng);
        let _ = board.spawn(cell, TileKind::Normal, Some(color));
    }
    board
}

/// Picks a uniformly random color among those that do not complete a run
/// with tiles already on the board.
fn fill_color<R>(board: &Board, cell: CellCoord, colors: u8, rng: &mut R) -> TileColor
where
    R: Rng + ?Sized,
{
    let palette: Vec<TileColor> = (0..colors).map(TileColor::new).collect();
    let safe: Vec<TileColor> = palette
        .iter()
        .copied()
        .filter(|color| !completes_run(board, cell, *color))
        .collect();
    let pool = if safe.is_empty() { &palette } else { &safe };
    pool.choose(rng).copied().unwrap_or(TileColor::new(0))
}

fn completes_run(board: &Board, cell: CellCoord, color: TileColor) -> bool {
    let reach = |rows: i32, columns: i32| {
        let mut length = 0;
        let mut cursor = cell;
        while let Some(next) = cursor.offset(rows, columns) {
            if board.tile(next).and_then(|tile| tile.match_color()) != Some(color) {
                break;
            }
            length += 1;
            cursor = next;
        }
        length
    };
    1 + reach(0, -1) + reach(0, 1) >= MIN_RUN || 1 + reach(-1, 0) + reach(1, 0) >= MIN_RUN
}
