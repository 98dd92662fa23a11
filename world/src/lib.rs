#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state and the turn controller for Gem Cascade.
//!
//! The world owns the board, the level's random stream, score, moves and
//! target progress. Every mutation enters through [`apply`]; observers learn
//! about changes from the [`Event`]s appended to the caller's buffer and read
//! state through [`query`].

mod setup;
mod targets;
mod turn;

use gem_cascade_core::{Board, Command, Event, Level, LevelStatus, TurnPhase};
use gem_cascade_system_deadlock::DeadlockGuard;
use gem_cascade_system_synthesis::SpecialSynthesizer;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::targets::TargetLedger;

/// Points for every removed tile, before the cascade multiplier.
pub const TILE_POINTS: u64 = 60;

/// Points for every removed lock, before the cascade multiplier.
pub const LOCK_POINTS: u64 = 20;

/// Points for every stripped jelly coating, before the cascade multiplier.
pub const JELLY_POINTS: u64 = 40;

/// Points for every cracked ice layer, before the cascade multiplier.
pub const ICE_POINTS: u64 = 50;

/// Points awarded for each unused move when the level is won.
pub const MOVE_BONUS_POINTS: u64 = 500;

/// Deadlock repairs attempted before the world gives up on a board.
pub const MAX_REPAIR_ROUNDS: u32 = 8;

/// Represents the authoritative state of one level in play.
#[derive(Debug)]
pub struct World {
    level: Level,
    board: Board,
    rng: ChaCha8Rng,
    score: u64,
    moves_left: u32,
    status: LevelStatus,
    phase: TurnPhase,
    targets: TargetLedger,
    guard: DeadlockGuard,
    synthesizer: SpecialSynthesizer,
}

impl World {
    /// Creates a new world with the default level loaded and ready for input.
    #[must_use]
    pub fn new() -> Self {
        let level = Level::default();
        let mut world = Self {
            rng: ChaCha8Rng::seed_from_u64(level.seed()),
            board: Board::new(level.rows(), level.columns()),
            score: 0,
            moves_left: level.moves(),
            status: LevelStatus::Playing,
            phase: TurnPhase::Idle,
            targets: TargetLedger::new(level.targets()),
            guard: DeadlockGuard::default(),
            synthesizer: SpecialSynthesizer::new(),
            level: level.clone(),
        };
        let mut discarded = Vec::new();
        world.load(level, &mut discarded);
        world
    }

    fn state_event(&self) -> Event {
        Event::StateChanged {
            score: self.score,
            moves_left: self.moves_left,
            status: self.status,
            targets_left: self.targets.progress(),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureLevel { level } => world.load(level, out_events),
        Command::RestartLevel => {
            let level = world.level.clone();
            world.load(level, out_events);
        }
        Command::RequestSwap { from, to } => world.request_swap(from, to, out_events),
    }

    debug_assert!(
        world.board.is_consistent(),
        "board and tile positions disagree"
    );
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use gem_cascade_core::{
        Board, Layout, Level, LevelStatus, SwapMove, TargetProgress, TurnPhase,
    };
    use gem_cascade_system_move_finder::find_move;

    use super::World;

    /// Provides read-only access to the board.
    #[must_use]
    pub fn board(world: &World) -> &Board {
        &world.board
    }

    /// Level currently loaded.
    #[must_use]
    pub fn level(world: &World) -> &Level {
        &world.level
    }

    /// Current score.
    #[must_use]
    pub fn score(world: &World) -> u64 {
        world.score
    }

    /// Moves still available to the player.
    #[must_use]
    pub fn moves_left(world: &World) -> u32 {
        world.moves_left
    }

    /// Outcome of the level so far.
    #[must_use]
    pub fn status(world: &World) -> LevelStatus {
        world.status
    }

    /// State of the turn controller.
    #[must_use]
    pub fn phase(world: &World) -> TurnPhase {
        world.phase
    }

    /// Remaining counts for every configured target, in configuration order.
    #[must_use]
    pub fn targets_left(world: &World) -> Vec<TargetProgress> {
        world.targets.progress()
    }

    /// Suggests a productive swap while the world awaits input.
    ///
    /// Never mutates the board.
    #[must_use]
    pub fn hint(world: &World) -> Option<SwapMove> {
        if world.phase != TurnPhase::Idle {
            return None;
        }
        find_move(&world.board)
    }

    /// Captures the board in layout notation.
    #[must_use]
    pub fn layout(world: &World) -> Layout {
        Layout::capture(&world.board)
    }
}
