#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Keeps the board playable by shuffling it and granting a bonus special
//! whenever no productive swap remains.

use gem_cascade_core::{Board, CellCoord, TileColor, TileId, TileKind, TileRelocation};
use gem_cascade_system_match_finder::has_matches;
use gem_cascade_system_move_finder::find_move;
use rand::{seq::SliceRandom, Rng};

/// Default number of permutations tried per repair.
pub const DEFAULT_SHUFFLE_ATTEMPTS: u32 = 16;

const BONUS_KINDS: [TileKind; 4] = [
    TileKind::Bomb,
    TileKind::ROCKET_H,
    TileKind::ROCKET_V,
    TileKind::Magic,
];

/// Special tile granted after a shuffle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BonusGrant {
    /// Identifier of the special tile.
    pub tile: TileId,
    /// Cell holding the special.
    pub cell: CellCoord,
    /// Kind of the special.
    pub kind: TileKind,
    /// Color of the special; Magic tiles carry none.
    pub color: Option<TileColor>,
    /// Whether the special was spawned into an empty cell rather than
    /// converted from an existing tile.
    pub spawned: bool,
}

/// Changes made by one repair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Repair {
    /// Tiles that changed cells during the shuffle.
    pub relocations: Vec<TileRelocation>,
    /// Bonus special granted after the shuffle, if any cell could take one.
    pub bonus: Option<BonusGrant>,
}

/// Detects deadlocked boards and repairs them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeadlockGuard {
    shuffle_attempts: u32,
}

impl DeadlockGuard {
    /// Creates a new guard trying up to `shuffle_attempts` permutations per repair.
    #[must_use]
    pub const fn new(shuffle_attempts: u32) -> Self {
        Self { shuffle_attempts }
    }

    /// Number of permutations tried per repair.
    #[must_use]
    pub const fn shuffle_attempts(&self) -> u32 {
        self.shuffle_attempts
    }

    /// Reports whether the board has neither a productive swap nor a pending match.
    #[must_use]
    pub fn is_deadlocked(&self, board: &Board) -> bool {
        find_move(board).is_none() && !has_matches(board)
    }

    /// Leaves a playable board untouched; otherwise shuffles the movable
    /// tiles and grants exactly one bonus special.
    ///
    /// Immovable tiles keep their cells. Permutations are drawn until one
    /// yields a productive swap or a pending match, up to the configured
    /// number of attempts; the last permutation is kept if none does.
    pub fn ensure_playable<R>(&self, board: &mut Board, colors: u8, rng: &mut R) -> Option<Repair>
    where
        R: Rng + ?Sized,
    {
        if find_move(board).is_some() {
            return None;
        }

        let relocations = self.shuffle(board, rng);
        let bonus = grant_bonus(board, colors, rng);
        tracing::debug!(
            relocated = relocations.len(),
            bonus = ?bonus.map(|grant| grant.kind),
            "repaired deadlocked board"
        );
        Some(Repair { relocations, bonus })
    }

    fn shuffle<R>(&self, board: &mut Board, rng: &mut R) -> Vec<TileRelocation>
    where
        R: Rng + ?Sized,
    {
        let cells = board.movable_cells();
        let original = board.clone();
        let mut candidate = original.clone();

        for attempt in 0..self.shuffle_attempts.max(1) {
            let mut targets = cells.clone();
            targets.shuffle(rng);

            candidate = original.clone();
            let tiles: Vec<_> = cells.iter().filter_map(|cell| candidate.remove(*cell)).collect();
            for (tile, target) in tiles.into_iter().zip(targets) {
                let _ = candidate.put(target, tile);
            }

            if find_move(&candidate).is_some() || has_matches(&candidate) {
                tracing::trace!(attempt, "shuffle produced a playable board");
                break;
            }
        }

        let relocations = cells
            .iter()
            .filter_map(|from| {
                let tile = original.tile(*from)?.id();
                let to = candidate.tiles().find(|moved| moved.id() == tile)?.position();
                (to != *from).then_some(TileRelocation {
                    tile,
                    from: *from,
                    to,
                })
            })
            .collect();
        *board = candidate;
        relocations
    }
}

impl Default for DeadlockGuard {
    fn default() -> Self {
        Self::new(DEFAULT_SHUFFLE_ATTEMPTS)
    }
}

fn grant_bonus<R>(board: &mut Board, colors: u8, rng: &mut R) -> Option<BonusGrant>
where
    R: Rng + ?Sized,
{
    let kind = BONUS_KINDS.choose(rng).copied()?;
    let color = match kind {
        TileKind::Magic => None,
        _ => Some(TileColor::new(rng.gen_range(0..colors.max(1)))),
    };

    if let Some(cell) = board.empty_cells().choose(rng).copied() {
        let tile = board.spawn(cell, kind, color)?;
        return Some(BonusGrant {
            tile,
            cell,
            kind,
            color,
            spawned: true,
        });
    }

    let mut candidates = board.movable_cells();
    candidates.shuffle(rng);
    let keeps_playable = |cell: CellCoord| {
        let mut trial = board.clone();
        let _ = trial.transform(cell, kind, color);
        find_move(&trial).is_some() || has_matches(&trial)
    };
    let cell = candidates
        .iter()
        .copied()
        .find(|cell| keeps_playable(*cell))
        .or_else(|| candidates.first().copied())?;

    let _ = board.transform(cell, kind, color);
    let tile = board.tile(cell)?.id();
    Some(BonusGrant {
        tile,
        cell,
        kind,
        color,
        spawned: false,
    })
}
