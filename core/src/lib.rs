#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gem Cascade engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for presentation
//! layers to react to. Systems borrow the [`Board`] immutably (or mutably for
//! the few that restabilize it) and never hold their own copy of the grid.

use std::fmt;

use serde::{Deserialize, Serialize};

mod board;
mod layout;
mod level;

pub use board::{Board, Tile};
pub use layout::{CellBase, CellSpec, Layout, LayoutError};
pub use level::{
    Level, LevelConfig, LevelConfigError, TargetKey, TargetKeyError, TargetSpec, MAX_COLORS,
    MAX_DIMENSION, MIN_COLORS,
};

/// Shortest same-color run that counts as a match.
pub const MIN_RUN: u32 = 3;

/// Location of a single board cell expressed as row and column coordinates.
///
/// Ordering is row-major, which is the scan order every system relies on for
/// tie-breaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell, counted from the top of the board.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell, counted from the left edge.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Computes the Chebyshev (king-move) distance between two cell coordinates.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column
            .abs_diff(other.column)
            .max(self.row.abs_diff(other.row))
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Returns the cell displaced by the provided deltas, or `None` when the
    /// result would have a negative coordinate.
    #[must_use]
    pub fn offset(self, rows: i32, columns: i32) -> Option<CellCoord> {
        let row = i64::from(self.row) + i64::from(rows);
        let column = i64::from(self.column) + i64::from(columns);
        Some(Self::new(
            u32::try_from(row).ok()?,
            u32::try_from(column).ok()?,
        ))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Unique identifier assigned to a tile by its board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    /// Creates a new tile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index into the level's color palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileColor(u8);

impl TileColor {
    /// Creates a color referring to the provided palette slot.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Palette slot referenced by the color.
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for TileColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Board axis swept by a rocket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Sweeps the whole row.
    Horizontal,
    /// Sweeps the whole column.
    Vertical,
}

/// Base kind of a tile. Lock and jelly modifiers are tracked separately on
/// [`Tile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Plain colored tile; the only kind that participates in run matching.
    Normal,
    /// Clears a full row or column when triggered.
    Rocket(Axis),
    /// Clears the surrounding 3×3 block when triggered.
    Bomb,
    /// Clears every tile of one color when triggered.
    Magic,
    /// Breakable obstacle, destroyed by adjacent destruction or area effects.
    Wood,
    /// Permanent obstacle that nothing destroys.
    Stone,
}

impl TileKind {
    /// Rocket sweeping its row.
    pub const ROCKET_H: TileKind = TileKind::Rocket(Axis::Horizontal);
    /// Rocket sweeping its column.
    pub const ROCKET_V: TileKind = TileKind::Rocket(Axis::Vertical);

    /// Reports whether the kind produces an area effect when triggered.
    #[must_use]
    pub const fn is_special(self) -> bool {
        matches!(self, Self::Rocket(_) | Self::Bomb | Self::Magic)
    }

    /// Reports whether the kind is a Wood or Stone obstacle.
    #[must_use]
    pub const fn is_obstacle(self) -> bool {
        matches!(self, Self::Wood | Self::Stone)
    }

    /// Target category for special kinds.
    #[must_use]
    pub const fn special_kind(self) -> Option<SpecialKind> {
        match self {
            Self::Rocket(_) => Some(SpecialKind::Rocket),
            Self::Bomb => Some(SpecialKind::Bomb),
            Self::Magic => Some(SpecialKind::Magic),
            Self::Normal | Self::Wood | Self::Stone => None,
        }
    }
}

/// Special categories tracked by collection targets. Both rocket axes count
/// as [`SpecialKind::Rocket`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpecialKind {
    /// Horizontal or vertical rocket.
    Rocket,
    /// Bomb.
    Bomb,
    /// Magic tile.
    Magic,
}

/// Jelly coating applied on top of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Jelly {
    /// Inert jelly (variant A).
    Plain,
    /// Jelly that spreads to a neighbor on turns where no jelly was cleared
    /// (variant B).
    Infectious,
}

/// Connected group of same-colored Normal tiles discovered in one matching
/// pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchGroup {
    /// Color shared by every member.
    pub color: TileColor,
    /// Members in flood-fill discovery order.
    pub cells: Vec<CellCoord>,
    /// Number of distinct rows occupied by the group.
    pub rows: u32,
    /// Number of distinct columns occupied by the group.
    pub columns: u32,
    /// Longest run of horizontally adjacent members within a single row.
    pub longest_horizontal: u32,
    /// Longest run of vertically adjacent members within a single column.
    pub longest_vertical: u32,
}

impl MatchGroup {
    /// Number of tiles in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reports whether the provided cell belongs to the group.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Middle member by list order.
    #[must_use]
    pub fn middle(&self) -> Option<CellCoord> {
        self.cells.get(self.cells.len() / 2).copied()
    }
}

/// Pair of adjacent cells whose swap produces a match or a combo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SwapMove {
    /// Cell the player drags from.
    pub from: CellCoord,
    /// Cell the dragged tile lands on.
    pub to: CellCoord,
}

impl SwapMove {
    /// Creates a new swap descriptor.
    #[must_use]
    pub const fn new(from: CellCoord, to: CellCoord) -> Self {
        Self { from, to }
    }
}

/// Combined effect produced when two tiles from the direct-combo table are
/// swapped together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Combo {
    /// Magic + Magic: the whole board.
    DoubleMagic,
    /// Magic + Normal: every tile of the partner's color.
    MagicColor {
        /// Color of the Normal partner.
        color: TileColor,
    },
    /// Magic + Bomb: every tile of the bomb's color turns into a bomb.
    MagicBomb {
        /// Color of the Bomb partner.
        color: TileColor,
    },
    /// Magic + Rocket: every tile of the rocket's color turns into a rocket.
    MagicRocket {
        /// Color of the Rocket partner.
        color: TileColor,
    },
    /// Bomb + Bomb: 5×5 explosion.
    DoubleBomb,
    /// Bomb + Rocket: three rows and three columns.
    BombRocket,
    /// Rocket + Rocket: one row and one column.
    DoubleRocket,
}

impl Combo {
    /// Looks the pair up in the direct-combo table. Order does not matter.
    #[must_use]
    pub fn classify(first: &Tile, second: &Tile) -> Option<Self> {
        match (first.kind(), second.kind()) {
            (TileKind::Magic, TileKind::Magic) => Some(Self::DoubleMagic),
            (TileKind::Magic, partner) => Self::with_magic(partner, second.color()),
            (partner, TileKind::Magic) => Self::with_magic(partner, first.color()),
            (TileKind::Bomb, TileKind::Bomb) => Some(Self::DoubleBomb),
            (TileKind::Bomb, TileKind::Rocket(_)) | (TileKind::Rocket(_), TileKind::Bomb) => {
                Some(Self::BombRocket)
            }
            (TileKind::Rocket(_), TileKind::Rocket(_)) => Some(Self::DoubleRocket),
            _ => None,
        }
    }

    fn with_magic(partner: TileKind, color: Option<TileColor>) -> Option<Self> {
        let color = color?;
        match partner {
            TileKind::Normal => Some(Self::MagicColor { color }),
            TileKind::Bomb => Some(Self::MagicBomb { color }),
            TileKind::Rocket(_) => Some(Self::MagicRocket { color }),
            TileKind::Magic | TileKind::Wood | TileKind::Stone => None,
        }
    }
}

/// Outcome of the level as reported to collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelStatus {
    /// Moves remain and the goal is not reached yet.
    Playing,
    /// Goal reached and the bonus phase completed.
    Won,
    /// Move budget exhausted without reaching the goal.
    Lost,
}

impl LevelStatus {
    /// Lowercase label used by presentation layers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }
}

/// States of the turn controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurnPhase {
    /// Awaiting player input.
    Idle,
    /// A swap is being resolved; input is refused.
    Resolving,
    /// The board is stable and being checked for available moves.
    DeadlockCheck,
    /// Terminal: the level was won.
    Won,
    /// Terminal: the level was lost.
    Lost,
}

/// Remaining count for a single collection target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetProgress {
    /// Target being tracked.
    pub key: TargetKey,
    /// Count still required before the target is satisfied.
    pub remaining: u32,
}

/// Record of a tile moved to a new cell by a shuffle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileRelocation {
    /// Identifier of the relocated tile.
    pub tile: TileId,
    /// Cell the tile occupied before the shuffle.
    pub from: CellCoord,
    /// Cell the tile occupies after the shuffle.
    pub to: CellCoord,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Discards the current board and builds a fresh one for the level.
    ConfigureLevel {
        /// Validated level description.
        level: Level,
    },
    /// Player request to swap the tiles occupying two adjacent cells.
    RequestSwap {
        /// Cell the player drags from.
        from: CellCoord,
        /// Cell the dragged tile should land on.
        to: CellCoord,
    },
    /// Rebuilds the current level from its configuration and seed.
    RestartLevel,
}

/// Events broadcast by the world after processing commands.
///
/// Apart from [`Event::StateChanged`] these are presentation hints only and
/// carry no control authority back into the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A fresh board was built.
    LevelConfigured {
        /// Number of rows in the new board.
        rows: u32,
        /// Number of columns in the new board.
        columns: u32,
    },
    /// Two tiles exchanged cells at the player's request.
    TilesSwapped {
        /// Cell the player dragged from.
        from: CellCoord,
        /// Cell the dragged tile landed on.
        to: CellCoord,
    },
    /// An unproductive swap was undone; no move was consumed.
    SwapReverted {
        /// Cell the player dragged from.
        from: CellCoord,
        /// Cell the dragged tile had landed on.
        to: CellCoord,
    },
    /// A direct combo fired.
    ComboTriggered {
        /// Which table entry fired.
        combo: Combo,
        /// Primary cell the combo is centered on.
        cell: CellCoord,
    },
    /// A tile was removed from the board.
    TileDestroyed {
        /// Identifier of the removed tile.
        tile: TileId,
        /// Cell the tile occupied.
        cell: CellCoord,
        /// Kind of the removed tile.
        kind: TileKind,
        /// Color of the removed tile, if any.
        color: Option<TileColor>,
    },
    /// A tile changed kind in place (synthesis, Magic conversion, bonus grant).
    TileTransformed {
        /// Identifier of the transformed tile.
        tile: TileId,
        /// Cell the tile occupies.
        cell: CellCoord,
        /// New kind of the tile.
        kind: TileKind,
        /// New color of the tile, if any.
        color: Option<TileColor>,
    },
    /// A lock absorbed an effect and was removed.
    TileUnlocked {
        /// Cell whose tile lost its lock.
        cell: CellCoord,
    },
    /// A jelly coating absorbed an effect and was removed.
    JellyStripped {
        /// Cell whose tile lost its jelly.
        cell: CellCoord,
        /// Variant that was removed.
        jelly: Jelly,
    },
    /// The ice under a destroyed tile cracked.
    IceCracked {
        /// Cell whose ice layer was removed.
        cell: CellCoord,
    },
    /// Gravity moved a tile down (straight or diagonally).
    TileFell {
        /// Identifier of the falling tile.
        tile: TileId,
        /// Cell the tile left.
        from: CellCoord,
        /// Cell the tile entered.
        to: CellCoord,
    },
    /// A new tile entered the board.
    TileSpawned {
        /// Identifier of the new tile.
        tile: TileId,
        /// Cell the tile entered.
        cell: CellCoord,
        /// Kind of the new tile.
        kind: TileKind,
        /// Color of the new tile, if any.
        color: Option<TileColor>,
    },
    /// The movable tiles were permuted to repair a deadlock.
    BoardShuffled {
        /// Tiles that changed cells.
        relocations: Vec<TileRelocation>,
    },
    /// A free special was handed out after a shuffle.
    BonusSpecialGranted {
        /// Cell holding the special.
        cell: CellCoord,
        /// Kind of the special.
        kind: TileKind,
    },
    /// Infectious jelly spread onto a neighboring tile.
    InfectionOccurred {
        /// Cell that became jellied.
        cell: CellCoord,
    },
    /// Targets were met; remaining specials detonate and moves convert to score.
    BonusPhaseStarted {
        /// Moves left when the phase started.
        moves_left: u32,
    },
    /// Outward snapshot emitted after every observable state change.
    StateChanged {
        /// Current score.
        score: u64,
        /// Moves still available.
        moves_left: u32,
        /// Current level outcome.
        status: LevelStatus,
        /// Remaining counts for every configured target.
        targets_left: Vec<TargetProgress>,
    },
}

#[cfg(test)]
mod tests {
    use super::{Axis, CellCoord, Combo, LevelStatus, TileColor, TileKind};
    use crate::Board;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(3, 4);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
        assert_eq!(origin.chebyshev_distance(destination), 3);
    }

    #[test]
    fn adjacency_requires_shared_edge() {
        let cell = CellCoord::new(2, 2);
        assert!(cell.is_adjacent(CellCoord::new(1, 2)));
        assert!(cell.is_adjacent(CellCoord::new(2, 3)));
        assert!(!cell.is_adjacent(CellCoord::new(3, 3)));
        assert!(!cell.is_adjacent(cell));
    }

    #[test]
    fn offset_rejects_negative_coordinates() {
        let cell = CellCoord::new(0, 1);
        assert_eq!(cell.offset(0, -1), Some(CellCoord::new(0, 0)));
        assert_eq!(cell.offset(-1, 0), None);
        assert_eq!(cell.offset(2, 3), Some(CellCoord::new(2, 4)));
    }

    #[test]
    fn cell_ordering_is_row_major() {
        let mut cells = vec![
            CellCoord::new(1, 0),
            CellCoord::new(0, 2),
            CellCoord::new(0, 1),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(0, 1),
                CellCoord::new(0, 2),
                CellCoord::new(1, 0)
            ]
        );
    }

    #[test]
    fn rocket_axes_share_special_kind() {
        assert_eq!(
            TileKind::Rocket(Axis::Horizontal).special_kind(),
            TileKind::Rocket(Axis::Vertical).special_kind()
        );
        assert!(TileKind::Bomb.is_special());
        assert!(!TileKind::Wood.is_special());
        assert!(TileKind::Stone.is_obstacle());
    }

    #[test]
    fn combo_table_is_symmetric() {
        let mut board = Board::new(1, 2);
        let magic = CellCoord::new(0, 0);
        let bomb = CellCoord::new(0, 1);
        let _ = board.spawn(magic, TileKind::Magic, None);
        let _ = board.spawn(bomb, TileKind::Bomb, Some(TileColor::new(2)));
        let (Some(first), Some(second)) = (board.tile(magic), board.tile(bomb)) else {
            panic!("tiles were spawned");
        };

        let expected = Some(Combo::MagicBomb {
            color: TileColor::new(2),
        });
        assert_eq!(Combo::classify(first, second), expected);
        assert_eq!(Combo::classify(second, first), expected);
    }

    #[test]
    fn plain_pairs_are_not_combos() {
        let mut board = Board::new(1, 2);
        let left = CellCoord::new(0, 0);
        let right = CellCoord::new(0, 1);
        let _ = board.spawn(left, TileKind::Bomb, Some(TileColor::new(0)));
        let _ = board.spawn(right, TileKind::Normal, Some(TileColor::new(1)));
        let (Some(first), Some(second)) = (board.tile(left), board.tile(right)) else {
            panic!("tiles were spawned");
        };
        assert_eq!(Combo::classify(first, second), None);
    }

    #[test]
    fn rocket_pairs_fire_double_rocket_regardless_of_axis() {
        let mut board = Board::new(1, 2);
        let left = CellCoord::new(0, 0);
        let right = CellCoord::new(0, 1);
        let _ = board.spawn(left, TileKind::ROCKET_H, Some(TileColor::new(0)));
        let _ = board.spawn(right, TileKind::ROCKET_V, Some(TileColor::new(1)));
        let (Some(first), Some(second)) = (board.tile(left), board.tile(right)) else {
            panic!("tiles were spawned");
        };
        assert_eq!(Combo::classify(first, second), Some(Combo::DoubleRocket));
    }

    #[test]
    fn level_status_round_trips_through_bincode() {
        let bytes = bincode::serialize(&LevelStatus::Won).expect("serialize");
        let restored: LevelStatus = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, LevelStatus::Won);
        assert_eq!(LevelStatus::Won.as_str(), "won");
    }
}
