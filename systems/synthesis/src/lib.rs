#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Decides which special tile, if any, a match group turns into.

use gem_cascade_core::{Axis, CellCoord, MatchGroup, TileColor, TileKind};

/// Longest run that turns a group into a Magic tile.
pub const MAGIC_RUN: u32 = 5;

/// Run length that turns a group into a rocket.
pub const ROCKET_RUN: u32 = 4;

/// Run length both axes need for a bomb.
pub const BOMB_RUN: u32 = 3;

/// Special tile to create in place of one group member.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpecialSpawn {
    /// Cell whose tile is transformed.
    pub cell: CellCoord,
    /// Kind the tile becomes.
    pub kind: TileKind,
    /// Color the tile carries; Magic tiles carry none.
    pub color: Option<TileColor>,
}

/// Outcome of synthesis for one match group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SynthesisPlan {
    /// Special to create, if the group qualifies.
    pub spawn: Option<SpecialSpawn>,
    /// Group members to destroy, excluding the spawn cell.
    pub consumed: Vec<CellCoord>,
}

/// Turns match groups into synthesis plans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpecialSynthesizer {
    enabled: bool,
}

impl SpecialSynthesizer {
    /// Creates a new synthesizer with synthesis enabled.
    #[must_use]
    pub const fn new() -> Self {
        Self { enabled: true }
    }

    /// Reports whether new specials may be created.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables creation of new specials.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Plans one resolution pass.
    ///
    /// `swapped` lists the cells of the player's swap in order of preference;
    /// a group containing one of them creates its special there, otherwise at
    /// its middle member. Plans are returned in the order of `groups`.
    #[must_use]
    pub fn plan(&self, groups: &[MatchGroup], swapped: &[CellCoord]) -> Vec<SynthesisPlan> {
        groups
            .iter()
            .map(|group| self.plan_group(group, swapped))
            .collect()
    }

    fn plan_group(&self, group: &MatchGroup, swapped: &[CellCoord]) -> SynthesisPlan {
        let kind = if self.enabled { classify(group) } else { None };
        let cell = kind.and_then(|_| {
            swapped
                .iter()
                .copied()
                .find(|cell| group.contains(*cell))
                .or_else(|| group.middle())
        });

        let (Some(kind), Some(cell)) = (kind, cell) else {
            return SynthesisPlan {
                spawn: None,
                consumed: group.cells.clone(),
            };
        };

        let color = match kind {
            TileKind::Magic => None,
            _ => Some(group.color),
        };
        SynthesisPlan {
            spawn: Some(SpecialSpawn { cell, kind, color }),
            consumed: group
                .cells
                .iter()
                .copied()
                .filter(|member| *member != cell)
                .collect(),
        }
    }
}

impl Default for SpecialSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Special kind a group qualifies for, by priority: Magic, Bomb, Rocket.
#[must_use]
pub fn classify(group: &MatchGroup) -> Option<TileKind> {
    let horizontal = group.longest_horizontal;
    let vertical = group.longest_vertical;

    if horizontal >= MAGIC_RUN || vertical >= MAGIC_RUN {
        Some(TileKind::Magic)
    } else if horizontal >= BOMB_RUN && vertical >= BOMB_RUN {
        Some(TileKind::Bomb)
    } else if horizontal == ROCKET_RUN || vertical == ROCKET_RUN {
        let axis = if horizontal >= vertical {
            Axis::Horizontal
        } else {
            Axis::Vertical
        };
        Some(TileKind::Rocket(axis))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(horizontal: u32, vertical: u32) -> MatchGroup {
        MatchGroup {
            color: TileColor::new(2),
            cells: vec![
                CellCoord::new(0, 0),
                CellCoord::new(0, 1),
                CellCoord::new(0, 2),
            ],
            rows: 1,
            columns: 3,
            longest_horizontal: horizontal,
            longest_vertical: vertical,
        }
    }

    #[test]
    fn magic_outranks_everything() {
        assert_eq!(classify(&group(5, 1)), Some(TileKind::Magic));
        assert_eq!(classify(&group(3, 6)), Some(TileKind::Magic));
    }

    #[test]
    fn bomb_outranks_rocket() {
        assert_eq!(classify(&group(3, 3)), Some(TileKind::Bomb));
        assert_eq!(classify(&group(4, 3)), Some(TileKind::Bomb));
    }

    #[test]
    fn rocket_axis_follows_the_longer_run() {
        assert_eq!(classify(&group(4, 1)), Some(TileKind::ROCKET_H));
        assert_eq!(classify(&group(2, 4)), Some(TileKind::ROCKET_V));
    }

    #[test]
    fn plain_runs_do_not_synthesize() {
        assert_eq!(classify(&group(3, 1)), None);
        assert_eq!(classify(&group(3, 2)), None);
    }
}
