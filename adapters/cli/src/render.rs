//! Plain-text presentation of the world for terminal output.

use std::fmt::{self, Write as _};

use gem_cascade_core::{Event, SwapMove};
use gem_cascade_world::{query, World};

/// Board in layout notation, one row per line.
pub(crate) fn board(world: &World) -> String {
    query::layout(world).to_string()
}

/// One-line summary of score, moves, outcome and targets.
pub(crate) fn status(world: &World) -> String {
    let mut line = format!(
        "score {} | moves {} | {}",
        query::score(world),
        query::moves_left(world),
        query::status(world).as_str()
    );
    let targets = query::targets_left(world);
    if !targets.is_empty() {
        line.push_str(" | targets");
        for target in targets {
            let _ = write!(line, " {}={}", target.key, target.remaining);
        }
    }
    line
}

/// Tally of the events produced by one command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TurnSummary {
    pub(crate) reverted: bool,
    pub(crate) destroyed: usize,
    pub(crate) spawned: usize,
    pub(crate) specials: usize,
    pub(crate) combos: usize,
    pub(crate) shuffles: usize,
    pub(crate) infections: usize,
    pub(crate) bonus_phase: bool,
}

impl TurnSummary {
    pub(crate) fn tally(events: &[Event]) -> Self {
        let mut summary = Self::default();
        for event in events {
            match event {
                Event::SwapReverted { .. } => summary.reverted = true,
                Event::TileDestroyed { .. } => summary.destroyed += 1,
                Event::TileSpawned { .. } => summary.spawned += 1,
                Event::TileTransformed { .. } => summary.specials += 1,
                Event::ComboTriggered { .. } => summary.combos += 1,
                Event::BoardShuffled { .. } => summary.shuffles += 1,
                Event::InfectionOccurred { .. } => summary.infections += 1,
                Event::BonusPhaseStarted { .. } => summary.bonus_phase = true,
                _ => {}
            }
        }
        summary
    }
}

impl fmt::Display for TurnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reverted {
            return write!(f, "no match, swap reverted");
        }
        write!(
            f,
            "destroyed {} | spawned {} | specials {}",
            self.destroyed, self.spawned, self.specials
        )?;
        if self.combos > 0 {
            write!(f, " | combos {}", self.combos)?;
        }
        if self.shuffles > 0 {
            write!(f, " | shuffles {}", self.shuffles)?;
        }
        if self.infections > 0 {
            write!(f, " | infections {}", self.infections)?;
        }
        if self.bonus_phase {
            write!(f, " | bonus phase")?;
        }
        Ok(())
    }
}

/// Header printed before a swap's outcome.
pub(crate) fn swap_header(index: usize, swap: SwapMove, hinted: bool) -> String {
    let source = if hinted { "hint" } else { "swap" };
    format!("#{index} {source} {} -> {}", swap.from, swap.to)
}
