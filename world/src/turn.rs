//! Turn controller: swap validation, match and combo resolution, cascades,
//! deadlock repair, win evaluation and jelly infection.

use std::collections::BTreeSet;

use gem_cascade_core::{
    CellCoord, Combo, Event, Jelly, LevelStatus, MatchGroup, TargetKey, TileColor, TileId,
    TileKind, TurnPhase,
};
use gem_cascade_system_effects::{plan_combo, resolve, ResolutionScope};
use gem_cascade_system_gravity::{settle, GravityMove};
use gem_cascade_system_match_finder::find_matches;
use gem_cascade_system_move_finder::find_move;
use rand::seq::SliceRandom;

use crate::{
    World, ICE_POINTS, JELLY_POINTS, LOCK_POINTS, MAX_REPAIR_ROUNDS, MOVE_BONUS_POINTS,
    TILE_POINTS,
};

const MAX_CASCADE_PASSES: u32 = 256;
const MAX_BONUS_ROUNDS: u32 = 64;

/// Bookkeeping scoped to one turn, or to the setup of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Turn {
    multiplier: u64,
    jelly_cleared: bool,
    scoring: bool,
}

impl Turn {
    fn player() -> Self {
        Self {
            multiplier: 1,
            jelly_cleared: false,
            scoring: true,
        }
    }

    pub(crate) fn setup() -> Self {
        Self {
            multiplier: 1,
            jelly_cleared: false,
            scoring: false,
        }
    }
}

impl World {
    #[tracing::instrument(level = "debug", skip(self, out), fields(moves_left = self.moves_left))]
    pub(crate) fn request_swap(&mut self, from: CellCoord, to: CellCoord, out: &mut Vec<Event>) {
        if let Err(reason) = self.validate_swap(from, to) {
            tracing::debug!(reason, "rejected swap");
            return;
        }

        self.phase = TurnPhase::Resolving;
        let _ = self.board.swap(from, to);
        out.push(Event::TilesSwapped { from, to });

        let mut turn = Turn::player();
        let combo = match (self.board.tile(to), self.board.tile(from)) {
            (Some(dragged), Some(partner)) => Combo::classify(dragged, partner),
            _ => None,
        };

        if let Some(combo) = combo {
            self.moves_left -= 1;
            self.fire_combo(combo, to, from, &mut turn, out);
        } else {
            let groups = find_matches(&self.board);
            if groups.is_empty() {
                let _ = self.board.swap(from, to);
                out.push(Event::SwapReverted { from, to });
                self.phase = TurnPhase::Idle;
                tracing::debug!("swap produced nothing and was reverted");
                return;
            }
            self.moves_left -= 1;
            let hybrid: Vec<CellCoord> = [to, from]
                .into_iter()
                .filter(|cell| self.board.tile(*cell).is_some_and(|tile| tile.is_special()))
                .collect();
            self.resolve_matches(&groups, &[to, from], &hybrid, &mut turn, out);
        }

        self.cascade(&mut turn, out);
        if self.moves_left > 0 && !self.goal_reached() {
            self.stabilize(&mut turn, out);
        }
        self.finish_turn(&mut turn, out);
    }

    fn validate_swap(&self, from: CellCoord, to: CellCoord) -> Result<(), &'static str> {
        if self.phase != TurnPhase::Idle {
            return Err("turn in progress");
        }
        if self.status != LevelStatus::Playing {
            return Err("level finished");
        }
        if self.moves_left == 0 {
            return Err("no moves left");
        }
        if !self.board.contains(from) || !self.board.contains(to) {
            return Err("cell outside the grid");
        }
        if !from.is_adjacent(to) {
            return Err("cells are not adjacent");
        }
        let movable = |cell| self.board.tile(cell).is_some_and(|tile| tile.is_movable());
        if !movable(from) || !movable(to) {
            return Err("tile cannot move");
        }
        Ok(())
    }

    fn fire_combo(
        &mut self,
        combo: Combo,
        primary: CellCoord,
        partner: CellCoord,
        turn: &mut Turn,
        out: &mut Vec<Event>,
    ) {
        tracing::debug!(?combo, %primary, "combo triggered");
        out.push(Event::ComboTriggered {
            combo,
            cell: primary,
        });

        let mut scope = ResolutionScope::new();
        for cell in [primary, partner] {
            if let Some(tile) = self.board.tile(cell) {
                scope.spend(tile.id());
            }
        }

        let plan = plan_combo(&self.board, combo, primary, partner, &mut self.rng);
        for conversion in plan.conversions {
            let _ = self.transform(conversion.cell, conversion.kind, conversion.color, out);
        }
        self.detonate(&plan.triggers, &scope, turn, out);
    }

    /// Synthesizes specials for the groups, then destroys the remaining
    /// members together with any extra triggers.
    fn resolve_matches(
        &mut self,
        groups: &[MatchGroup],
        swapped: &[CellCoord],
        extra_triggers: &[CellCoord],
        turn: &mut Turn,
        out: &mut Vec<Event>,
    ) {
        let mut scope = ResolutionScope::new();
        let mut triggers = Vec::new();
        for plan in self.synthesizer.plan(groups, swapped) {
            if let Some(spawn) = plan.spawn {
                if let Some(tile) = self.transform(spawn.cell, spawn.kind, spawn.color, out) {
                    scope.protect(tile);
                }
            }
            triggers.extend(plan.consumed);
        }
        triggers.extend_from_slice(extra_triggers);
        self.detonate(&triggers, &scope, turn, out);
    }

    fn transform(
        &mut self,
        cell: CellCoord,
        kind: TileKind,
        color: Option<TileColor>,
        out: &mut Vec<Event>,
    ) -> Option<TileId> {
        if !self.board.transform(cell, kind, color) {
            return None;
        }
        let tile = self.board.tile(cell)?.id();
        out.push(Event::TileTransformed {
            tile,
            cell,
            kind,
            color,
        });
        Some(tile)
    }

    /// Runs the effect resolver on the triggers and applies the outcome.
    fn detonate(
        &mut self,
        triggers: &[CellCoord],
        scope: &ResolutionScope,
        turn: &mut Turn,
        out: &mut Vec<Event>,
    ) {
        let blast = resolve(&self.board, triggers, scope);

        for cell in blast.destroyed {
            let Some(tile) = self.board.remove(cell) else {
                continue;
            };
            let key = match tile.kind() {
                TileKind::Normal => tile.color().map(TargetKey::Color),
                TileKind::Wood => Some(TargetKey::Wood),
                TileKind::Stone => None,
                special => special.special_kind().map(TargetKey::Special),
            };
            self.collect(turn, key, TILE_POINTS);
            out.push(Event::TileDestroyed {
                tile: tile.id(),
                cell,
                kind: tile.kind(),
                color: tile.color(),
            });
            if self.board.crack_ice(cell) {
                self.collect(turn, Some(TargetKey::Ice), ICE_POINTS);
                out.push(Event::IceCracked { cell });
            }
        }

        for cell in blast.unlocked {
            if self.board.unlock(cell) {
                self.collect(turn, Some(TargetKey::Lock), LOCK_POINTS);
                out.push(Event::TileUnlocked { cell });
            }
        }

        for cell in blast.stripped {
            if let Some(jelly) = self.board.strip_jelly(cell) {
                turn.jelly_cleared = true;
                self.collect(turn, Some(TargetKey::Jelly), JELLY_POINTS);
                out.push(Event::JellyStripped { cell, jelly });
            }
        }

        out.push(self.state_event());
    }

    fn collect(&mut self, turn: &Turn, key: Option<TargetKey>, points: u64) {
        if !turn.scoring {
            return;
        }
        self.score = self
            .score
            .saturating_add(points.saturating_mul(turn.multiplier));
        if let Some(key) = key {
            self.targets.collect(key, 1);
        }
    }

    /// Refills the board and resolves new matches until none remain.
    pub(crate) fn cascade(&mut self, turn: &mut Turn, out: &mut Vec<Event>) {
        for _ in 0..MAX_CASCADE_PASSES {
            self.refill(out);
            let groups = find_matches(&self.board);
            if groups.is_empty() {
                return;
            }
            turn.multiplier += 1;
            tracing::trace!(multiplier = turn.multiplier, groups = groups.len(), "cascade");
            self.resolve_matches(&groups, &[], &[], turn, out);
        }
        tracing::warn!(passes = MAX_CASCADE_PASSES, "cascade did not settle");
    }

    fn refill(&mut self, out: &mut Vec<Event>) {
        let settlement = settle(&mut self.board, self.level.colors(), &mut self.rng);
        out.extend(settlement.moves.into_iter().map(|step| match step {
            GravityMove::Fall { tile, from, to } => Event::TileFell { tile, from, to },
            GravityMove::Spawn { tile, cell, color } => Event::TileSpawned {
                tile,
                cell,
                kind: TileKind::Normal,
                color: Some(color),
            },
        }));
    }

    /// Repairs deadlocks until a productive swap exists, resolving any
    /// matches a shuffle creates along the way.
    pub(crate) fn stabilize(&mut self, turn: &mut Turn, out: &mut Vec<Event>) {
        for round in 0..MAX_REPAIR_ROUNDS {
            self.phase = TurnPhase::DeadlockCheck;
            let Some(repair) =
                self.guard
                    .ensure_playable(&mut self.board, self.level.colors(), &mut self.rng)
            else {
                return;
            };

            tracing::info!(
                round,
                relocated = repair.relocations.len(),
                "shuffled deadlocked board"
            );
            out.push(Event::BoardShuffled {
                relocations: repair.relocations,
            });
            if let Some(bonus) = repair.bonus {
                tracing::info!(kind = ?bonus.kind, cell = %bonus.cell, "granted bonus special");
                out.push(Event::BonusSpecialGranted {
                    cell: bonus.cell,
                    kind: bonus.kind,
                });
            }

            self.phase = TurnPhase::Resolving;
            self.cascade(turn, out);
        }

        self.phase = TurnPhase::DeadlockCheck;
        if find_move(&self.board).is_none() {
            tracing::warn!(
                rounds = MAX_REPAIR_ROUNDS,
                "board still has no productive swap after repair"
            );
        }
    }

    fn goal_reached(&self) -> bool {
        if self.targets.is_empty() {
            self.score >= self.level.score_threshold()
        } else {
            self.targets.all_met()
        }
    }

    fn finish_turn(&mut self, turn: &mut Turn, out: &mut Vec<Event>) {
        if self.goal_reached() {
            self.run_bonus_phase(turn, out);
            return;
        }

        if !turn.jelly_cleared && self.spread_infection(out) && self.moves_left > 0 {
            self.stabilize(turn, out);
        }

        if self.moves_left == 0 {
            self.status = LevelStatus::Lost;
            self.phase = TurnPhase::Lost;
            tracing::info!(score = self.score, "level lost");
        } else {
            self.phase = TurnPhase::Idle;
        }
        out.push(self.state_event());
    }

    /// Detonates every remaining special with synthesis disabled, then
    /// converts unused moves into score.
    fn run_bonus_phase(&mut self, turn: &mut Turn, out: &mut Vec<Event>) {
        tracing::info!(moves_left = self.moves_left, "bonus phase started");
        out.push(Event::BonusPhaseStarted {
            moves_left: self.moves_left,
        });
        self.phase = TurnPhase::Resolving;
        self.synthesizer.set_enabled(false);

        for _ in 0..MAX_BONUS_ROUNDS {
            let specials: Vec<CellCoord> = self
                .board
                .tiles()
                .filter(|tile| tile.is_special())
                .map(|tile| tile.position())
                .collect();
            if specials.is_empty() {
                break;
            }
            self.detonate(&specials, &ResolutionScope::new(), turn, out);
            self.cascade(turn, out);
        }

        self.score = self
            .score
            .saturating_add(u64::from(self.moves_left).saturating_mul(MOVE_BONUS_POINTS));
        self.moves_left = 0;
        self.status = LevelStatus::Won;
        self.phase = TurnPhase::Won;
        tracing::info!(score = self.score, "level won");
        out.push(self.state_event());
    }

    /// Spreads infectious jelly onto one random eligible neighbor.
    fn spread_infection(&mut self, out: &mut Vec<Event>) -> bool {
        let mut candidates = BTreeSet::new();
        for source in self
            .board
            .tiles()
            .filter(|tile| tile.jelly() == Some(Jelly::Infectious))
        {
            for neighbor in self.board.neighbors(source.position()) {
                let eligible = self.board.tile(neighbor).is_some_and(|tile| {
                    tile.kind() == TileKind::Normal && !tile.is_locked() && tile.jelly().is_none()
                });
                if eligible {
                    let _ = candidates.insert(neighbor);
                }
            }
        }

        let candidates: Vec<CellCoord> = candidates.into_iter().collect();
        let Some(cell) = candidates.choose(&mut self.rng).copied() else {
            return false;
        };
        self.board.set_jelly(cell, Some(Jelly::Infectious));
        let raised = self.targets.raise(TargetKey::Jelly);
        tracing::debug!(%cell, raised, "infection spread");
        out.push(Event::InfectionOccurred { cell });
        true
    }
}
