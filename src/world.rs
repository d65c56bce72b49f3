//! The world façade: current grid, compiled rules, history ring, and RNG.
//!
//! See DESIGN.md and `SPEC_FULL.md` §4.7 for how the history ring's cursor
//! semantics were pinned down: the cursor is a read pointer over archived
//! *pre-step* grids plus the live grid, never a branch point. `step`
//! always advances the live grid, regardless of where the cursor points.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::cell::{Cell, State};
use crate::error::{EngineError, ParseError};
use crate::expand::{expand_ruleset, ConcreteRule};
use crate::geometry::Axial;
use crate::grid::Grid;
use crate::parser::parse_ruleset;
use crate::snapshot::WorldSnapshot;
use crate::stepper::step as step_grid;

/// How many generations the history ring retains before evicting the
/// oldest. Chosen generously for an interactive session; not a spec
/// requirement beyond "bounded".
pub const HISTORY_CAPACITY: usize = 256;

/// One archived generation: the grid before a step was applied, and the
/// log that step produced.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub grid: Grid,
    pub log: Vec<String>,
}

/// A single entry in `World::history_entries`: a generation index plus
/// the active-cell count at that generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistorySummary {
    pub index: usize,
    pub active_count: usize,
}

/// Holds one simulation's grid, compiled rules, source text, history ring,
/// and RNG. Operations never panic; failures are reported as `EngineError`
/// or `ParseError` and leave the world in its previous valid state.
pub struct World {
    radius: u32,
    rules_text: String,
    rules: Vec<ConcreteRule>,
    grid: Grid,
    history: VecDeque<HistoryEntry>,
    history_base: usize,
    cursor: usize,
    rng: StdRng,
}

impl World {
    /// Creates an empty world of the given radius with no rules, seeded
    /// deterministically from `seed` (tests pin this; an embedding can
    /// otherwise seed from entropy before constructing).
    pub fn new(radius: u32, seed: u64) -> Result<World, EngineError> {
        if radius == 0 {
            return Err(EngineError::InvalidRadius(radius));
        }
        info!(radius, seed, "creating world");
        Ok(World {
            radius,
            rules_text: String::new(),
            rules: Vec::new(),
            grid: Grid::new(radius),
            history: VecDeque::new(),
            history_base: 0,
            cursor: 0,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn rules_text(&self) -> &str {
        &self.rules_text
    }

    pub fn active_count(&self) -> usize {
        self.grid.active_count()
    }

    /// The live grid's own generation number (not yet archived).
    pub fn tip_index(&self) -> usize {
        self.history_base + self.history.len()
    }

    /// The grid currently materialized at the cursor: the live grid when
    /// the cursor is at the tip, or an archived pre-step grid otherwise.
    fn viewed_grid(&self) -> &Grid {
        if self.cursor == self.tip_index() {
            &self.grid
        } else {
            &self.history[self.cursor - self.history_base].grid
        }
    }

    /// Re-parses and re-expands `text` into the compiled rule set. On
    /// failure the previous rule set and source text are kept, matching
    /// `spec.md` §7: "engine retains previous rule set and logs".
    pub fn replace_rules(&mut self, text: &str) -> Result<(), ParseError> {
        match self.try_compile(text) {
            Ok(concrete) => {
                debug!(rules = concrete.len(), "compiled rule set replaced");
                self.rules_text = text.to_string();
                self.rules = concrete;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "rule replacement rejected; keeping previous rule set");
                Err(e)
            }
        }
    }

    fn try_compile(&self, text: &str) -> Result<Vec<ConcreteRule>, ParseError> {
        let abstract_rules = parse_ruleset(text)?;
        expand_ruleset(&abstract_rules)
    }

    /// Reads the cell at `coord`. Out-of-bounds coordinates are rejected.
    pub fn get_cell(&self, coord: Axial) -> Result<Cell, EngineError> {
        if !self.grid.in_bounds(coord) {
            return Err(EngineError::Bounds {
                q: coord.q,
                r: coord.r,
                radius: self.radius,
            });
        }
        Ok(self.grid.get(coord))
    }

    /// Writes the cell at `coord` on the live grid.
    pub fn set_cell(&mut self, coord: Axial, cell: Cell) -> Result<(), EngineError> {
        self.grid.set(coord, cell)
    }

    /// Clears every cell on the live grid.
    pub fn clear(&mut self) {
        self.grid.clear();
    }

    /// Independently writes each in-bounds coordinate of the live grid with
    /// probability `p`, choosing uniformly among `states`.
    pub fn randomize(&mut self, states: &[State], p: f64) -> Result<(), EngineError> {
        self.grid.randomize(&mut self.rng, states, p)
    }

    /// Advances the live grid by one generation. Always operates on the
    /// live grid, regardless of cursor position; always appends a fresh
    /// history entry and moves the cursor to the new tip.
    ///
    /// A rule set that failed to compile (an empty `rules` from a prior
    /// `replace_rules` error) produces a no-op step with a single log
    /// line, per `spec.md` §4.6: "Parser failures short-circuit the step".
    pub fn step(&mut self) -> Vec<String> {
        let outcome = step_grid(&self.grid, &self.rules, &mut self.rng);
        let pre_step_grid = std::mem::replace(&mut self.grid, outcome.next_grid);
        self.history.push_back(HistoryEntry {
            grid: pre_step_grid,
            log: outcome.log.clone(),
        });
        if self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
            self.history_base += 1;
            warn!(history_base = self.history_base, "history ring evicted its oldest generation");
        }
        self.cursor = self.tip_index();
        debug!(generation = self.cursor, "stepped");
        outcome.log
    }

    /// Moves the cursor one generation back, if possible.
    pub fn prev(&mut self) -> Result<(), EngineError> {
        self.go(self.cursor.saturating_sub(1).max(self.history_base))
    }

    /// Moves the cursor one generation forward, if possible.
    pub fn next(&mut self) -> Result<(), EngineError> {
        self.go((self.cursor + 1).min(self.tip_index()))
    }

    /// Moves the cursor to generation `index`, which must be within
    /// `[history_base, tip_index]`.
    pub fn go(&mut self, index: usize) -> Result<(), EngineError> {
        if index < self.history_base || index > self.tip_index() {
            return Err(EngineError::HistoryNotFound(index));
        }
        self.cursor = index;
        Ok(())
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// A snapshot of the grid currently materialized at the cursor.
    pub fn current_snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(self.radius, &self.rules_text, self.viewed_grid())
    }

    /// Lists every retained generation, oldest first, including the live
    /// tip.
    pub fn history_entries(&self) -> Vec<HistorySummary> {
        let mut out: Vec<HistorySummary> = self
            .history
            .iter()
            .enumerate()
            .map(|(i, entry)| HistorySummary {
                index: self.history_base + i,
                active_count: entry.grid.active_count(),
            })
            .collect();
        out.push(HistorySummary {
            index: self.tip_index(),
            active_count: self.grid.active_count(),
        });
        out
    }

    /// The snapshot archived (or live) at generation `index`.
    pub fn snapshot_at(&self, index: usize) -> Result<WorldSnapshot, EngineError> {
        if index == self.tip_index() {
            return Ok(WorldSnapshot::capture(self.radius, &self.rules_text, &self.grid));
        }
        if index < self.history_base || index >= self.tip_index() {
            return Err(EngineError::HistoryNotFound(index));
        }
        let entry = &self.history[index - self.history_base];
        Ok(WorldSnapshot::capture(self.radius, &self.rules_text, &entry.grid))
    }

    /// The log produced by the step taken *from* generation `index`. The
    /// live tip has no such log yet (no step has left it), so this
    /// returns an empty slice for `index == tip_index()`.
    pub fn log_at(&self, index: usize) -> Result<&[String], EngineError> {
        if index == self.tip_index() {
            return Ok(&[]);
        }
        if index < self.history_base {
            return Err(EngineError::HistoryNotFound(index));
        }
        self.history
            .get(index - self.history_base)
            .map(|e| e.log.as_slice())
            .ok_or(EngineError::HistoryNotFound(index))
    }

    /// Replaces the live grid and rule source from a snapshot, without
    /// touching history. Used to load a persisted world.
    pub fn load_snapshot(&mut self, snapshot: &WorldSnapshot) -> Result<(), EngineError> {
        let grid = snapshot.to_grid()?;
        if grid.radius() != self.radius {
            return Err(EngineError::RadiusMismatch {
                expected: self.radius,
                found: grid.radius(),
            });
        }
        self.grid = grid;
        if let Err(err) = self.replace_rules(&snapshot.rules_text) {
            return Err(EngineError::Io(err.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::State;

    fn world_with_rules(radius: u32, seed: u64, rules: &str) -> World {
        let mut w = World::new(radius, seed).unwrap();
        w.replace_rules(rules).unwrap();
        w
    }

    #[test]
    fn empty_step_is_a_no_op_and_logs_nothing() {
        let mut w = world_with_rules(2, 0, "");
        w.set_cell(
            Axial::new(0, 0),
            Cell {
                state: State::Named("a".into()),
                direction: crate::geometry::Direction::new(1),
            },
        )
        .unwrap();
        let log = w.step();
        assert!(log.is_empty());
        assert_eq!(w.get_cell(Axial::new(0, 0)).unwrap().state, State::Named("a".into()));
    }

    #[test]
    fn history_grows_and_cursor_tracks_tip() {
        let mut w = world_with_rules(2, 0, "a% => a%1");
        w.set_cell(
            Axial::new(0, 0),
            Cell {
                state: State::Named("a".into()),
                direction: crate::geometry::Direction::new(1),
            },
        )
        .unwrap();
        assert_eq!(w.tip_index(), 0);
        w.step();
        assert_eq!(w.tip_index(), 1);
        assert_eq!(w.cursor(), 1);
        w.step();
        assert_eq!(w.tip_index(), 2);
        assert_eq!(w.history_entries().len(), 3); // generations 0, 1 archived + tip 2
    }

    #[test]
    fn prev_and_go_restore_archived_generations_without_losing_entries() {
        let mut w = world_with_rules(2, 0, "a% => a%1");
        w.set_cell(
            Axial::new(0, 0),
            Cell {
                state: State::Named("a".into()),
                direction: crate::geometry::Direction::new(1),
            },
        )
        .unwrap();
        w.step();
        w.step();
        let tip = w.tip_index();
        w.prev().unwrap();
        assert_eq!(w.cursor(), tip - 1);
        let archived = w.current_snapshot();
        assert_eq!(archived.radius, 2);
        w.go(0).unwrap();
        assert_eq!(w.cursor(), 0);
        assert_eq!(w.history_entries().len(), tip + 1);
        w.next().unwrap();
        assert_eq!(w.cursor(), 1);
    }

    #[test]
    fn go_out_of_range_is_rejected() {
        let mut w = world_with_rules(1, 0, "");
        let err = w.go(5).unwrap_err();
        assert!(matches!(err, EngineError::HistoryNotFound(5)));
    }

    #[test]
    fn replace_rules_keeps_previous_set_on_parse_failure() {
        let mut w = world_with_rules(2, 0, "a% => a%1");
        let before = w.rules_text().to_string();
        let err = w.replace_rules("a3 => b");
        assert!(err.is_err());
        assert_eq!(w.rules_text(), before);
    }
}
