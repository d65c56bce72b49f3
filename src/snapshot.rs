//! The world snapshot JSON schema: radius, rule source text, and the
//! sequence of non-empty cells. See `spec.md` §6.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cell::{Cell, SnapshotCell, State};
use crate::error::EngineError;
use crate::geometry::{Axial, Direction};
use crate::grid::Grid;

/// A world's persistable state. Unknown JSON keys are ignored on read
/// (serde's default for a struct without `deny_unknown_fields`); writes
/// emit exactly these three keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub radius: u32,
    pub rules_text: String,
    pub cells: Vec<SnapshotCell>,
}

impl WorldSnapshot {
    /// Captures every non-empty cell of `grid`, in the grid's own
    /// lexicographic iteration order.
    pub fn capture(radius: u32, rules_text: &str, grid: &Grid) -> WorldSnapshot {
        let cells = grid
            .occupied()
            .into_iter()
            .map(|(coord, cell)| SnapshotCell {
                q: coord.q,
                r: coord.r,
                state: cell.state.to_string(),
                direction: cell.direction.map(Direction::get),
            })
            .collect();
        WorldSnapshot {
            radius,
            rules_text: rules_text.to_string(),
            cells,
        }
    }

    /// Rebuilds a grid from this snapshot. Cells outside `[-radius, radius]`
    /// bounds are dropped with a warning, matching "loading validates
    /// bounds and drops out-of-range cells" (`spec.md` §6); cells whose
    /// state or direction text is malformed are dropped the same way.
    pub fn to_grid(&self) -> Result<Grid, EngineError> {
        if self.radius == 0 {
            return Err(EngineError::InvalidRadius(self.radius));
        }
        let mut grid = Grid::new(self.radius);
        for sc in &self.cells {
            let coord = Axial::new(sc.q, sc.r);
            if !coord.in_bounds(self.radius) {
                warn!(q = sc.q, r = sc.r, radius = self.radius, "dropping out-of-bounds snapshot cell");
                continue;
            }
            let state = match State::parse(&sc.state) {
                Ok(s) => s,
                Err(kind) => {
                    warn!(q = sc.q, r = sc.r, state = %sc.state, error = %kind, "dropping snapshot cell with malformed state");
                    continue;
                }
            };
            let direction = match sc.direction {
                None => None,
                Some(d) => match Direction::new(d as u32) {
                    Some(dir) => Some(dir),
                    None => {
                        warn!(q = sc.q, r = sc.r, direction = d, "dropping snapshot cell with malformed direction");
                        continue;
                    }
                },
            };
            let cell = match Cell::new(state, direction) {
                Ok(c) => c,
                Err(kind) => {
                    warn!(q = sc.q, r = sc.r, error = %kind, "dropping snapshot cell violating cell invariants");
                    continue;
                }
            };
            grid.set(coord, cell)
                .expect("bounds already checked above");
        }
        Ok(grid)
    }

    /// Serializes to the canonical JSON text.
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::Io(e.to_string()))
    }

    /// Parses the canonical JSON text.
    pub fn from_json(text: &str) -> Result<WorldSnapshot, EngineError> {
        serde_json::from_str(text).map_err(|e| EngineError::Io(e.to_string()))
    }
}
