//! A finite hex grid mapping in-bounds coordinates to cell values.

use std::collections::BTreeMap;

use rand::Rng;

use crate::cell::{Cell, State};
use crate::error::EngineError;
use crate::geometry::{Axial, Direction};

/// A finite mapping from in-bounds coordinate to cell value. Absent entries
/// and entries mapped to the empty state are equivalent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    radius: u32,
    cells: BTreeMap<(i32, i32), Cell>,
}

impl Grid {
    pub fn new(radius: u32) -> Self {
        Grid {
            radius,
            cells: BTreeMap::new(),
        }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn in_bounds(&self, coord: Axial) -> bool {
        coord.in_bounds(self.radius)
    }

    /// The cell at `coord`. Out-of-bounds coordinates read as empty, with no
    /// direction, matching the matcher's treatment of off-grid neighbors.
    pub fn get(&self, coord: Axial) -> Cell {
        self.cells
            .get(&(coord.q, coord.r))
            .cloned()
            .unwrap_or_else(Cell::empty)
    }

    pub fn neighbor(&self, coord: Axial, dir: Direction) -> Cell {
        self.get(coord.neighbor(dir))
    }

    /// Writes a cell, rejecting out-of-bounds coordinates (I2). Writing the
    /// empty cell removes the entry so the active count stays accurate.
    pub fn set(&mut self, coord: Axial, cell: Cell) -> Result<(), EngineError> {
        if !self.in_bounds(coord) {
            return Err(EngineError::Bounds {
                q: coord.q,
                r: coord.r,
                radius: self.radius,
            });
        }
        if cell.is_empty() {
            self.cells.remove(&(coord.q, coord.r));
        } else {
            self.cells.insert((coord.q, coord.r), cell);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// The number of non-empty cells.
    pub fn active_count(&self) -> usize {
        self.cells.len()
    }

    /// All in-bounds coordinates, in `(q, r)` lexicographic order — the
    /// stable iteration order the stepper relies on.
    pub fn coords(&self) -> Vec<Axial> {
        Axial::all_in_bounds(self.radius)
    }

    /// Every non-empty `(coordinate, cell)` pair, in lexicographic order.
    pub fn occupied(&self) -> Vec<(Axial, Cell)> {
        self.cells
            .iter()
            .map(|(&(q, r), cell)| (Axial::new(q, r), cell.clone()))
            .collect()
    }

    /// Independently writes each in-bounds coordinate with probability `p`,
    /// choosing uniformly among `states` and defaulting to direction `1`.
    pub fn randomize<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        states: &[State],
        p: f64,
    ) -> Result<(), EngineError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(EngineError::BadProbability(p));
        }
        if states.is_empty() {
            return Ok(());
        }
        for coord in self.coords() {
            if rng.gen_bool(p) {
                let idx = rng.gen_range(0..states.len());
                let state = states[idx].clone();
                let direction = if state.is_empty() {
                    None
                } else {
                    Direction::new(1)
                };
                self.set(coord, Cell { state, direction })?;
            } else {
                self.set(coord, Cell::empty())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_set_is_rejected() {
        let mut g = Grid::new(1);
        let err = g
            .set(Axial::new(5, 5), Cell::empty())
            .expect_err("out of bounds");
        assert!(matches!(err, EngineError::Bounds { .. }));
    }

    #[test]
    fn empty_write_clears_the_entry() {
        let mut g = Grid::new(1);
        let a = Axial::new(0, 0);
        g.set(
            a,
            Cell {
                state: State::Named("x".into()),
                direction: None,
            },
        )
        .unwrap();
        assert_eq!(g.active_count(), 1);
        g.set(a, Cell::empty()).unwrap();
        assert_eq!(g.active_count(), 0);
    }

    #[test]
    fn radius_one_has_seven_cells() {
        let g = Grid::new(1);
        assert_eq!(g.coords().len(), 7);
    }
}
