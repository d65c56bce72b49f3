//! The two-phase generation stepper: collect matches, then choose and apply.

use std::collections::BTreeMap;

use rand::Rng;

use crate::cell::Cell;
use crate::error::RuleEvalError;
use crate::expand::{ConcreteRule, TargetDirective};
use crate::geometry::{Axial, Direction};
use crate::grid::Grid;
use crate::matcher::rule_matches;

/// The result of advancing one generation: the new grid and a textual log.
pub struct StepOutcome {
    pub next_grid: Grid,
    pub log: Vec<String>,
}

/// Advances `grid` by one generation under `rules`, using `rng` to break
/// ties. The new grid is computed from `grid` alone — no cell sees another
/// cell's updated value within the same step.
pub fn step<R: Rng + ?Sized>(grid: &Grid, rules: &[ConcreteRule], rng: &mut R) -> StepOutcome {
    let mut next = Grid::new(grid.radius());
    let mut log = Vec::new();

    for coord in grid.coords() {
        let cell = grid.get(coord);
        match evaluate_cell(coord, &cell, grid, rules, rng) {
            Ok(Some((new_cell, entry))) => {
                log.push(entry);
                next.set(coord, new_cell)
                    .expect("coordinates from grid.coords() are always in bounds");
            }
            Ok(None) => {
                next.set(coord, cell)
                    .expect("coordinates from grid.coords() are always in bounds");
            }
            Err(e) => {
                log.push(e.to_string());
                next.set(coord, cell)
                    .expect("coordinates from grid.coords() are always in bounds");
            }
        }
    }

    StepOutcome {
        next_grid: next,
        log,
    }
}

/// Evaluates every rule against one cell. Returns `Ok(None)` when nothing
/// matches (the cell is left unchanged with no log entry), `Ok(Some(..))`
/// with the new value and a log line when a rule fired, or `Err` if
/// applying the chosen rule is internally inconsistent (the cell is left
/// unchanged, the step continues).
fn evaluate_cell<R: Rng + ?Sized>(
    coord: Axial,
    cell: &Cell,
    grid: &Grid,
    rules: &[ConcreteRule],
    rng: &mut R,
) -> Result<Option<(Cell, String)>, RuleEvalError> {
    let matches: Vec<&ConcreteRule> = rules
        .iter()
        .filter(|r| rule_matches(r, cell, |d| grid.neighbor(coord, d)))
        .collect();
    if matches.is_empty() {
        return Ok(None);
    }

    let mut by_group: BTreeMap<u32, Vec<&ConcreteRule>> = BTreeMap::new();
    for r in &matches {
        by_group.entry(r.group_id).or_default().push(r);
    }
    let group_ids: Vec<u32> = by_group.keys().copied().collect();
    let chosen_group = group_ids[rng.gen_range(0..group_ids.len())];
    let siblings = &by_group[&chosen_group];
    let chosen = siblings[rng.gen_range(0..siblings.len())];

    let new_cell = apply_rule(coord, cell, chosen, rng)?;
    let entry = format!(
        "{}: {} rule(s) matched across {} group(s); chose group {} -> {}{}",
        coord,
        matches.len(),
        group_ids.len(),
        chosen_group,
        new_cell.state,
        new_cell
            .direction
            .map(|d| format!(" dir {}", d))
            .unwrap_or_default(),
    );
    Ok(Some((new_cell, entry)))
}

fn apply_rule<R: Rng + ?Sized>(
    coord: Axial,
    cell: &Cell,
    rule: &ConcreteRule,
    rng: &mut R,
) -> Result<Cell, RuleEvalError> {
    let new_state = rule.target_state.clone();
    let new_direction = if new_state.is_empty() {
        None
    } else {
        resolve_direction(coord, cell, rule, rng)?
    };
    Ok(Cell {
        state: new_state,
        direction: new_direction,
    })
}

fn resolve_direction<R: Rng + ?Sized>(
    coord: Axial,
    cell: &Cell,
    rule: &ConcreteRule,
    rng: &mut R,
) -> Result<Option<Direction>, RuleEvalError> {
    match rule.target_directive {
        TargetDirective::None => Ok(None),
        TargetDirective::Fixed(d) => Ok(Some(d)),
        TargetDirective::Rotate(n) => match cell.direction {
            Some(d) => Ok(Some(d.rotate(n as i32))),
            None => Err(RuleEvalError {
                q: coord.q,
                r: coord.r,
                message: format!(
                    "rule in group {} resolved to a rotation but the matched cell has no direction",
                    rule.group_id
                ),
            }),
        },
        TargetDirective::RandomAny => {
            let idx = rng.gen_range(0..6);
            Ok(Some(Direction::all()[idx]))
        }
    }
}
