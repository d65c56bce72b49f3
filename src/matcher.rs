//! Decides whether a concrete rule applies to a given cell.

use crate::cell::Cell;
use crate::expand::{ConcreteCondition, ConcreteRule, OrientReq};
use crate::geometry::Direction;

/// Whether `rule` matches `cell`, given a way to read its neighbors.
/// `neighbor(d)` must return the empty cell for an out-of-bounds position.
pub fn rule_matches<F>(rule: &ConcreteRule, cell: &Cell, neighbor: F) -> bool
where
    F: Fn(Direction) -> Cell,
{
    if cell.state != rule.src_state || cell.direction != rule.src_direction {
        return false;
    }
    rule.conditions
        .iter()
        .enumerate()
        .all(|(i, slot)| match slot {
            None => true,
            Some(cond) => {
                let position = Direction::new((i + 1) as u32).expect("index 0..6 maps to 1..6");
                condition_satisfied(cond, &neighbor(position))
            }
        })
}

fn condition_satisfied(cond: &ConcreteCondition, neighbor: &Cell) -> bool {
    if cond.negated {
        neighbor.state != cond.state
    } else {
        if neighbor.state != cond.state {
            return false;
        }
        match cond.orient {
            OrientReq::Any => true,
            OrientReq::Dir(d) => neighbor.direction == Some(d),
            OrientReq::AnyDirection => neighbor.direction.is_some(),
        }
    }
}
