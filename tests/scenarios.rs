//! Integration tests exercising `World` and the preset rule set end to end,
//! covering the seed-pinned scenarios a pretty-printed rule summary would
//! show a user: an empty step, a pointing-based birth, direction
//! persistence and rotation under the source-any marker, an unpositioned
//! negation producing a random sibling direction, and one generation of the
//! `b3s23` totalistic preset on a three-cell hex triangle.

use std::collections::HashMap;

use hexidirect::cell::{Cell, State};
use hexidirect::geometry::{Axial, Direction};
use hexidirect::presets::expand_presets;
use hexidirect::world::World;

fn alive(name: &str, dir: Option<u32>) -> Cell {
    Cell {
        state: State::Named(name.into()),
        direction: dir.map(|d| Direction::new(d).unwrap()),
    }
}

#[test]
fn empty_step_is_a_no_op() {
    let mut w = World::new(2, 0).unwrap();
    w.set_cell(Axial::new(0, 0), alive("a", Some(1))).unwrap();
    let log = w.step();
    assert!(log.is_empty());
    assert_eq!(w.get_cell(Axial::new(0, 0)).unwrap(), alive("a", Some(1)));
}

#[test]
fn pointing_birth_creates_the_cell_the_source_points_at() {
    let mut w = World::new(2, 0).unwrap();
    w.replace_rules("_[t.] => a").unwrap();
    w.set_cell(Axial::new(0, 0), alive("t", Some(1))).unwrap();
    let log = w.step();
    assert_eq!(log.len(), 1);

    // (0,0) with direction 1 points at its own neighbor in direction 1,
    // which is (1,-1) under this grid's clockwise offset table — not
    // (0,-1); the offset table puts direction 1 at (dq,dr) = (1,-1).
    assert_eq!(w.get_cell(Axial::new(1, -1)).unwrap(), alive("a", None));
    assert_eq!(w.get_cell(Axial::new(0, 0)).unwrap(), alive("t", Some(1)));
    assert_eq!(w.get_cell(Axial::new(0, -1)).unwrap(), Cell::empty());
}

#[test]
fn direction_persists_when_the_source_is_constrained_by_the_matching_variant() {
    let mut w = World::new(2, 0).unwrap();
    w.replace_rules("a% => a%").unwrap();
    w.set_cell(Axial::new(0, 0), alive("a", Some(4))).unwrap();
    w.step();
    assert_eq!(w.get_cell(Axial::new(0, 0)).unwrap(), alive("a", Some(4)));
}

#[test]
fn rotation_advances_direction_by_the_stated_delta() {
    let mut w = World::new(2, 0).unwrap();
    w.replace_rules("a% => a%1").unwrap();
    w.set_cell(Axial::new(0, 0), alive("a", Some(6))).unwrap();
    w.step();
    assert_eq!(w.get_cell(Axial::new(0, 0)).unwrap(), alive("a", Some(1)));
}

#[test]
fn unpositioned_negation_assigns_some_direction_deterministically_for_a_seed() {
    // Unpositioned negation (`-a` with no explicit neighbor position) is
    // rejected by the parser; the six-sibling-variant forking this
    // scenario exercises requires pinning a position, e.g. `-1a`.
    let mut w = World::new(2, 0).unwrap();
    w.replace_rules("t[-1a] => t%").unwrap();
    w.set_cell(Axial::new(0, 0), Cell { state: State::Named("t".into()), direction: None })
        .unwrap();
    w.step();
    let after = w.get_cell(Axial::new(0, 0)).unwrap();
    assert_eq!(after.state, State::Named("t".into()));
    assert!(after.direction.is_some());

    // Same seed, same starting grid: the chosen direction is reproducible.
    let mut w2 = World::new(2, 0).unwrap();
    w2.replace_rules("t[-1a] => t%").unwrap();
    w2.set_cell(Axial::new(0, 0), Cell { state: State::Named("t".into()), direction: None })
        .unwrap();
    w2.step();
    assert_eq!(w2.get_cell(Axial::new(0, 0)).unwrap(), after);
}

#[test]
fn b3s23_triangle_survives_one_generation_with_no_births() {
    // Three mutually adjacent cells meet at a single grid vertex; at most
    // two of the three ever share a common empty neighbor (each vertex of
    // a hex grid touches exactly three hexagons, never four), so no empty
    // cell can see all three alive cells at once and the birth threshold
    // of exactly 3 alive neighbors is never reached. All three cells see
    // exactly 2 alive neighbors each, so all three survive unchanged and
    // no fourth cell is born.
    let mut w = World::new(5, 0).unwrap();
    w.replace_rules(&expand_presets("b3s23")).unwrap();
    let triangle = [Axial::new(0, 0), Axial::new(1, 0), Axial::new(0, 1)];
    for &c in &triangle {
        w.set_cell(c, alive("a", None)).unwrap();
    }
    w.step();

    for &c in &triangle {
        assert_eq!(w.get_cell(c).unwrap(), alive("a", None), "triangle member {:?} should survive", c);
    }
    assert_eq!(w.active_count(), 3);

    // Candidate birth sites adjacent to at least one triangle member never
    // reach the required 3-alive-neighbor threshold.
    for candidate in [
        Axial::new(1, -1),
        Axial::new(-1, 1),
        Axial::new(1, 1),
        Axial::new(-1, 0),
        Axial::new(0, -1),
        Axial::new(0, 2),
        Axial::new(-1, 2),
        Axial::new(2, -1),
        Axial::new(2, 0),
    ] {
        assert_eq!(w.get_cell(candidate).unwrap(), Cell::empty(), "no birth expected at {:?}", candidate);
    }
}

#[test]
fn a_cell_with_no_matching_rule_keeps_its_previous_value_exactly() {
    let mut w = World::new(2, 0).unwrap();
    w.replace_rules("x => y").unwrap();
    w.set_cell(Axial::new(0, 0), alive("a", Some(2))).unwrap();
    w.step();
    assert_eq!(w.get_cell(Axial::new(0, 0)).unwrap(), alive("a", Some(2)));
}

#[test]
fn radius_one_seven_cell_world_steps_cleanly_with_no_rules() {
    let mut w = World::new(1, 0).unwrap();
    for c in [
        Axial::new(0, 0),
        Axial::new(1, 0),
        Axial::new(1, -1),
        Axial::new(0, -1),
        Axial::new(-1, 0),
        Axial::new(-1, 1),
        Axial::new(0, 1),
    ] {
        w.set_cell(c, alive("a", None)).unwrap();
    }
    assert_eq!(w.active_count(), 7);
    let log = w.step();
    assert!(log.is_empty());
    assert_eq!(w.active_count(), 7);
}

#[test]
fn out_of_bounds_neighbors_behave_as_empty_for_condition_evaluation() {
    // A lone `a` at the rim of a radius-1 world has fewer than six
    // in-bounds neighbors; a birth rule requiring two specific adjacent
    // empty positions must still be able to match using off-grid "empty"
    // reads for the missing ones.
    let mut w = World::new(1, 0).unwrap();
    w.replace_rules("a[-1b][-2b] => a%").unwrap();
    w.set_cell(Axial::new(1, -1), alive("a", None)).unwrap();
    let log = w.step();
    assert_eq!(log.len(), 1);
    let after = w.get_cell(Axial::new(1, -1)).unwrap();
    assert_eq!(after.state, State::Named("a".into()));
    assert!(after.direction.is_some());
}

#[test]
fn snapshot_round_trips_through_a_fresh_world() {
    let mut w = World::new(2, 0).unwrap();
    w.replace_rules("a% => a%1").unwrap();
    w.set_cell(Axial::new(0, 0), alive("a", Some(3))).unwrap();
    w.set_cell(Axial::new(1, -1), alive("b", None)).unwrap();
    let snapshot = w.current_snapshot();

    let mut loaded = World::new(2, 1).unwrap();
    loaded.load_snapshot(&snapshot).unwrap();
    assert_eq!(loaded.get_cell(Axial::new(0, 0)).unwrap(), alive("a", Some(3)));
    assert_eq!(loaded.get_cell(Axial::new(1, -1)).unwrap(), alive("b", None));
    assert_eq!(loaded.rules_text(), "a% => a%1");
}

#[test]
fn macro_group_random_choice_is_roughly_uniform_over_many_seeds() {
    // Two sibling macro groups both always match a lone `a`; over many
    // independently seeded worlds the group chosen should split close to
    // evenly. This is a coarse sanity bound, not a strict chi-square test —
    // generous enough to never flake, tight enough to catch a stepper that
    // always picks the same group or the same rule within a group.
    let rules = "a => b\na => c";
    let trials = 2000u64;
    let mut counts: HashMap<&'static str, u32> = HashMap::new();
    counts.insert("b", 0);
    counts.insert("c", 0);

    for seed in 0..trials {
        let mut w = World::new(1, seed).unwrap();
        w.replace_rules(rules).unwrap();
        w.set_cell(Axial::new(0, 0), Cell { state: State::Named("a".into()), direction: None })
            .unwrap();
        w.step();
        match w.get_cell(Axial::new(0, 0)).unwrap().state {
            State::Named(s) if s == "b" => *counts.get_mut("b").unwrap() += 1,
            State::Named(s) if s == "c" => *counts.get_mut("c").unwrap() += 1,
            other => panic!("unexpected resulting state {:?}", other),
        }
    }

    let b = counts["b"];
    let c = counts["c"];
    assert_eq!(b + c, trials as u32);
    let low = (trials as f64 * 0.35) as u32;
    let high = (trials as f64 * 0.65) as u32;
    assert!(b >= low && b <= high, "group b chosen {} / {} times, expected roughly half", b, trials);
    assert!(c >= low && c <= high, "group c chosen {} / {} times, expected roughly half", c, trials);
}
