//! The macro expander: rewrites abstract rules into concrete rules.
//!
//! See DESIGN.md for the resolution of two spots where the prose spec is
//! ambiguous: how position collisions among *unpositioned* conditions are
//! handled (kept distinct via permutation, not merged), and how `z.K`
//! pointing-transfer targets resolve (statically, at expansion time, since
//! the pointing orientation already pins the neighbor's direction).

use std::collections::HashSet;

use crate::ast::{AbstractRule, Alternative, BracketGroup, Orient, SourceDirection, TargetDirectiveSpec};
use crate::cell::State;
use crate::error::{ParseError, ParseErrorKind};
use crate::geometry::Direction;

/// A condition's direction requirement, with `PointingToCenter` already
/// resolved to a literal direction for the position it ended up at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrientReq {
    Any,
    Dir(Direction),
    AnyDirection,
}

/// A fully positioned condition on one of the six neighbor slots.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConcreteCondition {
    pub negated: bool,
    pub state: State,
    pub orient: OrientReq,
    /// Whether this condition came from an (unnegated) pointing marker —
    /// a candidate source for a `z.K` target's direction transfer.
    pub from_pointing: bool,
}

/// The target direction, fully resolved against one concrete source
/// direction variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetDirective {
    None,
    Fixed(Direction),
    /// Rotate the source direction clockwise by this many steps.
    Rotate(u32),
    /// The source had no direction and the target asked for one anyway;
    /// picked uniformly at random at apply time.
    RandomAny,
}

/// A rule after macro expansion: a source with a literal direction (or
/// none), six positioned condition slots, and a resolved target.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConcreteRule {
    pub group_id: u32,
    pub src_state: State,
    pub src_direction: Option<Direction>,
    /// Index `i` holds the condition at position `i + 1`.
    pub conditions: [Option<ConcreteCondition>; 6],
    pub target_state: State,
    pub target_directive: TargetDirective,
}

fn condition_from_alt(alt: &Alternative, position: u8) -> ConcreteCondition {
    let orient = match alt.orient {
        Orient::Any => OrientReq::Any,
        Orient::Fixed(d) => OrientReq::Dir(d),
        Orient::AnyDirection => OrientReq::AnyDirection,
        Orient::PointingToCenter => {
            OrientReq::Dir(Direction::new(position as u32).unwrap().back())
        }
    };
    let from_pointing = !alt.negated && alt.orient == Orient::PointingToCenter;
    ConcreteCondition {
        negated: alt.negated,
        state: alt.state.clone(),
        orient,
        from_pointing,
    }
}

fn merge_orient(a: OrientReq, b: OrientReq) -> Option<OrientReq> {
    use OrientReq::*;
    match (a, b) {
        (Any, Any) => Some(Any),
        (Any, x) | (x, Any) => Some(x),
        (AnyDirection, AnyDirection) => Some(AnyDirection),
        (AnyDirection, Dir(d)) | (Dir(d), AnyDirection) => Some(Dir(d)),
        (Dir(d1), Dir(d2)) => {
            if d1 == d2 {
                Some(Dir(d1))
            } else {
                None
            }
        }
    }
}

/// Merges two conditions that landed on the same position. Returns `None`
/// if they cannot be jointly satisfied by a single neighbor state.
fn merge_conditions(a: &ConcreteCondition, b: &ConcreteCondition) -> Option<ConcreteCondition> {
    let from_pointing = a.from_pointing || b.from_pointing;
    if a.negated && b.negated {
        if a.state == b.state {
            Some(ConcreteCondition {
                from_pointing,
                ..a.clone()
            })
        } else {
            None
        }
    } else if !a.negated && !b.negated {
        if a.state != b.state {
            return None;
        }
        let orient = merge_orient(a.orient, b.orient)?;
        Some(ConcreteCondition {
            negated: false,
            state: a.state.clone(),
            orient,
            from_pointing,
        })
    } else {
        let (pos, neg) = if a.negated { (b, a) } else { (a, b) };
        if pos.state == neg.state {
            None
        } else {
            Some(ConcreteCondition {
                from_pointing,
                ..pos.clone()
            })
        }
    }
}

fn flatten_groups(groups: &[BracketGroup]) -> Vec<Vec<Alternative>> {
    let mut flat = Vec::new();
    for g in groups {
        for _ in 0..g.repeat {
            flat.push(g.alternatives.clone());
        }
    }
    flat
}

fn cartesian_alts(groups: &[Vec<Alternative>]) -> Vec<Vec<Alternative>> {
    let mut result: Vec<Vec<Alternative>> = vec![Vec::new()];
    for g in groups {
        let mut next = Vec::with_capacity(result.len() * g.len());
        for combo in &result {
            for alt in g {
                let mut c = combo.clone();
                c.push(alt.clone());
                next.push(c);
            }
        }
        result = next;
    }
    result
}

/// All length-`k` permutations (order matters) of `items`.
fn permutations(items: &[u8], k: usize) -> Vec<Vec<u8>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    let mut out = Vec::new();
    for (i, &item) in items.iter().enumerate() {
        let mut rest = items.to_vec();
        rest.remove(i);
        for mut tail in permutations(&rest, k - 1) {
            let mut v = vec![item];
            v.append(&mut tail);
            out.push(v);
        }
    }
    out
}

fn resolve_target(
    spec: TargetDirectiveSpec,
    src_dir: Option<Direction>,
    conditions: &[Option<ConcreteCondition>; 6],
) -> Option<TargetDirective> {
    match spec {
        TargetDirectiveSpec::None => Some(TargetDirective::None),
        TargetDirectiveSpec::Fixed(d) => Some(TargetDirective::Fixed(d)),
        TargetDirectiveSpec::Rotate(n) => {
            if src_dir.is_some() {
                Some(TargetDirective::Rotate(n))
            } else {
                Some(TargetDirective::RandomAny)
            }
        }
        TargetDirectiveSpec::PointTransfer(k) => {
            for (i, c) in conditions.iter().enumerate() {
                if let Some(cond) = c {
                    if cond.from_pointing {
                        let position = (i + 1) as u32;
                        let back = Direction::new(position).unwrap().back();
                        return Some(TargetDirective::Fixed(back.rotate(k as i32)));
                    }
                }
            }
            None
        }
    }
}

/// Expands one abstract rule into its concrete siblings.
pub fn expand_rule(rule: &AbstractRule) -> Result<Vec<ConcreteRule>, ParseErrorKind> {
    if let TargetDirectiveSpec::PointTransfer(_) = rule.target.directive {
        let has_pointing = rule.groups.iter().any(|g| {
            g.alternatives
                .iter()
                .any(|a| !a.negated && a.orient == Orient::PointingToCenter)
        });
        if !has_pointing {
            return Err(ParseErrorKind::NoPointingSource);
        }
    }

    let flat_groups = flatten_groups(&rule.groups);
    if flat_groups.len() > 6 {
        return Err(ParseErrorKind::TooManyConditions);
    }
    let alt_combos = cartesian_alts(&flat_groups);
    let src_variants: Vec<Option<Direction>> = match rule.src_direction {
        SourceDirection::None => vec![None],
        SourceDirection::Fixed(d) => vec![Some(d)],
        SourceDirection::Any => Direction::all().iter().map(|d| Some(*d)).collect(),
    };

    let mut results: HashSet<ConcreteRule> = HashSet::new();

    for combo in &alt_combos {
        let mut explicit: [Option<ConcreteCondition>; 6] = [None, None, None, None, None, None];
        let mut unpositioned: Vec<&Alternative> = Vec::new();
        let mut conflict = false;

        for alt in combo {
            if let Some(p) = alt.position {
                let idx = (p.get() - 1) as usize;
                let cond = condition_from_alt(alt, p.get());
                match &explicit[idx] {
                    None => explicit[idx] = Some(cond),
                    Some(existing) => match merge_conditions(existing, &cond) {
                        Some(merged) => explicit[idx] = Some(merged),
                        None => {
                            conflict = true;
                            break;
                        }
                    },
                }
            } else {
                unpositioned.push(alt);
            }
        }
        if conflict {
            continue;
        }

        let free: Vec<u8> = (1..=6u8)
            .filter(|p| explicit[(*p - 1) as usize].is_none())
            .collect();
        if unpositioned.len() > free.len() {
            continue;
        }

        let mut seen_for_combo: HashSet<[Option<ConcreteCondition>; 6]> = HashSet::new();
        for perm in permutations(&free, unpositioned.len()) {
            let mut conditions = explicit.clone();
            for (i, alt) in unpositioned.iter().enumerate() {
                let p = perm[i];
                conditions[(p - 1) as usize] = Some(condition_from_alt(alt, p));
            }
            if !seen_for_combo.insert(conditions.clone()) {
                continue;
            }
            for src_dir in &src_variants {
                if let Some(directive) = resolve_target(rule.target.directive, *src_dir, &conditions)
                {
                    results.insert(ConcreteRule {
                        group_id: rule.group_id,
                        src_state: rule.src_state.clone(),
                        src_direction: *src_dir,
                        conditions: conditions.clone(),
                        target_state: rule.target.state.clone(),
                        target_directive: directive,
                    });
                }
            }
        }
    }

    Ok(results.into_iter().collect())
}

/// Expands every abstract rule, in order, into the full concrete rule set.
pub fn expand_ruleset(rules: &[AbstractRule]) -> Result<Vec<ConcreteRule>, ParseError> {
    let mut out = Vec::new();
    for rule in rules {
        match expand_rule(rule) {
            Ok(mut concrete) => out.append(&mut concrete),
            Err(kind) => {
                return Err(ParseError {
                    rule_index: rule.group_id as usize,
                    offset: 0,
                    kind,
                })
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_ruleset;

    fn expand_source(src: &str) -> Vec<ConcreteRule> {
        let rules = parse_ruleset(src).unwrap();
        expand_ruleset(&rules).unwrap()
    }

    #[test]
    fn any_source_direction_forks_into_six() {
        let concrete = expand_source("a% => a%");
        assert_eq!(concrete.len(), 6);
        let dirs: HashSet<_> = concrete.iter().map(|c| c.src_direction).collect();
        assert_eq!(dirs.len(), 6);
    }

    #[test]
    fn bare_percent_with_no_source_direction_is_random() {
        let concrete = expand_source("t[-1a] => t%");
        assert_eq!(concrete.len(), 1);
        assert_eq!(concrete[0].src_direction, None);
        assert_eq!(concrete[0].target_directive, TargetDirective::RandomAny);
    }

    #[test]
    fn rotation_on_fixed_source_direction() {
        let concrete = expand_source("a6 => a%1");
        assert_eq!(concrete.len(), 1);
        assert_eq!(concrete[0].src_direction, Direction::new(6));
        assert_eq!(concrete[0].target_directive, TargetDirective::Rotate(1));
    }

    #[test]
    fn pointing_condition_forks_over_six_positions() {
        let concrete = expand_source("_[t.] => a");
        assert_eq!(concrete.len(), 6);
        for rule in &concrete {
            let positioned: Vec<_> = rule.conditions.iter().filter(|c| c.is_some()).collect();
            assert_eq!(positioned.len(), 1);
        }
    }

    #[test]
    fn point_transfer_resolves_statically() {
        let concrete = expand_source("_[t.] => z.1");
        assert_eq!(concrete.len(), 6);
        for (i, rule) in concrete.iter().enumerate() {
            let position = (i as u32) + 1; // order not guaranteed but all six appear
            let _ = position;
            match rule.target_directive {
                TargetDirective::Fixed(_) => {}
                other => panic!("expected a fixed direction, got {:?}", other),
            }
        }
    }

    #[test]
    fn missing_pointing_source_is_a_structural_error() {
        let rules = parse_ruleset("a => z.1").unwrap();
        let err = expand_ruleset(&rules).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NoPointingSource);
    }

    #[test]
    fn b3s23_birth_rule_requires_all_six_neighbors_pinned() {
        let concrete = expand_source("_[a]3[_]3 => a");
        for rule in &concrete {
            let pinned = rule.conditions.iter().filter(|c| c.is_some()).count();
            assert_eq!(pinned, 6, "each birth variant must pin all six neighbors");
        }
        // C(6,3) = 20 distinct ways to choose which three neighbors are alive.
        assert_eq!(concrete.len(), 20);
    }
}
