//! Canonical pretty-printing of abstract rules: the inverse of `parser`,
//! used to test the "parse stability" property from `spec.md` §8 —
//! reparsing a canonically printed rule set yields the same concrete
//! rules.

use std::fmt::Write as _;

use crate::ast::{
    AbstractRule, Alternative, BracketGroup, Orient, SourceDirection, Target, TargetDirectiveSpec,
};

/// Prints a full rule set, one line per macro group, `|`-joining the
/// sources of group siblings (mirroring how the parser folds a top-level
/// `|` into one shared group id).
pub fn print_ruleset(rules: &[AbstractRule]) -> String {
    let mut groups: Vec<(u32, Vec<&AbstractRule>)> = Vec::new();
    for rule in rules {
        match groups.iter_mut().find(|(id, _)| *id == rule.group_id) {
            Some((_, members)) => members.push(rule),
            None => groups.push((rule.group_id, vec![rule])),
        }
    }
    groups
        .into_iter()
        .map(|(_, members)| print_group_line(&members))
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_group_line(members: &[&AbstractRule]) -> String {
    let sources: Vec<String> = members.iter().map(|r| print_source(r)).collect();
    format!("{} => {}", sources.join("|"), print_target(&members[0].target))
}

fn print_source(rule: &AbstractRule) -> String {
    let mut s = format!("{}", rule.src_state);
    match rule.src_direction {
        SourceDirection::None => {}
        SourceDirection::Fixed(d) => write!(s, "{}", d).unwrap(),
        SourceDirection::Any => s.push('%'),
    }
    for group in &rule.groups {
        s.push_str(&print_bracket(group));
    }
    s
}

fn print_bracket(group: &BracketGroup) -> String {
    let alts: Vec<String> = group.alternatives.iter().map(print_alt).collect();
    let mut s = format!("[{}]", alts.join("|"));
    if group.repeat != 1 {
        write!(s, "{}", group.repeat).unwrap();
    }
    s
}

fn print_alt(alt: &Alternative) -> String {
    let mut s = String::new();
    if alt.negated {
        s.push('-');
    }
    if let Some(p) = alt.position {
        write!(s, "{}", p).unwrap();
    }
    write!(s, "{}", alt.state).unwrap();
    match alt.orient {
        Orient::Any => {}
        Orient::Fixed(d) => write!(s, "{}", d).unwrap(),
        Orient::PointingToCenter => s.push('.'),
        Orient::AnyDirection => s.push('%'),
    }
    s
}

fn print_target(target: &Target) -> String {
    let mut s = format!("{}", target.state);
    match target.directive {
        TargetDirectiveSpec::None => {}
        TargetDirectiveSpec::Fixed(d) => write!(s, "{}", d).unwrap(),
        TargetDirectiveSpec::Rotate(n) => {
            s.push('%');
            if n != 0 {
                write!(s, "{}", n).unwrap();
            }
        }
        TargetDirectiveSpec::PointTransfer(k) => {
            s.push('.');
            if k != 0 {
                write!(s, "{}", k).unwrap();
            }
        }
    }
    s
}
