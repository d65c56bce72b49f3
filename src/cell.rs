//! A cell's symbolic state and optional facing direction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseErrorKind;
use crate::geometry::Direction;

/// A cell's symbolic state: the empty sentinel, or a named identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum State {
    Empty,
    Named(String),
}

impl State {
    pub fn is_empty(&self) -> bool {
        matches!(self, State::Empty)
    }

    /// Parses a state token: `_`, or one or more lowercase letters followed
    /// by lowercase letters or underscores.
    pub fn parse(s: &str) -> Result<State, ParseErrorKind> {
        if s == "_" {
            return Ok(State::Empty);
        }
        let mut chars = s.chars();
        match chars.next() {
            Some(c) if c.is_ascii_lowercase() => {}
            Some(c) if c.is_ascii_digit() => return Err(ParseErrorKind::DigitInState),
            _ => return Err(ParseErrorKind::Unexpected(s.chars().next().unwrap_or('?'))),
        }
        for c in chars {
            if c.is_ascii_digit() {
                return Err(ParseErrorKind::DigitInState);
            }
            if !(c.is_ascii_lowercase() || c == '_') {
                return Err(ParseErrorKind::Unexpected(c));
            }
        }
        Ok(State::Named(s.to_string()))
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Empty => write!(f, "_"),
            State::Named(s) => write!(f, "{}", s),
        }
    }
}

/// The value stored at one grid coordinate: a state plus an optional
/// direction. Invariant I1: the empty state never carries a direction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub state: State,
    pub direction: Option<Direction>,
}

impl Cell {
    pub fn empty() -> Cell {
        Cell {
            state: State::Empty,
            direction: None,
        }
    }

    /// Builds a cell, enforcing invariant I1.
    pub fn new(state: State, direction: Option<Direction>) -> Result<Cell, ParseErrorKind> {
        if state.is_empty() && direction.is_some() {
            return Err(ParseErrorKind::EmptyStateWithDirection);
        }
        Ok(Cell { state, direction })
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::empty()
    }
}

/// A cell together with the coordinate it was read from, as serialized in a
/// world snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCell {
    pub q: i32,
    pub r: i32,
    pub state: String,
    pub direction: Option<u8>,
}
