//! Errors returned by the parser, macro expander, and world façade.

use displaydoc::Display;
use thiserror::Error;

/// The specific defect found while parsing or expanding one rule.
#[derive(Clone, Debug, PartialEq, Eq, Error, Display)]
pub enum ParseErrorKind {
    /// expected {0:?}
    Missing(char),
    /// expected a number
    MissingNumber,
    /// unexpected character {0:?}
    Unexpected(char),
    /// extra unparsed text after the rule
    ExtraJunk,
    /// state identifiers may not contain digits
    DigitInState,
    /// `-` negation requires an explicit neighbor position
    NegationWithoutPosition,
    /// bracket repeat count must be between 1 and 6, got {0}
    BadRepeatCount(u32),
    /// rotation amount must be between 0 and 5, got {0}
    BadRotation(u32),
    /// direction must be between 1 and 6, got {0}
    BadDirection(u32),
    /// a `z.K` target requires a pointing condition (`state.`) among the source conditions
    NoPointingSource,
    /// the empty state `_` cannot carry a direction
    EmptyStateWithDirection,
    /// a rule's conditions cannot fit in the six neighbor positions
    TooManyConditions,
}

/// A parse or macro-expansion failure, naming the offending rule.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("rule {rule_index} (byte offset {offset} in that rule): {kind}")]
pub struct ParseError {
    /// 0-based index of the offending rule among the rules split from the source text.
    pub rule_index: usize,
    /// Byte offset of the defect within that rule's own text.
    pub offset: usize,
    pub kind: ParseErrorKind,
}

/// An error raised while evaluating a single cell during a step. The cell
/// keeps its previous value and the step continues.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("cell ({q}, {r}): {message}")]
pub struct RuleEvalError {
    pub q: i32,
    pub r: i32,
    pub message: String,
}

/// Errors surfaced by the world façade and the session layer to an embedding.
#[derive(Clone, Debug, PartialEq, Eq, Error, Display)]
pub enum EngineError {
    /// coordinate ({q}, {r}) is out of bounds for radius {radius}
    Bounds { q: i32, r: i32, radius: u32 },
    /// a world named {0:?} already exists in this session
    NameConflict(String),
    /// no world named {0:?} in this session
    WorldNotFound(String),
    /// no session {0:?}
    SessionNotFound(String),
    /// no history entry at index {0}
    HistoryNotFound(usize),
    /// failed to read or write a snapshot: {0}
    Io(String),
    /// probability must be within [0, 1], got {0}
    BadProbability(f64),
    /// grid radius must be at least 1, got {0}
    InvalidRadius(u32),
    /// snapshot radius {found} does not match this world's radius {expected}
    RadiusMismatch { expected: u32, found: u32 },
}
