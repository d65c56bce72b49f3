//! Abstract syntax produced by the parser, before macro expansion.

use crate::cell::State;
use crate::geometry::Direction;

/// The source-side direction marker: absent, a literal direction, or `%`
/// (any direction — expands to six variants).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceDirection {
    None,
    Fixed(Direction),
    Any,
}

/// A condition's orientation marker, as written by the author.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orient {
    /// No orientation constraint; any direction (including none) matches.
    Any,
    /// The neighbor must face this literal direction.
    Fixed(Direction),
    /// The neighbor must point back at the center (`.`).
    PointingToCenter,
    /// The neighbor must have *some* direction (`%`).
    AnyDirection,
}

/// One alternative inside a bracket group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alternative {
    /// An explicit neighbor position, or `None` if this alternative forks
    /// over all six positions during expansion.
    pub position: Option<Direction>,
    pub negated: bool,
    pub state: State,
    pub orient: Orient,
}

/// A bracketed group: a disjunction of alternatives, optionally repeated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BracketGroup {
    pub alternatives: Vec<Alternative>,
    /// Repeat count from the `]N` suffix; `1` when absent.
    pub repeat: u32,
}

/// The target-side direction descriptor, before expansion resolves it
/// against a concrete source direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetDirectiveSpec {
    /// No direction on the target; the new cell has none.
    None,
    /// A literal target direction.
    Fixed(Direction),
    /// `%` or `%N`: rotate the source direction by `N` (default 0), or
    /// (when the source has no direction) pick uniformly at random.
    Rotate(u32),
    /// `z.K`: take the direction from the pointing neighbor that matched,
    /// rotated by `K` clockwise.
    PointTransfer(u32),
}

/// The target side of an authored rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub state: State,
    pub directive: TargetDirectiveSpec,
}

/// One authored rule, as emitted by the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbstractRule {
    pub src_state: State,
    pub src_direction: SourceDirection,
    pub groups: Vec<BracketGroup>,
    pub target: Target,
    /// The macro-group id this rule belongs to (shared with `|`-split
    /// siblings; see the design decision in DESIGN.md).
    pub group_id: u32,
}
