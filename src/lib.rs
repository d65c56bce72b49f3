//! HexiDirect: a parser, macro expander, matcher, and stepper for a
//! small rule language governing a hexagonal cellular automaton, plus the
//! world façade and session registry a terminal/desktop/browser front end
//! can sit on top of.
//!
//! The engine compiles a HexiDirect source text in two stages:
//!
//! 1. [`parser::parse_ruleset`] turns source text into [`ast::AbstractRule`]s,
//!    one per authored rule line (sugared forms intact: `%`, `[state.]`,
//!    bracket repetition, alternatives, negation, rotation offsets).
//! 2. [`expand::expand_ruleset`] rewrites each abstract rule into one or
//!    more [`expand::ConcreteRule`]s — the canonical, fully-positioned form
//!    [`matcher::rule_matches`] and [`stepper::step`] consume directly.
//!
//! [`world::World`] wraps a compiled rule set around a live [`grid::Grid`],
//! a bounded history ring, and an RNG; [`session::SessionRegistry`] groups
//! worlds by name under opaque sessions for an embedding to address.
//!
//! # Example
//! ```
//! use hexidirect::world::World;
//!
//! let mut world = World::new(2, 0).unwrap();
//! world.replace_rules("_[t.] => a").unwrap();
//! world.set_cell(
//!     hexidirect::geometry::Axial::new(0, 0),
//!     hexidirect::cell::Cell {
//!         state: hexidirect::cell::State::Named("t".into()),
//!         direction: hexidirect::geometry::Direction::new(1),
//!     },
//! ).unwrap();
//! let log = world.step();
//! assert!(!log.is_empty());
//! ```

pub mod ast;
pub mod cell;
pub mod error;
pub mod expand;
pub mod geometry;
pub mod grid;
pub mod matcher;
pub mod parser;
pub mod presets;
pub mod printer;
pub mod session;
pub mod snapshot;
pub mod stepper;
pub mod world;

pub use error::{EngineError, ParseError, ParseErrorKind, RuleEvalError};
pub use session::{SessionId, SessionRegistry, WorldMeta};
pub use snapshot::WorldSnapshot;
pub use world::World;
