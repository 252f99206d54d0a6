//! Fixture harness: a small Java-subset parser and rewrite assertions.
//!
//! Production hosts hand the engine a tree they built themselves; this
//! module exists so tests can express fixtures as source text. The parser
//! covers exactly the surface the idiom catalog exercises, nothing more.

mod assertions;
mod parser;

pub use assertions::{assert_rewritten, assert_unchanged, rewrite};
pub use parser::parse_unit;
