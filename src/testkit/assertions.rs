//! Rewrite assertions over source fixtures.
//!
//! Both sides of a comparison go through parse-then-render, so fixture
//! authors never fight the printer's layout choices.

use pretty_assertions::assert_eq;

use crate::config::RewriteConfig;
use crate::rewrite::{harden_unit, HardenSummary};
use crate::tree::render::render_unit;
use crate::tree::Unit;

use super::parser::parse_unit;

/// Parses, hardens, and returns the unit with its summary.
pub fn rewrite(source: &str, config: &RewriteConfig) -> (Unit, HardenSummary) {
    let mut unit = parse_unit(source).expect("fixture must parse");
    let summary = harden_unit(&mut unit, config);
    (unit, summary)
}

/// Asserts the source rewrites to exactly the expected text.
pub fn assert_rewritten(source: &str, expected: &str, config: &RewriteConfig) -> HardenSummary {
    let (unit, summary) = rewrite(source, config);
    let expected_unit = parse_unit(expected).expect("expected fixture must parse");
    assert_eq!(render_unit(&unit), render_unit(&expected_unit));
    assert!(summary.changed, "expected at least one applied rewrite");
    summary
}

/// Asserts the source comes back untouched.
pub fn assert_unchanged(source: &str, config: &RewriteConfig) -> HardenSummary {
    let original = parse_unit(source).expect("fixture must parse");
    let (unit, summary) = rewrite(source, config);
    assert_eq!(render_unit(&unit), render_unit(&original));
    assert!(!summary.changed, "expected no applied rewrites");
    summary
}
