//! Rewrite orchestration: one read-only collection pass over the unit,
//! deterministic planning, a single edit traversal, then import fixup.
//! Each compilation unit transitions atomically from "original" to
//! "original plus accepted edits"; there is no partial-rewrite state.

pub mod apply;
pub mod helper;
pub mod imports;
pub mod plan;

use rayon::prelude::*;
use serde::Serialize;

use crate::config::RewriteConfig;
use crate::idioms::{self, IdiomKind};
use crate::tree::{NodeId, Unit};

/// One match that made it through planning and application.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedMatch {
    pub kind: IdiomKind,
    pub anchor: NodeId,
}

/// Outcome report for one compilation unit.
#[derive(Debug, Clone, Serialize, Default)]
pub struct HardenSummary {
    pub changed: bool,
    pub applied: Vec<AppliedMatch>,
    pub dropped_matches: usize,
    pub dropped_edits: usize,
    pub imports_added: Vec<String>,
    pub imports_removed: Vec<String>,
}

impl HardenSummary {
    pub fn count(&self, kind: IdiomKind) -> usize {
        self.applied.iter().filter(|m| m.kind == kind).count()
    }
}

/// Detects and rewrites every enabled idiom in one unit. Unanalyzable
/// sites are discarded silently; the unit is left untouched wherever no
/// match was accepted.
pub fn harden_unit(unit: &mut Unit, config: &RewriteConfig) -> HardenSummary {
    let matches = idioms::collect(unit, config);
    if matches.is_empty() {
        return HardenSummary::default();
    }

    let referenced_before = imports::referenced_simple_names(unit);
    let index = plan::StmtIndex::build(unit);
    let mut ids = std::mem::take(&mut unit.ids);
    let planned = plan::plan(matches, &index, &mut ids);
    unit.ids = ids;

    let stats = apply::apply(unit, planned.edits);
    let changed = stats.applied > 0;
    let delta = if changed {
        imports::update(unit, &planned.requested_imports, &referenced_before)
    } else {
        imports::ImportDelta::default()
    };

    HardenSummary {
        changed,
        applied: planned.accepted,
        dropped_matches: planned.dropped_matches,
        dropped_edits: stats.dropped_edits,
        imports_added: delta.added,
        imports_removed: delta.removed,
    }
}

/// Hardens independent compilation units in parallel. Units share no
/// mutable state: taint facts, matches, and the synthesized helper are
/// all unit-local.
pub fn harden_units(units: &mut [Unit], config: &RewriteConfig) -> Vec<HardenSummary> {
    units
        .par_iter_mut()
        .map(|unit| harden_unit(unit, config))
        .collect()
}
