//! Applies an [`EditSet`] to the tree in a single mutable traversal.
//!
//! First writer wins per node: removing a statement swallows every edit
//! targeting its subtree, so an edit whose target is never visited is
//! simply dropped and counted. The read-only pass has fully completed by
//! the time this runs, so no match references a position an earlier edit
//! already invalidated beyond that drop rule.

use crate::tree::{Block, ClassDecl, Expr, Member, Stmt, Unit};

use super::plan::EditSet;

#[derive(Debug, Default)]
pub struct ApplyStats {
    pub applied: usize,
    pub dropped_edits: usize,
}

pub fn apply(unit: &mut Unit, mut edits: EditSet) -> ApplyStats {
    let mut stats = ApplyStats::default();
    for class in &mut unit.classes {
        apply_class(class, &mut edits, &mut stats);
        // The helper nests in the top-level class whose code calls it.
        if let Some(helper) = edits.helpers.remove(&class.id) {
            class.members.push(Member::Class(helper));
            stats.applied += 1;
        }
    }
    stats.dropped_edits = edits.planned.saturating_sub(stats.applied);
    if stats.dropped_edits > 0 {
        log::debug!(
            "apply: dropped {} edit(s) whose targets were removed",
            stats.dropped_edits
        );
    }
    stats
}

fn apply_class(class: &mut ClassDecl, edits: &mut EditSet, stats: &mut ApplyStats) {
    for member in &mut class.members {
        match member {
            Member::Method(m) => apply_block(&mut m.body, edits, stats),
            Member::Class(c) => apply_class(c, edits, stats),
            Member::Field(_) => {}
        }
    }
}

fn apply_block(block: &mut Block, edits: &mut EditSet, stats: &mut ApplyStats) {
    let stmts = std::mem::take(&mut block.stmts);
    for mut stmt in stmts {
        let id = stmt.id();
        if let Some(inserts) = edits.insert_before.remove(&id) {
            for insert in inserts {
                block.stmts.push(insert);
                stats.applied += 1;
            }
        }
        if edits.remove_stmts.remove(&id) {
            stats.applied += 1;
            continue;
        }
        if let Some(replacement) = edits.replace_stmts.remove(&id) {
            block.stmts.push(replacement);
            stats.applied += 1;
            continue;
        }
        apply_stmt(&mut stmt, edits, stats);
        block.stmts.push(stmt);
    }
}

fn apply_stmt(stmt: &mut Stmt, edits: &mut EditSet, stats: &mut ApplyStats) {
    match stmt {
        Stmt::Local(l) => {
            if let Some(init) = &mut l.init {
                apply_expr(init, edits, stats);
            }
        }
        Stmt::Expr { expr, .. } => apply_expr(expr, edits, stats),
        Stmt::Assign(a) => {
            apply_expr(&mut a.target, edits, stats);
            apply_expr(&mut a.value, edits, stats);
        }
        Stmt::If(i) => {
            apply_expr(&mut i.cond, edits, stats);
            apply_block(&mut i.then_block, edits, stats);
            if let Some(e) = &mut i.else_block {
                apply_block(e, edits, stats);
            }
        }
        Stmt::Return { value, .. } => {
            if let Some(v) = value {
                apply_expr(v, edits, stats);
            }
        }
        Stmt::Throw { value, .. } => apply_expr(value, edits, stats),
        Stmt::Try(t) => {
            for r in &mut t.resources {
                if let Some(init) = &mut r.init {
                    apply_expr(init, edits, stats);
                }
            }
            apply_block(&mut t.body, edits, stats);
            for c in &mut t.catches {
                apply_block(&mut c.body, edits, stats);
            }
            if let Some(f) = &mut t.finally {
                apply_block(f, edits, stats);
            }
        }
    }
}

fn apply_expr(expr: &mut Expr, edits: &mut EditSet, stats: &mut ApplyStats) {
    if let Some(replacement) = edits.replace_exprs.remove(&expr.id()) {
        *expr = replacement;
        stats.applied += 1;
        return;
    }
    match expr {
        Expr::Literal { .. } | Expr::Ident { .. } => {}
        Expr::Field { target, .. } => apply_expr(target, edits, stats),
        Expr::Call(c) => {
            if let Some(t) = c.target.as_deref_mut() {
                apply_expr(t, edits, stats);
            }
            for a in &mut c.args {
                apply_expr(a, edits, stats);
            }
        }
        Expr::New(n) => {
            for a in &mut n.args {
                apply_expr(a, edits, stats);
            }
        }
        Expr::Binary { lhs, rhs, .. } => {
            apply_expr(lhs, edits, stats);
            apply_expr(rhs, edits, stats);
        }
        Expr::Unary { operand, .. } => apply_expr(operand, edits, stats),
    }
}
