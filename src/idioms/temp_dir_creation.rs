//! Idiom A: a temp *file* created, deleted, and re-created as a directory.
//!
//! ```java
//! File tempDir = File.createTempFile("prefix", "suffix");
//! tempDir.delete();
//! tempDir.mkdir();
//! ```
//!
//! The delete/mkdir pair may appear as bare statements, inside an `if`
//! guard whose failing branch only logs or throws (single call or the
//! combined `!delete() || !mkdir()` form), or as `flag &= ...` accumulator
//! assignments. All variants normalize into one match record.
//!
//! The accumulator rewrite removes the `flag &= ...` statements but leaves
//! the accumulator and its later branches intact; code meant to run on
//! partial failure becomes unreachable because the secure replacement
//! either succeeds or raises.

use super::calls::{as_create_temp_file, is_delete_on, is_mkdir_on};
use super::{AnchorForm, ConsumedSites, DirectoryArg, IdiomKind, IdiomMatch, MatchPayload};
use crate::tree::{AssignOp, BinOp, Block, Expr, NodeId, Scope, Stmt, UnOp};

pub fn match_block(
    block: &Block,
    scope: &Scope,
    consumed: &mut ConsumedSites,
    matches: &mut Vec<IdiomMatch>,
) {
    let stmts = &block.stmts;
    let mut i = 0;
    while i < stmts.len() {
        if let Some(anchor) = as_anchor(&stmts[i], scope) {
            if let Some(found) = scan_forward(stmts, i, &anchor) {
                consumed.claim(anchor.call_id);
                for id in &found.claimed_calls {
                    consumed.claim(*id);
                }
                matches.push(build_match(&anchor, &found, scope));
            } else {
                log::debug!(
                    "temp-dir-creation: no delete/mkdir pair for `{}`, leaving site unchanged",
                    anchor.binding
                );
            }
        }
        i += 1;
    }
}

/// Anchor: declaration or plain assignment of a local binding from a
/// createTempFile call.
struct Anchor<'a> {
    stmt_id: NodeId,
    call_id: NodeId,
    binding: &'a str,
    form: AnchorForm,
    prefix: &'a Expr,
    suffix: &'a Expr,
    directory: Option<&'a Expr>,
}

fn as_anchor<'a>(stmt: &'a Stmt, scope: &Scope) -> Option<Anchor<'a>> {
    match stmt {
        Stmt::Local(l) => {
            let init = l.init.as_ref()?;
            let ctf = as_create_temp_file(init)?;
            Some(Anchor {
                stmt_id: l.id,
                call_id: ctf.call.id,
                binding: &l.name,
                form: AnchorForm::Decl {
                    modifiers: l.modifiers.clone(),
                    ty: l.ty.clone(),
                },
                prefix: ctf.prefix,
                suffix: ctf.suffix,
                directory: ctf.directory,
            })
        }
        Stmt::Assign(a) if a.op == AssignOp::Set => {
            let binding = a.target.as_ident()?;
            // Binding invariant: the result must land in a local, never a
            // field of the enclosing class.
            if !scope.is_local(binding) {
                return None;
            }
            let ctf = as_create_temp_file(&a.value)?;
            Some(Anchor {
                stmt_id: a.id,
                call_id: ctf.call.id,
                binding,
                form: AnchorForm::Assign,
                prefix: ctf.prefix,
                suffix: ctf.suffix,
                directory: ctf.directory,
            })
        }
        _ => None,
    }
}

struct Found {
    consumed_stmts: Vec<NodeId>,
    claimed_calls: Vec<NodeId>,
}

enum Step {
    Delete(NodeId),
    Mkdir(NodeId),
    Both(NodeId, NodeId),
    Reassigned,
    Escapes,
    Unrelated,
}

/// Scans forward from the anchor until both a delete and a mkdir on the
/// binding are found, or the binding is redefined or escapes.
fn scan_forward(stmts: &[Stmt], anchor_idx: usize, anchor: &Anchor) -> Option<Found> {
    let binding = anchor.binding;
    let mut seen_delete = false;
    let mut seen_mkdir = false;
    let mut found = Found {
        consumed_stmts: Vec::new(),
        claimed_calls: Vec::new(),
    };
    for stmt in &stmts[anchor_idx + 1..] {
        match classify(stmt, binding) {
            Step::Delete(call) => {
                seen_delete = true;
                found.consumed_stmts.push(stmt.id());
                found.claimed_calls.push(call);
            }
            Step::Mkdir(call) => {
                seen_mkdir = true;
                found.consumed_stmts.push(stmt.id());
                found.claimed_calls.push(call);
            }
            Step::Both(del, mk) => {
                seen_delete = true;
                seen_mkdir = true;
                found.consumed_stmts.push(stmt.id());
                found.claimed_calls.push(del);
                found.claimed_calls.push(mk);
            }
            Step::Reassigned | Step::Escapes => return None,
            Step::Unrelated => {}
        }
        if seen_delete && seen_mkdir {
            return Some(found);
        }
    }
    None
}

fn classify(stmt: &Stmt, binding: &str) -> Step {
    match stmt {
        Stmt::Expr { expr, .. } => {
            if is_delete_on(expr, binding) {
                Step::Delete(expr.id())
            } else if is_mkdir_on(expr, binding) {
                Step::Mkdir(expr.id())
            } else if uses_binding_as_value(expr, binding) {
                Step::Escapes
            } else {
                Step::Unrelated
            }
        }
        Stmt::Assign(a) => match a.op {
            AssignOp::Set if a.target.as_ident() == Some(binding) => Step::Reassigned,
            AssignOp::AndSet if is_delete_on(&a.value, binding) => Step::Delete(a.value.id()),
            AssignOp::AndSet if is_mkdir_on(&a.value, binding) => Step::Mkdir(a.value.id()),
            _ if uses_binding_as_value(&a.value, binding) => Step::Escapes,
            _ => Step::Unrelated,
        },
        Stmt::If(i) => match classify_guard(i, binding) {
            Step::Unrelated => {
                let nested = block_invalidates(&i.then_block, binding).or_else(|| {
                    i.else_block
                        .as_ref()
                        .and_then(|e| block_invalidates(e, binding))
                });
                nested.unwrap_or(Step::Unrelated)
            }
            step => step,
        },
        Stmt::Return { value, .. } => match value {
            Some(v) if v.mentions_ident(binding) => Step::Escapes,
            _ => Step::Unrelated,
        },
        Stmt::Local(l) => match &l.init {
            Some(init) if uses_binding_as_value(init, binding) => Step::Escapes,
            _ => Step::Unrelated,
        },
        Stmt::Throw { value, .. } => {
            if uses_binding_as_value(value, binding) {
                Step::Escapes
            } else {
                Step::Unrelated
            }
        }
        Stmt::Try(t) => {
            // Same-block constraint: a delete/mkdir nested inside a try does
            // not complete the idiom, and a binding handed into one is gone.
            let escapes = t
                .resources
                .iter()
                .any(|r| r.init.as_ref().is_some_and(|e| uses_binding_as_value(e, binding)));
            if escapes {
                return Step::Escapes;
            }
            let nested = block_invalidates(&t.body, binding)
                .or_else(|| t.catches.iter().find_map(|c| block_invalidates(&c.body, binding)))
                .or_else(|| t.finally.as_ref().and_then(|f| block_invalidates(f, binding)));
            nested.unwrap_or(Step::Unrelated)
        }
    }
}

/// Looks inside a nested block for anything that breaks the match: a
/// redefinition of the binding, a return of it, or a use of it as a whole
/// value. Reads of the binding stay harmless at any depth.
fn block_invalidates(block: &Block, binding: &str) -> Option<Step> {
    block.stmts.iter().find_map(|stmt| match stmt {
        Stmt::Assign(a) => {
            if a.target.as_ident() == Some(binding) {
                Some(Step::Reassigned)
            } else if uses_binding_as_value(&a.value, binding) {
                Some(Step::Escapes)
            } else {
                None
            }
        }
        Stmt::Expr { expr, .. } => uses_binding_as_value(expr, binding).then_some(Step::Escapes),
        Stmt::Return { value, .. } => value
            .as_ref()
            .is_some_and(|v| v.mentions_ident(binding))
            .then_some(Step::Escapes),
        Stmt::Throw { value, .. } => {
            uses_binding_as_value(value, binding).then_some(Step::Escapes)
        }
        Stmt::Local(l) => l
            .init
            .as_ref()
            .is_some_and(|init| uses_binding_as_value(init, binding))
            .then_some(Step::Escapes),
        Stmt::If(i) => block_invalidates(&i.then_block, binding).or_else(|| {
            i.else_block
                .as_ref()
                .and_then(|e| block_invalidates(e, binding))
        }),
        Stmt::Try(t) => {
            let in_resources = t
                .resources
                .iter()
                .any(|r| r.init.as_ref().is_some_and(|e| uses_binding_as_value(e, binding)));
            if in_resources {
                return Some(Step::Escapes);
            }
            block_invalidates(&t.body, binding)
                .or_else(|| t.catches.iter().find_map(|c| block_invalidates(&c.body, binding)))
                .or_else(|| t.finally.as_ref().and_then(|f| block_invalidates(f, binding)))
        }
    })
}

/// `if (!b.delete()) { log/throw }`, `if (!b.mkdir()) { ... }`, or the
/// combined `if (!b.delete() || !b.mkdir()) { ... }`; guard consumed whole.
fn classify_guard(guard: &crate::tree::IfStmt, binding: &str) -> Step {
    if guard.else_block.is_some() || !branch_only_logs_or_throws(&guard.then_block) {
        return Step::Unrelated;
    }
    match &guard.cond {
        Expr::Unary {
            op: UnOp::Not,
            operand,
            ..
        } => {
            if is_delete_on(operand, binding) {
                Step::Delete(operand.id())
            } else if is_mkdir_on(operand, binding) {
                Step::Mkdir(operand.id())
            } else {
                Step::Unrelated
            }
        }
        Expr::Binary {
            op: BinOp::Or,
            lhs,
            rhs,
            ..
        } => match (negated_call(lhs), negated_call(rhs)) {
            (Some(l), Some(r)) if is_delete_on(l, binding) && is_mkdir_on(r, binding) => {
                Step::Both(l.id(), r.id())
            }
            (Some(l), Some(r)) if is_mkdir_on(l, binding) && is_delete_on(r, binding) => {
                Step::Both(r.id(), l.id())
            }
            _ => Step::Unrelated,
        },
        _ => Step::Unrelated,
    }
}

fn negated_call(expr: &Expr) -> Option<&Expr> {
    match expr {
        Expr::Unary {
            op: UnOp::Not,
            operand,
            ..
        } => Some(operand),
        _ => None,
    }
}

/// A failing branch that only reports: print-style calls and throws.
fn branch_only_logs_or_throws(block: &Block) -> bool {
    !block.stmts.is_empty()
        && block.stmts.iter().all(|s| match s {
            Stmt::Throw { .. } => true,
            Stmt::Expr { expr, .. } => expr.as_call().is_some(),
            _ => false,
        })
}

/// The binding handed somewhere the analysis cannot see: whole-value
/// argument, alias initializer, or bare value.
fn uses_binding_as_value(expr: &Expr, binding: &str) -> bool {
    expr.as_ident() == Some(binding) || expr.passes_ident_as_arg(binding)
}

fn build_match(anchor: &Anchor, found: &Found, scope: &Scope) -> IdiomMatch {
    let directory = anchor
        .directory
        .filter(|d| !d.is_null())
        .map(|d| DirectoryArg {
            expr: d.clone(),
            is_path_typed: scope.is_path_typed(d),
        });
    IdiomMatch {
        kind: IdiomKind::TempDirCreation,
        anchor: anchor.stmt_id,
        consumed: found.consumed_stmts.clone(),
        payload: MatchPayload::TempDirCreation {
            binding: anchor.binding.to_string(),
            anchor_form: anchor.form.clone(),
            prefix: anchor.prefix.clone(),
            suffix: anchor.suffix.clone(),
            directory,
        },
    }
}
