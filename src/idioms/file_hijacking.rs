//! Idiom D: writing to a temp-rooted path with a creation mode that is not
//! exclusive, so an attacker-owned file at that path is silently reused.
//!
//! The rewrite inserts an owner-only `Files.createFile` immediately before
//! the write. `StandardOpenOption.CREATE_NEW` call sites are inherently
//! race-free and left unchanged. The catalog marks this idiom's active
//! variants as pending a TOCTOU fix upstream, so it ships disabled in the
//! default configuration.

use super::calls::{as_files_write, has_create_new_option};
use super::{find_expr, ConsumedSites, IdiomKind, IdiomMatch, MatchPayload};
use crate::taint;
use crate::tree::{Block, Scope, Stmt};

pub fn match_block(
    block: &Block,
    scope: &Scope,
    consumed: &mut ConsumedSites,
    matches: &mut Vec<IdiomMatch>,
) {
    for stmt in &block.stmts {
        // The sink statement may be a bare call, a local declaration, or an
        // assignment; the created-file insert lands before any of them.
        let expr = match stmt {
            Stmt::Expr { expr, .. } => expr,
            Stmt::Local(l) => match &l.init {
                Some(init) => init,
                None => continue,
            },
            Stmt::Assign(a) => &a.value,
            _ => continue,
        };
        // The sink may be nested, e.g. `Files.newOutputStream(p).close()`.
        let Some(write) = find_expr(expr, &|e| as_files_write(e).is_some()) else {
            continue;
        };
        let call = as_files_write(write).expect("found by predicate");
        if consumed.is_claimed(call.id) {
            continue;
        }
        if has_create_new_option(call) {
            // Atomic create-new semantics; nothing to harden.
            continue;
        }
        let path = &call.args[0];
        if !taint::is_system_temp(path, scope) {
            continue;
        }
        consumed.claim(call.id);
        matches.push(IdiomMatch {
            kind: IdiomKind::FileHijacking,
            anchor: stmt.id(),
            consumed: Vec::new(),
            payload: MatchPayload::FileHijacking { path: path.clone() },
        });
    }
}
