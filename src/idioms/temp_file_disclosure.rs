//! Idiom B: a bare `File.createTempFile` call. The name it allocates is
//! predictable, so the file is disclosure-prone regardless of where the
//! directory argument points; rewriting does not depend on taint.
//!
//! Lowest priority: a createTempFile call already consumed by idiom A's
//! create/delete/mkdir group is out of consideration here. The binding
//! invariant still applies: a call whose result lands in a field is left
//! untouched.

use super::calls::as_create_temp_file;
use super::{ConsumedSites, DirectoryArg, IdiomKind, IdiomMatch, MatchPayload};
use crate::tree::{Block, Scope, Stmt};

pub fn match_block(
    block: &Block,
    scope: &Scope,
    consumed: &mut ConsumedSites,
    matches: &mut Vec<IdiomMatch>,
) {
    for stmt in &block.stmts {
        // The call must initialize or re-assign a simple local binding.
        let (stmt_id, value) = match stmt {
            Stmt::Local(l) => match &l.init {
                Some(init) => (l.id, init),
                None => continue,
            },
            Stmt::Assign(a) => match a.target.as_ident() {
                Some(name) if scope.is_local(name) => (a.id, &a.value),
                _ => continue,
            },
            _ => continue,
        };
        let Some(ctf) = as_create_temp_file(value) else {
            continue;
        };
        if consumed.is_claimed(ctf.call.id) {
            continue;
        }
        consumed.claim(ctf.call.id);
        // A null directory argument degenerates to the 2-arg form.
        let directory = ctf
            .directory
            .filter(|d| !d.is_null())
            .map(|d| DirectoryArg {
                expr: d.clone(),
                is_path_typed: scope.is_path_typed(d),
            });
        matches.push(IdiomMatch {
            kind: IdiomKind::TempFileDisclosure,
            anchor: stmt_id,
            consumed: Vec::new(),
            payload: MatchPayload::TempFileDisclosure {
                call: ctf.call.id,
                prefix: ctf.prefix.clone(),
                suffix: ctf.suffix.clone(),
                directory,
            },
        });
    }
}
