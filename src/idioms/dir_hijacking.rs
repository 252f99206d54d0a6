//! Idiom C: `mkdir()`/`mkdirs()` invoked directly on a path rooted at the
//! shared system temp directory.
//!
//! ```java
//! File tempDirChild = new File(System.getProperty("java.io.tmpdir"), "/child");
//! tempDirChild.mkdir();
//! ```
//!
//! An attacker who pre-creates the child path owns the directory the
//! program goes on to use. The rewrite routes the call through the
//! synthesized permission-hardening helper, which creates-or-repairs the
//! directory with owner-only permissions and raises on failure.

use super::calls::as_mkdir;
use super::{ConsumedSites, IdiomKind, IdiomMatch, MatchPayload};
use crate::taint;
use crate::tree::{Block, Scope};

pub fn match_block(
    block: &Block,
    scope: &Scope,
    consumed: &mut ConsumedSites,
    matches: &mut Vec<IdiomMatch>,
) {
    for stmt in &block.stmts {
        // Only statement-level calls: the helper raises instead of returning
        // a boolean, so a result-inspecting site cannot be substituted.
        let Some(expr) = stmt.as_expr_stmt() else {
            continue;
        };
        let Some(call) = as_mkdir(expr) else {
            continue;
        };
        if consumed.is_claimed(call.id) {
            continue;
        }
        let receiver = call.receiver().expect("as_mkdir requires a receiver");
        if !taint::is_system_temp(receiver, scope) {
            log::debug!(
                "dir-hijacking: receiver of {} not provably temp-rooted, skipping",
                call.name
            );
            continue;
        }
        consumed.claim(call.id);
        matches.push(IdiomMatch {
            kind: IdiomKind::DirHijacking,
            anchor: stmt.id(),
            consumed: Vec::new(),
            payload: MatchPayload::DirHijacking {
                call: call.id,
                receiver: receiver.clone(),
                receiver_is_path: scope.is_path_typed(receiver),
            },
        });
    }
}
