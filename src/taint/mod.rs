//! Local taint tracking: proves whether an expression denotes a path rooted
//! at the shared system temp directory.
//!
//! The analysis is single-scope by design. An identifier is followed only
//! through its reaching definitions inside the same method body; parameters,
//! fields, and results of unanalyzed calls resolve to [`TaintKind::Other`],
//! which makes every dependent match ineligible. The current working
//! directory is the one hard-coded safe origin and is never conflated with
//! the temp root, no matter how the expression wraps it.

use crate::tree::{Expr, NodeId, Scope};

/// Origin classification for a path expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaintKind {
    /// Derived from `System.getProperty("java.io.tmpdir")`.
    SystemTempRoot,
    /// Derived from `System.getProperty("user.dir")`; never rewritable.
    CurrentWorkingDir,
    /// Path-shaped but origin unproven.
    Other,
}

/// One step the path took on the way from its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathOp {
    ChildAppend(String),
    Canonicalize,
    Absolutize,
}

/// Provenance fact for a path expression.
#[derive(Debug, Clone)]
pub struct TaintFact {
    pub origin: NodeId,
    pub kind: TaintKind,
    pub ops: Vec<PathOp>,
}

impl TaintFact {
    pub fn is_system_temp(&self) -> bool {
        self.kind == TaintKind::SystemTempRoot
    }
}

/// Traces the origin of a path expression. Returns `None` for expressions
/// that are not path-shaped at all; `Some` with [`TaintKind::Other`] for
/// path-shaped expressions whose origin cannot be proven locally.
pub fn trace(expr: &Expr, scope: &Scope) -> Option<TaintFact> {
    trace_depth(expr, scope, 0)
}

/// True when the expression provably denotes a path under the system temp
/// root; the only result that makes a site eligible for rewriting.
pub fn is_system_temp(expr: &Expr, scope: &Scope) -> bool {
    trace(expr, scope).is_some_and(|f| f.is_system_temp())
}

// Reaching-definition chains through locals are finite, but a cycle of
// mutually-assigned bindings would recurse forever without a cap.
const MAX_TRACE_DEPTH: usize = 32;

fn trace_depth(expr: &Expr, scope: &Scope, depth: usize) -> Option<TaintFact> {
    if depth > MAX_TRACE_DEPTH {
        return Some(unknown(expr));
    }
    match expr {
        Expr::Call(call) => {
            if let Some(kind) = property_origin(expr) {
                return Some(TaintFact {
                    origin: expr.id(),
                    kind,
                    ops: Vec::new(),
                });
            }
            match call.name.as_str() {
                "getCanonicalFile" | "getCanonicalPath" => {
                    derive(call.receiver()?, scope, depth, Some(PathOp::Canonicalize))
                }
                "getAbsoluteFile" | "getAbsolutePath" => {
                    derive(call.receiver()?, scope, depth, Some(PathOp::Absolutize))
                }
                // Pure view conversion; origin and ops carry over untouched.
                "toPath" | "toFile" => derive(call.receiver()?, scope, depth, None),
                _ => path_shaped(expr, scope).then(|| unknown(expr)),
            }
        }
        Expr::New(new) if new.class == "File" => match new.args.as_slice() {
            [parent] => {
                if parent.as_str_literal().is_some() {
                    // A fixed literal path is not rooted at any tracked origin.
                    Some(unknown(expr))
                } else {
                    derive(parent, scope, depth, None)
                }
            }
            [parent, child] => {
                let name = child
                    .as_str_literal()
                    .map(str::to_owned)
                    .unwrap_or_else(|| crate::tree::render::render_expr(child));
                derive(parent, scope, depth, Some(PathOp::ChildAppend(name)))
            }
            _ => Some(unknown(expr)),
        },
        Expr::Ident { name, .. } => {
            if !scope.is_local(name) {
                // Parameter or field: typed maybe, but not locally provable.
                return path_shaped(expr, scope).then(|| unknown(expr));
            }
            let defs = scope.definitions(name);
            if defs.is_empty() {
                return Some(unknown(expr));
            }
            let facts: Vec<Option<TaintFact>> = defs
                .iter()
                .map(|d| trace_depth(d, scope, depth + 1))
                .collect();
            let first = match &facts[0] {
                Some(f) => f.clone(),
                None => return Some(unknown(expr)),
            };
            // A binding reassigned from a conflicting source is unprovable.
            let consistent = facts
                .iter()
                .all(|f| f.as_ref().map(|f| f.kind) == Some(first.kind));
            if consistent {
                Some(first)
            } else {
                log::debug!("taint: conflicting reaching definitions for `{}`", name);
                Some(unknown(expr))
            }
        }
        Expr::Field { .. } => path_shaped(expr, scope).then(|| unknown(expr)),
        _ => None,
    }
}

fn derive(
    parent: &Expr,
    scope: &Scope,
    depth: usize,
    op: Option<PathOp>,
) -> Option<TaintFact> {
    let mut fact = trace_depth(parent, scope, depth + 1)?;
    if let Some(op) = op {
        fact.ops.push(op);
    }
    Some(fact)
}

fn unknown(expr: &Expr) -> TaintFact {
    TaintFact {
        origin: expr.id(),
        kind: TaintKind::Other,
        ops: Vec::new(),
    }
}

/// `System.getProperty("java.io.tmpdir" | "user.dir")`.
fn property_origin(expr: &Expr) -> Option<TaintKind> {
    let call = expr.as_call()?;
    if !expr.is_static_call("System", "getProperty") {
        return None;
    }
    match call.args.first()?.as_str_literal()? {
        "java.io.tmpdir" => Some(TaintKind::SystemTempRoot),
        "user.dir" => Some(TaintKind::CurrentWorkingDir),
        _ => Some(TaintKind::Other),
    }
}

/// Heuristic for "could this even be a path": used only to decide between
/// `None` and `Other` for expressions the tracer does not understand.
fn path_shaped(expr: &Expr, scope: &Scope) -> bool {
    match scope.expr_type(expr) {
        Some(t) => t.is("File") || t.is("Path") || t.is("String"),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::parse_unit;
    use crate::tree::{Member, Unit};

    fn last_local_init(unit: &Unit) -> (&Expr, Scope<'_>) {
        let class = &unit.classes[0];
        let method = class
            .members
            .iter()
            .find_map(|m| match m {
                Member::Method(m) => Some(m),
                _ => None,
            })
            .unwrap();
        let init = method
            .body
            .stmts
            .iter()
            .rev()
            .find_map(|s| match s {
                crate::tree::Stmt::Local(l) => l.init.as_ref(),
                _ => None,
            })
            .unwrap();
        (init, Scope::of_method(class, method))
    }

    fn kind_of(source: &str) -> TaintKind {
        let unit = parse_unit(source).unwrap();
        let (init, scope) = last_local_init(&unit);
        trace(init, &scope).map(|f| f.kind).unwrap_or(TaintKind::Other)
    }

    #[test]
    fn tmpdir_property_is_temp_root() {
        let kind = kind_of(
            r#"
            class T {
                void m() {
                    File tempDirChild = new File(System.getProperty("java.io.tmpdir"), "/child");
                }
            }
            "#,
        );
        assert_eq!(kind, TaintKind::SystemTempRoot);
    }

    #[test]
    fn user_dir_is_never_temp_root() {
        let kind = kind_of(
            r#"
            class T {
                void m() {
                    File currentDirectory = new File(System.getProperty("user.dir"));
                    File child = new File(currentDirectory, "/child");
                }
            }
            "#,
        );
        assert_eq!(kind, TaintKind::CurrentWorkingDir);
    }

    #[test]
    fn canonicalize_preserves_origin_and_records_op() {
        let unit = parse_unit(
            r#"
            class T {
                void m() {
                    File tempDir = new File(System.getProperty("java.io.tmpdir")).getCanonicalFile();
                }
            }
            "#,
        )
        .unwrap();
        let (init, scope) = last_local_init(&unit);
        let fact = trace(init, &scope).unwrap();
        assert_eq!(fact.kind, TaintKind::SystemTempRoot);
        assert_eq!(fact.ops, vec![PathOp::Canonicalize]);
    }

    #[test]
    fn nested_children_stay_tainted() {
        let kind = kind_of(
            r#"
            class T {
                void m() {
                    File deep = new File(new File(new File(System.getProperty("java.io.tmpdir")), "/a"), "/b");
                }
            }
            "#,
        );
        assert_eq!(kind, TaintKind::SystemTempRoot);
    }

    #[test]
    fn literal_path_is_unproven() {
        let kind = kind_of(
            r#"
            class T {
                void m() {
                    File tmpDir = new File("/some/dumb/thing");
                }
            }
            "#,
        );
        assert_eq!(kind, TaintKind::Other);
    }

    #[test]
    fn conflicting_reassignment_defeats_tracing() {
        let kind = kind_of(
            r#"
            class T {
                void m() {
                    File dir = new File(System.getProperty("java.io.tmpdir"));
                    dir = new File("/elsewhere");
                    File child = new File(dir, "/c");
                }
            }
            "#,
        );
        assert_eq!(kind, TaintKind::Other);
    }

    #[test]
    fn to_path_keeps_taint() {
        let unit = parse_unit(
            r#"
            class T {
                void m() {
                    File tempDirChild = new File(System.getProperty("java.io.tmpdir"), "/child.txt");
                    Path p = tempDirChild.toPath();
                }
            }
            "#,
        )
        .unwrap();
        let (init, scope) = last_local_init(&unit);
        assert!(is_system_temp(init, &scope));
    }
}
