//! Idiom matchers: one per vulnerability class, each a pure function of a
//! tree region plus taint facts, producing canonical match records. The
//! collector runs the enabled matchers block by block in priority order
//! (A > C > D > B) and removes a call site from consideration once a
//! higher-priority matcher has consumed it.

pub mod calls;
pub mod dir_hijacking;
pub mod file_hijacking;
pub mod temp_dir_creation;
pub mod temp_file_disclosure;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::RewriteConfig;
use crate::tree::{Block, ClassDecl, Expr, Member, MethodDecl, NodeId, Scope, Stmt, TypeName, Unit};

/// The four vulnerability classes in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdiomKind {
    /// (A) create file, delete, mkdir(s): temp file reused as a directory.
    TempDirCreation,
    /// (C) mkdir(s) directly on a temp-rooted path.
    DirHijacking,
    /// (D) write/stream-open on a temp-rooted path without exclusive create.
    FileHijacking,
    /// (B) bare createTempFile with a predictable name.
    TempFileDisclosure,
}

impl IdiomKind {
    /// Tie-break rank for contended call sites: A > C > D > B.
    pub fn priority(self) -> u8 {
        match self {
            IdiomKind::TempDirCreation => 0,
            IdiomKind::DirHijacking => 1,
            IdiomKind::FileHijacking => 2,
            IdiomKind::TempFileDisclosure => 3,
        }
    }
}

/// Canonical match record; every syntactic variant of an idiom normalizes
/// into one of these before code generation.
#[derive(Debug, Clone)]
pub struct IdiomMatch {
    pub kind: IdiomKind,
    /// Statement the rewrite anchors on (replaced or inserted before).
    pub anchor: NodeId,
    /// Statements consumed outright by the rewrite.
    pub consumed: Vec<NodeId>,
    pub payload: MatchPayload,
}

#[derive(Debug, Clone)]
pub enum MatchPayload {
    TempDirCreation {
        binding: String,
        anchor_form: AnchorForm,
        prefix: Expr,
        suffix: Expr,
        directory: Option<DirectoryArg>,
    },
    TempFileDisclosure {
        /// The createTempFile call expression to substitute.
        call: NodeId,
        prefix: Expr,
        suffix: Expr,
        directory: Option<DirectoryArg>,
    },
    DirHijacking {
        /// The mkdir/mkdirs call expression to substitute.
        call: NodeId,
        receiver: Expr,
        receiver_is_path: bool,
    },
    FileHijacking {
        /// The tainted path argument of the write call.
        path: Expr,
    },
}

/// Shape of the statement idiom A anchors on.
#[derive(Debug, Clone)]
pub enum AnchorForm {
    /// `File tempDir = createTempFile(..);` with modifiers and type preserved.
    Decl { modifiers: Vec<String>, ty: TypeName },
    /// `tempDir = createTempFile(..);`
    Assign,
}

/// Directory argument of a 3-arg createTempFile, with the typing needed to
/// decide whether a `.toPath()` view conversion is required.
#[derive(Debug, Clone)]
pub struct DirectoryArg {
    pub expr: Expr,
    pub is_path_typed: bool,
}

/// Tracks call-expression ids already claimed by a higher-priority match.
#[derive(Debug, Default)]
pub struct ConsumedSites {
    calls: HashSet<NodeId>,
}

impl ConsumedSites {
    pub fn claim(&mut self, id: NodeId) {
        self.calls.insert(id);
    }

    pub fn is_claimed(&self, id: NodeId) -> bool {
        self.calls.contains(&id)
    }
}

/// Runs the enabled matchers over every method body in the unit and returns
/// the accepted matches, post priority tie-break.
pub fn collect(unit: &Unit, config: &RewriteConfig) -> Vec<IdiomMatch> {
    let mut matches = Vec::new();
    for class in &unit.classes {
        collect_class(class, config, &mut matches);
    }
    matches
}

fn collect_class(class: &ClassDecl, config: &RewriteConfig, matches: &mut Vec<IdiomMatch>) {
    for member in &class.members {
        match member {
            Member::Method(method) => collect_method(class, method, config, matches),
            Member::Class(nested) => collect_class(nested, config, matches),
            Member::Field(_) => {}
        }
    }
}

fn collect_method(
    class: &ClassDecl,
    method: &MethodDecl,
    config: &RewriteConfig,
    matches: &mut Vec<IdiomMatch>,
) {
    let scope = Scope::of_method(class, method);
    let mut consumed = ConsumedSites::default();
    collect_block(&method.body, &scope, config, &mut consumed, matches);
}

fn collect_block(
    block: &Block,
    scope: &Scope,
    config: &RewriteConfig,
    consumed: &mut ConsumedSites,
    matches: &mut Vec<IdiomMatch>,
) {
    // Priority order inside one block; each matcher claims the call sites
    // it consumes so the lower-priority ones skip them.
    if config.temp_dir_creation {
        temp_dir_creation::match_block(block, scope, consumed, matches);
    }
    if config.dir_hijacking {
        dir_hijacking::match_block(block, scope, consumed, matches);
    }
    if config.file_hijacking {
        file_hijacking::match_block(block, scope, consumed, matches);
    }
    if config.temp_file_disclosure {
        temp_file_disclosure::match_block(block, scope, consumed, matches);
    }

    for stmt in &block.stmts {
        match stmt {
            Stmt::If(i) => {
                collect_block(&i.then_block, scope, config, consumed, matches);
                if let Some(e) = &i.else_block {
                    collect_block(e, scope, config, consumed, matches);
                }
            }
            Stmt::Try(t) => {
                collect_block(&t.body, scope, config, consumed, matches);
                for c in &t.catches {
                    collect_block(&c.body, scope, config, consumed, matches);
                }
                if let Some(f) = &t.finally {
                    collect_block(f, scope, config, consumed, matches);
                }
            }
            _ => {}
        }
    }
}

/// Walks an expression tree looking for the first subexpression satisfying
/// the predicate.
pub(crate) fn find_expr<'a>(expr: &'a Expr, pred: &dyn Fn(&Expr) -> bool) -> Option<&'a Expr> {
    if pred(expr) {
        return Some(expr);
    }
    match expr {
        Expr::Literal { .. } | Expr::Ident { .. } => None,
        Expr::Field { target, .. } => find_expr(target, pred),
        Expr::Call(c) => c
            .target
            .as_deref()
            .and_then(|t| find_expr(t, pred))
            .or_else(|| c.args.iter().find_map(|a| find_expr(a, pred))),
        Expr::New(n) => n.args.iter().find_map(|a| find_expr(a, pred)),
        Expr::Binary { lhs, rhs, .. } => {
            find_expr(lhs, pred).or_else(|| find_expr(rhs, pred))
        }
        Expr::Unary { operand, .. } => find_expr(operand, pred),
    }
}
