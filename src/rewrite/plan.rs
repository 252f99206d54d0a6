//! Converts accepted matches into concrete tree edits.
//!
//! Matches are ordered by idiom priority and structural position, then
//! filtered so a match nested inside a statement a higher-priority match
//! removes is dropped whole, never partially applied. Code generation for
//! every idiom lives here so the appliers stay syntax-agnostic.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::idioms::{AnchorForm, DirectoryArg, IdiomMatch, MatchPayload};
use crate::tree::stmt::Assign;
use crate::tree::{
    build, AssignOp, Block, ClassDecl, Expr, IdGen, Member, NodeId, Stmt, Unit,
};

use super::helper;
use super::AppliedMatch;

/// Edits to apply in one traversal, keyed by target node.
#[derive(Debug, Default)]
pub struct EditSet {
    pub remove_stmts: HashSet<NodeId>,
    pub replace_stmts: HashMap<NodeId, Stmt>,
    pub insert_before: HashMap<NodeId, Vec<Stmt>>,
    pub replace_exprs: HashMap<NodeId, Expr>,
    /// Synthesized helper per top-level class that needs one, keyed by the
    /// class id so the helper nests next to the code that calls it.
    pub helpers: HashMap<NodeId, ClassDecl>,
    /// Total number of individual edits planned, for drop accounting.
    pub planned: usize,
}

/// Everything the apply phase and the import fixup need.
#[derive(Debug)]
pub struct Plan {
    pub edits: EditSet,
    pub accepted: Vec<AppliedMatch>,
    pub dropped_matches: usize,
    pub requested_imports: BTreeSet<String>,
}

/// Structural index over the unmodified tree: statement visit order and
/// ancestor chains, used for deterministic edit ordering and containment
/// checks. Holds ids only, so it outlives no borrow of the tree.
#[derive(Debug, Default)]
pub struct StmtIndex {
    order: HashMap<NodeId, usize>,
    ancestors: HashMap<NodeId, Vec<NodeId>>,
    enclosing: HashMap<NodeId, NodeId>,
}

impl StmtIndex {
    pub fn build(unit: &Unit) -> Self {
        let mut index = StmtIndex::default();
        let mut counter = 0usize;
        for class in &unit.classes {
            index.scan_class(class, class.id, &mut Vec::new(), &mut counter);
        }
        index
    }

    fn scan_class(
        &mut self,
        class: &ClassDecl,
        top: NodeId,
        stack: &mut Vec<NodeId>,
        counter: &mut usize,
    ) {
        for member in &class.members {
            match member {
                Member::Method(m) => self.scan_block(&m.body, top, stack, counter),
                Member::Class(c) => self.scan_class(c, top, stack, counter),
                Member::Field(_) => {}
            }
        }
    }

    fn scan_block(&mut self, block: &Block, top: NodeId, stack: &mut Vec<NodeId>, counter: &mut usize) {
        for stmt in &block.stmts {
            let id = stmt.id();
            self.order.insert(id, *counter);
            *counter += 1;
            self.ancestors.insert(id, stack.clone());
            self.enclosing.insert(id, top);
            stack.push(id);
            match stmt {
                Stmt::If(i) => {
                    self.scan_block(&i.then_block, top, stack, counter);
                    if let Some(e) = &i.else_block {
                        self.scan_block(e, top, stack, counter);
                    }
                }
                Stmt::Try(t) => {
                    self.scan_block(&t.body, top, stack, counter);
                    for c in &t.catches {
                        self.scan_block(&c.body, top, stack, counter);
                    }
                    if let Some(f) = &t.finally {
                        self.scan_block(f, top, stack, counter);
                    }
                }
                _ => {}
            }
            stack.pop();
        }
    }

    /// Top-level class a statement lives under.
    fn enclosing_class(&self, id: NodeId) -> Option<NodeId> {
        self.enclosing.get(&id).copied()
    }

    fn position(&self, id: NodeId) -> usize {
        self.order.get(&id).copied().unwrap_or(usize::MAX)
    }

    /// True when the statement or any of its ancestors is in `removed`.
    fn is_inside(&self, id: NodeId, removed: &HashSet<NodeId>) -> bool {
        removed.contains(&id)
            || self
                .ancestors
                .get(&id)
                .is_some_and(|chain| chain.iter().any(|a| removed.contains(a)))
    }
}

pub fn plan(mut matches: Vec<IdiomMatch>, index: &StmtIndex, ids: &mut IdGen) -> Plan {
    matches.sort_by_key(|m| (m.kind.priority(), index.position(m.anchor)));

    let mut plan = Plan {
        edits: EditSet::default(),
        accepted: Vec::new(),
        dropped_matches: 0,
        requested_imports: BTreeSet::new(),
    };
    let mut removed: HashSet<NodeId> = HashSet::new();

    for m in matches {
        if std::iter::once(m.anchor)
            .chain(m.consumed.iter().copied())
            .any(|id| index.is_inside(id, &removed))
        {
            log::debug!(
                "plan: dropping {:?} match at {:?}, target consumed by a higher-priority rewrite",
                m.kind,
                m.anchor
            );
            plan.dropped_matches += 1;
            continue;
        }
        for id in &m.consumed {
            removed.insert(*id);
        }
        emit(&m, &mut plan, index, ids);
        plan.accepted.push(AppliedMatch {
            kind: m.kind,
            anchor: m.anchor,
        });
    }
    plan
}

fn emit(m: &IdiomMatch, plan: &mut Plan, index: &StmtIndex, ids: &mut IdGen) {
    for id in &m.consumed {
        plan.edits.remove_stmts.insert(*id);
        plan.edits.planned += 1;
    }
    match &m.payload {
        MatchPayload::TempDirCreation {
            binding,
            anchor_form,
            prefix,
            suffix,
            directory,
        } => {
            let replacement =
                temp_dir_replacement(ids, binding, anchor_form, prefix, suffix, directory.as_ref());
            plan.edits.replace_stmts.insert(m.anchor, replacement);
            plan.edits.planned += 1;
            request(plan, "Files");
        }
        MatchPayload::TempFileDisclosure {
            call,
            prefix,
            suffix,
            directory,
        } => {
            let replacement = temp_file_replacement(ids, prefix, suffix, directory.as_ref());
            plan.edits.replace_exprs.insert(*call, replacement);
            plan.edits.planned += 1;
            request(plan, "Files");
        }
        MatchPayload::DirHijacking {
            call,
            receiver,
            receiver_is_path,
        } => {
            let invocation = helper::invocation(ids, receiver, *receiver_is_path);
            plan.edits.replace_exprs.insert(*call, invocation);
            plan.edits.planned += 1;
            if let Some(class_id) = index.enclosing_class(m.anchor) {
                if !plan.edits.helpers.contains_key(&class_id) {
                    let synthesized = helper::synthesize(ids);
                    plan.edits.helpers.insert(class_id, synthesized);
                    plan.edits.planned += 1;
                }
            }
            for path in helper::required_imports() {
                plan.requested_imports.insert((*path).to_string());
            }
        }
        MatchPayload::FileHijacking { path } => {
            let create = owner_only_create_file(ids, path);
            plan.edits
                .insert_before
                .entry(m.anchor)
                .or_default()
                .push(create);
            plan.edits.planned += 1;
            request(plan, "Files");
            request(plan, "PosixFilePermission");
            request(plan, "PosixFilePermissions");
            request(plan, "EnumSet");
        }
    }
}

fn request(plan: &mut Plan, simple: &str) {
    if let Some(path) = super::imports::known_path(simple) {
        plan.requested_imports.insert(path.to_string());
    }
}

/// `Files.createTempDirectory([dir,] prefix + suffix).toFile()` in the
/// anchor's original declaration or assignment shape.
fn temp_dir_replacement(
    ids: &mut IdGen,
    binding: &str,
    form: &AnchorForm,
    prefix: &Expr,
    suffix: &Expr,
    directory: Option<&DirectoryArg>,
) -> Stmt {
    let mut args = Vec::new();
    if let Some(dir) = directory {
        args.push(directory_argument(ids, dir));
    }
    let lhs = prefix.clone_fresh(ids);
    let rhs = suffix.clone_fresh(ids);
    args.push(build::concat(ids, lhs, rhs));
    let create = build::static_call(ids, "Files", "createTempDirectory", args);
    let value = build::call(ids, Some(create), "toFile", vec![]);
    match form {
        AnchorForm::Decl { modifiers, ty } => build::local(
            ids,
            modifiers.clone(),
            ty.clone(),
            binding,
            Some(value),
        ),
        AnchorForm::Assign => {
            let target = build::ident(ids, binding);
            Stmt::Assign(Assign {
                id: ids.fresh(),
                target,
                op: AssignOp::Set,
                value,
            })
        }
    }
}

/// `Files.createTempFile([dir.toPath(),] prefix, suffix).toFile()`; the
/// wrapper keeps downstream call sites `File`-typed.
fn temp_file_replacement(
    ids: &mut IdGen,
    prefix: &Expr,
    suffix: &Expr,
    directory: Option<&DirectoryArg>,
) -> Expr {
    let mut args = Vec::new();
    if let Some(dir) = directory {
        args.push(directory_argument(ids, dir));
    }
    args.push(prefix.clone_fresh(ids));
    args.push(suffix.clone_fresh(ids));
    let create = build::static_call(ids, "Files", "createTempFile", args);
    build::call(ids, Some(create), "toFile", vec![])
}

fn directory_argument(ids: &mut IdGen, dir: &DirectoryArg) -> Expr {
    if dir.is_path_typed {
        dir.expr.clone_fresh(ids)
    } else {
        build::to_path(ids, &dir.expr)
    }
}

/// `Files.createFile(path, PosixFilePermissions.asFileAttribute(
///     EnumSet.of(PosixFilePermission.OWNER_READ, PosixFilePermission.OWNER_WRITE)));`
fn owner_only_create_file(ids: &mut IdGen, path: &Expr) -> Stmt {
    let perms = ["OWNER_READ", "OWNER_WRITE"]
        .into_iter()
        .map(|perm| {
            let class = build::ident(ids, "PosixFilePermission");
            build::field(ids, class, perm)
        })
        .collect();
    let set = build::static_call(ids, "EnumSet", "of", perms);
    let attr = build::static_call(ids, "PosixFilePermissions", "asFileAttribute", vec![set]);
    let target = path.clone_fresh(ids);
    let create = build::static_call(ids, "Files", "createFile", vec![target, attr]);
    build::expr_stmt(ids, create)
}
