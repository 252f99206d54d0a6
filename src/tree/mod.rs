//! Program-tree data model for one Java compilation unit.
//!
//! The rewriting core does not parse or print source itself; it operates on
//! this tree, which a host framework (or the in-crate [`crate::testkit`]
//! fixture harness) produces. Every statement and expression carries a
//! [`NodeId`] so the read-only analysis pass can hand positions to the edit
//! pass without holding borrows across the mutation.

pub mod build;
pub mod expr;
pub mod render;
pub mod scope;
pub mod stmt;

pub use expr::{BinOp, Call, Expr, Literal, NewExpr, UnOp};
pub use scope::Scope;
pub use stmt::{Assign, AssignOp, CatchClause, IfStmt, LocalVar, Stmt, TryStmt};

use serde::{Deserialize, Serialize};

/// Stable handle for a statement or expression within one [`Unit`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct NodeId(pub u32);

/// Monotone id allocator, owned by the [`Unit`] it numbers.
#[derive(Debug, Clone, Default)]
pub struct IdGen {
    next: u32,
}

impl IdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

/// One compilation unit: package, imports, top-level classes.
#[derive(Debug, Clone)]
pub struct Unit {
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub classes: Vec<ClassDecl>,
    pub ids: IdGen,
}

impl Unit {
    pub fn new() -> Self {
        Self {
            package: None,
            imports: Vec::new(),
            classes: Vec::new(),
            ids: IdGen::new(),
        }
    }

    pub fn has_import(&self, path: &str) -> bool {
        self.imports.iter().any(|i| i.path == path)
    }
}

impl Default for Unit {
    fn default() -> Self {
        Self::new()
    }
}

/// A single-type import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub path: String,
}

impl Import {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Last segment of the imported path.
    pub fn simple_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }
}

/// Possibly generic, possibly array-suffixed type reference, kept textual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base name with generics and array brackets stripped: `EnumSet<X>[]` -> `EnumSet`.
    pub fn base(&self) -> &str {
        let end = self
            .0
            .find(|c| c == '<' || c == '[')
            .unwrap_or(self.0.len());
        &self.0[..end]
    }

    /// Every simple type name mentioned, including generic arguments.
    pub fn simple_names(&self) -> Vec<&str> {
        self.0
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn is(&self, name: &str) -> bool {
        self.base() == name
    }
}

impl std::fmt::Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub id: NodeId,
    pub modifiers: Vec<String>,
    pub name: String,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    Class(ClassDecl),
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub id: NodeId,
    pub modifiers: Vec<String>,
    pub ty: TypeName,
    pub name: String,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub id: NodeId,
    pub modifiers: Vec<String>,
    pub ret: TypeName,
    pub name: String,
    pub params: Vec<Param>,
    pub throws: Vec<String>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub ty: TypeName,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub id: NodeId,
    pub stmts: Vec<Stmt>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_gen_is_monotone() {
        let mut ids = IdGen::new();
        let a = ids.fresh();
        let b = ids.fresh();
        assert!(b > a);
    }

    #[test]
    fn type_name_base_strips_generics_and_arrays() {
        assert_eq!(TypeName::new("EnumSet<PosixFilePermission>").base(), "EnumSet");
        assert_eq!(TypeName::new("byte[]").base(), "byte");
        assert_eq!(TypeName::new("File").base(), "File");
    }

    #[test]
    fn type_name_simple_names_include_generic_args() {
        let ty = TypeName::new("EnumSet<PosixFilePermission>");
        assert_eq!(ty.simple_names(), vec!["EnumSet", "PosixFilePermission"]);
    }

    #[test]
    fn import_simple_name() {
        assert_eq!(Import::new("java.nio.file.Files").simple_name(), "Files");
    }
}
