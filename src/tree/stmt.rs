//! Statement nodes covering the surface the idiom catalog exercises.

use super::expr::Expr;
use super::{Block, NodeId, TypeName};

#[derive(Debug, Clone)]
pub enum Stmt {
    Local(LocalVar),
    Expr { id: NodeId, expr: Expr },
    Assign(Assign),
    If(IfStmt),
    Return { id: NodeId, value: Option<Expr> },
    Throw { id: NodeId, value: Expr },
    Try(TryStmt),
}

#[derive(Debug, Clone)]
pub struct LocalVar {
    pub id: NodeId,
    pub modifiers: Vec<String>,
    pub ty: TypeName,
    pub name: String,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct Assign {
    pub id: NodeId,
    pub target: Expr,
    pub op: AssignOp,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Set,
    /// `&=`, the boolean-accumulator form.
    AndSet,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub id: NodeId,
    pub cond: Expr,
    pub then_block: Block,
    pub else_block: Option<Block>,
}

#[derive(Debug, Clone)]
pub struct TryStmt {
    pub id: NodeId,
    pub resources: Vec<LocalVar>,
    pub body: Block,
    pub catches: Vec<CatchClause>,
    pub finally: Option<Block>,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub ty: TypeName,
    pub name: String,
    pub body: Block,
}

impl Stmt {
    pub fn id(&self) -> NodeId {
        match self {
            Stmt::Local(l) => l.id,
            Stmt::Expr { id, .. } | Stmt::Return { id, .. } | Stmt::Throw { id, .. } => *id,
            Stmt::Assign(a) => a.id,
            Stmt::If(i) => i.id,
            Stmt::Try(t) => t.id,
        }
    }

    /// The statement's expression when it is a bare expression statement.
    pub fn as_expr_stmt(&self) -> Option<&Expr> {
        match self {
            Stmt::Expr { expr, .. } => Some(expr),
            _ => None,
        }
    }
}
