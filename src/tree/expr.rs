//! Expression nodes and the structural accessors the matchers rely on.

use super::{IdGen, NodeId};

#[derive(Debug, Clone)]
pub enum Expr {
    Literal { id: NodeId, value: Literal },
    Ident { id: NodeId, name: String },
    /// Qualified name or instance field read: `System.out`, `C.FILE`,
    /// `StandardOpenOption.CREATE_NEW`.
    Field {
        id: NodeId,
        target: Box<Expr>,
        name: String,
    },
    Call(Call),
    New(NewExpr),
    Binary {
        id: NodeId,
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        id: NodeId,
        op: UnOp,
        operand: Box<Expr>,
    },
}

/// Method invocation; `target == None` means an unqualified call.
#[derive(Debug, Clone)]
pub struct Call {
    pub id: NodeId,
    pub target: Option<Box<Expr>>,
    pub name: String,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct NewExpr {
    pub id: NodeId,
    pub class: String,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Str(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Plus,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Not,
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Literal { id, .. }
            | Expr::Ident { id, .. }
            | Expr::Field { id, .. }
            | Expr::Binary { id, .. }
            | Expr::Unary { id, .. } => *id,
            Expr::Call(c) => c.id,
            Expr::New(n) => n.id,
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&Call> {
        match self {
            Expr::Call(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_str_literal(&self) -> Option<&str> {
        match self {
            Expr::Literal {
                value: Literal::Str(s),
                ..
            } => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Expr::Literal {
                value: Literal::Null,
                ..
            }
        )
    }

    /// True when the call is a static invocation `Class.name(..)`.
    pub fn is_static_call(&self, class: &str, name: &str) -> bool {
        match self {
            Expr::Call(c) => {
                c.name == name
                    && c.target
                        .as_deref()
                        .and_then(Expr::as_ident)
                        .is_some_and(|t| t == class)
            }
            _ => false,
        }
    }

    /// True when the expression mentions `name` as a bare identifier anywhere.
    pub fn mentions_ident(&self, name: &str) -> bool {
        match self {
            Expr::Ident { name: n, .. } => n == name,
            Expr::Literal { .. } => false,
            Expr::Field { target, .. } => target.mentions_ident(name),
            Expr::Call(c) => {
                c.target.as_deref().is_some_and(|t| t.mentions_ident(name))
                    || c.args.iter().any(|a| a.mentions_ident(name))
            }
            Expr::New(n) => n.args.iter().any(|a| a.mentions_ident(name)),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.mentions_ident(name) || rhs.mentions_ident(name)
            }
            Expr::Unary { operand, .. } => operand.mentions_ident(name),
        }
    }

    /// True when `name` is handed whole to a call or constructor argument.
    /// Receiver position and reads nested under further calls do not count;
    /// this is the escape test for binding invalidation.
    pub fn passes_ident_as_arg(&self, name: &str) -> bool {
        match self {
            Expr::Literal { .. } | Expr::Ident { .. } => false,
            Expr::Field { target, .. } => target.passes_ident_as_arg(name),
            Expr::Call(c) => {
                c.args
                    .iter()
                    .any(|a| a.as_ident() == Some(name) || a.passes_ident_as_arg(name))
                    || c.target
                        .as_deref()
                        .is_some_and(|t| t.passes_ident_as_arg(name))
            }
            Expr::New(n) => n
                .args
                .iter()
                .any(|a| a.as_ident() == Some(name) || a.passes_ident_as_arg(name)),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.passes_ident_as_arg(name) || rhs.passes_ident_as_arg(name)
            }
            Expr::Unary { operand, .. } => operand.passes_ident_as_arg(name),
        }
    }

    /// Deep clone with every node renumbered, for inserting an analyzed
    /// subexpression into generated code without duplicating ids.
    pub fn clone_fresh(&self, ids: &mut IdGen) -> Expr {
        let mut cloned = self.clone();
        cloned.renumber(ids);
        cloned
    }

    fn renumber(&mut self, ids: &mut IdGen) {
        match self {
            Expr::Literal { id, .. } | Expr::Ident { id, .. } => *id = ids.fresh(),
            Expr::Field { id, target, .. } => {
                *id = ids.fresh();
                target.renumber(ids);
            }
            Expr::Call(c) => {
                c.id = ids.fresh();
                if let Some(t) = c.target.as_deref_mut() {
                    t.renumber(ids);
                }
                for a in &mut c.args {
                    a.renumber(ids);
                }
            }
            Expr::New(n) => {
                n.id = ids.fresh();
                for a in &mut n.args {
                    a.renumber(ids);
                }
            }
            Expr::Binary { id, lhs, rhs, .. } => {
                *id = ids.fresh();
                lhs.renumber(ids);
                rhs.renumber(ids);
            }
            Expr::Unary { id, operand, .. } => {
                *id = ids.fresh();
                operand.renumber(ids);
            }
        }
    }
}

impl Call {
    /// Receiver, when the call has one.
    pub fn receiver(&self) -> Option<&Expr> {
        self.target.as_deref()
    }

    /// True for `recv.name()` where `recv` is the given identifier.
    pub fn is_on_ident(&self, name: &str, ident: &str) -> bool {
        self.name == name && self.receiver().and_then(Expr::as_ident) == Some(ident)
    }
}
