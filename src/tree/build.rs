//! Constructors for synthesized tree fragments. Every builder allocates
//! fresh ids from the unit's [`IdGen`] so generated code never collides
//! with analyzed nodes.

use super::expr::{BinOp, Call, Expr, Literal, NewExpr, UnOp};
use super::stmt::{IfStmt, LocalVar, Stmt};
use super::{Block, IdGen, TypeName};

pub fn ident(ids: &mut IdGen, name: impl Into<String>) -> Expr {
    Expr::Ident {
        id: ids.fresh(),
        name: name.into(),
    }
}

pub fn string(ids: &mut IdGen, value: impl Into<String>) -> Expr {
    Expr::Literal {
        id: ids.fresh(),
        value: Literal::Str(value.into()),
    }
}

pub fn bool_lit(ids: &mut IdGen, value: bool) -> Expr {
    Expr::Literal {
        id: ids.fresh(),
        value: Literal::Bool(value),
    }
}

pub fn null(ids: &mut IdGen) -> Expr {
    Expr::Literal {
        id: ids.fresh(),
        value: Literal::Null,
    }
}

pub fn field(ids: &mut IdGen, target: Expr, name: impl Into<String>) -> Expr {
    Expr::Field {
        id: ids.fresh(),
        target: Box::new(target),
        name: name.into(),
    }
}

pub fn call(ids: &mut IdGen, target: Option<Expr>, name: impl Into<String>, args: Vec<Expr>) -> Expr {
    Expr::Call(Call {
        id: ids.fresh(),
        target: target.map(Box::new),
        name: name.into(),
        args,
    })
}

pub fn static_call(
    ids: &mut IdGen,
    class: impl Into<String>,
    name: impl Into<String>,
    args: Vec<Expr>,
) -> Expr {
    let target = ident(ids, class);
    call(ids, Some(target), name, args)
}

pub fn new_class(ids: &mut IdGen, class: impl Into<String>, args: Vec<Expr>) -> Expr {
    Expr::New(NewExpr {
        id: ids.fresh(),
        class: class.into(),
        args,
    })
}

pub fn concat(ids: &mut IdGen, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        id: ids.fresh(),
        op: BinOp::Plus,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

pub fn and(ids: &mut IdGen, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        id: ids.fresh(),
        op: BinOp::And,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

pub fn or(ids: &mut IdGen, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        id: ids.fresh(),
        op: BinOp::Or,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

pub fn not(ids: &mut IdGen, operand: Expr) -> Expr {
    Expr::Unary {
        id: ids.fresh(),
        op: UnOp::Not,
        operand: Box::new(operand),
    }
}

pub fn expr_stmt(ids: &mut IdGen, expr: Expr) -> Stmt {
    Stmt::Expr {
        id: ids.fresh(),
        expr,
    }
}

pub fn local(
    ids: &mut IdGen,
    modifiers: Vec<String>,
    ty: TypeName,
    name: impl Into<String>,
    init: Option<Expr>,
) -> Stmt {
    Stmt::Local(LocalVar {
        id: ids.fresh(),
        modifiers,
        ty,
        name: name.into(),
        init,
    })
}

pub fn block(ids: &mut IdGen, stmts: Vec<Stmt>) -> Block {
    Block {
        id: ids.fresh(),
        stmts,
    }
}

pub fn if_stmt(ids: &mut IdGen, cond: Expr, then_block: Block, else_block: Option<Block>) -> Stmt {
    Stmt::If(IfStmt {
        id: ids.fresh(),
        cond,
        then_block,
        else_block,
    })
}

pub fn throw_new(ids: &mut IdGen, class: impl Into<String>, args: Vec<Expr>) -> Stmt {
    let value = new_class(ids, class, args);
    Stmt::Throw {
        id: ids.fresh(),
        value,
    }
}

/// `recv.toPath()` around an analyzed receiver, renumbered.
pub fn to_path(ids: &mut IdGen, recv: &Expr) -> Expr {
    let recv = recv.clone_fresh(ids);
    call(ids, Some(recv), "toPath", vec![])
}
