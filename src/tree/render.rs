//! Deterministic pretty-printer for a [`Unit`].
//!
//! Comparisons in tests normalize both sides through parse-then-render, so
//! the only requirement here is a single canonical layout: four-space
//! indentation, one blank line between members, `else if` collapsed.

use super::expr::{BinOp, Expr, Literal, UnOp};
use super::stmt::{AssignOp, IfStmt, Stmt};
use super::{Block, ClassDecl, FieldDecl, Member, MethodDecl, Unit};

pub fn render_unit(unit: &Unit) -> String {
    let mut out = String::new();
    if let Some(pkg) = &unit.package {
        out.push_str(&format!("package {};\n\n", pkg));
    }
    if !unit.imports.is_empty() {
        for import in &unit.imports {
            out.push_str(&format!("import {};\n", import.path));
        }
        out.push('\n');
    }
    for (i, class) in unit.classes.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_class(&mut out, class, 0);
    }
    out
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("    ");
    }
}

fn modifiers(mods: &[String]) -> String {
    if mods.is_empty() {
        String::new()
    } else {
        format!("{} ", mods.join(" "))
    }
}

fn render_class(out: &mut String, class: &ClassDecl, level: usize) {
    indent(out, level);
    out.push_str(&format!("{}class {} {{\n", modifiers(&class.modifiers), class.name));
    for (i, member) in class.members.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match member {
            Member::Field(f) => render_field(out, f, level + 1),
            Member::Method(m) => render_method(out, m, level + 1),
            Member::Class(c) => render_class(out, c, level + 1),
        }
    }
    indent(out, level);
    out.push_str("}\n");
}

fn render_field(out: &mut String, field: &FieldDecl, level: usize) {
    indent(out, level);
    out.push_str(&format!("{}{} {}", modifiers(&field.modifiers), field.ty, field.name));
    if let Some(init) = &field.init {
        out.push_str(" = ");
        out.push_str(&render_expr(init));
    }
    out.push_str(";\n");
}

fn render_method(out: &mut String, method: &MethodDecl, level: usize) {
    indent(out, level);
    let params = method
        .params
        .iter()
        .map(|p| format!("{} {}", p.ty, p.name))
        .collect::<Vec<_>>()
        .join(", ");
    out.push_str(&format!(
        "{}{} {}({})",
        modifiers(&method.modifiers),
        method.ret,
        method.name,
        params
    ));
    if !method.throws.is_empty() {
        out.push_str(&format!(" throws {}", method.throws.join(", ")));
    }
    out.push_str(" {\n");
    render_block_stmts(out, &method.body, level + 1);
    indent(out, level);
    out.push_str("}\n");
}

fn render_block_stmts(out: &mut String, block: &Block, level: usize) {
    for stmt in &block.stmts {
        render_stmt(out, stmt, level);
    }
}

fn render_stmt(out: &mut String, stmt: &Stmt, level: usize) {
    match stmt {
        Stmt::Local(l) => {
            indent(out, level);
            out.push_str(&format!("{}{} {}", modifiers(&l.modifiers), l.ty, l.name));
            if let Some(init) = &l.init {
                out.push_str(" = ");
                out.push_str(&render_expr(init));
            }
            out.push_str(";\n");
        }
        Stmt::Expr { expr, .. } => {
            indent(out, level);
            out.push_str(&render_expr(expr));
            out.push_str(";\n");
        }
        Stmt::Assign(a) => {
            indent(out, level);
            let op = match a.op {
                AssignOp::Set => "=",
                AssignOp::AndSet => "&=",
            };
            out.push_str(&format!(
                "{} {} {};\n",
                render_expr(&a.target),
                op,
                render_expr(&a.value)
            ));
        }
        Stmt::If(i) => {
            indent(out, level);
            render_if(out, i, level);
        }
        Stmt::Return { value, .. } => {
            indent(out, level);
            match value {
                Some(v) => out.push_str(&format!("return {};\n", render_expr(v))),
                None => out.push_str("return;\n"),
            }
        }
        Stmt::Throw { value, .. } => {
            indent(out, level);
            out.push_str(&format!("throw {};\n", render_expr(value)));
        }
        Stmt::Try(t) => {
            indent(out, level);
            if t.resources.is_empty() {
                out.push_str("try {\n");
            } else {
                let res = t
                    .resources
                    .iter()
                    .map(|r| {
                        let init = r
                            .init
                            .as_ref()
                            .map(|e| format!(" = {}", render_expr(e)))
                            .unwrap_or_default();
                        format!("{}{} {}{}", modifiers(&r.modifiers), r.ty, r.name, init)
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                out.push_str(&format!("try ({}) {{\n", res));
            }
            render_block_stmts(out, &t.body, level + 1);
            for c in &t.catches {
                indent(out, level);
                out.push_str(&format!("}} catch ({} {}) {{\n", c.ty, c.name));
                render_block_stmts(out, &c.body, level + 1);
            }
            if let Some(f) = &t.finally {
                indent(out, level);
                out.push_str("} finally {\n");
                render_block_stmts(out, f, level + 1);
            }
            indent(out, level);
            out.push_str("}\n");
        }
    }
}

/// Renders `if`, collapsing an else-branch that is a single nested `if`
/// into `else if`.
fn render_if(out: &mut String, stmt: &IfStmt, level: usize) {
    out.push_str(&format!("if ({}) {{\n", render_expr(&stmt.cond)));
    render_block_stmts(out, &stmt.then_block, level + 1);
    if let Some(else_block) = &stmt.else_block {
        if let [Stmt::If(nested)] = else_block.stmts.as_slice() {
            indent(out, level);
            out.push_str("} else ");
            render_if(out, nested, level);
            return;
        }
        indent(out, level);
        out.push_str("} else {\n");
        render_block_stmts(out, else_block, level + 1);
    }
    indent(out, level);
    out.push_str("}\n");
}

pub fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Literal { value, .. } => match value {
            Literal::Str(s) => format!("\"{}\"", escape(s)),
            Literal::Bool(b) => b.to_string(),
            Literal::Null => "null".to_string(),
        },
        Expr::Ident { name, .. } => name.clone(),
        Expr::Field { target, name, .. } => format!("{}.{}", render_expr(target), name),
        Expr::Call(c) => {
            let args = c
                .args
                .iter()
                .map(render_expr)
                .collect::<Vec<_>>()
                .join(", ");
            match &c.target {
                Some(t) => format!("{}.{}({})", render_expr(t), c.name, args),
                None => format!("{}({})", c.name, args),
            }
        }
        Expr::New(n) => {
            let args = n
                .args
                .iter()
                .map(render_expr)
                .collect::<Vec<_>>()
                .join(", ");
            format!("new {}({})", n.class, args)
        }
        Expr::Binary { op, lhs, rhs, .. } => {
            let sym = match op {
                BinOp::Plus => "+",
                BinOp::And => "&&",
                BinOp::Or => "||",
            };
            format!(
                "{} {} {}",
                render_operand(lhs, *op),
                sym,
                render_operand(rhs, *op)
            )
        }
        Expr::Unary { op, operand, .. } => {
            let sym = match op {
                UnOp::Not => "!",
            };
            if matches!(operand.as_ref(), Expr::Binary { .. }) {
                format!("{}({})", sym, render_expr(operand))
            } else {
                format!("{}{}", sym, render_expr(operand))
            }
        }
    }
}

fn precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Or => 1,
        BinOp::And => 2,
        BinOp::Plus => 3,
    }
}

fn render_operand(operand: &Expr, parent: BinOp) -> String {
    match operand {
        Expr::Binary { op, .. } if precedence(*op) < precedence(parent) => {
            format!("({})", render_expr(operand))
        }
        _ => render_expr(operand),
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
