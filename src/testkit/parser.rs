//! Recursive-descent parser for the Java subset fixtures are written in.
//!
//! Supported: package and single-type imports, classes with nested
//! classes, fields, methods with throws clauses, local declarations,
//! `=`/`&=` assignments, if/else, return, throw, try/catch/finally with
//! resources, and expressions over calls, field reads, `new`, string and
//! boolean literals, `+`, `&&`, `||`, `!`. That is the whole fixture
//! surface; anything else is a parse error, not a silent skip.

use anyhow::Result;

use crate::errors::TempmendError;
use crate::tree::stmt::{Assign, AssignOp, CatchClause, LocalVar, TryStmt};
use crate::tree::{
    build, Block, ClassDecl, Expr, FieldDecl, IdGen, Import, Member, MethodDecl, Param, Stmt,
    TypeName, Unit,
};

pub fn parse_unit(src: &str) -> Result<Unit> {
    let tokens = lex(src)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        ids: IdGen::new(),
    };
    let unit = parser.unit()?;
    Ok(unit)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Ident(String),
    Str(String),
    Punct(&'static str),
}

fn lex(src: &str) -> Result<Vec<(Tok, usize)>> {
    let mut tokens = Vec::new();
    let mut chars = src.chars().peekable();
    let mut line = 1usize;

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '/' => {
                chars.next();
                match chars.peek() {
                    Some('/') => {
                        for c in chars.by_ref() {
                            if c == '\n' {
                                line += 1;
                                break;
                            }
                        }
                    }
                    Some('*') => {
                        chars.next();
                        let mut prev = ' ';
                        for c in chars.by_ref() {
                            if c == '\n' {
                                line += 1;
                            }
                            if prev == '*' && c == '/' {
                                break;
                            }
                            prev = c;
                        }
                    }
                    _ => return Err(parse_err(line, "unexpected `/`")),
                }
            }
            '"' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('"') => s.push('"'),
                            Some('\\') => s.push('\\'),
                            Some('n') => s.push('\n'),
                            _ => return Err(parse_err(line, "bad escape in string")),
                        },
                        Some('\n') | None => {
                            return Err(parse_err(line, "unterminated string"));
                        }
                        Some(c) => s.push(c),
                    }
                }
                tokens.push((Tok::Str(s), line));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((Tok::Ident(name), line));
            }
            '&' => {
                chars.next();
                match chars.peek() {
                    Some('&') => {
                        chars.next();
                        tokens.push((Tok::Punct("&&"), line));
                    }
                    Some('=') => {
                        chars.next();
                        tokens.push((Tok::Punct("&="), line));
                    }
                    _ => return Err(parse_err(line, "unexpected `&`")),
                }
            }
            '|' => {
                chars.next();
                if chars.peek() == Some(&'|') {
                    chars.next();
                    tokens.push((Tok::Punct("||"), line));
                } else {
                    return Err(parse_err(line, "unexpected `|`"));
                }
            }
            _ => {
                chars.next();
                let punct = match c {
                    '{' => "{",
                    '}' => "}",
                    '(' => "(",
                    ')' => ")",
                    '[' => "[",
                    ']' => "]",
                    '<' => "<",
                    '>' => ">",
                    ';' => ";",
                    ',' => ",",
                    '.' => ".",
                    '=' => "=",
                    '!' => "!",
                    '+' => "+",
                    _ => return Err(parse_err(line, &format!("unexpected `{}`", c))),
                };
                tokens.push((Tok::Punct(punct), line));
            }
        }
    }
    Ok(tokens)
}

fn parse_err(line: usize, message: &str) -> anyhow::Error {
    TempmendError::Parse {
        line,
        message: message.to_string(),
    }
    .into()
}

const MODIFIERS: &[&str] = &["public", "private", "protected", "static", "final", "abstract"];

struct Parser {
    tokens: Vec<(Tok, usize)>,
    pos: usize,
    ids: IdGen,
}

impl Parser {
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, l)| *l)
            .unwrap_or(1)
    }

    fn err(&self, message: &str) -> anyhow::Error {
        parse_err(self.line(), message)
    }

    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_at(&self, offset: usize) -> Option<&Tok> {
        self.tokens.get(self.pos + offset).map(|(t, _)| t)
    }

    fn next(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn at_punct(&self, p: &str) -> bool {
        matches!(self.peek(), Some(Tok::Punct(q)) if *q == p)
    }

    fn at_keyword(&self, kw: &str) -> bool {
        matches!(self.peek(), Some(Tok::Ident(n)) if n == kw)
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.at_punct(p) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.at_keyword(kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: &str) -> Result<()> {
        if self.eat_punct(p) {
            Ok(())
        } else {
            Err(self.err(&format!("expected `{}`", p)))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.peek() {
            Some(Tok::Ident(n)) => {
                let name = n.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.err("expected identifier")),
        }
    }

    fn unit(&mut self) -> Result<Unit> {
        let mut unit = Unit::new();
        if self.eat_keyword("package") {
            unit.package = Some(self.qualified_name()?);
            self.expect_punct(";")?;
        }
        while self.eat_keyword("import") {
            let path = self.qualified_name()?;
            self.expect_punct(";")?;
            unit.imports.push(Import::new(path));
        }
        while self.peek().is_some() {
            unit.classes.push(self.class_decl()?);
        }
        unit.ids = std::mem::take(&mut self.ids);
        Ok(unit)
    }

    fn qualified_name(&mut self) -> Result<String> {
        let mut path = self.expect_ident()?;
        while self.eat_punct(".") {
            path.push('.');
            path.push_str(&self.expect_ident()?);
        }
        Ok(path)
    }

    fn modifiers(&mut self) -> Vec<String> {
        let mut mods = Vec::new();
        while let Some(Tok::Ident(n)) = self.peek() {
            if MODIFIERS.contains(&n.as_str()) {
                mods.push(n.clone());
                self.pos += 1;
            } else {
                break;
            }
        }
        mods
    }

    fn class_decl(&mut self) -> Result<ClassDecl> {
        let modifiers = self.modifiers();
        if !self.eat_keyword("class") {
            return Err(self.err("expected `class`"));
        }
        let name = self.expect_ident()?;
        self.expect_punct("{")?;
        let mut members = Vec::new();
        while !self.eat_punct("}") {
            members.push(self.member()?);
        }
        Ok(ClassDecl {
            id: self.ids.fresh(),
            modifiers,
            name,
            members,
        })
    }

    fn member(&mut self) -> Result<Member> {
        let start = self.pos;
        let modifiers = self.modifiers();
        if self.at_keyword("class") {
            self.pos = start;
            return Ok(Member::Class(self.class_decl()?));
        }
        let ty = self.type_name()?;
        let name = self.expect_ident()?;
        if self.at_punct("(") {
            Ok(Member::Method(self.method_rest(modifiers, ty, name)?))
        } else {
            let init = if self.eat_punct("=") {
                Some(self.expr()?)
            } else {
                None
            };
            self.expect_punct(";")?;
            Ok(Member::Field(FieldDecl {
                id: self.ids.fresh(),
                modifiers,
                ty,
                name,
                init,
            }))
        }
    }

    fn method_rest(
        &mut self,
        modifiers: Vec<String>,
        ret: TypeName,
        name: String,
    ) -> Result<MethodDecl> {
        self.expect_punct("(")?;
        let mut params = Vec::new();
        if !self.at_punct(")") {
            loop {
                let ty = self.type_name()?;
                let name = self.expect_ident()?;
                params.push(Param { ty, name });
                if !self.eat_punct(",") {
                    break;
                }
            }
        }
        self.expect_punct(")")?;
        let mut throws = Vec::new();
        if self.eat_keyword("throws") {
            loop {
                throws.push(self.expect_ident()?);
                if !self.eat_punct(",") {
                    break;
                }
            }
        }
        let body = self.block()?;
        Ok(MethodDecl {
            id: self.ids.fresh(),
            modifiers,
            ret,
            name,
            params,
            throws,
            body,
        })
    }

    /// Textual type: identifier, optional balanced generics, `[]` suffixes.
    fn type_name(&mut self) -> Result<TypeName> {
        let mut text = self.expect_ident()?;
        if self.at_punct("<") {
            let mut depth = 0usize;
            loop {
                match self.next() {
                    Some(Tok::Punct("<")) => {
                        depth += 1;
                        text.push('<');
                    }
                    Some(Tok::Punct(">")) => {
                        depth -= 1;
                        text.push('>');
                        if depth == 0 {
                            break;
                        }
                    }
                    Some(Tok::Punct(",")) => text.push_str(", "),
                    Some(Tok::Ident(n)) => text.push_str(&n),
                    _ => return Err(self.err("malformed generic type")),
                }
            }
        }
        while self.at_punct("[") && self.peek_at(1) == Some(&Tok::Punct("]")) {
            self.pos += 2;
            text.push_str("[]");
        }
        Ok(TypeName::new(text))
    }

    fn block(&mut self) -> Result<Block> {
        self.expect_punct("{")?;
        let mut stmts = Vec::new();
        while !self.eat_punct("}") {
            stmts.push(self.stmt()?);
        }
        Ok(Block {
            id: self.ids.fresh(),
            stmts,
        })
    }

    fn stmt(&mut self) -> Result<Stmt> {
        if self.at_keyword("if") {
            return self.if_stmt();
        }
        if self.eat_keyword("return") {
            let value = if self.at_punct(";") {
                None
            } else {
                Some(self.expr()?)
            };
            self.expect_punct(";")?;
            return Ok(Stmt::Return {
                id: self.ids.fresh(),
                value,
            });
        }
        if self.eat_keyword("throw") {
            let value = self.expr()?;
            self.expect_punct(";")?;
            return Ok(Stmt::Throw {
                id: self.ids.fresh(),
                value,
            });
        }
        if self.at_keyword("try") {
            return self.try_stmt();
        }
        if let Some(local) = self.try_local_decl()? {
            return Ok(Stmt::Local(local));
        }
        let target = self.expr()?;
        if self.eat_punct("=") {
            let value = self.expr()?;
            self.expect_punct(";")?;
            return Ok(Stmt::Assign(Assign {
                id: self.ids.fresh(),
                target,
                op: AssignOp::Set,
                value,
            }));
        }
        if self.eat_punct("&=") {
            let value = self.expr()?;
            self.expect_punct(";")?;
            return Ok(Stmt::Assign(Assign {
                id: self.ids.fresh(),
                target,
                op: AssignOp::AndSet,
                value,
            }));
        }
        self.expect_punct(";")?;
        Ok(Stmt::Expr {
            id: self.ids.fresh(),
            expr: target,
        })
    }

    /// Attempts `modifiers type name [= init];`, rewinding on any mismatch
    /// so the caller can fall back to an expression statement. Ids are only
    /// allocated after the shape is confirmed.
    fn try_local_decl(&mut self) -> Result<Option<LocalVar>> {
        let start = self.pos;
        let modifiers = self.modifiers();
        let ty = match self.type_name() {
            Ok(ty) => ty,
            Err(_) => {
                self.pos = start;
                return Ok(None);
            }
        };
        let name = match self.peek() {
            Some(Tok::Ident(n)) if !MODIFIERS.contains(&n.as_str()) => {
                let name = n.clone();
                self.pos += 1;
                name
            }
            _ => {
                self.pos = start;
                return Ok(None);
            }
        };
        if self.eat_punct("=") {
            let init = self.expr()?;
            self.expect_punct(";")?;
            Ok(Some(LocalVar {
                id: self.ids.fresh(),
                modifiers,
                ty,
                name,
                init: Some(init),
            }))
        } else if self.eat_punct(";") {
            Ok(Some(LocalVar {
                id: self.ids.fresh(),
                modifiers,
                ty,
                name,
                init: None,
            }))
        } else {
            self.pos = start;
            Ok(None)
        }
    }

    fn if_stmt(&mut self) -> Result<Stmt> {
        self.eat_keyword("if");
        self.expect_punct("(")?;
        let cond = self.expr()?;
        self.expect_punct(")")?;
        let then_block = self.block()?;
        let else_block = if self.eat_keyword("else") {
            if self.at_keyword("if") {
                // `else if` re-wraps as a single-statement else block.
                let nested = self.if_stmt()?;
                Some(Block {
                    id: self.ids.fresh(),
                    stmts: vec![nested],
                })
            } else {
                Some(self.block()?)
            }
        } else {
            None
        };
        Ok(build::if_stmt(&mut self.ids, cond, then_block, else_block))
    }

    fn try_stmt(&mut self) -> Result<Stmt> {
        self.eat_keyword("try");
        let mut resources = Vec::new();
        if self.eat_punct("(") {
            loop {
                let modifiers = self.modifiers();
                let ty = self.type_name()?;
                let name = self.expect_ident()?;
                let init = if self.eat_punct("=") {
                    Some(self.expr()?)
                } else {
                    None
                };
                resources.push(LocalVar {
                    id: self.ids.fresh(),
                    modifiers,
                    ty,
                    name,
                    init,
                });
                if !self.eat_punct(";") {
                    break;
                }
                if self.at_punct(")") {
                    break;
                }
            }
            self.expect_punct(")")?;
        }
        let body = self.block()?;
        let mut catches = Vec::new();
        while self.eat_keyword("catch") {
            self.expect_punct("(")?;
            let ty = self.type_name()?;
            let name = self.expect_ident()?;
            self.expect_punct(")")?;
            let body = self.block()?;
            catches.push(CatchClause { ty, name, body });
        }
        let finally = if self.eat_keyword("finally") {
            Some(self.block()?)
        } else {
            None
        };
        if catches.is_empty() && finally.is_none() && resources.is_empty() {
            return Err(self.err("try without catch, finally, or resources"));
        }
        Ok(Stmt::Try(TryStmt {
            id: self.ids.fresh(),
            resources,
            body,
            catches,
            finally,
        }))
    }

    fn expr(&mut self) -> Result<Expr> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.and_expr()?;
        while self.eat_punct("||") {
            let rhs = self.and_expr()?;
            lhs = build::or(&mut self.ids, lhs, rhs);
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.plus_expr()?;
        while self.eat_punct("&&") {
            let rhs = self.plus_expr()?;
            lhs = build::and(&mut self.ids, lhs, rhs);
        }
        Ok(lhs)
    }

    fn plus_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.unary_expr()?;
        while self.eat_punct("+") {
            let rhs = self.unary_expr()?;
            lhs = build::concat(&mut self.ids, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary_expr(&mut self) -> Result<Expr> {
        if self.eat_punct("!") {
            let operand = self.unary_expr()?;
            return Ok(build::not(&mut self.ids, operand));
        }
        self.postfix_expr()
    }

    fn postfix_expr(&mut self) -> Result<Expr> {
        let mut expr = self.primary_expr()?;
        while self.eat_punct(".") {
            let name = self.expect_ident()?;
            if self.at_punct("(") {
                let args = self.call_args()?;
                expr = build::call(&mut self.ids, Some(expr), &name, args);
            } else {
                expr = build::field(&mut self.ids, expr, &name);
            }
        }
        Ok(expr)
    }

    fn primary_expr(&mut self) -> Result<Expr> {
        match self.peek().cloned() {
            Some(Tok::Str(s)) => {
                self.pos += 1;
                Ok(build::string(&mut self.ids, &s))
            }
            Some(Tok::Punct("(")) => {
                self.pos += 1;
                let inner = self.expr()?;
                self.expect_punct(")")?;
                Ok(inner)
            }
            Some(Tok::Ident(name)) => {
                self.pos += 1;
                match name.as_str() {
                    "true" => Ok(build::bool_lit(&mut self.ids, true)),
                    "false" => Ok(build::bool_lit(&mut self.ids, false)),
                    "null" => Ok(build::null(&mut self.ids)),
                    "new" => {
                        let class = self.expect_ident()?;
                        let args = self.call_args()?;
                        Ok(build::new_class(&mut self.ids, &class, args))
                    }
                    _ => {
                        if self.at_punct("(") {
                            let args = self.call_args()?;
                            Ok(build::call(&mut self.ids, None, &name, args))
                        } else {
                            Ok(build::ident(&mut self.ids, &name))
                        }
                    }
                }
            }
            _ => Err(self.err("expected expression")),
        }
    }

    fn call_args(&mut self) -> Result<Vec<Expr>> {
        self.expect_punct("(")?;
        let mut args = Vec::new();
        if !self.at_punct(")") {
            loop {
                args.push(self.expr()?);
                if !self.eat_punct(",") {
                    break;
                }
            }
        }
        self.expect_punct(")")?;
        Ok(args)
    }
}
