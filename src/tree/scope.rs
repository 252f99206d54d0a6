//! Lexical scope queries for one method body: declared types, reaching
//! definitions of local bindings, and shallow expression typing.
//!
//! The taint tracker only trusts a binding with a single consistent set of
//! defining expressions inside the method; anything defined by a parameter,
//! a field, or no visible initializer is unanalyzable by construction.

use std::collections::HashMap;

use super::expr::Expr;
use super::stmt::Stmt;
use super::{Block, ClassDecl, Member, MethodDecl, TypeName};

/// Scope of one method within its enclosing class.
pub struct Scope<'a> {
    /// Declared types for locals, parameters, and enclosing-class fields.
    types: HashMap<&'a str, &'a TypeName>,
    /// Defining expressions (initializer plus every assignment) per local.
    defs: HashMap<&'a str, Vec<&'a Expr>>,
    /// Names that are locals (parameters and fields are typed but have no
    /// locally visible definitions).
    locals: Vec<&'a str>,
}

impl<'a> Scope<'a> {
    pub fn of_method(class: &'a ClassDecl, method: &'a MethodDecl) -> Self {
        let mut scope = Scope {
            types: HashMap::new(),
            defs: HashMap::new(),
            locals: Vec::new(),
        };
        for member in &class.members {
            if let Member::Field(f) = member {
                scope.types.insert(f.name.as_str(), &f.ty);
            }
        }
        for param in &method.params {
            scope.types.insert(param.name.as_str(), &param.ty);
        }
        scope.collect_block(&method.body);
        scope
    }

    fn collect_block(&mut self, block: &'a Block) {
        for stmt in &block.stmts {
            self.collect_stmt(stmt);
        }
    }

    fn collect_stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::Local(l) => {
                self.types.insert(l.name.as_str(), &l.ty);
                self.locals.push(l.name.as_str());
                if let Some(init) = &l.init {
                    self.defs.entry(l.name.as_str()).or_default().push(init);
                }
            }
            Stmt::Assign(a) => {
                if let Some(name) = a.target.as_ident() {
                    self.defs.entry(name).or_default().push(&a.value);
                }
            }
            Stmt::If(i) => {
                self.collect_block(&i.then_block);
                if let Some(e) = &i.else_block {
                    self.collect_block(e);
                }
            }
            Stmt::Try(t) => {
                for r in &t.resources {
                    self.types.insert(r.name.as_str(), &r.ty);
                    self.locals.push(r.name.as_str());
                    if let Some(init) = &r.init {
                        self.defs.entry(r.name.as_str()).or_default().push(init);
                    }
                }
                self.collect_block(&t.body);
                for c in &t.catches {
                    self.collect_block(&c.body);
                }
                if let Some(f) = &t.finally {
                    self.collect_block(f);
                }
            }
            Stmt::Expr { .. } | Stmt::Return { .. } | Stmt::Throw { .. } => {}
        }
    }

    pub fn declared_type(&self, name: &str) -> Option<&TypeName> {
        self.types.get(name).copied()
    }

    pub fn is_local(&self, name: &str) -> bool {
        self.locals.contains(&name)
    }

    /// Every defining expression for a local binding, in source order.
    pub fn definitions(&self, name: &str) -> &[&'a Expr] {
        self.defs.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Shallow type of an expression, enough to pick between the `File` and
    /// `Path` calling conventions during code generation.
    pub fn expr_type(&self, expr: &Expr) -> Option<TypeName> {
        match expr {
            Expr::Ident { name, .. } => self.declared_type(name).cloned(),
            Expr::New(n) => Some(TypeName::new(n.class.clone())),
            Expr::Literal { value, .. } => match value {
                super::expr::Literal::Str(_) => Some(TypeName::new("String")),
                super::expr::Literal::Bool(_) => Some(TypeName::new("boolean")),
                super::expr::Literal::Null => None,
            },
            Expr::Binary { op, .. } => match op {
                super::expr::BinOp::Plus => Some(TypeName::new("String")),
                _ => Some(TypeName::new("boolean")),
            },
            Expr::Unary { .. } => Some(TypeName::new("boolean")),
            Expr::Call(c) => match c.name.as_str() {
                "toPath" => Some(TypeName::new("Path")),
                "toFile" | "getCanonicalFile" | "getAbsoluteFile" => Some(TypeName::new("File")),
                "getAbsolutePath" | "getCanonicalPath" | "getProperty" => {
                    Some(TypeName::new("String"))
                }
                "createTempFile" if expr.is_static_call("File", "createTempFile") => {
                    Some(TypeName::new("File"))
                }
                "createTempFile" | "createTempDirectory"
                    if c.target.as_deref().and_then(Expr::as_ident) == Some("Files") =>
                {
                    Some(TypeName::new("Path"))
                }
                "delete" | "mkdir" | "mkdirs" | "isDirectory" | "exists" => {
                    Some(TypeName::new("boolean"))
                }
                _ => None,
            },
            Expr::Field { .. } => None,
        }
    }

    /// True when the expression is `Path`-typed; directory arguments that
    /// already are paths skip the `.toPath()` conversion.
    pub fn is_path_typed(&self, expr: &Expr) -> bool {
        self.expr_type(expr).is_some_and(|t| t.is("Path"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::parse_unit;

    fn scoped<'a>(unit: &'a crate::tree::Unit) -> Scope<'a> {
        let class = &unit.classes[0];
        let method = class
            .members
            .iter()
            .find_map(|m| match m {
                Member::Method(m) => Some(m),
                _ => None,
            })
            .expect("fixture has a method");
        Scope::of_method(class, method)
    }

    #[test]
    fn locals_and_fields_are_typed() {
        let unit = parse_unit(
            r#"
            class A {
                File testData = null;
                void b() {
                    File tmpDir = null;
                }
            }
            "#,
        )
        .unwrap();
        let scope = scoped(&unit);
        assert!(scope.declared_type("tmpDir").unwrap().is("File"));
        assert!(scope.declared_type("testData").unwrap().is("File"));
        assert!(scope.is_local("tmpDir"));
        assert!(!scope.is_local("testData"));
    }

    #[test]
    fn reassignment_produces_multiple_definitions() {
        let unit = parse_unit(
            r#"
            class A {
                void b() {
                    File tempDir = File.createTempFile("a", "b");
                    tempDir = File.createTempFile("c", "d");
                }
            }
            "#,
        )
        .unwrap();
        let scope = scoped(&unit);
        assert_eq!(scope.definitions("tempDir").len(), 2);
    }

    #[test]
    fn path_typing_of_conversions() {
        let unit = parse_unit(
            r#"
            class A {
                void b() {
                    Path p = new File("x").toPath();
                    File f = new File("y");
                }
            }
            "#,
        )
        .unwrap();
        let scope = scoped(&unit);
        let p_def = scope.definitions("p")[0];
        assert!(scope.is_path_typed(p_def));
        let f_def = scope.definitions("f")[0];
        assert!(!scope.is_path_typed(f_def));
    }
}
