//! Import bookkeeping: adds the declarations rewritten code references and
//! removes imports nothing in the unit references any more. A declaration
//! still used by untouched code is never removed.

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;

use crate::tree::{
    Block, ClassDecl, Expr, FieldDecl, Import, Member, MethodDecl, Stmt, TypeName, Unit,
};

/// JDK types the rewrites may introduce, simple name to import path.
static KNOWN_IMPORTS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("File", "java.io.File"),
        ("FileWriter", "java.io.FileWriter"),
        ("BufferedWriter", "java.io.BufferedWriter"),
        ("IOException", "java.io.IOException"),
        ("UncheckedIOException", "java.io.UncheckedIOException"),
        ("Files", "java.nio.file.Files"),
        ("Path", "java.nio.file.Path"),
        ("Paths", "java.nio.file.Paths"),
        ("StandardOpenOption", "java.nio.file.StandardOpenOption"),
        ("FileAttribute", "java.nio.file.attribute.FileAttribute"),
        ("PosixFilePermission", "java.nio.file.attribute.PosixFilePermission"),
        ("PosixFilePermissions", "java.nio.file.attribute.PosixFilePermissions"),
        ("StandardCharsets", "java.nio.charset.StandardCharsets"),
        ("EnumSet", "java.util.EnumSet"),
        ("Collections", "java.util.Collections"),
        ("UUID", "java.util.UUID"),
    ])
});

/// Result of the post-rewrite import fixup.
#[derive(Debug, Default)]
pub struct ImportDelta {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

/// Reconciles the unit's import list with what the rewritten tree actually
/// references. `requested` holds the fully-qualified paths the applied
/// edits introduced; `referenced_before` is the reference set captured
/// before rewriting, so only imports the rewrite orphaned are removed;
/// an import that was already unused stays as it was.
pub fn update(
    unit: &mut Unit,
    requested: &BTreeSet<String>,
    referenced_before: &BTreeSet<String>,
) -> ImportDelta {
    let referenced = referenced_simple_names(unit);
    let mut delta = ImportDelta::default();

    unit.imports.retain(|import| {
        let simple = import.simple_name();
        let keep = referenced.contains(simple) || !referenced_before.contains(simple);
        if !keep {
            log::debug!("imports: removing orphaned `{}`", import.path);
            delta.removed.push(import.path.clone());
        }
        keep
    });

    for path in requested {
        let simple = path.rsplit('.').next().unwrap_or(path);
        if referenced.contains(simple) && !unit.has_import(path) {
            insert_sorted(&mut unit.imports, path);
            delta.added.push(path.clone());
        }
    }
    delta
}

/// Fully-qualified path for a simple name the rewrites know about.
pub fn known_path(simple: &str) -> Option<&'static str> {
    KNOWN_IMPORTS.get(simple).copied()
}

/// Inserts at the first position that keeps an already-sorted list sorted;
/// degenerates to append for unsorted input.
fn insert_sorted(imports: &mut Vec<Import>, path: &str) {
    let pos = imports
        .iter()
        .position(|i| i.path.as_str() > path)
        .unwrap_or(imports.len());
    imports.insert(pos, Import::new(path));
}

/// Every simple type name the unit references: declared types, constructor
/// classes, static-call receivers, qualified-name roots, throws clauses.
pub fn referenced_simple_names(unit: &Unit) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for class in &unit.classes {
        scan_class(class, &mut names);
    }
    names
}

fn scan_class(class: &ClassDecl, names: &mut BTreeSet<String>) {
    for member in &class.members {
        match member {
            Member::Field(f) => scan_field(f, names),
            Member::Method(m) => scan_method(m, names),
            Member::Class(c) => scan_class(c, names),
        }
    }
}

fn scan_field(field: &FieldDecl, names: &mut BTreeSet<String>) {
    scan_type(&field.ty, names);
    if let Some(init) = &field.init {
        scan_expr(init, names);
    }
}

fn scan_method(method: &MethodDecl, names: &mut BTreeSet<String>) {
    scan_type(&method.ret, names);
    for p in &method.params {
        scan_type(&p.ty, names);
    }
    for t in &method.throws {
        names.insert(t.clone());
    }
    scan_block(&method.body, names);
}

fn scan_block(block: &Block, names: &mut BTreeSet<String>) {
    for stmt in &block.stmts {
        scan_stmt(stmt, names);
    }
}

fn scan_stmt(stmt: &Stmt, names: &mut BTreeSet<String>) {
    match stmt {
        Stmt::Local(l) => {
            scan_type(&l.ty, names);
            if let Some(init) = &l.init {
                scan_expr(init, names);
            }
        }
        Stmt::Expr { expr, .. } => scan_expr(expr, names),
        Stmt::Assign(a) => {
            scan_expr(&a.target, names);
            scan_expr(&a.value, names);
        }
        Stmt::If(i) => {
            scan_expr(&i.cond, names);
            scan_block(&i.then_block, names);
            if let Some(e) = &i.else_block {
                scan_block(e, names);
            }
        }
        Stmt::Return { value, .. } => {
            if let Some(v) = value {
                scan_expr(v, names);
            }
        }
        Stmt::Throw { value, .. } => scan_expr(value, names),
        Stmt::Try(t) => {
            for r in &t.resources {
                scan_type(&r.ty, names);
                if let Some(init) = &r.init {
                    scan_expr(init, names);
                }
            }
            scan_block(&t.body, names);
            for c in &t.catches {
                scan_type(&c.ty, names);
                scan_block(&c.body, names);
            }
            if let Some(f) = &t.finally {
                scan_block(f, names);
            }
        }
    }
}

fn scan_type(ty: &TypeName, names: &mut BTreeSet<String>) {
    for simple in ty.simple_names() {
        if is_type_like(simple) {
            names.insert(simple.to_string());
        }
    }
}

fn scan_expr(expr: &Expr, names: &mut BTreeSet<String>) {
    match expr {
        Expr::Literal { .. } => {}
        // A bare capitalized identifier in expression position is a class
        // reference (static receiver); locals are lowercase by convention,
        // and a false positive only makes removal more conservative.
        Expr::Ident { name, .. } => {
            if is_type_like(name) {
                names.insert(name.clone());
            }
        }
        Expr::Field { target, .. } => scan_expr(target, names),
        Expr::Call(c) => {
            if let Some(t) = c.target.as_deref() {
                scan_expr(t, names);
            }
            for a in &c.args {
                scan_expr(a, names);
            }
        }
        Expr::New(n) => {
            names.insert(n.class.clone());
            for a in &n.args {
                scan_expr(a, names);
            }
        }
        Expr::Binary { lhs, rhs, .. } => {
            scan_expr(lhs, names);
            scan_expr(rhs, names);
        }
        Expr::Unary { operand, .. } => scan_expr(operand, names),
    }
}

fn is_type_like(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::parse_unit;

    #[test]
    fn sorted_insert_into_sorted_list() {
        let mut imports = vec![
            Import::new("java.io.File"),
            Import::new("java.io.IOException"),
        ];
        insert_sorted(&mut imports, "java.io.FileWriter");
        assert_eq!(imports[1].path, "java.io.FileWriter");
        insert_sorted(&mut imports, "java.nio.file.Files");
        assert_eq!(imports.last().unwrap().path, "java.nio.file.Files");
    }

    #[test]
    fn update_adds_only_referenced_and_missing() {
        let mut unit = parse_unit(
            r#"
            import java.io.File;

            class A {
                void b() {
                    File f = Files.createTempFile("a", "b").toFile();
                }
            }
            "#,
        )
        .unwrap();
        let requested: BTreeSet<String> =
            ["java.nio.file.Files".to_string(), "java.nio.file.Path".to_string()].into();
        let before = referenced_simple_names(&unit);
        let delta = update(&mut unit, &requested, &before);
        // Path is requested but unreferenced, so only Files lands.
        assert_eq!(delta.added, vec!["java.nio.file.Files".to_string()]);
        assert!(unit.has_import("java.io.File"));
    }

    #[test]
    fn update_removes_imports_the_rewrite_orphaned() {
        let mut unit = parse_unit(
            r#"
            import java.io.File;
            import java.util.UUID;

            class A {
                void b() {
                    File f = new File("x");
                }
            }
            "#,
        )
        .unwrap();
        // Pretend UUID was referenced before the rewrite and is not now.
        let mut before = referenced_simple_names(&unit);
        before.insert("UUID".to_string());
        let delta = update(&mut unit, &BTreeSet::new(), &before);
        assert_eq!(delta.removed, vec!["java.util.UUID".to_string()]);
        assert!(unit.has_import("java.io.File"));
    }

    #[test]
    fn update_leaves_pre_existing_unused_imports_alone() {
        let mut unit = parse_unit(
            r#"
            import java.util.UUID;

            class A {
                void b() {
                }
            }
            "#,
        )
        .unwrap();
        let before = referenced_simple_names(&unit);
        let delta = update(&mut unit, &BTreeSet::new(), &before);
        assert!(delta.removed.is_empty());
        assert!(unit.has_import("java.util.UUID"));
    }
}
