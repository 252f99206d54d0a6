//! Synthesis of the shared permission-hardening helper.
//!
//! Emitted at most once per compilation unit, the first time a
//! directory-hijacking match needs it. The generated routine
//! creates-or-repairs a directory with owner-only permissions:
//! on posix filesystems it creates the directory atomically with
//! owner-rwx attributes, or resets the permission bits when the directory
//! already exists (closing any prior world-accessible window); elsewhere
//! (per-user-isolated temp directories) it only creates when absent.
//! Failures surface as `UncheckedIOException`; callers never get a
//! boolean back.

use crate::tree::stmt::{CatchClause, TryStmt};
use crate::tree::{build, ClassDecl, Expr, IdGen, Member, MethodDecl, Param, Stmt, TypeName};

pub const HELPER_CLASS: &str = "TempDirSecurityHelper";
pub const HELPER_METHOD: &str = "ensureSecureDirectory";

const PARAM: &str = "tempDirChild";
const PERMS: &str = "posixFilePermissions";

/// Imports the synthesized class requires to resolve.
pub fn required_imports() -> &'static [&'static str] {
    &[
        "java.io.IOException",
        "java.io.UncheckedIOException",
        "java.nio.file.Files",
        "java.nio.file.Path",
        "java.nio.file.attribute.PosixFilePermission",
        "java.nio.file.attribute.PosixFilePermissions",
        "java.util.EnumSet",
    ]
}

/// `TempDirSecurityHelper.ensureSecureDirectory(recv.toPath())`, with the
/// view conversion skipped for receivers that already are paths.
pub fn invocation(ids: &mut IdGen, receiver: &Expr, receiver_is_path: bool) -> Expr {
    let arg = if receiver_is_path {
        receiver.clone_fresh(ids)
    } else {
        build::to_path(ids, receiver)
    };
    build::static_call(ids, HELPER_CLASS, HELPER_METHOD, vec![arg])
}

/// Builds the nested helper class.
pub fn synthesize(ids: &mut IdGen) -> ClassDecl {
    let body = vec![try_create(ids)];
    let method = MethodDecl {
        id: ids.fresh(),
        modifiers: vec!["static".to_string()],
        ret: TypeName::new("void"),
        name: HELPER_METHOD.to_string(),
        params: vec![Param {
            ty: TypeName::new("Path"),
            name: PARAM.to_string(),
        }],
        throws: Vec::new(),
        body: build::block(ids, body),
    };
    ClassDecl {
        id: ids.fresh(),
        modifiers: vec!["private".to_string(), "static".to_string()],
        name: HELPER_CLASS.to_string(),
        members: vec![Member::Method(method)],
    }
}

fn try_create(ids: &mut IdGen) -> Stmt {
    let posix_branch = posix_branch(ids);
    let fallback = create_if_absent(ids);
    let condition = supports_posix(ids);
    let then_block = build::block(ids, posix_branch);
    let else_block = build::block(ids, vec![fallback]);
    let outer_if = build::if_stmt(ids, condition, then_block, Some(else_block));
    let catch_body = vec![{
        let cause = build::ident(ids, "exception");
        let message = build::string(ids, "Failed to create temp directory");
        build::throw_new(ids, "UncheckedIOException", vec![message, cause])
    }];
    Stmt::Try(TryStmt {
        id: ids.fresh(),
        resources: Vec::new(),
        body: build::block(ids, vec![outer_if]),
        catches: vec![CatchClause {
            ty: TypeName::new("IOException"),
            name: "exception".to_string(),
            body: build::block(ids, catch_body),
        }],
        finally: None,
    })
}

/// `tempDirChild.getFileSystem().supportedFileAttributeViews().contains("posix")`
fn supports_posix(ids: &mut IdGen) -> Expr {
    let param = build::ident(ids, PARAM);
    let fs = build::call(ids, Some(param), "getFileSystem", vec![]);
    let views = build::call(ids, Some(fs), "supportedFileAttributeViews", vec![]);
    let posix = build::string(ids, "posix");
    build::call(ids, Some(views), "contains", vec![posix])
}

/// The posix arm: build owner-rwx, then create-with-attributes or reset.
fn posix_branch(ids: &mut IdGen) -> Vec<Stmt> {
    let perms_init = {
        let args = ["OWNER_READ", "OWNER_WRITE", "OWNER_EXECUTE"]
            .into_iter()
            .map(|perm| {
                let class = build::ident(ids, "PosixFilePermission");
                build::field(ids, class, perm)
            })
            .collect();
        build::static_call(ids, "EnumSet", "of", args)
    };
    let perms_decl = build::local(
        ids,
        vec!["final".to_string()],
        TypeName::new("EnumSet<PosixFilePermission>"),
        PERMS,
        Some(perms_init),
    );

    let create = {
        let param = build::ident(ids, PARAM);
        let perms = build::ident(ids, PERMS);
        let attr = build::static_call(ids, "PosixFilePermissions", "asFileAttribute", vec![perms]);
        let call = build::static_call(ids, "Files", "createDirectory", vec![param, attr]);
        build::expr_stmt(ids, call)
    };
    let reset = {
        let param = build::ident(ids, PARAM);
        let perms = build::ident(ids, PERMS);
        let call = build::static_call(ids, "Files", "setPosixFilePermissions", vec![param, perms]);
        build::expr_stmt(ids, call)
    };
    let condition = not_exists(ids);
    let then_block = build::block(ids, vec![create]);
    let else_block = build::block(ids, vec![reset]);
    let create_or_reset = build::if_stmt(ids, condition, then_block, Some(else_block));
    vec![perms_decl, create_or_reset]
}

/// `if (!Files.exists(tempDirChild)) { Files.createDirectory(tempDirChild); }`
fn create_if_absent(ids: &mut IdGen) -> Stmt {
    let create = {
        let param = build::ident(ids, PARAM);
        let call = build::static_call(ids, "Files", "createDirectory", vec![param]);
        build::expr_stmt(ids, call)
    };
    let condition = not_exists(ids);
    let then_block = build::block(ids, vec![create]);
    build::if_stmt(ids, condition, then_block, None)
}

fn not_exists(ids: &mut IdGen) -> Expr {
    let param = build::ident(ids, PARAM);
    let exists = build::static_call(ids, "Files", "exists", vec![param]);
    build::not(ids, exists)
}
