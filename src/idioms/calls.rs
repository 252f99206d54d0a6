//! Recognizers for the JDK call shapes the idiom catalog names.

use crate::tree::{Call, Expr};

/// `File.createTempFile(prefix, suffix)` or `(prefix, suffix, dir)`.
#[derive(Debug, Clone, Copy)]
pub struct CreateTempFile<'a> {
    pub call: &'a Call,
    pub prefix: &'a Expr,
    pub suffix: &'a Expr,
    pub directory: Option<&'a Expr>,
}

pub fn as_create_temp_file(expr: &Expr) -> Option<CreateTempFile<'_>> {
    if !expr.is_static_call("File", "createTempFile") {
        return None;
    }
    let call = expr.as_call()?;
    match call.args.as_slice() {
        [prefix, suffix] => Some(CreateTempFile {
            call,
            prefix,
            suffix,
            directory: None,
        }),
        [prefix, suffix, dir] => Some(CreateTempFile {
            call,
            prefix,
            suffix,
            directory: Some(dir),
        }),
        _ => None,
    }
}

/// `binding.delete()`.
pub fn is_delete_on(expr: &Expr, binding: &str) -> bool {
    expr.as_call().is_some_and(|c| c.is_on_ident("delete", binding) && c.args.is_empty())
}

/// `binding.mkdir()` or `binding.mkdirs()`.
pub fn is_mkdir_on(expr: &Expr, binding: &str) -> bool {
    expr.as_call().is_some_and(|c| {
        (c.is_on_ident("mkdir", binding) || c.is_on_ident("mkdirs", binding)) && c.args.is_empty()
    })
}

/// `recv.mkdir()` / `recv.mkdirs()` with an arbitrary receiver expression.
pub fn as_mkdir(expr: &Expr) -> Option<&Call> {
    let call = expr.as_call()?;
    if (call.name == "mkdir" || call.name == "mkdirs")
        && call.args.is_empty()
        && call.receiver().is_some()
    {
        Some(call)
    } else {
        None
    }
}

/// `Files.write(path, ..)`, `Files.newBufferedWriter(path, ..)`,
/// `Files.newOutputStream(path, ..)`: the write-without-create sinks.
pub fn as_files_write(expr: &Expr) -> Option<&Call> {
    let call = expr.as_call()?;
    let is_files = call.receiver().and_then(Expr::as_ident) == Some("Files");
    let is_write_op = matches!(
        call.name.as_str(),
        "write" | "newBufferedWriter" | "newOutputStream"
    );
    if is_files && is_write_op && !call.args.is_empty() {
        Some(call)
    } else {
        None
    }
}

/// True when any argument is `StandardOpenOption.CREATE_NEW`, the atomic
/// create-new mode that is inherently race-free.
pub fn has_create_new_option(call: &Call) -> bool {
    call.args.iter().any(|a| match a {
        Expr::Field { target, name, .. } => {
            name == "CREATE_NEW" && target.as_ident() == Some("StandardOpenOption")
        }
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{build, IdGen};

    #[test]
    fn create_temp_file_arity() {
        let mut ids = IdGen::new();
        let prefix = build::string(&mut ids, "a");
        let suffix = build::string(&mut ids, "b");
        let two = build::static_call(&mut ids, "File", "createTempFile", vec![prefix, suffix]);
        let m = as_create_temp_file(&two).unwrap();
        assert!(m.directory.is_none());

        let prefix = build::string(&mut ids, "a");
        let suffix = build::string(&mut ids, "b");
        let dir = build::ident(&mut ids, "testData");
        let three =
            build::static_call(&mut ids, "File", "createTempFile", vec![prefix, suffix, dir]);
        let m = as_create_temp_file(&three).unwrap();
        assert!(m.directory.is_some());
    }

    #[test]
    fn create_new_option_detection() {
        let mut ids = IdGen::new();
        let class = build::ident(&mut ids, "StandardOpenOption");
        let opt = build::field(&mut ids, class, "CREATE_NEW");
        let path = build::ident(&mut ids, "p");
        let write = build::static_call(&mut ids, "Files", "write", vec![path, opt]);
        assert!(has_create_new_option(write.as_call().unwrap()));

        let path = build::ident(&mut ids, "p");
        let plain = build::static_call(&mut ids, "Files", "write", vec![path]);
        assert!(!has_create_new_option(plain.as_call().unwrap()));
    }
}
