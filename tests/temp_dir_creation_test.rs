//! Create/delete/mkdir groups collapsing into `Files.createTempDirectory`.

use tempmend::testkit::{assert_rewritten, assert_unchanged};
use tempmend::{IdiomKind, RewriteConfig};

fn config() -> RewriteConfig {
    RewriteConfig::only(IdiomKind::TempDirCreation)
}

#[test]
fn assignment_anchor_with_bare_calls() {
    let summary = assert_rewritten(
        r#"
        import java.io.File;
        import java.io.IOException;

        class A {
            void b() throws IOException {
                File tempDir;
                tempDir = File.createTempFile("OverridesTest", "dir");
                tempDir.delete();
                tempDir.mkdir();
                System.out.println(tempDir.getAbsolutePath());
            }
        }
        "#,
        r#"
        import java.io.File;
        import java.io.IOException;
        import java.nio.file.Files;

        class A {
            void b() throws IOException {
                File tempDir;
                tempDir = Files.createTempDirectory("OverridesTest" + "dir").toFile();
                System.out.println(tempDir.getAbsolutePath());
            }
        }
        "#,
        &config(),
    );
    assert_eq!(summary.count(IdiomKind::TempDirCreation), 1);
    assert_eq!(summary.imports_added, vec!["java.nio.file.Files".to_string()]);
}

#[test]
fn declaration_anchor_with_directory_argument() {
    assert_rewritten(
        r#"
        import java.io.File;
        import java.io.IOException;
        import java.nio.file.Files;

        class A {
            File testData = Files.createTempDirectory("").toFile();
            void b() throws IOException {
                File tmpDir = File.createTempFile("test", "dir", testData);
                tmpDir.delete();
                tmpDir.mkdir();
            }
        }
        "#,
        r#"
        import java.io.File;
        import java.io.IOException;
        import java.nio.file.Files;

        class A {
            File testData = Files.createTempDirectory("").toFile();
            void b() throws IOException {
                File tmpDir = Files.createTempDirectory(testData.toPath(), "test" + "dir").toFile();
            }
        }
        "#,
        &config(),
    );
}

#[test]
fn two_generations_of_the_same_binding() {
    let summary = assert_rewritten(
        r#"
        import java.io.File;
        import java.io.IOException;

        class A {
            void b() throws IOException {
                File tempDir = File.createTempFile("abc", "def");
                tempDir.delete();
                tempDir.mkdir();
                System.out.println(tempDir.getAbsolutePath());
                tempDir = File.createTempFile("efg", "hij");
                tempDir.delete();
                tempDir.mkdir();
                System.out.println(tempDir.getAbsolutePath());
            }
        }
        "#,
        r#"
        import java.io.File;
        import java.io.IOException;
        import java.nio.file.Files;

        class A {
            void b() throws IOException {
                File tempDir = Files.createTempDirectory("abc" + "def").toFile();
                System.out.println(tempDir.getAbsolutePath());
                tempDir = Files.createTempDirectory("efg" + "hij").toFile();
                System.out.println(tempDir.getAbsolutePath());
            }
        }
        "#,
        &config(),
    );
    assert_eq!(summary.count(IdiomKind::TempDirCreation), 2);
}

#[test]
fn field_assignment_is_not_an_anchor() {
    assert_rewritten(
        r#"
        package abc;
        import java.io.File;
        import java.io.IOException;

        class A {
            void b() throws IOException {
                C.FILE = File.createTempFile("cfile", "txt");
                File tempDir = File.createTempFile("abc", "png");
                tempDir.delete();
                tempDir.mkdir();
            }
        }
        "#,
        r#"
        package abc;
        import java.io.File;
        import java.io.IOException;
        import java.nio.file.Files;

        class A {
            void b() throws IOException {
                C.FILE = File.createTempFile("cfile", "txt");
                File tempDir = Files.createTempDirectory("abc" + "png").toFile();
            }
        }
        "#,
        &config(),
    );
}

#[test]
fn mkdirs_and_unrelated_guards_between() {
    assert_rewritten(
        r#"
        import java.io.File;
        import java.io.IOException;

        class T {
            public void doSomething() throws IOException {
                File tmpDir = new File("/some/dumb/thing");
                tmpDir.mkdirs();
                if (!tmpDir.isDirectory()) {
                    System.out.println("Mkdirs failed to create " + tmpDir);
                }
                final File workDir = File.createTempFile("unjar", "", tmpDir);
                workDir.delete();
                workDir.mkdirs();
                if (!workDir.isDirectory()) {
                    System.out.println("Mkdirs failed to create " + workDir);
                }
            }
        }
        "#,
        r#"
        import java.io.File;
        import java.io.IOException;
        import java.nio.file.Files;

        class T {
            public void doSomething() throws IOException {
                File tmpDir = new File("/some/dumb/thing");
                tmpDir.mkdirs();
                if (!tmpDir.isDirectory()) {
                    System.out.println("Mkdirs failed to create " + tmpDir);
                }
                final File workDir = Files.createTempDirectory(tmpDir.toPath(), "unjar" + "").toFile();
                if (!workDir.isDirectory()) {
                    System.out.println("Mkdirs failed to create " + workDir);
                }
            }
        }
        "#,
        &config(),
    );
}

#[test]
fn delete_wrapped_in_a_logging_guard() {
    assert_rewritten(
        r#"
        import java.io.File;
        import java.io.IOException;
        import java.nio.file.Files;

        class A {
            File testData = Files.createTempDirectory("").toFile();
            void b() throws IOException {
                File tmpDir = File.createTempFile("test", "dir", testData);
                if (!tmpDir.delete()) {
                    System.out.println("Failed to delete directory!");
                }
                tmpDir.mkdir();
            }
        }
        "#,
        r#"
        import java.io.File;
        import java.io.IOException;
        import java.nio.file.Files;

        class A {
            File testData = Files.createTempDirectory("").toFile();
            void b() throws IOException {
                File tmpDir = Files.createTempDirectory(testData.toPath(), "test" + "dir").toFile();
            }
        }
        "#,
        &config(),
    );
}

#[test]
fn combined_delete_or_mkdir_guard() {
    assert_rewritten(
        r#"
        import java.io.File;
        import java.io.IOException;
        import java.nio.file.Files;

        class A {
            File testData = Files.createTempDirectory("").toFile();
            void b() throws IOException {
                File tmpDir = File.createTempFile("test", "dir", testData);
                if (!tmpDir.delete() || !tmpDir.mkdir()) {
                    throw new IOException("Failed to or create directory!");
                }
            }
        }
        "#,
        r#"
        import java.io.File;
        import java.io.IOException;
        import java.nio.file.Files;

        class A {
            File testData = Files.createTempDirectory("").toFile();
            void b() throws IOException {
                File tmpDir = Files.createTempDirectory(testData.toPath(), "test" + "dir").toFile();
            }
        }
        "#,
        &config(),
    );
}

#[test]
fn boolean_accumulator_statements_are_removed() {
    assert_rewritten(
        r#"
        import java.io.File;
        import java.io.IOException;

        class A {
            File b() throws IOException {
                boolean success = true;
                File temp = File.createTempFile("test", "directory");
                success &= temp.delete();
                success &= temp.mkdir();
                if (success) {
                    return temp;
                } else {
                    throw new RuntimeException("Failed to create directory");
                }
            }
        }
        "#,
        r#"
        import java.io.File;
        import java.io.IOException;
        import java.nio.file.Files;

        class A {
            File b() throws IOException {
                boolean success = true;
                File temp = Files.createTempDirectory("test" + "directory").toFile();
                if (success) {
                    return temp;
                } else {
                    throw new RuntimeException("Failed to create directory");
                }
            }
        }
        "#,
        &config(),
    );
}

#[test]
fn later_uses_after_the_pair_are_untouched() {
    assert_rewritten(
        r#"
        import java.io.File;
        import java.io.FileWriter;
        import java.io.IOException;

        class A {
            void b() throws IOException {
                boolean success = true;
                File temp = File.createTempFile("test", "directory");
                temp.delete();
                temp.mkdir();
                File textFile = new File(temp, "test.txt");
                try (FileWriter writer = new FileWriter(textFile)) {
                    writer.write("Hello World!");
                } finally {
                    textFile.delete();
                    temp.delete();
                }
            }
        }
        "#,
        r#"
        import java.io.File;
        import java.io.FileWriter;
        import java.io.IOException;
        import java.nio.file.Files;

        class A {
            void b() throws IOException {
                boolean success = true;
                File temp = Files.createTempDirectory("test" + "directory").toFile();
                File textFile = new File(temp, "test.txt");
                try (FileWriter writer = new FileWriter(textFile)) {
                    writer.write("Hello World!");
                } finally {
                    textFile.delete();
                    temp.delete();
                }
            }
        }
        "#,
        &config(),
    );
}

#[test]
fn assignment_to_a_field_of_the_same_name_is_not_an_anchor() {
    assert_unchanged(
        r#"
        import java.io.File;
        import java.io.IOException;

        class A {
            File tempDir;
            void b() throws IOException {
                tempDir = File.createTempFile("abc", "def");
                tempDir.delete();
                tempDir.mkdir();
            }
        }
        "#,
        &config(),
    );
}

#[test]
fn reassignment_inside_a_branch_blocks_the_match() {
    assert_unchanged(
        r#"
        import java.io.File;
        import java.io.IOException;

        class A {
            void b(boolean flag) throws IOException {
                File temp = File.createTempFile("test", "dir");
                temp.delete();
                if (flag) {
                    temp = new File("/attacker");
                }
                temp.mkdir();
            }
        }
        "#,
        &config(),
    );
}

#[test]
fn return_inside_a_branch_blocks_the_match() {
    assert_unchanged(
        r#"
        import java.io.File;
        import java.io.IOException;

        class A {
            File b(boolean flag) throws IOException {
                File temp = File.createTempFile("test", "dir");
                temp.delete();
                if (flag) {
                    return temp;
                }
                temp.mkdir();
                return temp;
            }
        }
        "#,
        &config(),
    );
}

#[test]
fn reassignment_between_delete_and_mkdir_blocks_the_match() {
    assert_unchanged(
        r#"
        import java.io.File;
        import java.io.FileWriter;
        import java.io.IOException;

        class A {
            void createWorkingDir() throws IOException {
                File temp = File.createTempFile("temp", Long.toString(System.nanoTime()));
                temp.delete();
                temp = new File(temp.getAbsolutePath() + ".d");
                temp.mkdir();
            }
        }
        "#,
        &config(),
    );
}

#[test]
fn escape_between_delete_and_mkdir_blocks_the_match() {
    assert_unchanged(
        r#"
        import java.io.File;
        import java.io.IOException;

        class A {
            void b() throws IOException {
                File temp = File.createTempFile("test", "dir");
                temp.delete();
                register(temp);
                temp.mkdir();
            }
        }
        "#,
        &config(),
    );
}

#[test]
fn delete_without_mkdir_is_not_the_idiom() {
    assert_unchanged(
        r#"
        import java.io.File;
        import java.io.IOException;

        class A {
            void b() throws IOException {
                File temp = File.createTempFile("test", "file");
                temp.delete();
            }
        }
        "#,
        &config(),
    );
}

#[test]
fn guard_with_else_branch_is_not_consumed() {
    assert_unchanged(
        r#"
        import java.io.File;
        import java.io.IOException;

        class A {
            void b() throws IOException {
                File temp = File.createTempFile("test", "dir");
                if (!temp.delete()) {
                    System.out.println("fail");
                } else {
                    System.out.println("ok");
                }
                temp.mkdir();
            }
        }
        "#,
        &config(),
    );
}
