//! Opt-in owner-only `Files.createFile` insertion before non-exclusive writes.

use tempmend::testkit::{assert_rewritten, assert_unchanged};
use tempmend::{IdiomKind, RewriteConfig};

fn config() -> RewriteConfig {
    RewriteConfig::only(IdiomKind::FileHijacking)
}

#[test]
fn create_new_option_is_already_race_free() {
    assert_unchanged(
        r#"
        import java.io.File;
        import java.io.IOException;
        import java.nio.charset.StandardCharsets;
        import java.nio.file.Files;
        import java.nio.file.StandardOpenOption;
        import java.util.Collections;

        class T {
            void exclusive() throws IOException {
                File tempDirChild = new File(System.getProperty("java.io.tmpdir"), "/child.txt");
                Files.write(tempDirChild.toPath(), Collections.singletonList("secret"), StandardCharsets.UTF_8, StandardOpenOption.CREATE_NEW);
            }
        }
        "#,
        &config(),
    );
}

#[test]
fn non_exclusive_write_gets_a_preceding_create() {
    let summary = assert_rewritten(
        r#"
        import java.io.File;
        import java.io.IOException;
        import java.nio.charset.StandardCharsets;
        import java.nio.file.Files;
        import java.nio.file.StandardOpenOption;
        import java.util.Collections;

        class T {
            void vulnerable() throws IOException {
                File tempDirChild = new File(System.getProperty("java.io.tmpdir"), "/child.txt");
                Files.write(tempDirChild.toPath(), Collections.singletonList("secret"), StandardCharsets.UTF_8, StandardOpenOption.CREATE);
            }
        }
        "#,
        r#"
        import java.io.File;
        import java.io.IOException;
        import java.nio.charset.StandardCharsets;
        import java.nio.file.Files;
        import java.nio.file.StandardOpenOption;
        import java.nio.file.attribute.PosixFilePermission;
        import java.nio.file.attribute.PosixFilePermissions;
        import java.util.Collections;
        import java.util.EnumSet;

        class T {
            void vulnerable() throws IOException {
                File tempDirChild = new File(System.getProperty("java.io.tmpdir"), "/child.txt");
                Files.createFile(tempDirChild.toPath(), PosixFilePermissions.asFileAttribute(EnumSet.of(PosixFilePermission.OWNER_READ, PosixFilePermission.OWNER_WRITE)));
                Files.write(tempDirChild.toPath(), Collections.singletonList("secret"), StandardCharsets.UTF_8, StandardOpenOption.CREATE);
            }
        }
        "#,
        &config(),
    );
    assert_eq!(summary.count(IdiomKind::FileHijacking), 1);
}

#[test]
fn buffered_writer_declaration_is_an_anchor() {
    assert_rewritten(
        r#"
        import java.io.BufferedWriter;
        import java.io.File;
        import java.io.IOException;
        import java.nio.file.Files;
        import java.nio.file.Path;

        class T {
            void vulnerable() throws IOException {
                Path tempDirChild = new File(System.getProperty("java.io.tmpdir"), "/child-buffered-writer.txt").toPath();
                BufferedWriter bw = Files.newBufferedWriter(tempDirChild);
            }
        }
        "#,
        r#"
        import java.io.BufferedWriter;
        import java.io.File;
        import java.io.IOException;
        import java.nio.file.Files;
        import java.nio.file.Path;
        import java.nio.file.attribute.PosixFilePermission;
        import java.nio.file.attribute.PosixFilePermissions;
        import java.util.EnumSet;

        class T {
            void vulnerable() throws IOException {
                Path tempDirChild = new File(System.getProperty("java.io.tmpdir"), "/child-buffered-writer.txt").toPath();
                Files.createFile(tempDirChild, PosixFilePermissions.asFileAttribute(EnumSet.of(PosixFilePermission.OWNER_READ, PosixFilePermission.OWNER_WRITE)));
                BufferedWriter bw = Files.newBufferedWriter(tempDirChild);
            }
        }
        "#,
        &config(),
    );
}

#[test]
fn nested_output_stream_sink_is_found() {
    assert_rewritten(
        r#"
        import java.io.File;
        import java.nio.file.Files;
        import java.nio.file.Path;

        class T {
            void vulnerable() {
                Path tempDirChild = new File(System.getProperty("java.io.tmpdir"), "/child-output-stream.txt").toPath();
                Files.newOutputStream(tempDirChild).close();
            }
        }
        "#,
        r#"
        import java.io.File;
        import java.nio.file.Files;
        import java.nio.file.Path;
        import java.nio.file.attribute.PosixFilePermission;
        import java.nio.file.attribute.PosixFilePermissions;
        import java.util.EnumSet;

        class T {
            void vulnerable() {
                Path tempDirChild = new File(System.getProperty("java.io.tmpdir"), "/child-output-stream.txt").toPath();
                Files.createFile(tempDirChild, PosixFilePermissions.asFileAttribute(EnumSet.of(PosixFilePermission.OWNER_READ, PosixFilePermission.OWNER_WRITE)));
                Files.newOutputStream(tempDirChild).close();
            }
        }
        "#,
        &config(),
    );
}

#[test]
fn untainted_destination_is_not_hardened() {
    assert_unchanged(
        r#"
        import java.io.File;
        import java.nio.file.Files;
        import java.nio.file.Path;

        class T {
            void fine() {
                Path report = new File("/var/log/app/report.txt").toPath();
                Files.newOutputStream(report).close();
            }
        }
        "#,
        &config(),
    );
}

#[test]
fn disabled_by_default() {
    assert_unchanged(
        r#"
        import java.io.File;
        import java.nio.file.Files;
        import java.nio.file.Path;

        class T {
            void vulnerable() {
                Path tempDirChild = new File(System.getProperty("java.io.tmpdir"), "/child.txt").toPath();
                Files.newOutputStream(tempDirChild).close();
            }
        }
        "#,
        &RewriteConfig::default(),
    );
}
