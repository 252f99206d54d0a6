//! Property tests: origin tracking survives arbitrarily long local chains.

use proptest::prelude::*;
use tempmend::testkit::rewrite;
use tempmend::{IdiomKind, RewriteConfig};

/// Builds a method whose last binding is reached from `root` through
/// `segments.len()` child appends, optionally canonicalizing along the way.
fn chained_source(root: &str, segments: &[String], canonicalize: &[bool]) -> String {
    let mut body = format!(
        "        File d0 = new File(System.getProperty(\"{root}\"));\n"
    );
    for (i, segment) in segments.iter().enumerate() {
        let prev = format!("d{i}");
        let next = i + 1;
        if canonicalize[i] {
            body.push_str(&format!(
                "        File c{next} = {prev}.getCanonicalFile();\n"
            ));
            body.push_str(&format!(
                "        File d{next} = new File(c{next}, \"/{segment}\");\n"
            ));
        } else {
            body.push_str(&format!(
                "        File d{next} = new File({prev}, \"/{segment}\");\n"
            ));
        }
    }
    let last = segments.len();
    body.push_str(&format!("        d{last}.mkdir();\n"));
    format!(
        "import java.io.File;\nimport java.io.IOException;\n\nclass T {{\n    void m() throws IOException {{\n{body}    }}\n}}\n"
    )
}

// Canonicalize hops double the cost of a link in the reaching-definition
// walk, so the chain length stays well inside the tracer's recursion cap.
fn segments() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 1..8)
}

proptest! {
    #[test]
    fn temp_rooted_chains_always_harden(
        segments in segments(),
        canonical_seed in prop::collection::vec(any::<bool>(), 8),
    ) {
        let canonicalize = &canonical_seed[..segments.len()];
        let source = chained_source("java.io.tmpdir", &segments, canonicalize);
        let (_, summary) = rewrite(&source, &RewriteConfig::only(IdiomKind::DirHijacking));
        prop_assert!(summary.changed);
        prop_assert_eq!(summary.count(IdiomKind::DirHijacking), 1);
    }

    #[test]
    fn working_dir_chains_never_harden(
        segments in segments(),
        canonical_seed in prop::collection::vec(any::<bool>(), 8),
    ) {
        let canonicalize = &canonical_seed[..segments.len()];
        let source = chained_source("user.dir", &segments, canonicalize);
        let (_, summary) = rewrite(&source, &RewriteConfig::only(IdiomKind::DirHijacking));
        prop_assert!(!summary.changed);
    }

    #[test]
    fn a_reassignment_to_a_literal_breaks_the_chain(
        segments in segments(),
    ) {
        let canonicalize = vec![false; segments.len()];
        let mut source = chained_source("java.io.tmpdir", &segments, &canonicalize);
        let last = segments.len();
        let sink = format!("        d{last}.mkdir();\n");
        let severed = format!(
            "        d{last} = new File(\"/opt/app\");\n{sink}"
        );
        source = source.replace(&sink, &severed);
        let (_, summary) = rewrite(&source, &RewriteConfig::only(IdiomKind::DirHijacking));
        prop_assert!(!summary.changed);
    }
}
