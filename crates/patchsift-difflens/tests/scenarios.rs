use patchsift_core::Verdict;
use patchsift_difflens::classify::is_formatting_only;
use patchsift_difflens::filter::{strip_formatting_changes, DiffFilter};
use patchsift_difflens::parser::{segment_hunks, Hunk};

#[test]
fn reindented_return_filters_to_nothing() {
    let diff = "@@ -3,3 +3,3 @@\n int one(void) {\n-    return 1\n+\treturn 1\n }\n";
    assert_eq!(strip_formatting_changes(diff), "");
}

#[test]
fn semantic_hunk_survives_next_to_reindent() {
    let reindent = "@@ -1,3 +1,3 @@\n void f(void) {\n-  g();\n+    g();\n }";
    let guard = "@@ -20,4 +20,5 @@ void copy(char *dst, int len)\n {\n+    if (len <= 0) return;\n     memcpy(dst, src, len);\n }";
    let diff = format!("{reindent}\n{guard}");

    let out = strip_formatting_changes(&diff);
    assert_eq!(out, guard);
    assert!(out.starts_with("@@ -20,4 +20,5 @@"));
    assert!(!out.contains("g();"));
}

#[test]
fn empty_input_is_not_a_failure() {
    assert!(segment_hunks("").is_empty());
    assert_eq!(strip_formatting_changes(""), "");
}

#[test]
fn fixture_keeps_only_the_overflow_check() {
    let diff = include_str!("fixtures/buffer_fix.diff");
    let filter = DiffFilter::new(diff);
    assert_eq!(filter.hunks().len(), 3);
    assert_eq!(
        filter.verdicts(),
        &[
            Verdict::WhitespaceOnly { pairs: 3 },
            Verdict::CountMismatch { added: 2, removed: 0 },
            Verdict::WhitespaceOnly { pairs: 2 },
        ]
    );

    let out = filter.into_diff();
    assert!(out.starts_with("@@ -41,7 +41,10 @@"));
    assert!(out.contains("+\tif (need < b->len)"));
    assert!(!out.contains("malloc"));
    assert!(!out.contains("free("));
}

#[test]
fn filter_output_is_a_fixed_point() {
    let inputs = [
        include_str!("fixtures/buffer_fix.diff"),
        "",
        "no hunk markers at all",
        "@@ -1 +1 @@\n-a\n+b\n@@ -2 +2 @@\n- c\n+c\n",
        "--- a/x.c\n+++ b/x.c\n@@ -1 +1 @@\n-x\n+ x\n@@ -4 +4 @@\n+y",
    ];
    for diff in inputs {
        let once = strip_formatting_changes(diff);
        assert_eq!(strip_formatting_changes(&once), once, "input: {diff:?}");
    }
}

#[test]
fn all_context_hunks_are_formatting_only() {
    for text in [
        "@@ -1,2 +1,2 @@\n a\n b",
        "@@ -1 +1 @@",
        "just some text\nwithout markers",
        "--- a/x\n+++ b/x",
    ] {
        assert!(is_formatting_only(&Hunk::new(text)), "hunk: {text:?}");
    }
}

#[test]
fn whitespace_pair_is_formatting_only() {
    assert!(is_formatting_only(&Hunk::new("+  foo\n-foo\t")));
}

#[test]
fn different_pair_is_semantic() {
    assert!(!is_formatting_only(&Hunk::new("+foo\n-bar")));
}

#[test]
fn unmatched_extra_line_is_semantic() {
    assert!(!is_formatting_only(&Hunk::new("+foo\n+bar\n-foo")));
}

#[test]
fn concurrent_callers_agree() {
    let diff = include_str!("fixtures/buffer_fix.diff");
    let expected = strip_formatting_changes(diff);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| strip_formatting_changes(diff)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
