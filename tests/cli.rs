use std::io::Write;
use std::process::{Command, Stdio};

const MIXED: &str = "@@ -1,3 +1,3 @@\n int f(void) {\n-    return 1;\n+\treturn 1;\n }\n@@ -9,2 +9,3 @@\n {\n+    if (len <= 0) return;\n }\n";

fn patchsift(dir: &std::path::Path, args: &[&str], stdin: &str) -> std::process::Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_patchsift"))
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    // Commands that never read stdin may exit before the write lands.
    let _ = child.stdin.take().unwrap().write_all(stdin.as_bytes());
    child.wait_with_output().unwrap()
}

#[test]
fn filter_prints_only_semantic_hunks() {
    let dir = tempfile::tempdir().unwrap();
    let output = patchsift(dir.path(), &["filter"], MIXED);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout, "@@ -9,2 +9,3 @@\n {\n+    if (len <= 0) return;\n }\n");
}

#[test]
fn filter_prints_nothing_for_formatting_only() {
    let dir = tempfile::tempdir().unwrap();
    let output = patchsift(
        dir.path(),
        &["filter"],
        "@@ -1 +1 @@\n-    return 1\n+\treturn 1\n",
    );
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn filter_reads_file_and_emits_json() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("fix.diff"), MIXED).unwrap();

    let output = patchsift(
        dir.path(),
        &["filter", "--file", "fix.diff", "--format", "json"],
        "",
    );
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["totalHunks"], 2);
    assert_eq!(json["keptHunks"], 1);
    assert_eq!(json["hunks"][0]["verdict"]["kind"], "whitespaceOnly");
}

#[test]
fn classify_lists_each_hunk() {
    let dir = tempfile::tempdir().unwrap();
    let output = patchsift(dir.path(), &["classify"], MIXED);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("drop"));
    assert!(lines[1].contains("keep"));
}

#[test]
fn commit_selects_source_patches() {
    let dir = tempfile::tempdir().unwrap();
    let commit = serde_json::json!({
        "sha": "0123456789abcdef",
        "commit": { "message": "Fix heap overflow (CVE-2024-31337)" },
        "files": [
            { "filename": "src/copy.c", "patch": "@@ -9,2 +9,3 @@\n {\n+    if (len <= 0) return;\n }" },
            { "filename": "src/style.c", "patch": "@@ -1 +1 @@\n-  x();\n+x();" },
            { "filename": "NEWS", "patch": "@@ -1 +1 @@\n+fixed" }
        ]
    });

    let output = patchsift(
        dir.path(),
        &["commit", "--format", "json"],
        &commit.to_string(),
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["identifier"], "CVE-2024-31337");
    let patches = json["patches"].as_array().unwrap();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0]["filename"], "src/copy.c");
    assert!(patches[0]["patch"]
        .as_str()
        .unwrap()
        .starts_with("--- a/src/copy.c\n+++ b/src/copy.c\n@@ -9,2 +9,3 @@"));
}

#[test]
fn commit_without_keyword_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let commit = r#"{"sha":"abc","commit":{"message":"refactor"},"files":[{"filename":"a.c","patch":"@@ -1 +1 @@\n+x();"}]}"#;

    let output = patchsift(dir.path(), &["commit"], commit);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let output = patchsift(dir.path(), &["commit", "--all"], commit);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("--- a/a.c\n+++ b/a.c\n@@ -1 +1 @@\n+x();"));
}

#[test]
fn batch_writes_only_semantic_patches() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("one.diff"), MIXED).unwrap();
    std::fs::write(dir.path().join("two.diff"), "@@ -1 +1 @@\n- a\n+a\n").unwrap();

    let output = patchsift(
        dir.path(),
        &[
            "batch",
            "one.diff",
            "two.diff",
            "--out-dir",
            "out",
            "--workers",
            "2",
            "--format",
            "json",
        ],
        "",
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["keptHunks"], 1);
    assert_eq!(entries[1]["keptHunks"], 0);
    assert!(entries[1].get("writtenTo").is_none());

    assert!(dir.path().join("out/one.diff").exists());
    assert!(!dir.path().join("out/two.diff").exists());
}

#[test]
fn batch_fails_on_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("one.diff"), MIXED).unwrap();

    let output = patchsift(
        dir.path(),
        &[
            "batch",
            "one.diff",
            "missing.diff",
            "--out-dir",
            "out",
            "--workers",
            "1",
            "--format",
            "json",
        ],
        "",
    );
    assert!(!output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["keptHunks"], 1);
    assert!(entries[0].get("error").is_none());
    assert!(entries[0]["writtenTo"].is_string());
    assert!(dir.path().join("out/one.diff").exists());
    assert!(entries[1]["error"]
        .as_str()
        .unwrap()
        .contains("missing.diff"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("1 of 2 files failed"));
}

#[test]
fn batch_keeps_same_named_inputs_apart() {
    let dir = tempfile::tempdir().unwrap();
    let guard_x = "@@ -9,2 +9,3 @@\n {\n+    if (len <= 0) return;\n }\n";
    let guard_y = "@@ -4,2 +4,3 @@\n {\n+    if (p == NULL) return;\n }\n";
    std::fs::create_dir(dir.path().join("x")).unwrap();
    std::fs::create_dir(dir.path().join("y")).unwrap();
    std::fs::write(dir.path().join("x/fix.diff"), guard_x).unwrap();
    std::fs::write(dir.path().join("y/fix.diff"), guard_y).unwrap();

    let output = patchsift(
        dir.path(),
        &["batch", "x/fix.diff", "y/fix.diff", "--out-dir", "out", "--format", "json"],
        "",
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = json.as_array().unwrap();
    let first = entries[0]["writtenTo"].as_str().unwrap();
    let second = entries[1]["writtenTo"].as_str().unwrap();
    assert_ne!(first, second);

    assert_eq!(std::fs::read_to_string(dir.path().join(first)).unwrap(), guard_x);
    assert_eq!(std::fs::read_to_string(dir.path().join(second)).unwrap(), guard_y);
}

#[test]
fn batch_never_overwrites_an_input() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("fix.diff"), MIXED).unwrap();

    let output = patchsift(
        dir.path(),
        &["batch", "fix.diff", "--out-dir", ".", "--format", "json"],
        "",
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    assert_eq!(std::fs::read_to_string(dir.path().join("fix.diff")).unwrap(), MIXED);
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let written = json[0]["writtenTo"].as_str().unwrap();
    let filtered = std::fs::read_to_string(dir.path().join(written)).unwrap();
    assert_eq!(filtered, "@@ -9,2 +9,3 @@\n {\n+    if (len <= 0) return;\n }\n");
}

#[test]
fn batch_accepts_huge_worker_count() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("one.diff"), MIXED).unwrap();

    let output = patchsift(
        dir.path(),
        &["batch", "one.diff", "--workers", "18446744073709551615"],
        "",
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "one.diff: 1 of 2 hunks kept\n"
    );
}

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = patchsift(dir.path(), &["init"], "");
    assert!(
        output.status.success(),
        "patchsift init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config_path = dir.path().join(".patchsift.toml");
    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[filter]"));
    assert!(content.contains("[commit]"));

    let _config: patchsift_core::PatchsiftConfig = toml::from_str(&content).unwrap();
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".patchsift.toml"), "# existing").unwrap();

    let output = patchsift(dir.path(), &["init"], "");
    assert!(!output.status.success());
}

#[test]
fn invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".patchsift.toml"), "[batch]\nworkers = 0\n").unwrap();

    let output = patchsift(dir.path(), &["filter"], MIXED);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("workers"));
}
