use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Get the workspace root (two levels up from CARGO_MANIFEST_DIR of pbtypes-cli)
fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent() // crates/
        .unwrap()
        .parent() // workspace root
        .unwrap()
        .to_path_buf()
}

fn pbtypes_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pbtypes"));
    cmd.current_dir(workspace_root());
    cmd.env_remove("RUST_LOG");
    cmd
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn cli_help() {
    let output = pbtypes_bin().arg("--help").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Generate TypeScript declarations from PocketBase"));
}

#[test]
fn cli_version() {
    let output = pbtypes_bin().arg("--version").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0.3.0"));
}

#[test]
fn cli_generate_snapshot_file() {
    let out = tempfile::tempdir().unwrap();
    let output = pbtypes_bin()
        .args(["generate", "samples/launcher/collections.json", "-o"])
        .arg(out.path())
        .output()
        .expect("failed to run");
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Written to "));

    let content = fs::read_to_string(out.path().join("pocketbase-types.ts")).unwrap();
    assert!(content.starts_with("/**\n * PocketBase TypeScript Types\n"));
    assert!(content.contains("export interface AppBuildsResponse<Expand = {}>"));
}

#[test]
fn cli_generate_twice_is_up_to_date() {
    let out = tempfile::tempdir().unwrap();
    for expected in ["Written to ", "Up to date: "] {
        let output = pbtypes_bin()
            .args(["generate", "samples/launcher/collections.json", "-o"])
            .arg(out.path())
            .output()
            .expect("failed to run");
        assert_success(&output);
        assert!(String::from_utf8_lossy(&output.stdout).starts_with(expected));
    }
}

#[test]
fn cli_generate_project_directory() {
    let out = tempfile::tempdir().unwrap();
    let output = pbtypes_bin()
        .args(["generate", "samples/launcher", "-o"])
        .arg(out.path())
        .output()
        .expect("failed to run");
    assert_success(&output);

    // The project file points at collections.json, not the whole directory.
    let content = fs::read_to_string(out.path().join("pocketbase-types.ts")).unwrap();
    assert!(content.contains("Users: \"users\","));
    assert!(!workspace_root()
        .join("samples/launcher/generated")
        .exists());
}

#[test]
fn cli_generate_directory_of_exports() {
    let out = tempfile::tempdir().unwrap();
    let output = pbtypes_bin()
        .args(["generate", "samples/blog", "-o"])
        .arg(out.path())
        .output()
        .expect("failed to run");
    assert_success(&output);

    let content = fs::read_to_string(out.path().join("pocketbase-types.ts")).unwrap();
    assert!(content.contains(
        r#""posts_via_tags": { response: PostsResponse; isMulti: true; collection: "posts" };"#
    ));
}

#[test]
fn cli_generate_missing_path() {
    let output = pbtypes_bin()
        .args(["generate", "samples/nope.json"])
        .output()
        .expect("failed to run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: Path does not exist"));
}

#[test]
fn cli_generate_invalid_snapshot() {
    let work = tempfile::tempdir().unwrap();
    let snapshot = work.path().join("collections.json");
    fs::write(&snapshot, "{\"items\": 3}").unwrap();

    let output = pbtypes_bin()
        .arg("generate")
        .arg(&snapshot)
        .arg("-o")
        .arg(work.path().join("out"))
        .output()
        .expect("failed to run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: failed to get collections"));
    assert!(!work.path().join("out/pocketbase-types.ts").exists());
}

#[test]
fn cli_expand_typescript() {
    let output = pbtypes_bin()
        .args([
            "expand",
            "samples/launcher/collections.json",
            "app_builds",
            "app.default_branch",
        ])
        .output()
        .expect("failed to run");
    assert_success(&output);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "{ app?: (Omit<AppsResponse, 'expand'> & { expand?: { default_branch?: BranchesResponse } }) }"
    );
}

#[test]
fn cli_expand_json() {
    let output = pbtypes_bin()
        .args([
            "expand",
            "samples/launcher/collections.json",
            "apps",
            "app_builds_via_app.branch, owner",
            "--format",
            "json",
        ])
        .output()
        .expect("failed to run");
    assert_success(&output);

    let shape: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("invalid JSON output");
    let builds = &shape["app_builds_via_app"];
    assert_eq!(builds["kind"], "record");
    assert_eq!(builds["collection"], "app_builds");
    assert_eq!(builds["isMulti"], true);
    assert_eq!(builds["expand"]["branch"]["collection"], "branches");
    assert_eq!(shape["owner"]["collection"], "users");
    assert!(shape["owner"].get("expand").is_none());
}

#[test]
fn cli_expand_unknown_collection() {
    let output = pbtypes_bin()
        .args(["expand", "samples/launcher/collections.json", "nope", "app"])
        .output()
        .expect("failed to run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: Unknown collection: nope"));
}

#[test]
fn cli_analyze_mermaid() {
    let output = pbtypes_bin()
        .args(["analyze", "samples/blog"])
        .output()
        .expect("failed to run");
    assert_success(&output);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim_end(),
        "graph LR
    posts -->|author| authors
    posts -->|tags[]| tags
%% 3 collections, 2 relations"
    );
}

#[test]
fn cli_analyze_dot() {
    let output = pbtypes_bin()
        .args(["analyze", "samples/launcher", "--format", "dot"])
        .output()
        .expect("failed to run");
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("digraph PocketBase {"));
    assert!(stdout.contains("\"app_builds\" -> \"apps\" [label=\"app\", color=black];"));
    assert!(stdout.trim_end().ends_with('}'));
}
