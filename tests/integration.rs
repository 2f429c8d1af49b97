use std::path::Path;
use std::process::Command;

fn diaref_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_diaref"));
    cmd.current_dir(dir);
    cmd
}

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new("tests/fixtures").join(name)
}

/// Build a small project tree in `dir` for tests that mutate files.
fn write_project(dir: &Path, package: &str) {
    let pkg = dir.join("src").join(package);
    std::fs::create_dir_all(pkg.join("img")).unwrap();
    std::fs::write(dir.join(".diaref.toml"), "roots = [\"src\"]\n").unwrap();
    std::fs::write(
        pkg.join("Doc.java"),
        "package pkg;\n\n/**\n * Overview: <img src=\"img/a.png\" alt=\"overview\">\n */\npublic class Doc {\n}\n",
    )
    .unwrap();
    std::fs::write(pkg.join("img/a.uxf"), "<diagram program=\"umlet\"></diagram>\n").unwrap();
    std::fs::write(pkg.join("img/a.png"), "png-placeholder\n").unwrap();
}

#[test]
fn check_passes_on_resolved_references() {
    let output = diaref_cmd(&fixture("basic")).arg("check").output().unwrap();
    assert!(
        output.status.success(),
        "check failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("All 1 references resolved"), "stdout: {stdout}");
}

#[test]
fn check_reports_missing_references() {
    let output = diaref_cmd(&fixture("missing")).arg("check").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("MISSING"), "stdout: {stdout}");
    assert!(stdout.contains("img/ghost.png"), "stdout: {stdout}");
}

#[test]
fn check_json_is_empty_when_clean() {
    let output = diaref_cmd(&fixture("basic"))
        .args(["check", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "[]");
}

#[test]
fn refs_lists_each_reference_with_its_diagram() {
    let output = diaref_cmd(&fixture("basic")).arg("refs").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("src/pkg/Doc.java:4  img/a.png -> src/pkg/img/a.uxf"),
        "stdout: {stdout}"
    );
}

#[test]
fn move_dry_run_prints_the_plan_and_changes_nothing() {
    let output = diaref_cmd(&fixture("basic"))
        .args(["move", "src/pkg/img/a.uxf", "src/pkg2", "--dry-run"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "move --dry-run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("img/a.png -> ../pkg2/a.png"), "stderr: {stderr}");
    assert!(stderr.contains("Dry run"), "stderr: {stderr}");

    // Nothing moved, nothing rewritten.
    assert!(fixture("basic").join("src/pkg/img/a.uxf").exists());
    let doc = std::fs::read_to_string(fixture("basic").join("src/pkg/Doc.java")).unwrap();
    assert!(doc.contains("src=\"img/a.png\""));
}

#[test]
fn move_updates_references_and_moves_the_companion() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), "pkg");

    let output = diaref_cmd(dir.path())
        .args(["move", "src/pkg/img/a.uxf", "src/assets"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "move failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let doc = std::fs::read_to_string(dir.path().join("src/pkg/Doc.java")).unwrap();
    assert!(doc.contains("src=\"../assets/a.png\""), "doc: {doc}");
    assert!(dir.path().join("src/assets/a.uxf").exists());
    assert!(dir.path().join("src/assets/a.png").exists());
    assert!(!dir.path().join("src/pkg/img/a.uxf").exists());
    assert!(!dir.path().join("src/pkg/img/a.png").exists());

    // The moved tree still checks clean.
    let check = diaref_cmd(dir.path()).arg("check").output().unwrap();
    assert!(
        check.status.success(),
        "check after move failed: {}",
        String::from_utf8_lossy(&check.stdout)
    );
}

#[test]
fn rename_updates_references_in_place() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), "pkg");

    let output = diaref_cmd(dir.path())
        .args(["rename", "src/pkg/img/a.uxf", "overview.uxf"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "rename failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let doc = std::fs::read_to_string(dir.path().join("src/pkg/Doc.java")).unwrap();
    assert!(doc.contains("src=\"img/overview.png\""), "doc: {doc}");
    assert!(dir.path().join("src/pkg/img/overview.uxf").exists());
    assert!(dir.path().join("src/pkg/img/overview.png").exists());
}

#[test]
fn package_rename_comove_moves_folders_without_edits() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), "com/foo");

    let output = diaref_cmd(dir.path())
        .args(["rename-package", "com.foo", "com.bar"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "rename-package failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    // Diagram and document moved together: the relative reference survives
    // unchanged and still resolves at the new location.
    let doc = std::fs::read_to_string(dir.path().join("src/com/bar/Doc.java")).unwrap();
    assert!(doc.contains("src=\"img/a.png\""), "doc: {doc}");
    assert!(dir.path().join("src/com/bar/img/a.uxf").exists());

    let check = diaref_cmd(dir.path()).arg("check").output().unwrap();
    assert!(
        check.status.success(),
        "check after rename-package failed: {}",
        String::from_utf8_lossy(&check.stdout)
    );
}

#[test]
fn export_runs_the_configured_converter() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path(), "pkg");
    std::fs::remove_file(dir.path().join("src/pkg/img/a.png")).unwrap();
    std::fs::write(
        dir.path().join(".diaref.toml"),
        "roots = [\"src\"]\n\n[export]\ncommand = \"cp {input} {output}\"\n",
    )
    .unwrap();

    let output = diaref_cmd(dir.path()).arg("export").output().unwrap();
    assert!(
        output.status.success(),
        "export failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(dir.path().join("src/pkg/img/a.png").exists());
}

#[test]
fn unknown_diagram_is_a_clean_error() {
    let output = diaref_cmd(&fixture("basic"))
        .args(["move", "src/pkg/img/ghost.uxf", "src/pkg2"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Diagram Not Found"), "stderr: {stderr}");
}
