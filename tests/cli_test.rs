//! Tests for the `partbind` binary.

use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn partbind() -> Command {
    Command::new(env!("CARGO_BIN_EXE_partbind"))
}

fn corpus() -> TempDir {
    let root = TempDir::new().unwrap();
    let dir = root.path().join("emma");
    fs::create_dir(&dir).unwrap();
    fs::write(
        dir.join("emma-1.xml"),
        r#"<doc><characters><character name="Emma"/></characters><text><quote id="q0">Hi</quote></text></doc>"#,
    )
    .unwrap();
    fs::write(
        dir.join("emma-2.xml"),
        r#"<doc><characters><character name="Emma"/></characters><text><quote id="q0">Bye</quote></text></doc>"#,
    )
    .unwrap();
    root
}

#[test]
fn test_default_output_next_to_input_dir() {
    let root = corpus();
    let status = partbind()
        .arg(root.path().join("emma"))
        .arg("-q")
        .status()
        .unwrap();
    assert!(status.success());

    let merged = fs::read_to_string(root.path().join("emma.xml")).unwrap();
    assert!(merged.contains(r#"<quote id="q0">Hi</quote><quote id="q1">Bye</quote>"#), "{merged}");
    assert_eq!(merged.matches("<character ").count(), 1);
}

#[test]
fn test_sections_flag_and_explicit_output() {
    let root = corpus();
    let out = root.path().join("merged.xml");
    let status = partbind()
        .arg(root.path().join("emma"))
        .arg("-p")
        .arg(&out)
        .arg("-q")
        .status()
        .unwrap();
    assert!(status.success());

    let merged = fs::read_to_string(&out).unwrap();
    assert_eq!(merged.matches("<chapter>").count(), 2);
}

#[test]
fn test_summary_is_json() {
    let root = corpus();
    let output = partbind()
        .arg(root.path().join("emma"))
        .args(["--summary", "-q", "--offset-mode", "per-file"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["files"], 2);
    assert_eq!(summary["characters"], 1);
    assert_eq!(summary["duplicate_characters"], 1);
    assert_eq!(summary["options"]["offset_mode"], "per-file");
}

#[test]
fn test_missing_input_dir_fails() {
    let root = TempDir::new().unwrap();
    let output = partbind()
        .arg(root.path().join("nope"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"), "{stderr}");
}
