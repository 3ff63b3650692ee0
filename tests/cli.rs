use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn srcequiv(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_srcequiv"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run srcequiv")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn equivalent_exit_codes() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.rs"), "struct A { x: u8, y: u8 }").unwrap();
    fs::write(dir.path().join("b.rs"), "// reordered\nstruct A {\n    y: u8,\n    x: u8,\n}\n").unwrap();
    fs::write(dir.path().join("c.rs"), "struct A { x: u8 }").unwrap();
    fs::write(dir.path().join("broken.rs"), "struct {").unwrap();

    let ok = srcequiv(&["equivalent", "a.rs", "b.rs"], dir.path());
    assert_eq!(ok.status.code(), Some(0));

    let differs = srcequiv(&["equivalent", "c.rs", "a.rs"], dir.path());
    assert_eq!(differs.status.code(), Some(1));
    assert!(stdout(&differs).contains("unmatched nodes in the expected tree"));

    let broken = srcequiv(&["equivalent", "broken.rs", "a.rs"], dir.path());
    assert_eq!(broken.status.code(), Some(2));
}

#[test]
fn equivalent_json_output() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.rs"), "fn f() {}").unwrap();
    fs::write(dir.path().join("b.rs"), "fn g() {}").unwrap();

    let output = srcequiv(&["--format", "json", "equivalent", "a.rs", "b.rs"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["equivalent"], false);
    assert_eq!(json["unmatched_expected"].as_array().unwrap().len(), 1);
    assert_eq!(json["unmatched_actual"].as_array().unwrap().len(), 1);
}

#[test]
fn contents_and_matches() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.rs"), "struct A;").unwrap();
    fs::write(dir.path().join("b.rs"), "struct A;").unwrap();
    fs::write(dir.path().join("c.rs"), "struct  A;").unwrap();

    assert_eq!(srcequiv(&["contents", "a.rs", "b.rs"], dir.path()).status.code(), Some(0));
    let differs = srcequiv(&["contents", "a.rs", "c.rs"], dir.path());
    assert_eq!(differs.status.code(), Some(1));
    assert!(stdout(&differs).contains("differ at byte 7"));

    assert_eq!(srcequiv(&["matches", "c.rs", r"struct +A"], dir.path()).status.code(), Some(0));
    assert_eq!(srcequiv(&["matches", "a.rs", "enum"], dir.path()).status.code(), Some(1));
    assert_eq!(
        srcequiv(&["matches", "a.rs", "A", "--charset", "no-such-charset"], dir.path()).status.code(),
        Some(2)
    );
}

#[test]
fn batch_uses_discovered_config() {
    let dir = tempdir().unwrap();
    let actual = dir.path().join("actual");
    let expected = dir.path().join("expected");
    fs::create_dir_all(&actual).unwrap();
    fs::create_dir_all(&expected).unwrap();
    fs::write(dir.path().join("srcequiv.toml"), "extensions = [\"rs\", \"rsx\"]\njobs = 1\n").unwrap();

    fs::write(actual.join("one.rs"), "fn one() {}").unwrap();
    fs::write(expected.join("one.rs"), "fn one() {}").unwrap();
    fs::write(actual.join("two.rsx"), "fn two() {}").unwrap();
    fs::write(expected.join("two.rsx"), "fn two() -> u8 { 2 }").unwrap();

    let output = srcequiv(&["batch", "actual", "expected"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("ok       one.rs"), "{}", out);
    assert!(out.contains("DIFFERS  two.rsx"), "{}", out);
    assert!(out.contains("1 equivalent, 1 failed"), "{}", out);
}
