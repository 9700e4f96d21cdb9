use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_displays_usage() {
    Command::cargo_bin("pomine")
        .expect("binary exists")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn batch_export_writes_a_model_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("orders.log");
    std::fs::write(&log, "4x a b\n2x a c\nd\n").unwrap();
    let out = dir.path().join("model.pn");

    Command::cargo_bin("pomine")
        .expect("binary exists")
        .arg(&log)
        .arg("--export")
        .arg(&out)
        .arg("--select")
        .arg("0,1")
        .arg("--strategy")
        .arg("full")
        .assert()
        .success()
        .stdout(predicate::str::contains("mined 2 of 3 fragments"));

    let contents = std::fs::read_to_string(&out).unwrap();
    assert!(contents.starts_with(".type pn"));
    assert!(contents.contains(".transitions"));
}

#[test]
fn export_requires_a_log_argument() {
    Command::cargo_bin("pomine")
        .expect("binary exists")
        .arg("--export")
        .arg("model.pn")
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires an event log"));
}

#[test]
fn invalid_select_spec_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("orders.log");
    std::fs::write(&log, "a b\n").unwrap();

    Command::cargo_bin("pomine")
        .expect("binary exists")
        .arg(&log)
        .arg("--export")
        .arg(dir.path().join("model.pn"))
        .arg("--select")
        .arg("7,spam")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --select"));
}
