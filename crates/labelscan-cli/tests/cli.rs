use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const LABEL: &str =
    "OS: Windows 10\nExp: Dec 2025\nP/O: 12345\nSerial: ABC123\nWarranty: 2 years\nExtra note here";

fn labelscan() -> Command {
    let mut cmd = Command::cargo_bin("labelscan").unwrap();
    cmd.env_remove("LABELSCAN_VISION_API_KEY")
        .env_remove("LABELSCAN_SHEETS_TOKEN");
    cmd
}

#[test]
fn scan_from_text_prints_fields() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("label.txt");
    fs::write(&input, LABEL).unwrap();
    fs::write(dir.path().join("config.json"), "{}").unwrap();

    labelscan()
        .arg("-c")
        .arg(dir.path().join("config.json"))
        .args(["scan", "--from-text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""serialNum": "ABC123""#))
        .stdout(predicate::str::contains(r#""po": "12345""#))
        .stdout(predicate::str::contains(r#""other": "Extra note here""#));
}

#[test]
fn scan_from_text_as_csv_uses_sheet_columns() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("label.txt");
    fs::write(&input, LABEL).unwrap();
    fs::write(dir.path().join("config.json"), "{}").unwrap();

    labelscan()
        .arg("-c")
        .arg(dir.path().join("config.json"))
        .args(["scan", "--from-text", "--format", "csv", "--room", "B-204"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Room,Serial Number,OS,P/O,Warranty,Expiration,Other",
        ))
        .stdout(predicate::str::contains(
            "B-204,ABC123,Windows 10,12345,2 years,Dec 2025,Extra note here",
        ));
}

#[test]
fn scan_missing_input_fails() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.json"), "{}").unwrap();

    labelscan()
        .arg("-c")
        .arg(dir.path().join("config.json"))
        .args(["scan", "--from-text"])
        .arg(dir.path().join("nope.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn config_init_then_get() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("nested").join("config.json");

    labelscan()
        .arg("-c")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    assert!(config.exists());

    labelscan()
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "server.port"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8080"));

    labelscan()
        .arg("-c")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn config_path_reports_missing_file() {
    let dir = tempdir().unwrap();

    labelscan()
        .arg("-c")
        .arg(dir.path().join("config.json"))
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"));
}
