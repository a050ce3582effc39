use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const ITEMS: &str = r#"{
  "generatedAt": "2024-01-21T00:00:00Z",
  "items": [
    {"name": "Create Deco", "author": "Orion", "authors": ["Orion"], "downloadCount": 60, "downloadRate": 6.0, "daysExisting": 10.0},
    {"name": "Create Trains", "author": "Vega", "authors": ["Vega"], "downloadCount": 500, "downloadRate": 50.0, "daysExisting": 10.0},
    {"name": "Create Lights", "author": "Orion", "authors": ["Orion"], "downloadCount": 40, "downloadRate": 4.0, "daysExisting": 10.0}
  ]
}"#;

const LEGACY_AUTHORS: &str = r#"{
  "authors": [
    {"name": "Vega", "downloadCount": 500, "mods": 1, "downloadRate": 50.0, "daysExisting": 10.0},
    {"name": "Orion", "downloadCount": 100, "mods": 2, "downloadRate": 10.0, "daysExisting": 10.0}
  ]
}"#;

fn seed(dir: &Path) {
    std::fs::write(dir.join("items.json"), ITEMS).unwrap();
    std::fs::write(dir.join("authors.json"), LEGACY_AUTHORS).unwrap();
}

fn modrank() -> Command {
    Command::cargo_bin("modrank").unwrap()
}

#[test]
fn test_cli_help() {
    modrank()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Popularity rankings for add-on catalogs"));
}

#[test]
fn test_cli_serve_help() {
    modrank().arg("serve").arg("--help").assert().success().stdout(predicate::str::contains("port"));
}

#[test]
fn test_chart_text_keeps_static_rank() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    modrank()
        .arg("--data-dir")
        .arg(dir.path())
        .args(["chart", "-q", "lights"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#3 Create Lights (by Orion)"))
        .stdout(predicate::str::contains("1 of 3 shown"))
        .stdout(predicate::str::contains("Data generated: 2024-01-21 00:00 UTC"));
}

#[test]
fn test_chart_json_reads_legacy_creators() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    modrank()
        .arg("--data-dir")
        .arg(dir.path())
        .args(["chart", "-P", "authors", "--format", "json", "--mode", "pie"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""population": "creators""#))
        .stdout(predicate::str::contains(r#""mode": "proportional""#));
}

#[test]
fn test_chart_without_snapshot_fails() {
    let dir = tempfile::tempdir().unwrap();
    modrank()
        .arg("--data-dir")
        .arg(dir.path())
        .arg("chart")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no data"));
}

#[test]
fn test_process_without_raw_dump_fails() {
    let dir = tempfile::tempdir().unwrap();
    modrank()
        .arg("--data-dir")
        .arg(dir.path())
        .arg("process")
        .assert()
        .failure()
        .stderr(predicate::str::contains("processing failed"));
    assert!(!dir.path().join("items.json").exists());
}

#[test]
fn test_process_builds_both_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let raw = r#"[
      {"id": 1, "name": "Create Deco", "authors": [{"name": "Orion"}], "downloadCount": 60,
       "dateCreated": "2024-01-01T00:00:00Z", "categories": [{"id": 6484}],
       "links": {"websiteUrl": "https://example.org/mc-mods/create-deco"}}
    ]"#;
    std::fs::write(dir.path().join("catalog.json"), raw).unwrap();
    modrank()
        .arg("--data-dir")
        .arg(dir.path())
        .arg("process")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""fetched": 1"#));
    assert!(dir.path().join("items.json").exists());
    assert!(dir.path().join("creators.json").exists());
}

#[test]
fn test_fetch_requires_api_key() {
    let dir = tempfile::tempdir().unwrap();
    modrank()
        .env_remove("MODRANK_API_KEY")
        .env_remove("CURSEFORGE_TOKEN")
        .arg("--data-dir")
        .arg(dir.path())
        .arg("fetch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("catalog settings"));
}

#[test]
fn test_notify_dry_run_prints_standing() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    modrank()
        .arg("--data-dir")
        .arg(dir.path())
        .args(["notify", "orion", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#2 Orion"));
}
