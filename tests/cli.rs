use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn pms(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pms").unwrap();
    cmd.arg("--db").arg(db).env_remove("PMS_LOG").env_remove("PMS_DB");
    cmd
}

fn tasks(db: &Path) -> Vec<Value> {
    let out = pms(db).args(["list", "--format", "json"]).output().unwrap();
    assert!(out.status.success());
    let value: Value = serde_json::from_slice(&out.stdout).unwrap();
    value.as_array().unwrap().clone()
}

fn seed(db: &Path) {
    pms(db)
        .args(["add", "Foundations", "--start", "2024-01-01", "--duration", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added T1 'Foundations' at WBS 1 (2024-01-01 to 2024-01-05)."));
    pms(db)
        .args(["add", "Walls", "--start", "2024-01-01", "--duration", "3", "--pred", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added T2 'Walls' at WBS 2 (2024-01-06 to 2024-01-08)."));
}

#[test]
fn test_add_pushes_successor_past_predecessor() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("schedule.json");
    seed(&db);

    let list = tasks(&db);
    assert_eq!(list.len(), 2);
    assert_eq!(list[1]["startDate"], "2024-01-06");
    assert_eq!(list[1]["endDate"], "2024-01-08");
    assert_eq!(list[1]["predecessors"][0]["taskId"], "T1");
    assert_eq!(list[1]["predecessors"][0]["displaySerial"], 1);
}

#[test]
fn test_cyclic_link_is_rejected() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("schedule.json");
    seed(&db);

    pms(&db)
        .args(["link", "T1", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("would create a cycle"));

    let list = tasks(&db);
    assert!(list[0]["predecessors"].as_array().unwrap().is_empty());
}

#[test]
fn test_duration_change_cascades_and_undo_restores() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("schedule.json");
    seed(&db);

    pms(&db)
        .args(["duration", "Foundations", "8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("T1 Foundations: 2024-01-01 to 2024-01-08 (8d)."));
    assert_eq!(tasks(&db)[1]["startDate"], "2024-01-09");

    pms(&db).arg("undo").assert().success();
    assert_eq!(tasks(&db)[1]["startDate"], "2024-01-06");

    pms(&db).arg("redo").assert().success();
    assert_eq!(tasks(&db)[1]["startDate"], "2024-01-09");
}

#[test]
fn test_start_before_predecessor_is_corrected() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("schedule.json");
    seed(&db);

    pms(&db)
        .args(["start", "T2", "2024-01-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Predecessors hold T2 until 2024-01-06."));
    assert_eq!(tasks(&db)[1]["startDate"], "2024-01-06");
}

#[test]
fn test_delete_checks_dependents() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("schedule.json");
    seed(&db);

    pms(&db)
        .args(["dependents", "T1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Walls <- T1"));

    pms(&db)
        .args(["delete", "T1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("still reference"));
    assert_eq!(tasks(&db).len(), 2);

    pms(&db)
        .args(["delete", "T1", "--dependents", "detach"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 1 task(s)."));

    let list = tasks(&db);
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["wbs"], "1");
    assert!(list[0]["predecessors"].as_array().unwrap().is_empty());
}

#[test]
fn test_outline_edits_renumber() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("schedule.json");

    pms(&db)
        .args(["add", "Phase", "--start", "2024-01-01"])
        .assert()
        .success();
    pms(&db)
        .args(["add", "Step", "--start", "2024-01-01", "--child"])
        .assert()
        .success()
        .stdout(predicate::str::contains("at WBS 1.1"));
    pms(&db)
        .args(["add", "Other", "--start", "2024-01-01", "--after", "Step"])
        .assert()
        .success()
        .stdout(predicate::str::contains("at WBS 1.2"));

    pms(&db)
        .args(["outdent", "T2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("T2 is now WBS 2 (level 0)."));

    // T3 was a level-1 row under T1; with T2 at root it now sits under T2.
    let list = tasks(&db);
    let codes: Vec<&str> = list.iter().map(|t| t["wbs"].as_str().unwrap()).collect();
    assert_eq!(codes, vec!["1", "2", "2.1"]);

    pms(&db)
        .args(["delete", "T2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--cascade"));
    pms(&db)
        .args(["delete", "T2", "--cascade"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 task(s)."));
}

#[test]
fn test_milestone_toggle() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("schedule.json");
    seed(&db);

    pms(&db)
        .args(["milestone", "T1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("T1 Foundations: 2024-01-01 to 2024-01-01 (0d)."));

    pms(&db)
        .args(["duration", "T1", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a milestone has no duration"));
}

#[test]
fn test_import_clamps_or_rejects_level_jumps() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("schedule.json");
    let input = dir.path().join("input.json");
    std::fs::write(
        &input,
        r#"[
            {"id": "a", "name": "Root", "duration": 2, "startDate": "2024-03-01", "endDate": "2024-03-02", "outlineLevel": 0},
            {"id": "b", "name": "Deep", "duration": 1, "startDate": "2024-03-01", "endDate": "2024-03-01", "outlineLevel": 2,
             "predecessors": [{"taskId": "a", "type": "FS"}]}
        ]"#,
    )
    .unwrap();

    pms(&db)
        .arg("import")
        .arg(&input)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Outline level jumps from 0 to 2"));

    pms(&db)
        .arg("import")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 task(s)"));

    let list = tasks(&db);
    assert_eq!(list[1]["wbs"], "1.1");
    assert_eq!(list[1]["outlineLevel"], 1);
    assert_eq!(list[1]["startDate"], "2024-03-03");
}

#[test]
fn test_empty_history() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("schedule.json");
    pms(&db)
        .arg("undo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to undo"));
}

#[test]
fn test_link_with_one_cyclic_row_changes_nothing() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("schedule.json");
    seed(&db);
    pms(&db)
        .args(["add", "Roof", "--start", "2024-01-01"])
        .assert()
        .success();

    pms(&db)
        .args(["link", "T1", "2,3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("would create a cycle"));

    let list = tasks(&db);
    assert!(list[0]["predecessors"].as_array().unwrap().is_empty());
    assert_eq!(list[0]["startDate"], "2024-01-01");
}

#[test]
fn test_import_rejects_duplicate_ids_and_cycles() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("schedule.json");
    seed(&db);

    let duplicated = dir.path().join("duplicated.json");
    std::fs::write(
        &duplicated,
        r#"[
            {"id": "a", "name": "One", "duration": 1, "startDate": "2024-03-01", "endDate": "2024-03-01"},
            {"id": "b", "name": "Two", "duration": 1, "startDate": "2024-03-01", "endDate": "2024-03-01"},
            {"id": "b", "name": "Three", "duration": 1, "startDate": "2024-03-01", "endDate": "2024-03-01"}
        ]"#,
    )
    .unwrap();
    pms(&db)
        .arg("import")
        .arg(&duplicated)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task id b appears more than once"));

    let looped = dir.path().join("looped.json");
    std::fs::write(
        &looped,
        r#"[
            {"id": "a", "name": "One", "duration": 1, "startDate": "2024-03-01", "endDate": "2024-03-01",
             "predecessors": [{"taskId": "b", "type": "FS"}]},
            {"id": "b", "name": "Two", "duration": 1, "startDate": "2024-03-01", "endDate": "2024-03-01",
             "predecessors": [{"taskId": "a", "type": "FS"}]}
        ]"#,
    )
    .unwrap();
    pms(&db)
        .arg("import")
        .arg(&looped)
        .assert()
        .failure()
        .stderr(predicate::str::contains("would create a cycle"));

    let list = tasks(&db);
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], "T1");
    assert_eq!(list[1]["id"], "T2");
}

#[test]
fn test_completions_need_no_schedule() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("missing").join("schedule.json");
    pms(&db)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pms"));
    assert!(!db.exists());
}
