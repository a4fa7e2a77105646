//! End-to-end CLI tests against the in-memory backend.
//!
//! Each invocation gets its own process (and therefore its own empty
//! store), so these exercise argument handling, input parsing, and the
//! single-run pipelines rather than cross-run persistence.

use assert_cmd::Command;
use std::io::Write;
use tempfile::NamedTempFile;

fn docbatch() -> Command {
    let mut cmd = Command::cargo_bin("docbatch").expect("binary builds");
    cmd.env("DOCBATCH_BACKEND", "memory");
    cmd
}

fn input_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write input");
    file
}

#[test]
fn test_version_prints_package_version() {
    docbatch()
        .arg("version")
        .assert()
        .success()
        .stdout(predicates::str::contains("docbatch version"));
}

#[test]
fn test_write_jsonl_reports_counts() {
    let file = input_file("{\"name\":\"Ada\"}\n{\"name\":\"Bob\"}\n");
    docbatch()
        .args(["write", "-c", "users"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicates::str::contains("2 records written to 'users' in 1 commits"));
}

#[test]
fn test_write_dry_run_commits_nothing() {
    // multi-line so detection sees a JSON document, not one JSONL line
    let file = input_file("[\n  {\"n\":1},\n  {\"n\":2},\n  {\"n\":3}\n]\n");
    docbatch()
        .args(["write", "-c", "items", "--dry-run"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicates::str::contains("3 records would be written"));
}

#[test]
fn test_read_empty_collection_succeeds() {
    docbatch()
        .args(["read", "-c", "users", "--format", "json"])
        .assert()
        .success()
        .stdout(predicates::str::contains("[]"));
}

#[test]
fn test_invalid_collection_path_exits_4() {
    docbatch()
        .args(["read", "-c", "users/u1"])
        .assert()
        .code(4)
        .stderr(predicates::str::contains("invalid path"));
}

#[test]
fn test_invalid_condition_exits_4() {
    docbatch()
        .args(["read", "-c", "users", "-w", "no operator here"])
        .assert()
        .code(4)
        .stderr(predicates::str::contains("invalid query condition"));
}

#[test]
fn test_undetectable_format_exits_4_with_hint() {
    let file = input_file("definitely not json\n");
    docbatch()
        .args(["write", "-c", "users"])
        .arg(file.path())
        .assert()
        .code(4)
        .stderr(predicates::str::contains("--format"));
}

#[test]
fn test_update_duplicate_ids_exit_4() {
    let file = input_file(concat!(
        "{\"__doc_id__\":\"x\",\"__data__\":{\"a\":1}}\n",
        "{\"__doc_id__\":\"x\",\"__data__\":{\"a\":2}}\n",
    ));
    docbatch()
        .args(["update", "-c", "users", "--upsert"])
        .arg(file.path())
        .assert()
        .code(4)
        .stderr(predicates::str::contains("duplicate document id"));
}

#[test]
fn test_delete_raw_export_exits_4_with_hint() {
    let file = input_file("{\"name\":\"Ada\"}\n");
    docbatch()
        .args(["delete", "-c", "users"])
        .arg(file.path())
        .assert()
        .code(4)
        .stderr(predicates::str::contains("--raw"));
}

#[test]
fn test_delete_requires_ids_or_file() {
    docbatch()
        .args(["delete", "-c", "users"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("required"));
}

#[test]
fn test_delete_by_ids_with_dry_run() {
    docbatch()
        .args(["delete", "-c", "users", "--doc-ids", "u1 u2", "--dry-run"])
        .assert()
        .success()
        .stdout(predicates::str::contains("2 documents would be deleted"));
}

#[test]
fn test_list_empty_store() {
    docbatch().arg("list").assert().success();
}
