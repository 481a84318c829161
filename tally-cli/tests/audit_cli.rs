use std::fs;
use std::path::PathBuf;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const SAMPLE_LISTING: &str = "\
Found 2 items
-rw-r--r--   3 jlewi supergroup       1024 2014-03-01 10:21 /data/part-00000
-rw-r--r--   3 jlewi supergroup        512 2014-03-01 10:21 /data/part-00001
";

fn tally_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("tally"))
}

/// Write a canned listing to disk so `--ls_command cat` with the fixture as
/// the input path stands in for a working `hadoop fs -ls`.
fn listing_fixture(dir: &TempDir) -> PathBuf {
    let fixture = dir.path().join("listing.txt");
    fs::write(&fixture, SAMPLE_LISTING).expect("write fixture");
    fixture
}

#[test]
fn missing_required_flags_exit_1_with_usage_on_stdout() {
    tally_cmd()
        .assert()
        .failure()
        .code(1)
        .stdout(contains("Usage"))
        .stdout(contains("--inputpath"));
}

#[test]
fn help_prints_flags_and_exits_zero() {
    tally_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--outputpath"))
        .stdout(contains("--ls_command"))
        .stdout(contains("--paginate"));
}

#[test]
fn failing_listing_command_aborts_the_run() {
    tally_cmd()
        .args([
            "--inputpath",
            "/data",
            "--outputpath",
            "gs://bucket/data",
            "--ls_command",
            "sh,-c,exit 7",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("failed to list source inventory"))
        .stderr(contains("7"));
}

#[test]
fn empty_destination_prefix_is_rejected_after_source_listing() {
    let dir = TempDir::new().expect("tempdir");
    let fixture = listing_fixture(&dir);

    tally_cmd()
        .args([
            "--inputpath",
            fixture.to_str().expect("utf8 path"),
            "--outputpath",
            "gs://bucket/",
            "--ls_command",
            "cat",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("empty object prefix"));
}

#[test]
fn missing_credentials_file_fails_with_instructive_error() {
    let dir = TempDir::new().expect("tempdir");
    let fixture = listing_fixture(&dir);
    let credentials = dir.path().join("nope.credentials");
    let secret = dir.path().join("secrets.json");

    tally_cmd()
        .args([
            "--inputpath",
            fixture.to_str().expect("utf8 path"),
            "--outputpath",
            "gs://bucket/data",
            "--ls_command",
            "cat",
            "--credentials",
            credentials.to_str().expect("utf8 path"),
            "--secret",
            secret.to_str().expect("utf8 path"),
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("credentials file not found"));
}
