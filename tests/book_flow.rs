use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn godown_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("godown"))
}

fn run_ok(home: &tempfile::TempDir, args: &[&str]) {
    let mut cmd = godown_cmd();
    cmd.env("GODOWN_HOME", home.path());
    cmd.args(args);
    cmd.assert().success();
}

fn run_ok_out(home: &tempfile::TempDir, args: &[&str]) -> String {
    let mut cmd = godown_cmd();
    cmd.env("GODOWN_HOME", home.path());
    cmd.args(args);
    let out = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(out).expect("utf8 stdout")
}

fn run_err(home: &tempfile::TempDir, args: &[&str], msg: &str) {
    let mut cmd = godown_cmd();
    cmd.env("GODOWN_HOME", home.path());
    cmd.args(args);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains(msg));
}

fn record_id(out: &str) -> String {
    out.split_whitespace()
        .find(|tok| tok.len() == 36 && tok.matches('-').count() == 4)
        .expect("uuid in output")
        .to_string()
}

#[test]
fn grade_counts_drive_the_total() {
    let home = tempfile::tempdir().expect("tempdir");

    let first = run_ok_out(
        &home,
        &[
            "book",
            "add",
            "--school",
            "Green Valley",
            "--grade",
            "grade1=10",
            "--grade",
            "grade7iot=5",
            "--grade",
            "grade10=2",
        ],
    );
    assert!(first.contains("total used 17"));

    // Same grades in another order land on the same total.
    let second = run_ok_out(
        &home,
        &[
            "book",
            "add",
            "--school",
            "Hill Top",
            "--grade",
            "grade10=2",
            "--grade",
            "grade7iot=5",
            "--grade",
            "grade1=10",
        ],
    );
    assert!(second.contains("total used 17"));

    let stats = run_ok_out(&home, &["book", "stats"]);
    assert!(stats.contains("records\t2"));
    assert!(stats.contains("total_books\t34"));
    assert!(stats.contains("schools\t2"));
}

#[test]
fn edit_overwrites_named_grades_and_recomputes() {
    let home = tempfile::tempdir().expect("tempdir");

    let out = run_ok_out(
        &home,
        &[
            "book",
            "add",
            "--school",
            "Green Valley",
            "--grade",
            "grade1=10",
        ],
    );
    assert!(out.contains("total used 10"));
    let id = record_id(&out);

    // New grades merge into the stored set.
    let merged = run_ok_out(&home, &["book", "edit", &id, "--grade", "grade2=4"]);
    assert!(merged.contains("total used 14"));

    // Zeroing a grade drops it from the total.
    let zeroed = run_ok_out(&home, &["book", "edit", &id, "--grade", "grade1=0"]);
    assert!(zeroed.contains("total used 4"));
}

#[test]
fn grade_specs_are_validated() {
    let home = tempfile::tempdir().expect("tempdir");

    run_err(
        &home,
        &["book", "add", "--school", "Green Valley", "--grade", "grade11=3"],
        "Unknown grade field 'grade11'",
    );
    run_err(
        &home,
        &["book", "add", "--school", "Green Valley", "--grade", "grade7"],
        "Invalid grade spec",
    );
}

#[test]
fn kit_type_and_delivery_date_round_trip() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(
        &home,
        &[
            "book",
            "add",
            "--school",
            "Lake View",
            "--kit-type",
            "returnable",
            "--delivery-date",
            "2026-05-01",
            "--grade",
            "grade5=20",
        ],
    );

    let list = run_ok_out(&home, &["book", "list", "--format", "tsv"]);
    assert!(list.contains("\tLake View\tReturnable\t0\t0\t20\t2026-05-01"));

    // Coordinator details are optional but searchable once present.
    run_ok(
        &home,
        &[
            "book",
            "add",
            "--school",
            "River Side",
            "--coordinator",
            "Meena Joshi",
            "--grade",
            "grade3=6",
        ],
    );
    let found = run_ok_out(
        &home,
        &["book", "list", "--search", "meena", "--format", "tsv"],
    );
    assert!(found.contains("River Side"));
    assert!(!found.contains("Lake View"));
}
