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

fn record_id(out: &str) -> String {
    out.split_whitespace()
        .find(|tok| tok.len() == 36 && tok.matches('-').count() == 4)
        .expect("uuid in output")
        .to_string()
}

#[test]
fn add_carries_in_stock_forward_per_game() {
    let home = tempfile::tempdir().expect("tempdir");

    let first = run_ok_out(
        &home,
        &["game", "add", "Chess", "--adding", "10", "--sent", "4"],
    );
    assert!(first.contains("in stock 6"));

    let second = run_ok_out(&home, &["game", "add", "Chess", "--sent", "2"]);
    assert!(second.contains("in stock 4"));

    let other = run_ok_out(&home, &["game", "add", "Ludo", "--adding", "3"]);
    assert!(other.contains("in stock 3"));

    let list = run_ok_out(
        &home,
        &["game", "list", "--game", "Chess", "--format", "tsv"],
    );
    let mut lines = list.lines();
    assert_eq!(
        lines.next(),
        Some("id\tgame\tprevious\tadding\tsent\tin-stock\tsent-by")
    );
    assert!(lines.next().expect("newest row").contains("\tChess\t6\t0\t2\t4\t"));
    assert!(lines.next().expect("older row").contains("\tChess\t0\t10\t4\t6\t"));

    let names = run_ok_out(&home, &["game", "names"]);
    assert_eq!(names, "Chess\nLudo\n");
}

#[test]
fn negative_in_stock_is_allowed_with_a_warning() {
    let home = tempfile::tempdir().expect("tempdir");

    let mut cmd = godown_cmd();
    cmd.env("GODOWN_HOME", home.path());
    cmd.args(["game", "add", "Chess", "--sent", "5"]);
    let assert = cmd
        .assert()
        .success()
        .stderr(predicate::str::contains("is negative (-5)"));
    let out = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    assert!(out.contains("in stock -5"));

    let list = run_ok_out(&home, &["game", "list", "--format", "tsv"]);
    assert!(list.contains("\tChess\t0\t0\t5\t-5\t"));
}

#[test]
fn previous_override_beats_the_carried_stock() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(&home, &["game", "add", "Carrom", "--adding", "8"]);
    let out = run_ok_out(
        &home,
        &["game", "add", "Carrom", "--previous", "50", "--sent", "5"],
    );
    assert!(out.contains("in stock 45"));
}

#[test]
fn edit_recomputes_in_stock_from_stored_fields() {
    let home = tempfile::tempdir().expect("tempdir");

    let out = run_ok_out(
        &home,
        &["game", "add", "Chess", "--adding", "10", "--sent", "4"],
    );
    let id = record_id(&out);

    let edited = run_ok_out(&home, &["game", "edit", &id, "--sent", "8"]);
    assert!(edited.contains("in stock 2"));

    run_ok(&home, &["game", "edit", &id, "--sent-by", "Priya"]);
    let list = run_ok_out(&home, &["game", "list", "--format", "tsv"]);
    assert!(list.contains("\tChess\t0\t10\t8\t2\tPriya"));
}

#[test]
fn stats_track_distributed_and_available() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(&home, &["game", "add", "Chess", "--adding", "10", "--sent", "4"]);
    run_ok(&home, &["game", "add", "Chess", "--sent", "2"]);
    run_ok(&home, &["game", "add", "Ludo", "--adding", "3"]);

    let stats = run_ok_out(&home, &["game", "stats"]);
    assert!(stats.contains("records\t3"));
    assert!(stats.contains("games\t2"));
    // Distributed counts every sent column; available sums the latest
    // in-stock per game.
    assert!(stats.contains("distributed\t6"));
    assert!(stats.contains("available\t7"));
}
