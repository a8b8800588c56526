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
        .stderr(predicate::str::contains(msg.to_string()));
}

fn record_id(out: &str) -> String {
    out.split_whitespace()
        .find(|tok| tok.len() == 36 && tok.matches('-').count() == 4)
        .expect("uuid in output")
        .to_string()
}

#[test]
fn office_stock_carries_and_clamps_at_zero() {
    let home = tempfile::tempdir().expect("tempdir");

    // Bare sizes pick up the gender prefix.
    let first = run_ok_out(
        &home,
        &[
            "blazer", "add", "--gender", "male", "--size", "40", "--received", "5",
        ],
    );
    assert!(first.contains("M-40"));
    assert!(first.contains("office stock 5"));

    // Sending more than the office holds floors at zero.
    let second = run_ok_out(
        &home,
        &[
            "blazer", "add", "--gender", "male", "--size", "M-40", "--sent", "8",
        ],
    );
    assert!(second.contains("office stock 0"));

    let third = run_ok_out(
        &home,
        &[
            "blazer", "add", "--gender", "male", "--size", "40", "--received", "3",
        ],
    );
    assert!(third.contains("office stock 3"));
}

#[test]
fn buckets_are_scoped_by_gender_and_size() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(
        &home,
        &[
            "blazer", "add", "--gender", "male", "--size", "40", "--received", "5",
        ],
    );
    run_ok(
        &home,
        &[
            "blazer", "add", "--gender", "male", "--size", "42", "--received", "7",
        ],
    );
    let female = run_ok_out(
        &home,
        &[
            "blazer", "add", "--gender", "female", "--size", "xl", "--received", "2",
        ],
    );
    assert!(female.contains("F-XL"));
    assert!(female.contains("office stock 2"));

    let stats = run_ok_out(&home, &["blazer", "stats"]);
    assert!(stats.contains("total_stock\t14"));
    assert!(stats.contains("male_stock\t12"));
    assert!(stats.contains("female_stock\t2"));

    let male_only = run_ok_out(
        &home,
        &["blazer", "list", "--gender", "male", "--format", "tsv"],
    );
    assert!(male_only.contains("M-40"));
    assert!(male_only.contains("M-42"));
    assert!(!male_only.contains("F-XL"));

    let sized = run_ok_out(&home, &["blazer", "list", "--size", "40", "--format", "tsv"]);
    assert!(sized.contains("M-40"));
    assert!(!sized.contains("M-42"));
}

#[test]
fn sizes_must_come_from_the_gender_catalog() {
    let home = tempfile::tempdir().expect("tempdir");

    run_err(
        &home,
        &[
            "blazer", "add", "--gender", "female", "--size", "40", "--received", "1",
        ],
        "not in the Female catalog",
    );
    run_err(
        &home,
        &[
            "blazer", "add", "--gender", "male", "--size", "xs", "--received", "1",
        ],
        "not in the Male catalog",
    );
    run_err(
        &home,
        &["blazer", "add", "--gender", "male", "--size", "40"],
        "Provide --received <count> or --sent <count>",
    );
}

#[test]
fn editing_quantity_rebases_on_the_next_older_row() {
    let home = tempfile::tempdir().expect("tempdir");

    let first = run_ok_out(
        &home,
        &[
            "blazer", "add", "--gender", "male", "--size", "40", "--received", "5",
        ],
    );
    let first_id = record_id(&first);

    let second = run_ok_out(
        &home,
        &[
            "blazer", "add", "--gender", "male", "--size", "40", "--received", "3",
        ],
    );
    let second_id = record_id(&second);
    assert!(second.contains("office stock 8"));

    // The newer row re-derives from the older row's stored stock: 5 + 6.
    let rebased = run_ok_out(&home, &["blazer", "edit", &second_id, "--received", "6"]);
    assert!(rebased.contains("office stock 11"));

    // The oldest row of a bucket has no baseline, so only the quantity
    // delta applies: 5 + (10 - 5).
    let oldest = run_ok_out(&home, &["blazer", "edit", &first_id, "--received", "10"]);
    assert!(oldest.contains("office stock 10"));

    // Flipping it to a send clamps at zero: 10 + (-2 - 10).
    let flipped = run_ok_out(&home, &["blazer", "edit", &first_id, "--sent", "2"]);
    assert!(flipped.contains("office stock 0"));
}

#[test]
fn explicit_stock_override_wins() {
    let home = tempfile::tempdir().expect("tempdir");

    let out = run_ok_out(
        &home,
        &[
            "blazer", "add", "--gender", "male", "--size", "44", "--received", "5", "--stock",
            "99",
        ],
    );
    assert!(out.contains("office stock 99"));
    let id = record_id(&out);

    let edited = run_ok_out(&home, &["blazer", "edit", &id, "--stock", "1"]);
    assert!(edited.contains("office stock 1"));

    // The next movement carries from the overridden stock.
    let next = run_ok_out(
        &home,
        &[
            "blazer", "add", "--gender", "male", "--size", "44", "--received", "2",
        ],
    );
    assert!(next.contains("office stock 3"));
}
