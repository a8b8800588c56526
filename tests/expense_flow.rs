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
fn monthly_pool_subtracts_spend_and_carryover() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(
        &home,
        &[
            "expense",
            "add",
            "--remarks",
            "March pool",
            "--date",
            "2026-03-01",
            "--fixed",
            "1000",
        ],
    );
    run_ok(
        &home,
        &[
            "expense",
            "add",
            "--remarks",
            "Stationery",
            "--date",
            "2026-03-05",
            "--amount",
            "100",
        ],
    );
    run_ok(
        &home,
        &[
            "expense",
            "add",
            "--remarks",
            "Tea",
            "--date",
            "2026-03-20",
            "--amount",
            "50",
        ],
    );

    let stats = run_ok_out(&home, &["expense", "stats", "--month", "2026-03"]);
    assert!(stats.contains("month\t2026-03"));
    assert!(stats.contains("entries\t3"));
    assert!(stats.contains("fixed_total\t₹1000"));
    assert!(stats.contains("carryover\t₹0"));
    assert!(stats.contains("spent\t₹150"));
    assert!(stats.contains("remaining\t₹850"));
}

#[test]
fn carryover_takes_the_newest_nonzero_entry() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(
        &home,
        &[
            "expense",
            "add",
            "--remarks",
            "Carry from Feb",
            "--date",
            "2026-03-02",
            "--carryover",
            "200",
        ],
    );
    run_ok(
        &home,
        &[
            "expense",
            "add",
            "--remarks",
            "Carry corrected",
            "--date",
            "2026-03-03",
            "--carryover",
            "120",
        ],
    );

    let stats = run_ok_out(&home, &["expense", "stats", "--month", "2026-03"]);
    assert!(stats.contains("carryover\t₹120"));
    assert!(stats.contains("remaining\t₹-120"));
}

#[test]
fn entries_scope_to_their_entry_date_month() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(
        &home,
        &[
            "expense",
            "add",
            "--remarks",
            "March spend",
            "--date",
            "2026-03-10",
            "--amount",
            "10",
        ],
    );
    run_ok(
        &home,
        &[
            "expense",
            "add",
            "--remarks",
            "April spend",
            "--date",
            "2026-04-02",
            "--amount",
            "20",
        ],
    );

    let march = run_ok_out(&home, &["expense", "stats", "--month", "2026-03"]);
    assert!(march.contains("entries\t1"));
    assert!(march.contains("spent\t₹10"));
    // All-time lines ignore the month filter.
    assert!(march.contains("all_time_spent\t₹30"));
    assert!(march.contains("daily_average\t₹15"));

    let april = run_ok_out(
        &home,
        &["expense", "list", "--month", "2026-04", "--format", "tsv"],
    );
    assert!(april.contains("April spend"));
    assert!(!april.contains("March spend"));
}

#[test]
fn remarks_are_required() {
    let home = tempfile::tempdir().expect("tempdir");

    let mut cmd = godown_cmd();
    cmd.env("GODOWN_HOME", home.path());
    cmd.args(["expense", "add", "--remarks", "   ", "--amount", "5"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("remarks must not be empty"));
}

#[test]
fn edit_updates_and_clears_pool_fields() {
    let home = tempfile::tempdir().expect("tempdir");

    let out = run_ok_out(
        &home,
        &[
            "expense",
            "add",
            "--remarks",
            "May pool",
            "--date",
            "2026-05-01",
            "--fixed",
            "500",
        ],
    );
    let id = record_id(&out);

    let seeded = run_ok_out(&home, &["expense", "stats", "--month", "2026-05"]);
    assert!(seeded.contains("fixed_total\t₹500"));

    run_ok(&home, &["expense", "edit", &id, "--clear-fixed"]);
    let cleared = run_ok_out(&home, &["expense", "stats", "--month", "2026-05"]);
    assert!(cleared.contains("fixed_total\t₹0"));

    run_ok(&home, &["expense", "edit", &id, "--amount", "75"]);
    let spent = run_ok_out(&home, &["expense", "stats", "--month", "2026-05"]);
    assert!(spent.contains("spent\t₹75"));

    // Moving the entry date moves the entry out of the month.
    run_ok(&home, &["expense", "edit", &id, "--date", "2026-06-01"]);
    let moved = run_ok_out(&home, &["expense", "stats", "--month", "2026-05"]);
    assert!(moved.contains("entries\t0"));
    let list = run_ok_out(&home, &["expense", "list", "--month", "2026-05"]);
    assert!(list.contains("(no expense entries)"));
}
