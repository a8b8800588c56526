use assert_cmd::Command;
use predicates::prelude::*;

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
fn add_carries_closing_balance_forward_per_item() {
    let home = tempfile::tempdir().expect("tempdir");

    let first = run_ok_out(
        &home,
        &[
            "kit",
            "add",
            "Chemistry Kit",
            "--date",
            "2026-03-01",
            "--opening",
            "10",
            "--add-in",
            "5",
            "--take-out",
            "3",
        ],
    );
    assert!(first.contains("closing balance 12"));

    let second = run_ok_out(
        &home,
        &[
            "kit",
            "add",
            "Chemistry Kit",
            "--date",
            "2026-03-02",
            "--take-out",
            "2",
        ],
    );
    assert!(second.contains("closing balance 10"));

    // A different item starts from zero.
    let other = run_ok_out(&home, &["kit", "add", "Rocket Kit", "--add-in", "4"]);
    assert!(other.contains("closing balance 4"));

    let list = run_ok_out(
        &home,
        &["kit", "list", "--item", "Chemistry Kit", "--format", "tsv"],
    );
    let mut lines = list.lines();
    assert_eq!(
        lines.next(),
        Some("id\titem\tdate\topening\tadd-in\ttake-out\tclosing\tremarks")
    );
    let newest = lines.next().expect("newest row");
    assert!(newest.contains("\tChemistry Kit\t2026-03-02\t12\t0\t2\t10\t"));
    let older = lines.next().expect("older row");
    assert!(older.contains("\tChemistry Kit\t2026-03-01\t10\t5\t3\t12\t"));

    let items = run_ok_out(&home, &["kit", "items"]);
    assert_eq!(items, "Chemistry Kit\nRocket Kit\n");
}

#[test]
fn negative_closing_is_allowed_with_a_warning() {
    let home = tempfile::tempdir().expect("tempdir");

    let mut cmd = godown_cmd();
    cmd.env("GODOWN_HOME", home.path());
    cmd.args(["kit", "add", "Beaker Set", "--take-out", "5"]);
    let assert = cmd
        .assert()
        .success()
        .stderr(predicate::str::contains("is negative (-5)"));
    let out = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    assert!(out.contains("closing balance -5"));

    let list = run_ok_out(&home, &["kit", "list", "--format", "tsv"]);
    assert!(list.contains("\tBeaker Set\t"));
    assert!(list.contains("\t0\t0\t5\t-5\t"));
}

#[test]
fn opening_override_beats_the_carried_balance() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(&home, &["kit", "add", "Glue Gun", "--add-in", "5"]);
    let out = run_ok_out(
        &home,
        &[
            "kit",
            "add",
            "Glue Gun",
            "--opening",
            "100",
            "--take-out",
            "10",
        ],
    );
    assert!(out.contains("closing balance 90"));
}

#[test]
fn edit_recomputes_the_row_but_leaves_later_rows_alone() {
    let home = tempfile::tempdir().expect("tempdir");

    let first = run_ok_out(
        &home,
        &[
            "kit",
            "add",
            "Microscope",
            "--opening",
            "10",
            "--add-in",
            "5",
            "--take-out",
            "3",
        ],
    );
    let first_id = record_id(&first);

    let second = run_ok_out(&home, &["kit", "add", "Microscope", "--take-out", "2"]);
    assert!(second.contains("closing balance 10"));

    let edited = run_ok_out(&home, &["kit", "edit", &first_id, "--add-in", "10"]);
    assert!(edited.contains("closing balance 17"));

    // Re-running the same edit settles on the same balance.
    let again = run_ok_out(&home, &["kit", "edit", &first_id, "--add-in", "10"]);
    assert!(again.contains("closing balance 17"));

    // The later row keeps its stored balance until it is edited itself.
    let list = run_ok_out(
        &home,
        &["kit", "list", "--item", "Microscope", "--format", "tsv"],
    );
    assert!(list.contains("\t12\t0\t2\t10\t"));
    assert!(list.contains("\t10\t10\t3\t17\t"));
}

#[test]
fn rm_asks_for_confirmation_unless_yes() {
    let home = tempfile::tempdir().expect("tempdir");

    let out = run_ok_out(&home, &["kit", "add", "Tool Box", "--add-in", "2"]);
    let id = record_id(&out);

    let mut cmd = godown_cmd();
    cmd.env("GODOWN_HOME", home.path());
    cmd.args(["kit", "rm", &id]);
    cmd.write_stdin("n\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Aborted"));

    let still = run_ok_out(&home, &["kit", "list", "--format", "tsv"]);
    assert!(still.contains("Tool Box"));

    let gone = run_ok_out(&home, &["kit", "rm", &id, "--yes"]);
    assert!(gone.contains("Deleted kit entry"));

    let empty = run_ok_out(&home, &["kit", "list"]);
    assert!(empty.contains("(no kit entries)"));
}

#[test]
fn rm_of_an_older_row_leaves_the_survivor_untouched() {
    let home = tempfile::tempdir().expect("tempdir");

    let first = run_ok_out(&home, &["kit", "add", "Stapler", "--add-in", "12"]);
    assert!(first.contains("closing balance 12"));
    let first_id = record_id(&first);

    let second = run_ok_out(&home, &["kit", "add", "Stapler", "--take-out", "2"]);
    assert!(second.contains("closing balance 10"));

    run_ok(&home, &["kit", "rm", &first_id, "--yes"]);

    // The survivor keeps its stored opening and closing.
    let list = run_ok_out(&home, &["kit", "list", "--format", "tsv"]);
    assert_eq!(list.lines().count(), 2);
    assert!(list.contains("\tStapler\t"));
    assert!(list.contains("\t12\t0\t2\t10\t"));

    // The next add carries from the surviving latest row.
    let third = run_ok_out(&home, &["kit", "add", "Stapler", "--add-in", "1"]);
    assert!(third.contains("closing balance 11"));
}

#[test]
fn stats_sum_the_latest_closing_per_item() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(
        &home,
        &[
            "kit",
            "add",
            "Chemistry Kit",
            "--opening",
            "10",
            "--add-in",
            "5",
            "--take-out",
            "3",
        ],
    );
    run_ok(&home, &["kit", "add", "Chemistry Kit", "--take-out", "2"]);
    run_ok(&home, &["kit", "add", "Rocket Kit", "--add-in", "4"]);

    let stats = run_ok_out(&home, &["kit", "stats"]);
    assert!(stats.contains("records\t3"));
    assert!(stats.contains("items\t2"));
    // 10 from the chemistry kit's latest row plus 4 from the rocket kit.
    assert!(stats.contains("in_stock\t14"));
}
