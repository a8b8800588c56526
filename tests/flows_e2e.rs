use assert_cmd::prelude::*;
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

fn db_path(home: &tempfile::TempDir) -> std::path::PathBuf {
    home.path().join("data").join("godown.sqlite3")
}

#[test]
fn export_writes_csv_with_headers_and_all_rows() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(&home, &["kit", "add", "Chemistry Kit", "--add-in", "5"]);
    run_ok(&home, &["kit", "add", "Rocket Kit", "--add-in", "2"]);

    let out_path = home.path().join("kits.csv");
    let out = run_ok_out(
        &home,
        &["kit", "export", "--out", out_path.to_str().expect("utf8 path")],
    );
    assert!(out.contains("Exported 2 rows to"));

    let csv = std::fs::read_to_string(&out_path).expect("read export");
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some(
            "id,item_name,entry_date,opening_balance,addins,takeouts,closing_balance,remarks,entered_by,created_at"
        )
    );
    assert_eq!(lines.count(), 2);
    assert!(csv.contains("Chemistry Kit"));
    assert!(csv.contains("Rocket Kit"));
}

#[test]
fn every_write_lands_in_the_activity_log() {
    let home = tempfile::tempdir().expect("tempdir");

    let out = run_ok_out(&home, &["kit", "add", "Chemistry Kit", "--add-in", "5"]);
    let id = record_id(&out);
    run_ok(&home, &["kit", "edit", &id, "--add-in", "6"]);
    run_ok(&home, &["kit", "rm", &id, "--yes"]);
    run_ok(
        &home,
        &["expense", "add", "--remarks", "Chai", "--amount", "10"],
    );

    let log = run_ok_out(&home, &["log", "list"]);
    assert!(log.contains("kits_inventory\tINSERT"));
    assert!(log.contains("kits_inventory\tUPDATE"));
    assert!(log.contains("kits_inventory\tDELETE"));
    assert!(log.contains("daily_expenses\tINSERT"));

    let scoped = run_ok_out(&home, &["log", "list", "--module", "kits"]);
    assert!(scoped.contains("kits_inventory\tINSERT"));
    assert!(!scoped.contains("daily_expenses"));

    let last = run_ok_out(&home, &["log", "list", "--last", "2"]);
    assert_eq!(last.lines().count(), 2);
}

#[test]
fn operator_name_reaches_stored_rows() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(&home, &["login", "--name", "Asha"]);
    let shown = run_ok_out(&home, &["login"]);
    assert!(shown.contains("operator\tAsha"));

    run_ok(&home, &["kit", "add", "Prism Kit", "--add-in", "2"]);

    let conn = rusqlite::Connection::open(db_path(&home)).expect("open sqlite");
    let entered_by: String = conn
        .query_row("SELECT entered_by FROM kits_inventory LIMIT 1", [], |row| {
            row.get(0)
        })
        .expect("read entered_by");
    assert_eq!(entered_by, "Asha");

    let operator: String = conn
        .query_row("SELECT operator FROM activity_log LIMIT 1", [], |row| {
            row.get(0)
        })
        .expect("read operator");
    assert_eq!(operator, "Asha");
}

#[test]
fn all_modules_share_one_database_under_home() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(&home, &["kit", "add", "Chemistry Kit", "--add-in", "5"]);
    run_ok(&home, &["game", "add", "Chess", "--adding", "4"]);
    run_ok(
        &home,
        &[
            "blazer", "add", "--gender", "male", "--size", "40", "--received", "5",
        ],
    );

    let path = db_path(&home);
    assert!(path.exists());

    let conn = rusqlite::Connection::open(path).expect("open sqlite");
    for table in ["kits_inventory", "games_inventory", "blazer_inventory"] {
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .expect("count rows");
        assert_eq!(count, 1, "expected one row in {table}");
    }

    // Every insert logs the id of the row it created.
    let with_record: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM activity_log WHERE record_id IS NOT NULL",
            [],
            |row| row.get(0),
        )
        .expect("count log rows");
    assert_eq!(with_record, 3);
}
