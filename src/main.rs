mod cli;
mod config;
mod db;
mod domain;
mod engine;
mod export;
mod resolver;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use clap::Parser;
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use std::path::PathBuf;
use uuid::Uuid;

use crate::cli::{
    BlazerCmd, BookCmd, Cli, Command, CourierCmd, ExpenseCmd, GameCmd, KitCmd, ListFormat, LogCmd,
    LoginArgs,
};
use crate::config::{AppConfig, AppPaths, app_paths, load_or_init_config, now_utc, write_config};
use crate::db::Db;
use crate::domain::{
    BlazerRecord, BookRecord, CourierRecord, CourierStatus, ExpenseRecord, GameRecord, GradeCounts,
    KitRecord, ModuleKind, ValidationError, clean_opt, normalize_size, parse_grade_spec,
    require_text,
};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = app_paths(cli.home.clone())?;
    let (mut cfg, cfg_path) = load_or_init_config(&paths)?;

    match cli.command {
        Command::Login(args) => handle_login(args, &mut cfg, &cfg_path, &paths),
        cmd => {
            let (db, _db_path) = Db::open(&paths)?;

            match cmd {
                Command::Kit(args) => handle_kit(&db, &cfg, args.cmd),
                Command::Game(args) => handle_game(&db, &cfg, args.cmd),
                Command::Blazer(args) => handle_blazer(&db, &cfg, args.cmd),
                Command::Expense(args) => handle_expense(&db, &cfg, args.cmd),
                Command::Book(args) => handle_book(&db, &cfg, args.cmd),
                Command::Courier(args) => handle_courier(&db, &cfg, args.cmd),
                Command::Log(args) => handle_log(&db, args.cmd),
                Command::Login(_) => unreachable!(),
            }
        }
    }
}

fn handle_login(
    args: LoginArgs,
    cfg: &mut AppConfig,
    cfg_path: &std::path::Path,
    paths: &AppPaths,
) -> Result<()> {
    if let Some(name) = args.name {
        let name = require_text("operator name", &name)?;
        cfg.operator = Some(name);
        write_config(cfg_path, cfg)?;
    }

    println!("device_id\t{}", cfg.device_id);
    println!("operator\t{}", cfg.operator_name());
    println!("currency\t{}", cfg.currency_symbol);
    println!("config\t{}", cfg_path.display());
    println!("data\t{}", paths.data_dir.display());
    Ok(())
}

fn handle_kit(db: &Db, cfg: &AppConfig, cmd: KitCmd) -> Result<()> {
    match cmd {
        KitCmd::Add {
            item,
            date,
            opening,
            add_in,
            take_out,
            remarks,
        } => {
            let item = require_text("item name", &item)?;
            let entry_date = parse_day_or_today(date.as_deref())?;

            if add_in < 0 || take_out < 0 {
                eprintln!(
                    "warning: negative movement for '{item}' (add-in {add_in}, take-out {take_out})."
                );
            }

            let prior = resolver::carried_opening(db, &item)?;
            let txn = engine::kit_transaction(prior, opening, add_in, take_out);
            if txn.closing_balance < 0 {
                eprintln!(
                    "warning: closing balance for '{item}' is negative ({}).",
                    txn.closing_balance
                );
            }

            let rec = KitRecord {
                id: Uuid::new_v4(),
                item_name: item,
                entry_date,
                opening_balance: txn.opening_balance,
                addins: add_in,
                takeouts: take_out,
                closing_balance: txn.closing_balance,
                remarks: clean_opt(remarks),
                entered_by: cfg.operator_name(),
                created_at: now_utc(),
            };
            db.insert_kit(&rec)?;
            db.log_action(
                ModuleKind::Kits,
                "INSERT",
                &json!({ "item_name": rec.item_name, "closing_balance": rec.closing_balance }),
                Some(rec.id),
                &cfg.operator_name(),
            )?;
            println!(
                "Recorded kit entry {} for '{}' (closing balance {}).",
                rec.id, rec.item_name, rec.closing_balance
            );
            Ok(())
        }
        KitCmd::Edit {
            id,
            item,
            date,
            opening,
            add_in,
            take_out,
            remarks,
        } => {
            let Some(mut rec) = db.get_kit(id)? else {
                return Err(anyhow!("No kit entry {id}"));
            };

            let mut updated: Vec<&str> = Vec::new();
            if let Some(item) = item {
                rec.item_name = require_text("item name", &item)?;
                updated.push("item_name");
            }
            if let Some(date) = date {
                rec.entry_date = parse_day(&date)?;
                updated.push("entry_date");
            }
            let balance_touched = opening.is_some() || add_in.is_some() || take_out.is_some();
            if let Some(v) = opening {
                rec.opening_balance = v;
                updated.push("opening_balance");
            }
            if let Some(v) = add_in {
                rec.addins = v;
                updated.push("addins");
            }
            if let Some(v) = take_out {
                rec.takeouts = v;
                updated.push("takeouts");
            }
            if let Some(remarks) = remarks {
                rec.remarks = clean_opt(Some(remarks));
                updated.push("remarks");
            }
            if updated.is_empty() {
                return Err(anyhow!("Nothing to update. Pass at least one field flag."));
            }

            if balance_touched {
                if rec.addins < 0 || rec.takeouts < 0 {
                    eprintln!(
                        "warning: negative movement for '{}' (add-in {}, take-out {}).",
                        rec.item_name, rec.addins, rec.takeouts
                    );
                }
                let txn = engine::kit_transaction(
                    None,
                    Some(rec.opening_balance),
                    rec.addins,
                    rec.takeouts,
                );
                rec.closing_balance = txn.closing_balance;
                updated.push("closing_balance");
                if rec.closing_balance < 0 {
                    eprintln!(
                        "warning: closing balance for '{}' is negative ({}).",
                        rec.item_name, rec.closing_balance
                    );
                }
            }

            let changed = db.update_kit(&rec)?;
            if changed == 0 {
                return Err(anyhow!("No kit entry {id}"));
            }
            db.log_action(
                ModuleKind::Kits,
                "UPDATE",
                &json!({ "updated_fields": updated, "closing_balance": rec.closing_balance }),
                Some(rec.id),
                &cfg.operator_name(),
            )?;
            println!(
                "Updated kit entry {} (closing balance {}).",
                rec.id, rec.closing_balance
            );
            Ok(())
        }
        KitCmd::Rm { id, yes } => {
            let Some(rec) = db.get_kit(id)? else {
                return Err(anyhow!("No kit entry {id}"));
            };
            if !confirm_delete(&format!("kit entry {id} for '{}'", rec.item_name), yes)? {
                println!("Aborted.");
                return Ok(());
            }

            let changed = db.delete_kit(id)?;
            if changed == 0 {
                return Err(anyhow!("No kit entry {id}"));
            }
            db.log_action(
                ModuleKind::Kits,
                "DELETE",
                &json!({ "item_name": rec.item_name, "closing_balance": rec.closing_balance }),
                Some(id),
                &cfg.operator_name(),
            )?;
            println!("Deleted kit entry {id}.");
            Ok(())
        }
        KitCmd::List { list, item } => {
            let mut rows = db.list_kits()?;
            if let Some(item) = item {
                rows.retain(|r| r.item_name == item);
            }
            if let Some(q) = &list.search {
                rows.retain(|r| {
                    matches_search(
                        &[
                            &r.item_name,
                            r.remarks.as_deref().unwrap_or(""),
                            &r.entered_by,
                        ],
                        q,
                    )
                });
            }
            if let Some(limit) = list.limit {
                rows.truncate(limit);
            }
            if rows.is_empty() {
                println!("(no kit entries)");
                return Ok(());
            }

            let headers = [
                "id", "item", "date", "opening", "add-in", "take-out", "closing", "remarks",
            ];
            let body: Vec<Vec<String>> = rows.iter().map(kit_row).collect();
            print_rows(&headers, &body, list.format);
            Ok(())
        }
        KitCmd::Items => {
            let items = db.distinct_kit_items()?;
            if items.is_empty() {
                println!("(no kit entries)");
                return Ok(());
            }
            for item in items {
                println!("{item}");
            }
            Ok(())
        }
        KitCmd::Stats => {
            let rows = db.list_kits()?;
            // Rows arrive newest first, so the first row seen per item is its
            // latest snapshot.
            let mut latest: BTreeMap<&str, i64> = BTreeMap::new();
            for r in &rows {
                latest.entry(r.item_name.as_str()).or_insert(r.closing_balance);
            }
            let in_stock: i64 = latest.values().sum();
            let today = now_utc().date_naive();
            let today_entries = rows
                .iter()
                .filter(|r| r.created_at.date_naive() == today)
                .count();

            println!("records\t{}", rows.len());
            println!("items\t{}", latest.len());
            println!("in_stock\t{in_stock}");
            println!("today_entries\t{today_entries}");
            Ok(())
        }
        KitCmd::Export { out } => handle_module_export(db, ModuleKind::Kits, out),
    }
}

fn handle_game(db: &Db, cfg: &AppConfig, cmd: GameCmd) -> Result<()> {
    match cmd {
        GameCmd::Add {
            game,
            previous,
            adding,
            sent,
            sent_by,
        } => {
            let game = require_text("game name", &game)?;

            if adding < 0 || sent < 0 {
                eprintln!("warning: negative movement for '{game}' (adding {adding}, sent {sent}).");
            }

            let prior = resolver::carried_stock(db, &game)?;
            let txn = engine::game_transaction(prior, previous, adding, sent);
            if txn.in_stock < 0 {
                eprintln!("warning: in stock for '{game}' is negative ({}).", txn.in_stock);
            }

            let rec = GameRecord {
                id: Uuid::new_v4(),
                game_details: game,
                previous_stock: txn.previous_stock,
                adding,
                sent,
                in_stock: txn.in_stock,
                sent_by: clean_opt(sent_by),
                entered_by: cfg.operator_name(),
                created_at: now_utc(),
            };
            db.insert_game(&rec)?;
            db.log_action(
                ModuleKind::Games,
                "INSERT",
                &json!({ "game_details": rec.game_details, "in_stock": rec.in_stock }),
                Some(rec.id),
                &cfg.operator_name(),
            )?;
            println!(
                "Recorded game entry {} for '{}' (in stock {}).",
                rec.id, rec.game_details, rec.in_stock
            );
            Ok(())
        }
        GameCmd::Edit {
            id,
            game,
            previous,
            adding,
            sent,
            sent_by,
        } => {
            let Some(mut rec) = db.get_game(id)? else {
                return Err(anyhow!("No game entry {id}"));
            };

            let mut updated: Vec<&str> = Vec::new();
            if let Some(game) = game {
                rec.game_details = require_text("game name", &game)?;
                updated.push("game_details");
            }
            let balance_touched = previous.is_some() || adding.is_some() || sent.is_some();
            if let Some(v) = previous {
                rec.previous_stock = v;
                updated.push("previous_stock");
            }
            if let Some(v) = adding {
                rec.adding = v;
                updated.push("adding");
            }
            if let Some(v) = sent {
                rec.sent = v;
                updated.push("sent");
            }
            if let Some(sent_by) = sent_by {
                rec.sent_by = clean_opt(Some(sent_by));
                updated.push("sent_by");
            }
            if updated.is_empty() {
                return Err(anyhow!("Nothing to update. Pass at least one field flag."));
            }

            if balance_touched {
                if rec.adding < 0 || rec.sent < 0 {
                    eprintln!(
                        "warning: negative movement for '{}' (adding {}, sent {}).",
                        rec.game_details, rec.adding, rec.sent
                    );
                }
                let txn =
                    engine::game_transaction(None, Some(rec.previous_stock), rec.adding, rec.sent);
                rec.in_stock = txn.in_stock;
                updated.push("in_stock");
                if rec.in_stock < 0 {
                    eprintln!(
                        "warning: in stock for '{}' is negative ({}).",
                        rec.game_details, rec.in_stock
                    );
                }
            }

            let changed = db.update_game(&rec)?;
            if changed == 0 {
                return Err(anyhow!("No game entry {id}"));
            }
            db.log_action(
                ModuleKind::Games,
                "UPDATE",
                &json!({ "updated_fields": updated, "in_stock": rec.in_stock }),
                Some(rec.id),
                &cfg.operator_name(),
            )?;
            println!("Updated game entry {} (in stock {}).", rec.id, rec.in_stock);
            Ok(())
        }
        GameCmd::Rm { id, yes } => {
            let Some(rec) = db.get_game(id)? else {
                return Err(anyhow!("No game entry {id}"));
            };
            if !confirm_delete(&format!("game entry {id} for '{}'", rec.game_details), yes)? {
                println!("Aborted.");
                return Ok(());
            }

            let changed = db.delete_game(id)?;
            if changed == 0 {
                return Err(anyhow!("No game entry {id}"));
            }
            db.log_action(
                ModuleKind::Games,
                "DELETE",
                &json!({ "game_details": rec.game_details, "in_stock": rec.in_stock }),
                Some(id),
                &cfg.operator_name(),
            )?;
            println!("Deleted game entry {id}.");
            Ok(())
        }
        GameCmd::List { list, game } => {
            let mut rows = db.list_games()?;
            if let Some(game) = game {
                rows.retain(|r| r.game_details == game);
            }
            if let Some(q) = &list.search {
                rows.retain(|r| {
                    matches_search(
                        &[
                            &r.game_details,
                            r.sent_by.as_deref().unwrap_or(""),
                            &r.entered_by,
                        ],
                        q,
                    )
                });
            }
            if let Some(limit) = list.limit {
                rows.truncate(limit);
            }
            if rows.is_empty() {
                println!("(no game entries)");
                return Ok(());
            }

            let headers = [
                "id", "game", "previous", "adding", "sent", "in-stock", "sent-by",
            ];
            let body: Vec<Vec<String>> = rows.iter().map(game_row).collect();
            print_rows(&headers, &body, list.format);
            Ok(())
        }
        GameCmd::Names => {
            let names = db.distinct_game_names()?;
            if names.is_empty() {
                println!("(no game entries)");
                return Ok(());
            }
            for name in names {
                println!("{name}");
            }
            Ok(())
        }
        GameCmd::Stats => {
            let rows = db.list_games()?;
            let distributed: i64 = rows.iter().map(|r| r.sent).sum();
            let mut latest: BTreeMap<&str, i64> = BTreeMap::new();
            for r in &rows {
                latest.entry(r.game_details.as_str()).or_insert(r.in_stock);
            }
            let available: i64 = latest.values().sum();
            let today = now_utc().date_naive();
            let today_entries = rows
                .iter()
                .filter(|r| r.created_at.date_naive() == today)
                .count();

            println!("records\t{}", rows.len());
            println!("games\t{}", latest.len());
            println!("distributed\t{distributed}");
            println!("available\t{available}");
            println!("today_entries\t{today_entries}");
            Ok(())
        }
        GameCmd::Export { out } => handle_module_export(db, ModuleKind::Games, out),
    }
}

fn handle_blazer(db: &Db, cfg: &AppConfig, cmd: BlazerCmd) -> Result<()> {
    match cmd {
        BlazerCmd::Add {
            gender,
            size,
            received,
            sent,
            stock,
            remarks,
        } => {
            let size = normalize_size(gender, &size)?;
            let quantity = signed_quantity(received, sent)?;
            if let Some(explicit) = stock {
                if explicit < 0 {
                    return Err(ValidationError::NegativeValue { field: "stock" }.into());
                }
            }

            let baseline = resolver::carried_office_stock(db, gender, &size)?;
            let in_office_stock = match stock {
                Some(explicit) => explicit,
                None => engine::blazer_stock(baseline, quantity),
            };

            let rec = BlazerRecord {
                id: Uuid::new_v4(),
                gender,
                size,
                quantity,
                in_office_stock,
                remarks: clean_opt(remarks),
                entered_by: cfg.operator_name(),
                created_at: now_utc(),
            };
            db.insert_blazer(&rec)?;
            db.log_action(
                ModuleKind::Blazer,
                "INSERT",
                &json!({
                    "gender": rec.gender.as_str(),
                    "size": rec.size,
                    "quantity": rec.quantity,
                    "in_office_stock": rec.in_office_stock,
                }),
                Some(rec.id),
                &cfg.operator_name(),
            )?;
            println!(
                "Recorded blazer movement {} for {} {} (office stock {}).",
                rec.id,
                rec.gender.as_str(),
                rec.size,
                rec.in_office_stock
            );
            Ok(())
        }
        BlazerCmd::Edit {
            id,
            gender,
            size,
            received,
            sent,
            stock,
            remarks,
        } => {
            let Some(mut rec) = db.get_blazer(id)? else {
                return Err(anyhow!("No blazer movement {id}"));
            };

            let mut updated: Vec<&str> = Vec::new();
            if let Some(new_gender) = gender {
                if new_gender != rec.gender {
                    rec.gender = new_gender;
                    updated.push("gender");
                    if size.is_none() {
                        let bare = rec
                            .size
                            .trim_start_matches("M-")
                            .trim_start_matches("F-")
                            .to_string();
                        rec.size = normalize_size(new_gender, &bare).context(
                            "Gender change needs a size from the new catalog. Pass --size as well.",
                        )?;
                        updated.push("size");
                    }
                }
            }
            if let Some(new_size) = size {
                rec.size = normalize_size(rec.gender, &new_size)?;
                updated.push("size");
            }

            if received.is_some() || sent.is_some() {
                let old_qty = rec.quantity;
                let new_qty = signed_quantity(received, sent)?;
                rec.quantity = new_qty;
                updated.push("quantity");

                let older = db.blazer_before(rec.gender, &rec.size, rec.created_at, rec.id)?;
                rec.in_office_stock = engine::blazer_stock_reedit(
                    older.map(|o| o.in_office_stock),
                    rec.in_office_stock,
                    old_qty,
                    new_qty,
                );
                updated.push("in_office_stock");
            }
            if let Some(explicit) = stock {
                if explicit < 0 {
                    return Err(ValidationError::NegativeValue { field: "stock" }.into());
                }
                rec.in_office_stock = explicit;
                if !updated.contains(&"in_office_stock") {
                    updated.push("in_office_stock");
                }
            }
            if let Some(remarks) = remarks {
                rec.remarks = clean_opt(Some(remarks));
                updated.push("remarks");
            }
            if updated.is_empty() {
                return Err(anyhow!("Nothing to update. Pass at least one field flag."));
            }

            let changed = db.update_blazer(&rec)?;
            if changed == 0 {
                return Err(anyhow!("No blazer movement {id}"));
            }
            db.log_action(
                ModuleKind::Blazer,
                "UPDATE",
                &json!({ "updated_fields": updated, "in_office_stock": rec.in_office_stock }),
                Some(rec.id),
                &cfg.operator_name(),
            )?;
            println!(
                "Updated blazer movement {} (office stock {}).",
                rec.id, rec.in_office_stock
            );
            Ok(())
        }
        BlazerCmd::Rm { id, yes } => {
            let Some(rec) = db.get_blazer(id)? else {
                return Err(anyhow!("No blazer movement {id}"));
            };
            if !confirm_delete(
                &format!(
                    "blazer movement {id} for {} {}",
                    rec.gender.as_str(),
                    rec.size
                ),
                yes,
            )? {
                println!("Aborted.");
                return Ok(());
            }

            let changed = db.delete_blazer(id)?;
            if changed == 0 {
                return Err(anyhow!("No blazer movement {id}"));
            }
            db.log_action(
                ModuleKind::Blazer,
                "DELETE",
                &json!({
                    "gender": rec.gender.as_str(),
                    "size": rec.size,
                    "in_office_stock": rec.in_office_stock,
                }),
                Some(id),
                &cfg.operator_name(),
            )?;
            println!("Deleted blazer movement {id}.");
            Ok(())
        }
        BlazerCmd::List { list, gender, size } => {
            let mut rows = db.list_blazers()?;
            if let Some(gender) = gender {
                rows.retain(|r| r.gender == gender);
            }
            if let Some(size) = size {
                let size = size.trim().to_ascii_uppercase();
                rows.retain(|r| r.size == size || r.size.ends_with(&format!("-{size}")));
            }
            if let Some(q) = &list.search {
                rows.retain(|r| {
                    matches_search(
                        &[
                            r.gender.as_str(),
                            &r.size,
                            r.remarks.as_deref().unwrap_or(""),
                            &r.entered_by,
                        ],
                        q,
                    )
                });
            }
            if let Some(limit) = list.limit {
                rows.truncate(limit);
            }
            if rows.is_empty() {
                println!("(no blazer movements)");
                return Ok(());
            }

            let headers = ["id", "gender", "size", "added", "sent", "stock", "remarks"];
            let body: Vec<Vec<String>> = rows.iter().map(blazer_row).collect();
            print_rows(&headers, &body, list.format);
            Ok(())
        }
        BlazerCmd::Stats => {
            let rows = db.list_blazers()?;
            let mut latest: BTreeMap<(&str, &str), i64> = BTreeMap::new();
            for r in &rows {
                latest
                    .entry((r.gender.as_str(), r.size.as_str()))
                    .or_insert(r.in_office_stock);
            }
            let total: i64 = latest.values().sum();
            let male: i64 = latest
                .iter()
                .filter(|((g, _), _)| *g == "Male")
                .map(|(_, v)| v)
                .sum();
            let female: i64 = latest
                .iter()
                .filter(|((g, _), _)| *g == "Female")
                .map(|(_, v)| v)
                .sum();

            println!("records\t{}", rows.len());
            println!("total_stock\t{total}");
            println!("male_stock\t{male}");
            println!("female_stock\t{female}");
            Ok(())
        }
        BlazerCmd::Export { out } => handle_module_export(db, ModuleKind::Blazer, out),
    }
}

fn handle_expense(db: &Db, cfg: &AppConfig, cmd: ExpenseCmd) -> Result<()> {
    match cmd {
        ExpenseCmd::Add {
            remarks,
            date,
            amount,
            fixed,
            carryover,
        } => {
            let remarks = require_text("remarks", &remarks)?;
            let entry_date = parse_day_or_today(date.as_deref())?;
            let expenses = parse_decimal(amount, "amount")?;
            let fixed_amount = fixed.map(|raw| parse_decimal(raw, "fixed")).transpose()?;
            let previous_month_overspend = carryover
                .map(|raw| parse_decimal(raw, "carryover"))
                .transpose()?;

            let rec = ExpenseRecord {
                id: Uuid::new_v4(),
                entry_date,
                expenses,
                fixed_amount,
                previous_month_overspend,
                remarks,
                entered_by: cfg.operator_name(),
                created_at: now_utc(),
            };
            db.insert_expense(&rec)?;
            db.log_action(
                ModuleKind::Expenses,
                "INSERT",
                &json!({ "entry_date": rec.entry_date.to_string(), "expenses": rec.expenses.to_string() }),
                Some(rec.id),
                &cfg.operator_name(),
            )?;
            println!(
                "Recorded expense entry {} ({}{} on {}).",
                rec.id, cfg.currency_symbol, rec.expenses, rec.entry_date
            );
            Ok(())
        }
        ExpenseCmd::Edit {
            id,
            date,
            amount,
            fixed,
            clear_fixed,
            carryover,
            clear_carryover,
            remarks,
        } => {
            let Some(mut rec) = db.get_expense(id)? else {
                return Err(anyhow!("No expense entry {id}"));
            };

            let mut updated: Vec<&str> = Vec::new();
            if let Some(date) = date {
                rec.entry_date = parse_day(&date)?;
                updated.push("entry_date");
            }
            if let Some(raw) = amount {
                rec.expenses = parse_decimal(raw, "amount")?;
                updated.push("expenses");
            }
            if let Some(raw) = fixed {
                rec.fixed_amount = Some(parse_decimal(raw, "fixed")?);
                updated.push("fixed_amount");
            }
            if clear_fixed {
                rec.fixed_amount = None;
                updated.push("fixed_amount");
            }
            if let Some(raw) = carryover {
                rec.previous_month_overspend = Some(parse_decimal(raw, "carryover")?);
                updated.push("previous_month_overspend");
            }
            if clear_carryover {
                rec.previous_month_overspend = None;
                updated.push("previous_month_overspend");
            }
            if let Some(remarks) = remarks {
                rec.remarks = require_text("remarks", &remarks)?;
                updated.push("remarks");
            }
            if updated.is_empty() {
                return Err(anyhow!("Nothing to update. Pass at least one field flag."));
            }

            let changed = db.update_expense(&rec)?;
            if changed == 0 {
                return Err(anyhow!("No expense entry {id}"));
            }
            db.log_action(
                ModuleKind::Expenses,
                "UPDATE",
                &json!({ "updated_fields": updated }),
                Some(rec.id),
                &cfg.operator_name(),
            )?;
            println!("Updated expense entry {}.", rec.id);
            Ok(())
        }
        ExpenseCmd::Rm { id, yes } => {
            let Some(rec) = db.get_expense(id)? else {
                return Err(anyhow!("No expense entry {id}"));
            };
            if !confirm_delete(&format!("expense entry {id} ({})", rec.remarks), yes)? {
                println!("Aborted.");
                return Ok(());
            }

            let changed = db.delete_expense(id)?;
            if changed == 0 {
                return Err(anyhow!("No expense entry {id}"));
            }
            db.log_action(
                ModuleKind::Expenses,
                "DELETE",
                &json!({ "entry_date": rec.entry_date.to_string(), "expenses": rec.expenses.to_string() }),
                Some(id),
                &cfg.operator_name(),
            )?;
            println!("Deleted expense entry {id}.");
            Ok(())
        }
        ExpenseCmd::List { list, month } => {
            let mut rows = match month {
                Some(raw) => db.list_expenses_for_month(&parse_month(&raw)?)?,
                None => db.list_expenses()?,
            };
            if let Some(q) = &list.search {
                rows.retain(|r| matches_search(&[&r.remarks, &r.entered_by], q));
            }
            if let Some(limit) = list.limit {
                rows.truncate(limit);
            }
            if rows.is_empty() {
                println!("(no expense entries)");
                return Ok(());
            }

            let headers = ["id", "date", "amount", "fixed", "carryover", "remarks"];
            let body: Vec<Vec<String>> = rows.iter().map(expense_row).collect();
            print_rows(&headers, &body, list.format);
            Ok(())
        }
        ExpenseCmd::Stats { month } => {
            let month = match month {
                Some(raw) => parse_month(&raw)?,
                None => current_month_yyyy_mm(now_utc()),
            };
            let entries = db.list_expenses_for_month(&month)?;
            let summary = engine::monthly_expense_balance(&entries);
            let sym = &cfg.currency_symbol;

            println!("month\t{month}");
            println!("entries\t{}", entries.len());
            println!("fixed_total\t{sym}{}", summary.sum_fixed);
            println!("carryover\t{sym}{}", summary.carryover);
            println!("spent\t{sym}{}", summary.spent);
            println!("remaining\t{sym}{}", summary.remaining);

            let all = db.list_expenses()?;
            let all_spent: Decimal = all.iter().map(|e| e.expenses).sum();
            let days: BTreeSet<NaiveDate> = all.iter().map(|e| e.entry_date).collect();
            let daily_average = if days.is_empty() {
                Decimal::ZERO
            } else {
                (all_spent / Decimal::from(days.len() as u64)).round_dp(2)
            };
            println!("all_time_spent\t{sym}{all_spent}");
            println!("daily_average\t{sym}{daily_average}");
            Ok(())
        }
        ExpenseCmd::Export { out } => handle_module_export(db, ModuleKind::Expenses, out),
    }
}

fn handle_book(db: &Db, cfg: &AppConfig, cmd: BookCmd) -> Result<()> {
    match cmd {
        BookCmd::Add {
            school,
            coordinator,
            phone,
            address,
            kit_type,
            ordered,
            received,
            delivery_date,
            grades,
            notes,
        } => {
            let school = require_text("school name", &school)?;
            let mut counts = GradeCounts::default();
            for raw in &grades {
                let (name, value) = parse_grade_spec(raw)?;
                counts.set(&name, value)?;
            }
            let total = engine::grade_total(&counts);
            let delivery_date = delivery_date.map(|raw| parse_day(&raw)).transpose()?;

            let rec = BookRecord {
                id: Uuid::new_v4(),
                school_name: school,
                coordinator_name: clean_opt(coordinator),
                coordinator_number: clean_opt(phone),
                address: clean_opt(address),
                kit_type,
                ordered_from_printer: ordered,
                received,
                total_used_till_now: total,
                delivery_date,
                grades: counts,
                additional: clean_opt(notes),
                entered_by: cfg.operator_name(),
                created_at: now_utc(),
            };
            db.insert_book(&rec)?;
            db.log_action(
                ModuleKind::Books,
                "INSERT",
                &json!({ "school_name": rec.school_name, "total_used_till_now": rec.total_used_till_now }),
                Some(rec.id),
                &cfg.operator_name(),
            )?;
            println!(
                "Recorded book distribution {} for '{}' (total used {}).",
                rec.id, rec.school_name, rec.total_used_till_now
            );
            Ok(())
        }
        BookCmd::Edit {
            id,
            school,
            coordinator,
            phone,
            address,
            kit_type,
            ordered,
            received,
            delivery_date,
            grades,
            notes,
        } => {
            let Some(mut rec) = db.get_book(id)? else {
                return Err(anyhow!("No book distribution {id}"));
            };

            let mut updated: Vec<&str> = Vec::new();
            if let Some(school) = school {
                rec.school_name = require_text("school name", &school)?;
                updated.push("school_name");
            }
            if let Some(coordinator) = coordinator {
                rec.coordinator_name = clean_opt(Some(coordinator));
                updated.push("coordinator_name");
            }
            if let Some(phone) = phone {
                rec.coordinator_number = clean_opt(Some(phone));
                updated.push("coordinator_number");
            }
            if let Some(address) = address {
                rec.address = clean_opt(Some(address));
                updated.push("address");
            }
            if let Some(kit_type) = kit_type {
                rec.kit_type = kit_type;
                updated.push("kit_type");
            }
            if let Some(v) = ordered {
                rec.ordered_from_printer = v;
                updated.push("ordered_from_printer");
            }
            if let Some(v) = received {
                rec.received = v;
                updated.push("received");
            }
            if let Some(raw) = delivery_date {
                rec.delivery_date = Some(parse_day(&raw)?);
                updated.push("delivery_date");
            }
            if !grades.is_empty() {
                for raw in &grades {
                    let (name, value) = parse_grade_spec(raw)?;
                    rec.grades.set(&name, value)?;
                }
                rec.total_used_till_now = engine::grade_total(&rec.grades);
                updated.push("grades");
                updated.push("total_used_till_now");
            }
            if let Some(notes) = notes {
                rec.additional = clean_opt(Some(notes));
                updated.push("additional");
            }
            if updated.is_empty() {
                return Err(anyhow!("Nothing to update. Pass at least one field flag."));
            }

            let changed = db.update_book(&rec)?;
            if changed == 0 {
                return Err(anyhow!("No book distribution {id}"));
            }
            db.log_action(
                ModuleKind::Books,
                "UPDATE",
                &json!({ "updated_fields": updated, "total_used_till_now": rec.total_used_till_now }),
                Some(rec.id),
                &cfg.operator_name(),
            )?;
            println!(
                "Updated book distribution {} (total used {}).",
                rec.id, rec.total_used_till_now
            );
            Ok(())
        }
        BookCmd::Rm { id, yes } => {
            let Some(rec) = db.get_book(id)? else {
                return Err(anyhow!("No book distribution {id}"));
            };
            if !confirm_delete(
                &format!("book distribution {id} for '{}'", rec.school_name),
                yes,
            )? {
                println!("Aborted.");
                return Ok(());
            }

            let changed = db.delete_book(id)?;
            if changed == 0 {
                return Err(anyhow!("No book distribution {id}"));
            }
            db.log_action(
                ModuleKind::Books,
                "DELETE",
                &json!({ "school_name": rec.school_name }),
                Some(id),
                &cfg.operator_name(),
            )?;
            println!("Deleted book distribution {id}.");
            Ok(())
        }
        BookCmd::List { list, school } => {
            let mut rows = db.list_books()?;
            if let Some(school) = school {
                rows.retain(|r| r.school_name == school);
            }
            if let Some(q) = &list.search {
                rows.retain(|r| {
                    matches_search(
                        &[
                            &r.school_name,
                            r.coordinator_name.as_deref().unwrap_or(""),
                            r.address.as_deref().unwrap_or(""),
                            r.additional.as_deref().unwrap_or(""),
                        ],
                        q,
                    )
                });
            }
            if let Some(limit) = list.limit {
                rows.truncate(limit);
            }
            if rows.is_empty() {
                println!("(no book distributions)");
                return Ok(());
            }

            let headers = [
                "id",
                "school",
                "kit-type",
                "ordered",
                "received",
                "total-used",
                "delivery",
            ];
            let body: Vec<Vec<String>> = rows.iter().map(book_row).collect();
            print_rows(&headers, &body, list.format);
            Ok(())
        }
        BookCmd::Stats => {
            let rows = db.list_books()?;
            let total_books: i64 = rows.iter().map(|r| engine::grade_total(&r.grades)).sum();
            let schools: BTreeSet<&str> = rows.iter().map(|r| r.school_name.as_str()).collect();
            let month = current_month_yyyy_mm(now_utc());
            let this_month: i64 = rows
                .iter()
                .filter(|r| current_month_yyyy_mm(r.created_at) == month)
                .map(|r| engine::grade_total(&r.grades))
                .sum();

            println!("records\t{}", rows.len());
            println!("total_books\t{total_books}");
            println!("schools\t{}", schools.len());
            println!("this_month\t{this_month}");
            Ok(())
        }
        BookCmd::Export { out } => handle_module_export(db, ModuleKind::Books, out),
    }
}

fn handle_courier(db: &Db, cfg: &AppConfig, cmd: CourierCmd) -> Result<()> {
    match cmd {
        CourierCmd::Add {
            name,
            tracking,
            details,
            phone,
            address,
            date,
            delivery_date,
            status,
        } => {
            let name = require_text("name", &name)?;
            let tracking = require_text("tracking number", &tracking)?;
            let details = require_text("courier details", &details)?;
            let phone = require_text("phone number", &phone)?;
            let address = require_text("address", &address)?;
            let entry_date = parse_day_or_today(date.as_deref())?;
            let delivery_date = delivery_date.map(|raw| parse_day(&raw)).transpose()?;

            let rec = CourierRecord {
                id: Uuid::new_v4(),
                entry_date,
                name,
                address,
                phone_number: phone,
                courier_details: details,
                tracking_number: tracking,
                status,
                delivery_date,
                entered_by: cfg.operator_name(),
                created_at: now_utc(),
            };
            db.insert_courier(&rec)?;
            db.log_action(
                ModuleKind::Courier,
                "INSERT",
                &json!({ "name": rec.name, "tracking_number": rec.tracking_number, "status": rec.status.as_str() }),
                Some(rec.id),
                &cfg.operator_name(),
            )?;
            println!(
                "Recorded courier {} for '{}' ({}).",
                rec.id,
                rec.name,
                rec.status.as_str()
            );
            Ok(())
        }
        CourierCmd::Edit {
            id,
            name,
            tracking,
            details,
            phone,
            address,
            date,
            delivery_date,
            status,
        } => {
            let Some(mut rec) = db.get_courier(id)? else {
                return Err(anyhow!("No courier {id}"));
            };

            let mut updated: Vec<&str> = Vec::new();
            if let Some(name) = name {
                rec.name = require_text("name", &name)?;
                updated.push("name");
            }
            if let Some(tracking) = tracking {
                rec.tracking_number = require_text("tracking number", &tracking)?;
                updated.push("tracking_number");
            }
            if let Some(details) = details {
                rec.courier_details = require_text("courier details", &details)?;
                updated.push("courier_details");
            }
            if let Some(phone) = phone {
                rec.phone_number = require_text("phone number", &phone)?;
                updated.push("phone_number");
            }
            if let Some(address) = address {
                rec.address = require_text("address", &address)?;
                updated.push("address");
            }
            if let Some(raw) = date {
                rec.entry_date = parse_day(&raw)?;
                updated.push("entry_date");
            }
            if let Some(raw) = delivery_date {
                rec.delivery_date = Some(parse_day(&raw)?);
                updated.push("delivery_date");
            }
            if let Some(status) = status {
                rec.status = status;
                updated.push("status");
            }
            if updated.is_empty() {
                return Err(anyhow!("Nothing to update. Pass at least one field flag."));
            }

            let changed = db.update_courier(&rec)?;
            if changed == 0 {
                return Err(anyhow!("No courier {id}"));
            }
            db.log_action(
                ModuleKind::Courier,
                "UPDATE",
                &json!({ "updated_fields": updated, "status": rec.status.as_str() }),
                Some(rec.id),
                &cfg.operator_name(),
            )?;
            println!("Updated courier {} ({}).", rec.id, rec.status.as_str());
            Ok(())
        }
        CourierCmd::Rm { id, yes } => {
            let Some(rec) = db.get_courier(id)? else {
                return Err(anyhow!("No courier {id}"));
            };
            if !confirm_delete(&format!("courier {id} for '{}'", rec.name), yes)? {
                println!("Aborted.");
                return Ok(());
            }

            let changed = db.delete_courier(id)?;
            if changed == 0 {
                return Err(anyhow!("No courier {id}"));
            }
            db.log_action(
                ModuleKind::Courier,
                "DELETE",
                &json!({ "name": rec.name, "tracking_number": rec.tracking_number }),
                Some(id),
                &cfg.operator_name(),
            )?;
            println!("Deleted courier {id}.");
            Ok(())
        }
        CourierCmd::List { list, status } => {
            let mut rows = db.list_couriers()?;
            if let Some(status) = status {
                rows.retain(|r| r.status == status);
            }
            if let Some(q) = &list.search {
                rows.retain(|r| {
                    matches_search(&[&r.name, &r.tracking_number, &r.courier_details], q)
                });
            }
            if let Some(limit) = list.limit {
                rows.truncate(limit);
            }
            if rows.is_empty() {
                println!("(no couriers)");
                return Ok(());
            }

            let headers = [
                "id", "date", "name", "tracking", "details", "status", "delivery",
            ];
            let body: Vec<Vec<String>> = rows.iter().map(courier_row).collect();
            print_rows(&headers, &body, list.format);
            Ok(())
        }
        CourierCmd::Stats => {
            let rows = db.list_couriers()?;
            let count_for =
                |status: CourierStatus| rows.iter().filter(|r| r.status == status).count();

            println!("records\t{}", rows.len());
            println!("dispatched\t{}", count_for(CourierStatus::Dispatched));
            println!("in_transit\t{}", count_for(CourierStatus::InTransit));
            println!("delivered\t{}", count_for(CourierStatus::Delivered));
            println!("delayed\t{}", count_for(CourierStatus::Delayed));
            println!("failed\t{}", count_for(CourierStatus::Failed));
            Ok(())
        }
        CourierCmd::Export { out } => handle_module_export(db, ModuleKind::Courier, out),
    }
}

fn handle_log(db: &Db, cmd: LogCmd) -> Result<()> {
    match cmd {
        LogCmd::List { module, last } => {
            let limit = last.unwrap_or(20) as usize;
            let entries = db.list_activity(module, limit)?;
            if entries.is_empty() {
                println!("(no activity)");
                return Ok(());
            }
            for e in entries {
                let record = e
                    .record_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    e.created_at.to_rfc3339(),
                    e.module,
                    e.action,
                    e.operator,
                    record,
                    e.detail
                );
            }
            Ok(())
        }
    }
}

fn handle_module_export(db: &Db, module: ModuleKind, out: Option<PathBuf>) -> Result<()> {
    let path = out.unwrap_or_else(|| export::default_export_path(module));
    let count = export::export_module(db, module, &path)?;
    println!("Exported {count} rows to {}", path.display());
    Ok(())
}

fn signed_quantity(received: Option<i64>, sent: Option<i64>) -> Result<i64> {
    match (received, sent) {
        (Some(count), None) => {
            if count < 0 {
                return Err(ValidationError::NegativeValue { field: "received" }.into());
            }
            Ok(count)
        }
        (None, Some(count)) => {
            if count < 0 {
                return Err(ValidationError::NegativeValue { field: "sent" }.into());
            }
            Ok(-count)
        }
        (None, None) => Err(anyhow!("Provide --received <count> or --sent <count>")),
        (Some(_), Some(_)) => Err(anyhow!("--received and --sent are mutually exclusive")),
    }
}

fn kit_row(r: &KitRecord) -> Vec<String> {
    vec![
        r.id.to_string(),
        r.item_name.clone(),
        r.entry_date.to_string(),
        r.opening_balance.to_string(),
        r.addins.to_string(),
        r.takeouts.to_string(),
        r.closing_balance.to_string(),
        r.remarks.clone().unwrap_or_default(),
    ]
}

fn game_row(r: &GameRecord) -> Vec<String> {
    vec![
        r.id.to_string(),
        r.game_details.clone(),
        r.previous_stock.to_string(),
        r.adding.to_string(),
        r.sent.to_string(),
        r.in_stock.to_string(),
        r.sent_by.clone().unwrap_or_default(),
    ]
}

fn blazer_row(r: &BlazerRecord) -> Vec<String> {
    let added = if r.quantity > 0 { r.quantity } else { 0 };
    let sent = if r.quantity < 0 { -r.quantity } else { 0 };
    vec![
        r.id.to_string(),
        r.gender.as_str().to_string(),
        r.size.clone(),
        added.to_string(),
        sent.to_string(),
        r.in_office_stock.to_string(),
        r.remarks.clone().unwrap_or_default(),
    ]
}

fn expense_row(r: &ExpenseRecord) -> Vec<String> {
    vec![
        r.id.to_string(),
        r.entry_date.to_string(),
        r.expenses.to_string(),
        r.fixed_amount.map(|d| d.to_string()).unwrap_or_default(),
        r.previous_month_overspend
            .map(|d| d.to_string())
            .unwrap_or_default(),
        r.remarks.clone(),
    ]
}

fn book_row(r: &BookRecord) -> Vec<String> {
    vec![
        r.id.to_string(),
        r.school_name.clone(),
        r.kit_type.as_str().to_string(),
        r.ordered_from_printer.to_string(),
        r.received.to_string(),
        r.total_used_till_now.to_string(),
        r.delivery_date.map(|d| d.to_string()).unwrap_or_default(),
    ]
}

fn courier_row(r: &CourierRecord) -> Vec<String> {
    vec![
        r.id.to_string(),
        r.entry_date.to_string(),
        r.name.clone(),
        r.tracking_number.clone(),
        r.courier_details.clone(),
        r.status.as_str().to_string(),
        r.delivery_date.map(|d| d.to_string()).unwrap_or_default(),
    ]
}

fn print_rows(headers: &[&str], rows: &[Vec<String>], format: ListFormat) {
    match format {
        ListFormat::Table => print_table(headers, rows),
        ListFormat::Tsv => {
            println!("{}", headers.join("\t"));
            for row in rows {
                println!("{}", row.join("\t"));
            }
        }
    }
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().take(cols).enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let render = |cells: &[String]| {
        let mut line = String::from("|");
        for (i, w) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            line.push_str(&format!(" {cell:w$} |", w = *w));
        }
        line
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    println!("{}", render(&header_cells));

    let mut sep = String::from("|");
    for w in &widths {
        sep.push_str(&"-".repeat(w + 2));
        sep.push('|');
    }
    println!("{sep}");

    for row in rows {
        println!("{}", render(row));
    }
}

fn matches_search(haystacks: &[&str], needle: &str) -> bool {
    let needle = needle.to_lowercase();
    haystacks
        .iter()
        .any(|h| h.to_lowercase().contains(&needle))
}

fn confirm_delete(what: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    prompt_yes_no(&format!("Delete {what}? [y/N] "))
}

fn prompt_yes_no(prompt: &str) -> Result<bool> {
    eprint!("{prompt}");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let s = line.trim();
    if s.is_empty() {
        return Ok(false);
    }
    Ok(matches!(s.to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn parse_decimal(raw: String, field: &'static str) -> Result<Decimal> {
    raw.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal for {field}: {raw}"))
}

fn parse_day(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {raw}. Expected YYYY-MM-DD"))
}

fn parse_day_or_today(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        None => Ok(now_utc().date_naive()),
        Some(s) => parse_day(s),
    }
}

fn parse_month(raw: &str) -> Result<String> {
    let (y, m) = raw
        .split_once('-')
        .ok_or_else(|| anyhow!("Invalid month: {raw}. Expected YYYY-MM"))?;
    let year: i32 = y
        .parse()
        .with_context(|| format!("Invalid month: {raw}. Expected YYYY-MM"))?;
    let month: u32 = m
        .parse()
        .with_context(|| format!("Invalid month: {raw}. Expected YYYY-MM"))?;
    if !(1..=12).contains(&month) {
        return Err(anyhow!("Invalid month: {raw}. Expected YYYY-MM"));
    }
    Ok(format!("{year:04}-{month:02}"))
}

fn current_month_yyyy_mm(now: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", now.year(), now.month())
}
