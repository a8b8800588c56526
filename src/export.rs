//! CSV export, one file per module, newest rows first.

use crate::db::{Db, ensure_parent_dir};
use crate::domain::ModuleKind;
use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::File;
use std::path::{Path, PathBuf};

pub fn default_export_path(module: ModuleKind) -> PathBuf {
    PathBuf::from(format!(
        "{}-{}.csv",
        module.slug(),
        Utc::now().format("%Y-%m-%d")
    ))
}

/// Writes the module's rows to `out` and returns the row count.
pub fn export_module(db: &Db, module: ModuleKind, out: &Path) -> Result<usize> {
    ensure_parent_dir(out)?;
    let mut wtr = csv::Writer::from_path(out)
        .with_context(|| format!("Failed to create {}", out.display()))?;

    let count = match module {
        ModuleKind::Kits => write_kits(db, &mut wtr)?,
        ModuleKind::Games => write_games(db, &mut wtr)?,
        ModuleKind::Blazer => write_blazers(db, &mut wtr)?,
        ModuleKind::Expenses => write_expenses(db, &mut wtr)?,
        ModuleKind::Books => write_books(db, &mut wtr)?,
        ModuleKind::Courier => write_couriers(db, &mut wtr)?,
    };

    wtr.flush()
        .with_context(|| format!("Failed to write {}", out.display()))?;
    Ok(count)
}

fn write_kits(db: &Db, wtr: &mut csv::Writer<File>) -> Result<usize> {
    wtr.write_record([
        "id",
        "item_name",
        "entry_date",
        "opening_balance",
        "addins",
        "takeouts",
        "closing_balance",
        "remarks",
        "entered_by",
        "created_at",
    ])?;

    let rows = db.list_kits()?;
    for r in &rows {
        wtr.write_record([
            r.id.to_string(),
            r.item_name.clone(),
            r.entry_date.to_string(),
            r.opening_balance.to_string(),
            r.addins.to_string(),
            r.takeouts.to_string(),
            r.closing_balance.to_string(),
            r.remarks.clone().unwrap_or_default(),
            r.entered_by.clone(),
            r.created_at.to_rfc3339(),
        ])?;
    }
    Ok(rows.len())
}

fn write_games(db: &Db, wtr: &mut csv::Writer<File>) -> Result<usize> {
    wtr.write_record([
        "id",
        "game_details",
        "previous_stock",
        "adding",
        "sent",
        "in_stock",
        "sent_by",
        "entered_by",
        "created_at",
    ])?;

    let rows = db.list_games()?;
    for r in &rows {
        wtr.write_record([
            r.id.to_string(),
            r.game_details.clone(),
            r.previous_stock.to_string(),
            r.adding.to_string(),
            r.sent.to_string(),
            r.in_stock.to_string(),
            r.sent_by.clone().unwrap_or_default(),
            r.entered_by.clone(),
            r.created_at.to_rfc3339(),
        ])?;
    }
    Ok(rows.len())
}

fn write_blazers(db: &Db, wtr: &mut csv::Writer<File>) -> Result<usize> {
    wtr.write_record([
        "id",
        "gender",
        "size",
        "quantity",
        "in_office_stock",
        "remarks",
        "entered_by",
        "created_at",
    ])?;

    let rows = db.list_blazers()?;
    for r in &rows {
        wtr.write_record([
            r.id.to_string(),
            r.gender.as_str().to_string(),
            r.size.clone(),
            r.quantity.to_string(),
            r.in_office_stock.to_string(),
            r.remarks.clone().unwrap_or_default(),
            r.entered_by.clone(),
            r.created_at.to_rfc3339(),
        ])?;
    }
    Ok(rows.len())
}

fn write_expenses(db: &Db, wtr: &mut csv::Writer<File>) -> Result<usize> {
    wtr.write_record([
        "id",
        "entry_date",
        "expenses",
        "fixed_amount",
        "previous_month_overspend",
        "remarks",
        "entered_by",
        "created_at",
    ])?;

    let rows = db.list_expenses()?;
    for r in &rows {
        wtr.write_record([
            r.id.to_string(),
            r.entry_date.to_string(),
            r.expenses.to_string(),
            r.fixed_amount.map(|d| d.to_string()).unwrap_or_default(),
            r.previous_month_overspend
                .map(|d| d.to_string())
                .unwrap_or_default(),
            r.remarks.clone(),
            r.entered_by.clone(),
            r.created_at.to_rfc3339(),
        ])?;
    }
    Ok(rows.len())
}

fn write_books(db: &Db, wtr: &mut csv::Writer<File>) -> Result<usize> {
    wtr.write_record([
        "id",
        "school_name",
        "coordinator_name",
        "coordinator_number",
        "address",
        "kit_type",
        "ordered_from_printer",
        "received",
        "total_used_till_now",
        "delivery_date",
        "grade1",
        "grade2",
        "grade3",
        "grade4",
        "grade5",
        "grade6",
        "grade7",
        "grade7iot",
        "grade8",
        "grade8iot",
        "grade9",
        "grade9iot",
        "grade10",
        "grade10iot",
        "additional",
        "entered_by",
        "created_at",
    ])?;

    let rows = db.list_books()?;
    for r in &rows {
        let g = r.grades;
        wtr.write_record([
            r.id.to_string(),
            r.school_name.clone(),
            r.coordinator_name.clone().unwrap_or_default(),
            r.coordinator_number.clone().unwrap_or_default(),
            r.address.clone().unwrap_or_default(),
            r.kit_type.as_str().to_string(),
            r.ordered_from_printer.to_string(),
            r.received.to_string(),
            r.total_used_till_now.to_string(),
            r.delivery_date.map(|d| d.to_string()).unwrap_or_default(),
            g.grade1.to_string(),
            g.grade2.to_string(),
            g.grade3.to_string(),
            g.grade4.to_string(),
            g.grade5.to_string(),
            g.grade6.to_string(),
            g.grade7.to_string(),
            g.grade7iot.to_string(),
            g.grade8.to_string(),
            g.grade8iot.to_string(),
            g.grade9.to_string(),
            g.grade9iot.to_string(),
            g.grade10.to_string(),
            g.grade10iot.to_string(),
            r.additional.clone().unwrap_or_default(),
            r.entered_by.clone(),
            r.created_at.to_rfc3339(),
        ])?;
    }
    Ok(rows.len())
}

fn write_couriers(db: &Db, wtr: &mut csv::Writer<File>) -> Result<usize> {
    wtr.write_record([
        "id",
        "entry_date",
        "name",
        "address",
        "phone_number",
        "courier_details",
        "tracking_number",
        "status",
        "delivery_date",
        "entered_by",
        "created_at",
    ])?;

    let rows = db.list_couriers()?;
    for r in &rows {
        wtr.write_record([
            r.id.to_string(),
            r.entry_date.to_string(),
            r.name.clone(),
            r.address.clone(),
            r.phone_number.clone(),
            r.courier_details.clone(),
            r.tracking_number.clone(),
            r.status.as_str().to_string(),
            r.delivery_date.map(|d| d.to_string()).unwrap_or_default(),
            r.entered_by.clone(),
            r.created_at.to_rfc3339(),
        ])?;
    }
    Ok(rows.len())
}
