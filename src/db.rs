use crate::config::AppPaths;
use crate::domain::{
    ActivityEntry, BlazerRecord, BookRecord, CourierRecord, CourierStatus, ExpenseRecord,
    GameRecord, Gender, GradeCounts, KitRecord, KitType, ModuleKind,
};
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(paths: &AppPaths) -> Result<(Self, PathBuf)> {
        fs::create_dir_all(&paths.data_dir)
            .with_context(|| format!("Failed to create data dir {}", paths.data_dir.display()))?;

        let db_path = paths.data_dir.join("godown.sqlite3");
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open DB {}", db_path.display()))?;

        let db = Self { conn };
        db.migrate()?;
        Ok((db, db_path))
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS kits_inventory (
                id TEXT PRIMARY KEY,
                item_name TEXT NOT NULL,
                entry_date TEXT NOT NULL,
                opening_balance INTEGER NOT NULL,
                addins INTEGER NOT NULL,
                takeouts INTEGER NOT NULL,
                closing_balance INTEGER NOT NULL,
                remarks TEXT,
                entered_by TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_kits_item ON kits_inventory(item_name, created_at);

            CREATE TABLE IF NOT EXISTS games_inventory (
                id TEXT PRIMARY KEY,
                game_details TEXT NOT NULL,
                previous_stock INTEGER NOT NULL,
                adding INTEGER NOT NULL,
                sent INTEGER NOT NULL,
                in_stock INTEGER NOT NULL,
                sent_by TEXT,
                entered_by TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_games_name ON games_inventory(game_details, created_at);

            CREATE TABLE IF NOT EXISTS blazer_inventory (
                id TEXT PRIMARY KEY,
                gender TEXT NOT NULL,
                size TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                in_office_stock INTEGER NOT NULL,
                remarks TEXT,
                entered_by TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_blazer_bucket ON blazer_inventory(gender, size, created_at);

            CREATE TABLE IF NOT EXISTS daily_expenses (
                id TEXT PRIMARY KEY,
                entry_date TEXT NOT NULL,
                expenses TEXT NOT NULL,
                fixed_amount TEXT,
                previous_month_overspend TEXT,
                remarks TEXT NOT NULL,
                entered_by TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_expenses_date ON daily_expenses(entry_date);

            CREATE TABLE IF NOT EXISTS books_distribution (
                id TEXT PRIMARY KEY,
                school_name TEXT NOT NULL,
                coordinator_name TEXT,
                coordinator_number TEXT,
                address TEXT,
                kit_type TEXT NOT NULL,
                ordered_from_printer INTEGER NOT NULL,
                received INTEGER NOT NULL,
                total_used_till_now INTEGER NOT NULL,
                delivery_date TEXT,
                grade1 INTEGER NOT NULL,
                grade2 INTEGER NOT NULL,
                grade3 INTEGER NOT NULL,
                grade4 INTEGER NOT NULL,
                grade5 INTEGER NOT NULL,
                grade6 INTEGER NOT NULL,
                grade7 INTEGER NOT NULL,
                grade7iot INTEGER NOT NULL,
                grade8 INTEGER NOT NULL,
                grade8iot INTEGER NOT NULL,
                grade9 INTEGER NOT NULL,
                grade9iot INTEGER NOT NULL,
                grade10 INTEGER NOT NULL,
                grade10iot INTEGER NOT NULL,
                additional TEXT,
                entered_by TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_books_school ON books_distribution(school_name);

            CREATE TABLE IF NOT EXISTS courier_tracking (
                id TEXT PRIMARY KEY,
                entry_date TEXT NOT NULL,
                name TEXT NOT NULL,
                address TEXT NOT NULL,
                phone_number TEXT NOT NULL,
                courier_details TEXT NOT NULL,
                tracking_number TEXT NOT NULL,
                status TEXT NOT NULL,
                delivery_date TEXT,
                entered_by TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_courier_status ON courier_tracking(status);

            CREATE TABLE IF NOT EXISTS activity_log (
                id TEXT PRIMARY KEY,
                module TEXT NOT NULL,
                action TEXT NOT NULL,
                detail TEXT NOT NULL,
                record_id TEXT,
                operator TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_activity_module ON activity_log(module, created_at);
            "#,
        )?;
        Ok(())
    }

    // ---- kits_inventory ----

    pub fn insert_kit(&self, rec: &KitRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO kits_inventory
                (id, item_name, entry_date, opening_balance, addins, takeouts,
                 closing_balance, remarks, entered_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                rec.id.to_string(),
                rec.item_name,
                rec.entry_date.to_string(),
                rec.opening_balance,
                rec.addins,
                rec.takeouts,
                rec.closing_balance,
                rec.remarks,
                rec.entered_by,
                rec.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn update_kit(&self, rec: &KitRecord) -> Result<usize> {
        let changed = self.conn.execute(
            r#"
            UPDATE kits_inventory
            SET item_name = ?2, entry_date = ?3, opening_balance = ?4, addins = ?5,
                takeouts = ?6, closing_balance = ?7, remarks = ?8
            WHERE id = ?1
            "#,
            params![
                rec.id.to_string(),
                rec.item_name,
                rec.entry_date.to_string(),
                rec.opening_balance,
                rec.addins,
                rec.takeouts,
                rec.closing_balance,
                rec.remarks,
            ],
        )?;
        Ok(changed)
    }

    pub fn delete_kit(&self, id: Uuid) -> Result<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM kits_inventory WHERE id = ?1", params![id.to_string()])?;
        Ok(changed)
    }

    pub fn get_kit(&self, id: Uuid) -> Result<Option<KitRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {KIT_COLUMNS} FROM kits_inventory WHERE id = ?1"
        ))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        Ok(Some(parse_kit(kit_columns(row)?)?))
    }

    pub fn list_kits(&self) -> Result<Vec<KitRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {KIT_COLUMNS} FROM kits_inventory ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], kit_columns)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(parse_kit(row?)?);
        }
        Ok(out)
    }

    /// Latest row for an item, by insertion recency.
    pub fn latest_kit_for_item(&self, item_name: &str) -> Result<Option<KitRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {KIT_COLUMNS} FROM kits_inventory
            WHERE item_name = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            "#
        ))?;
        let mut rows = stmt.query(params![item_name])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        Ok(Some(parse_kit(kit_columns(row)?)?))
    }

    pub fn distinct_kit_items(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT item_name FROM kits_inventory ORDER BY item_name ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    // ---- games_inventory ----

    pub fn insert_game(&self, rec: &GameRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO games_inventory
                (id, game_details, previous_stock, adding, sent, in_stock,
                 sent_by, entered_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                rec.id.to_string(),
                rec.game_details,
                rec.previous_stock,
                rec.adding,
                rec.sent,
                rec.in_stock,
                rec.sent_by,
                rec.entered_by,
                rec.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn update_game(&self, rec: &GameRecord) -> Result<usize> {
        let changed = self.conn.execute(
            r#"
            UPDATE games_inventory
            SET game_details = ?2, previous_stock = ?3, adding = ?4, sent = ?5,
                in_stock = ?6, sent_by = ?7
            WHERE id = ?1
            "#,
            params![
                rec.id.to_string(),
                rec.game_details,
                rec.previous_stock,
                rec.adding,
                rec.sent,
                rec.in_stock,
                rec.sent_by,
            ],
        )?;
        Ok(changed)
    }

    pub fn delete_game(&self, id: Uuid) -> Result<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM games_inventory WHERE id = ?1", params![id.to_string()])?;
        Ok(changed)
    }

    pub fn get_game(&self, id: Uuid) -> Result<Option<GameRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {GAME_COLUMNS} FROM games_inventory WHERE id = ?1"
        ))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        Ok(Some(parse_game(game_columns(row)?)?))
    }

    pub fn list_games(&self) -> Result<Vec<GameRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {GAME_COLUMNS} FROM games_inventory ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], game_columns)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(parse_game(row?)?);
        }
        Ok(out)
    }

    pub fn latest_game_for_name(&self, game_details: &str) -> Result<Option<GameRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {GAME_COLUMNS} FROM games_inventory
            WHERE game_details = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            "#
        ))?;
        let mut rows = stmt.query(params![game_details])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        Ok(Some(parse_game(game_columns(row)?)?))
    }

    pub fn distinct_game_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT game_details FROM games_inventory ORDER BY game_details ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    // ---- blazer_inventory ----

    pub fn insert_blazer(&self, rec: &BlazerRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO blazer_inventory
                (id, gender, size, quantity, in_office_stock, remarks, entered_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                rec.id.to_string(),
                rec.gender.as_str(),
                rec.size,
                rec.quantity,
                rec.in_office_stock,
                rec.remarks,
                rec.entered_by,
                rec.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn update_blazer(&self, rec: &BlazerRecord) -> Result<usize> {
        let changed = self.conn.execute(
            r#"
            UPDATE blazer_inventory
            SET gender = ?2, size = ?3, quantity = ?4, in_office_stock = ?5, remarks = ?6
            WHERE id = ?1
            "#,
            params![
                rec.id.to_string(),
                rec.gender.as_str(),
                rec.size,
                rec.quantity,
                rec.in_office_stock,
                rec.remarks,
            ],
        )?;
        Ok(changed)
    }

    pub fn delete_blazer(&self, id: Uuid) -> Result<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM blazer_inventory WHERE id = ?1", params![id.to_string()])?;
        Ok(changed)
    }

    pub fn get_blazer(&self, id: Uuid) -> Result<Option<BlazerRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BLAZER_COLUMNS} FROM blazer_inventory WHERE id = ?1"
        ))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        Ok(Some(parse_blazer(blazer_columns(row)?)?))
    }

    pub fn list_blazers(&self) -> Result<Vec<BlazerRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BLAZER_COLUMNS} FROM blazer_inventory ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], blazer_columns)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(parse_blazer(row?)?);
        }
        Ok(out)
    }

    pub fn latest_blazer_for_bucket(
        &self,
        gender: Gender,
        size: &str,
    ) -> Result<Option<BlazerRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {BLAZER_COLUMNS} FROM blazer_inventory
            WHERE gender = ?1 AND size = ?2
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            "#
        ))?;
        let mut rows = stmt.query(params![gender.as_str(), size])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        Ok(Some(parse_blazer(blazer_columns(row)?)?))
    }

    /// Next-older row in the same gender+size bucket, relative to the given
    /// row. Feeds the quantity re-edit rule.
    pub fn blazer_before(
        &self,
        gender: Gender,
        size: &str,
        created_at: DateTime<Utc>,
        id: Uuid,
    ) -> Result<Option<BlazerRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {BLAZER_COLUMNS} FROM blazer_inventory
            WHERE gender = ?1 AND size = ?2
              AND (created_at < ?3
                   OR (created_at = ?3
                       AND rowid < (SELECT rowid FROM blazer_inventory WHERE id = ?4)))
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            "#
        ))?;
        let mut rows = stmt.query(params![
            gender.as_str(),
            size,
            created_at.to_rfc3339(),
            id.to_string()
        ])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        Ok(Some(parse_blazer(blazer_columns(row)?)?))
    }

    // ---- daily_expenses ----

    pub fn insert_expense(&self, rec: &ExpenseRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO daily_expenses
                (id, entry_date, expenses, fixed_amount, previous_month_overspend,
                 remarks, entered_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                rec.id.to_string(),
                rec.entry_date.to_string(),
                rec.expenses.to_string(),
                rec.fixed_amount.map(|d| d.to_string()),
                rec.previous_month_overspend.map(|d| d.to_string()),
                rec.remarks,
                rec.entered_by,
                rec.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn update_expense(&self, rec: &ExpenseRecord) -> Result<usize> {
        let changed = self.conn.execute(
            r#"
            UPDATE daily_expenses
            SET entry_date = ?2, expenses = ?3, fixed_amount = ?4,
                previous_month_overspend = ?5, remarks = ?6
            WHERE id = ?1
            "#,
            params![
                rec.id.to_string(),
                rec.entry_date.to_string(),
                rec.expenses.to_string(),
                rec.fixed_amount.map(|d| d.to_string()),
                rec.previous_month_overspend.map(|d| d.to_string()),
                rec.remarks,
            ],
        )?;
        Ok(changed)
    }

    pub fn delete_expense(&self, id: Uuid) -> Result<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM daily_expenses WHERE id = ?1", params![id.to_string()])?;
        Ok(changed)
    }

    pub fn get_expense(&self, id: Uuid) -> Result<Option<ExpenseRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM daily_expenses WHERE id = ?1"
        ))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        Ok(Some(parse_expense(expense_columns(row)?)?))
    }

    pub fn list_expenses(&self) -> Result<Vec<ExpenseRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM daily_expenses ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], expense_columns)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(parse_expense(row?)?);
        }
        Ok(out)
    }

    /// Entries whose entry date falls in the given YYYY-MM month, newest first.
    pub fn list_expenses_for_month(&self, month: &str) -> Result<Vec<ExpenseRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {EXPENSE_COLUMNS} FROM daily_expenses
            WHERE substr(entry_date, 1, 7) = ?1
            ORDER BY created_at DESC, rowid DESC
            "#
        ))?;
        let rows = stmt.query_map(params![month], expense_columns)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(parse_expense(row?)?);
        }
        Ok(out)
    }

    // ---- books_distribution ----

    pub fn insert_book(&self, rec: &BookRecord) -> Result<()> {
        let g = rec.grades;
        self.conn.execute(
            r#"
            INSERT INTO books_distribution
                (id, school_name, coordinator_name, coordinator_number, address, kit_type,
                 ordered_from_printer, received, total_used_till_now, delivery_date,
                 grade1, grade2, grade3, grade4, grade5, grade6, grade7, grade7iot,
                 grade8, grade8iot, grade9, grade9iot, grade10, grade10iot,
                 additional, entered_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                    ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18,
                    ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27)
            "#,
            params![
                rec.id.to_string(),
                rec.school_name,
                rec.coordinator_name,
                rec.coordinator_number,
                rec.address,
                rec.kit_type.as_str(),
                rec.ordered_from_printer,
                rec.received,
                rec.total_used_till_now,
                rec.delivery_date.map(|d| d.to_string()),
                g.grade1,
                g.grade2,
                g.grade3,
                g.grade4,
                g.grade5,
                g.grade6,
                g.grade7,
                g.grade7iot,
                g.grade8,
                g.grade8iot,
                g.grade9,
                g.grade9iot,
                g.grade10,
                g.grade10iot,
                rec.additional,
                rec.entered_by,
                rec.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn update_book(&self, rec: &BookRecord) -> Result<usize> {
        let g = rec.grades;
        let changed = self.conn.execute(
            r#"
            UPDATE books_distribution
            SET school_name = ?2, coordinator_name = ?3, coordinator_number = ?4,
                address = ?5, kit_type = ?6, ordered_from_printer = ?7, received = ?8,
                total_used_till_now = ?9, delivery_date = ?10,
                grade1 = ?11, grade2 = ?12, grade3 = ?13, grade4 = ?14, grade5 = ?15,
                grade6 = ?16, grade7 = ?17, grade7iot = ?18, grade8 = ?19, grade8iot = ?20,
                grade9 = ?21, grade9iot = ?22, grade10 = ?23, grade10iot = ?24,
                additional = ?25
            WHERE id = ?1
            "#,
            params![
                rec.id.to_string(),
                rec.school_name,
                rec.coordinator_name,
                rec.coordinator_number,
                rec.address,
                rec.kit_type.as_str(),
                rec.ordered_from_printer,
                rec.received,
                rec.total_used_till_now,
                rec.delivery_date.map(|d| d.to_string()),
                g.grade1,
                g.grade2,
                g.grade3,
                g.grade4,
                g.grade5,
                g.grade6,
                g.grade7,
                g.grade7iot,
                g.grade8,
                g.grade8iot,
                g.grade9,
                g.grade9iot,
                g.grade10,
                g.grade10iot,
                rec.additional,
            ],
        )?;
        Ok(changed)
    }

    pub fn delete_book(&self, id: Uuid) -> Result<usize> {
        let changed = self.conn.execute(
            "DELETE FROM books_distribution WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(changed)
    }

    pub fn get_book(&self, id: Uuid) -> Result<Option<BookRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOK_COLUMNS} FROM books_distribution WHERE id = ?1"
        ))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        Ok(Some(parse_book(book_columns(row)?)?))
    }

    pub fn list_books(&self) -> Result<Vec<BookRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOK_COLUMNS} FROM books_distribution ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], book_columns)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(parse_book(row?)?);
        }
        Ok(out)
    }

    // ---- courier_tracking ----

    pub fn insert_courier(&self, rec: &CourierRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO courier_tracking
                (id, entry_date, name, address, phone_number, courier_details,
                 tracking_number, status, delivery_date, entered_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                rec.id.to_string(),
                rec.entry_date.to_string(),
                rec.name,
                rec.address,
                rec.phone_number,
                rec.courier_details,
                rec.tracking_number,
                rec.status.as_str(),
                rec.delivery_date.map(|d| d.to_string()),
                rec.entered_by,
                rec.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn update_courier(&self, rec: &CourierRecord) -> Result<usize> {
        let changed = self.conn.execute(
            r#"
            UPDATE courier_tracking
            SET entry_date = ?2, name = ?3, address = ?4, phone_number = ?5,
                courier_details = ?6, tracking_number = ?7, status = ?8, delivery_date = ?9
            WHERE id = ?1
            "#,
            params![
                rec.id.to_string(),
                rec.entry_date.to_string(),
                rec.name,
                rec.address,
                rec.phone_number,
                rec.courier_details,
                rec.tracking_number,
                rec.status.as_str(),
                rec.delivery_date.map(|d| d.to_string()),
            ],
        )?;
        Ok(changed)
    }

    pub fn delete_courier(&self, id: Uuid) -> Result<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM courier_tracking WHERE id = ?1", params![id.to_string()])?;
        Ok(changed)
    }

    pub fn get_courier(&self, id: Uuid) -> Result<Option<CourierRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COURIER_COLUMNS} FROM courier_tracking WHERE id = ?1"
        ))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        Ok(Some(parse_courier(courier_columns(row)?)?))
    }

    pub fn list_couriers(&self) -> Result<Vec<CourierRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COURIER_COLUMNS} FROM courier_tracking ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], courier_columns)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(parse_courier(row?)?);
        }
        Ok(out)
    }

    // ---- activity_log ----

    pub fn log_action(
        &self,
        module: ModuleKind,
        action: &str,
        detail: &serde_json::Value,
        record_id: Option<Uuid>,
        operator: &str,
    ) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO activity_log (id, module, action, detail, record_id, operator, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                Uuid::new_v4().to_string(),
                module.table_name(),
                action,
                detail.to_string(),
                record_id.map(|u| u.to_string()),
                operator,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_activity(
        &self,
        module: Option<ModuleKind>,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>> {
        let mut out = Vec::new();
        match module {
            Some(m) => {
                let mut stmt = self.conn.prepare(&format!(
                    r#"
                    SELECT {ACTIVITY_COLUMNS} FROM activity_log
                    WHERE module = ?1
                    ORDER BY created_at DESC, rowid DESC
                    LIMIT ?2
                    "#
                ))?;
                let rows = stmt.query_map(params![m.table_name(), limit as i64], activity_columns)?;
                for row in rows {
                    out.push(parse_activity(row?)?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    r#"
                    SELECT {ACTIVITY_COLUMNS} FROM activity_log
                    ORDER BY created_at DESC, rowid DESC
                    LIMIT ?1
                    "#
                ))?;
                let rows = stmt.query_map(params![limit as i64], activity_columns)?;
                for row in rows {
                    out.push(parse_activity(row?)?);
                }
            }
        }
        Ok(out)
    }
}

const KIT_COLUMNS: &str = "id, item_name, entry_date, opening_balance, addins, takeouts, \
     closing_balance, remarks, entered_by, created_at";

const GAME_COLUMNS: &str =
    "id, game_details, previous_stock, adding, sent, in_stock, sent_by, entered_by, created_at";

const BLAZER_COLUMNS: &str =
    "id, gender, size, quantity, in_office_stock, remarks, entered_by, created_at";

const EXPENSE_COLUMNS: &str = "id, entry_date, expenses, fixed_amount, previous_month_overspend, \
     remarks, entered_by, created_at";

const BOOK_COLUMNS: &str = "id, school_name, coordinator_name, coordinator_number, address, \
     kit_type, ordered_from_printer, received, total_used_till_now, delivery_date, \
     grade1, grade2, grade3, grade4, grade5, grade6, grade7, grade7iot, \
     grade8, grade8iot, grade9, grade9iot, grade10, grade10iot, \
     additional, entered_by, created_at";

const COURIER_COLUMNS: &str = "id, entry_date, name, address, phone_number, courier_details, \
     tracking_number, status, delivery_date, entered_by, created_at";

const ACTIVITY_COLUMNS: &str = "module, action, detail, record_id, operator, created_at";

type KitColumns = (
    String,
    String,
    String,
    i64,
    i64,
    i64,
    i64,
    Option<String>,
    String,
    String,
);

fn kit_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<KitColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
    ))
}

fn parse_kit(cols: KitColumns) -> Result<KitRecord> {
    let (
        id,
        item_name,
        entry_date,
        opening_balance,
        addins,
        takeouts,
        closing_balance,
        remarks,
        entered_by,
        created_at,
    ) = cols;
    Ok(KitRecord {
        id: parse_uuid(&id, "kits_inventory")?,
        item_name,
        entry_date: parse_day(&entry_date, "kits_inventory")?,
        opening_balance,
        addins,
        takeouts,
        closing_balance,
        remarks,
        entered_by,
        created_at: parse_stamp(&created_at, "kits_inventory")?,
    })
}

type GameColumns = (
    String,
    String,
    i64,
    i64,
    i64,
    i64,
    Option<String>,
    String,
    String,
);

fn game_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<GameColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn parse_game(cols: GameColumns) -> Result<GameRecord> {
    let (id, game_details, previous_stock, adding, sent, in_stock, sent_by, entered_by, created_at) =
        cols;
    Ok(GameRecord {
        id: parse_uuid(&id, "games_inventory")?,
        game_details,
        previous_stock,
        adding,
        sent,
        in_stock,
        sent_by,
        entered_by,
        created_at: parse_stamp(&created_at, "games_inventory")?,
    })
}

type BlazerColumns = (
    String,
    String,
    String,
    i64,
    i64,
    Option<String>,
    String,
    String,
);

fn blazer_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<BlazerColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn parse_blazer(cols: BlazerColumns) -> Result<BlazerRecord> {
    let (id, gender, size, quantity, in_office_stock, remarks, entered_by, created_at) = cols;
    let gender = Gender::parse(&gender)
        .ok_or_else(|| anyhow!("Invalid gender in blazer_inventory: {gender}"))?;
    Ok(BlazerRecord {
        id: parse_uuid(&id, "blazer_inventory")?,
        gender,
        size,
        quantity,
        in_office_stock,
        remarks,
        entered_by,
        created_at: parse_stamp(&created_at, "blazer_inventory")?,
    })
}

type ExpenseColumns = (
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    String,
    String,
);

fn expense_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExpenseColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn parse_expense(cols: ExpenseColumns) -> Result<ExpenseRecord> {
    let (id, entry_date, expenses, fixed_amount, previous_month_overspend, remarks, entered_by, created_at) =
        cols;
    Ok(ExpenseRecord {
        id: parse_uuid(&id, "daily_expenses")?,
        entry_date: parse_day(&entry_date, "daily_expenses")?,
        expenses: parse_money(&expenses, "daily_expenses")?,
        fixed_amount: fixed_amount
            .map(|raw| parse_money(&raw, "daily_expenses"))
            .transpose()?,
        previous_month_overspend: previous_month_overspend
            .map(|raw| parse_money(&raw, "daily_expenses"))
            .transpose()?,
        remarks,
        entered_by,
        created_at: parse_stamp(&created_at, "daily_expenses")?,
    })
}

struct BookColumns {
    id: String,
    school_name: String,
    coordinator_name: Option<String>,
    coordinator_number: Option<String>,
    address: Option<String>,
    kit_type: String,
    ordered_from_printer: i64,
    received: i64,
    total_used_till_now: i64,
    delivery_date: Option<String>,
    grades: GradeCounts,
    additional: Option<String>,
    entered_by: String,
    created_at: String,
}

fn book_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<BookColumns> {
    Ok(BookColumns {
        id: row.get(0)?,
        school_name: row.get(1)?,
        coordinator_name: row.get(2)?,
        coordinator_number: row.get(3)?,
        address: row.get(4)?,
        kit_type: row.get(5)?,
        ordered_from_printer: row.get(6)?,
        received: row.get(7)?,
        total_used_till_now: row.get(8)?,
        delivery_date: row.get(9)?,
        grades: GradeCounts {
            grade1: row.get(10)?,
            grade2: row.get(11)?,
            grade3: row.get(12)?,
            grade4: row.get(13)?,
            grade5: row.get(14)?,
            grade6: row.get(15)?,
            grade7: row.get(16)?,
            grade7iot: row.get(17)?,
            grade8: row.get(18)?,
            grade8iot: row.get(19)?,
            grade9: row.get(20)?,
            grade9iot: row.get(21)?,
            grade10: row.get(22)?,
            grade10iot: row.get(23)?,
        },
        additional: row.get(24)?,
        entered_by: row.get(25)?,
        created_at: row.get(26)?,
    })
}

fn parse_book(cols: BookColumns) -> Result<BookRecord> {
    let kit_type = KitType::parse(&cols.kit_type)
        .ok_or_else(|| anyhow!("Invalid kit_type in books_distribution: {}", cols.kit_type))?;
    Ok(BookRecord {
        id: parse_uuid(&cols.id, "books_distribution")?,
        school_name: cols.school_name,
        coordinator_name: cols.coordinator_name,
        coordinator_number: cols.coordinator_number,
        address: cols.address,
        kit_type,
        ordered_from_printer: cols.ordered_from_printer,
        received: cols.received,
        total_used_till_now: cols.total_used_till_now,
        delivery_date: cols
            .delivery_date
            .map(|raw| parse_day(&raw, "books_distribution"))
            .transpose()?,
        grades: cols.grades,
        additional: cols.additional,
        entered_by: cols.entered_by,
        created_at: parse_stamp(&cols.created_at, "books_distribution")?,
    })
}

type CourierColumns = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    String,
    String,
);

fn courier_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<CourierColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
    ))
}

fn parse_courier(cols: CourierColumns) -> Result<CourierRecord> {
    let (
        id,
        entry_date,
        name,
        address,
        phone_number,
        courier_details,
        tracking_number,
        status,
        delivery_date,
        entered_by,
        created_at,
    ) = cols;
    let status = CourierStatus::parse(&status)
        .ok_or_else(|| anyhow!("Invalid status in courier_tracking: {status}"))?;
    Ok(CourierRecord {
        id: parse_uuid(&id, "courier_tracking")?,
        entry_date: parse_day(&entry_date, "courier_tracking")?,
        name,
        address,
        phone_number,
        courier_details,
        tracking_number,
        status,
        delivery_date: delivery_date
            .map(|raw| parse_day(&raw, "courier_tracking"))
            .transpose()?,
        entered_by,
        created_at: parse_stamp(&created_at, "courier_tracking")?,
    })
}

type ActivityColumns = (String, String, String, Option<String>, String, String);

fn activity_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActivityColumns> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn parse_activity(cols: ActivityColumns) -> Result<ActivityEntry> {
    let (module, action, detail, record_id, operator, created_at) = cols;
    Ok(ActivityEntry {
        module,
        action,
        detail,
        record_id: record_id
            .map(|raw| parse_uuid(&raw, "activity_log"))
            .transpose()?,
        operator,
        created_at: parse_stamp(&created_at, "activity_log")?,
    })
}

fn parse_uuid(raw: &str, table: &'static str) -> Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("Invalid UUID in {table}"))
}

fn parse_day(raw: &str, table: &'static str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date in {table}: {raw}"))
}

fn parse_stamp(raw: &str, table: &'static str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid created_at in {table}"))?
        .with_timezone(&Utc))
}

fn parse_money(raw: &str, table: &'static str) -> Result<Decimal> {
    raw.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal in {table}: {raw}"))
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {}", parent.display()))?;
    }
    Ok(())
}
