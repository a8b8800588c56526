use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Entity families. Closed set; each owns one table and one balance rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModuleKind {
    Kits,
    Games,
    Blazer,
    Expenses,
    Books,
    Courier,
}

impl ModuleKind {
    pub fn table_name(self) -> &'static str {
        match self {
            ModuleKind::Kits => "kits_inventory",
            ModuleKind::Games => "games_inventory",
            ModuleKind::Blazer => "blazer_inventory",
            ModuleKind::Expenses => "daily_expenses",
            ModuleKind::Books => "books_distribution",
            ModuleKind::Courier => "courier_tracking",
        }
    }

    /// Short name used in export filenames and log output.
    pub fn slug(self) -> &'static str {
        match self {
            ModuleKind::Kits => "kits",
            ModuleKind::Games => "games",
            ModuleKind::Blazer => "blazer",
            ModuleKind::Expenses => "expenses",
            ModuleKind::Books => "books",
            ModuleKind::Courier => "courier",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    pub fn parse(s: &str) -> Option<Gender> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn size_prefix(self) -> &'static str {
        match self {
            Gender::Male => "M-",
            Gender::Female => "F-",
        }
    }

    pub fn sizes(self) -> &'static [&'static str] {
        match self {
            Gender::Male => MALE_SIZES,
            Gender::Female => FEMALE_SIZES,
        }
    }
}

pub const MALE_SIZES: &[&str] = &[
    "M-36", "M-38", "M-40", "M-42", "M-44", "M-46", "M-48", "M-50",
];

pub const FEMALE_SIZES: &[&str] = &["F-XS", "F-S", "F-M", "F-L", "F-XL", "F-XXL"];

/// Normalizes a size token against the gender's catalog.
///
/// Accepts the bare form ("40", "xl") and prefixes it from the gender, or the
/// full form ("M-40"), which must carry the matching prefix.
pub fn normalize_size(gender: Gender, raw: &str) -> Result<String, ValidationError> {
    let token = raw.trim().to_ascii_uppercase();
    if token.is_empty() {
        return Err(ValidationError::EmptyField { field: "size" });
    }

    let full = if token.starts_with("M-") || token.starts_with("F-") {
        token
    } else {
        format!("{}{}", gender.size_prefix(), token)
    };

    if gender.sizes().contains(&full.as_str()) {
        Ok(full)
    } else {
        Err(ValidationError::SizeNotInCatalog {
            size: full,
            gender: gender.as_str(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KitType {
    Lab,
    Individual,
    Returnable,
}

impl KitType {
    pub fn as_str(self) -> &'static str {
        match self {
            KitType::Lab => "Lab",
            KitType::Individual => "Individual",
            KitType::Returnable => "Returnable",
        }
    }

    pub fn parse(s: &str) -> Option<KitType> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lab" => Some(KitType::Lab),
            "individual" => Some(KitType::Individual),
            "returnable" => Some(KitType::Returnable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CourierStatus {
    Dispatched,
    InTransit,
    Delivered,
    Delayed,
    Failed,
}

impl CourierStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CourierStatus::Dispatched => "Dispatched",
            CourierStatus::InTransit => "In Transit",
            CourierStatus::Delivered => "Delivered",
            CourierStatus::Delayed => "Delayed",
            CourierStatus::Failed => "Failed",
        }
    }

    pub fn parse(s: &str) -> Option<CourierStatus> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dispatched" => Some(CourierStatus::Dispatched),
            "in transit" | "in-transit" => Some(CourierStatus::InTransit),
            "delivered" => Some(CourierStatus::Delivered),
            "delayed" => Some(CourierStatus::Delayed),
            "failed" => Some(CourierStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KitRecord {
    pub id: Uuid,
    pub item_name: String,
    pub entry_date: NaiveDate,
    pub opening_balance: i64,
    pub addins: i64,
    pub takeouts: i64,
    /// Always opening_balance + addins - takeouts. May go negative.
    pub closing_balance: i64,
    pub remarks: Option<String>,
    pub entered_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct GameRecord {
    pub id: Uuid,
    pub game_details: String,
    pub previous_stock: i64,
    pub adding: i64,
    pub sent: i64,
    /// Always previous_stock + adding - sent.
    pub in_stock: i64,
    pub sent_by: Option<String>,
    pub entered_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BlazerRecord {
    pub id: Uuid,
    pub gender: Gender,
    pub size: String,
    /// Signed movement: positive = received, negative = sent.
    pub quantity: i64,
    /// Clamped at zero, unlike kit/game balances.
    pub in_office_stock: i64,
    pub remarks: Option<String>,
    pub entered_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ExpenseRecord {
    pub id: Uuid,
    pub entry_date: NaiveDate,
    pub expenses: Decimal,
    /// Sparse: only entries that record a pool top-up carry one.
    pub fixed_amount: Option<Decimal>,
    pub previous_month_overspend: Option<Decimal>,
    pub remarks: String,
    pub entered_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BookRecord {
    pub id: Uuid,
    pub school_name: String,
    pub coordinator_name: Option<String>,
    pub coordinator_number: Option<String>,
    pub address: Option<String>,
    pub kit_type: KitType,
    pub ordered_from_printer: i64,
    pub received: i64,
    /// Always the sum of all grade counts.
    pub total_used_till_now: i64,
    pub delivery_date: Option<NaiveDate>,
    pub grades: GradeCounts,
    pub additional: Option<String>,
    pub entered_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CourierRecord {
    pub id: Uuid,
    pub entry_date: NaiveDate,
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub courier_details: String,
    pub tracking_number: String,
    pub status: CourierStatus,
    pub delivery_date: Option<NaiveDate>,
    pub entered_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub module: String,
    pub action: String,
    pub detail: String,
    pub record_id: Option<Uuid>,
    pub operator: String,
    pub created_at: DateTime<Utc>,
}

/// Per-grade distribution counts for a book record. Grades absent from the
/// input stay zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GradeCounts {
    pub grade1: i64,
    pub grade2: i64,
    pub grade3: i64,
    pub grade4: i64,
    pub grade5: i64,
    pub grade6: i64,
    pub grade7: i64,
    pub grade7iot: i64,
    pub grade8: i64,
    pub grade8iot: i64,
    pub grade9: i64,
    pub grade9iot: i64,
    pub grade10: i64,
    pub grade10iot: i64,
}

impl GradeCounts {
    pub fn entries(&self) -> [(&'static str, i64); 14] {
        [
            ("grade1", self.grade1),
            ("grade2", self.grade2),
            ("grade3", self.grade3),
            ("grade4", self.grade4),
            ("grade5", self.grade5),
            ("grade6", self.grade6),
            ("grade7", self.grade7),
            ("grade7iot", self.grade7iot),
            ("grade8", self.grade8),
            ("grade8iot", self.grade8iot),
            ("grade9", self.grade9),
            ("grade9iot", self.grade9iot),
            ("grade10", self.grade10),
            ("grade10iot", self.grade10iot),
        ]
    }

    pub fn set(&mut self, name: &str, value: i64) -> Result<(), ValidationError> {
        let slot = match name {
            "grade1" => &mut self.grade1,
            "grade2" => &mut self.grade2,
            "grade3" => &mut self.grade3,
            "grade4" => &mut self.grade4,
            "grade5" => &mut self.grade5,
            "grade6" => &mut self.grade6,
            "grade7" => &mut self.grade7,
            "grade7iot" => &mut self.grade7iot,
            "grade8" => &mut self.grade8,
            "grade8iot" => &mut self.grade8iot,
            "grade9" => &mut self.grade9,
            "grade9iot" => &mut self.grade9iot,
            "grade10" => &mut self.grade10,
            "grade10iot" => &mut self.grade10iot,
            _ => {
                return Err(ValidationError::UnknownGrade {
                    name: name.to_string(),
                });
            }
        };
        *slot = value;
        Ok(())
    }
}

/// Parses a repeatable `--grade` pair like `grade7iot=5`.
pub fn parse_grade_spec(raw: &str) -> Result<(String, i64), ValidationError> {
    let bad = || ValidationError::BadGradeSpec {
        raw: raw.to_string(),
    };

    let (name, count) = raw.split_once('=').ok_or_else(bad)?;
    let name = name.trim().to_ascii_lowercase();
    if name.is_empty() {
        return Err(bad());
    }
    let count: i64 = count.trim().parse().map_err(|_| bad())?;
    Ok((name, count))
}

/// Input problems caught before anything touches the store.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("{field} must not be negative")]
    NegativeValue { field: &'static str },

    #[error("Unknown grade field '{name}'")]
    UnknownGrade { name: String },

    #[error("Invalid grade spec '{raw}'. Expected <grade>=<count>, e.g. grade7iot=5")]
    BadGradeSpec { raw: String },

    #[error("Size {size} is not in the {gender} catalog")]
    SizeNotInCatalog { size: String, gender: &'static str },
}

/// Trims a required text field, rejecting blank input.
pub fn require_text(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(trimmed.to_string())
}

/// Optional text fields collapse to None when blank.
pub fn clean_opt(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
