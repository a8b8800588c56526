//! Balance rules for the inventory and expense families.
//!
//! Every function here is a pure computation over values the caller already
//! resolved; the prior snapshot always arrives as an argument. Carry-forward
//! behaviors differ per family on purpose: kit and game balances are signed
//! and may go negative, blazer office stock is clamped at zero.

use crate::domain::{ExpenseRecord, GradeCounts};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KitTxn {
    pub opening_balance: i64,
    pub closing_balance: i64,
}

/// Opening balance is the explicit override when given, else the prior
/// closing balance for the item, else zero. Closing is never clamped.
pub fn kit_transaction(
    prior_closing: Option<i64>,
    opening_override: Option<i64>,
    addins: i64,
    takeouts: i64,
) -> KitTxn {
    let opening_balance = opening_override.or(prior_closing).unwrap_or(0);
    KitTxn {
        opening_balance,
        closing_balance: opening_balance + addins - takeouts,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameTxn {
    pub previous_stock: i64,
    pub in_stock: i64,
}

/// Same shape as kits: previous stock carries from the latest row for the
/// game unless overridden, and the result is signed.
pub fn game_transaction(
    prior_stock: Option<i64>,
    previous_override: Option<i64>,
    adding: i64,
    sent: i64,
) -> GameTxn {
    let previous_stock = previous_override.or(prior_stock).unwrap_or(0);
    GameTxn {
        previous_stock,
        in_stock: previous_stock + adding - sent,
    }
}

/// Office stock after a signed movement (positive = received, negative =
/// sent), clamped at zero. A missing baseline means a brand-new bucket.
pub fn blazer_stock(baseline: Option<i64>, signed_qty: i64) -> i64 {
    (baseline.unwrap_or(0) + signed_qty).max(0)
}

/// Re-derives office stock when the quantity of an existing row changes.
///
/// With a next-older row in the same gender+size bucket, that row's stock is
/// the baseline. Without one the row is the oldest of its bucket and only
/// the delta between old and new quantity can be applied to its own stock.
/// Newer rows in the bucket keep their stored balances either way.
pub fn blazer_stock_reedit(
    next_older_stock: Option<i64>,
    own_stock: i64,
    old_qty: i64,
    new_qty: i64,
) -> i64 {
    match next_older_stock {
        Some(base) => (base + new_qty).max(0),
        None => (own_stock + (new_qty - old_qty)).max(0),
    }
}

/// Total books used across all grade columns. Order never matters.
pub fn grade_total(grades: &GradeCounts) -> i64 {
    grades.entries().iter().map(|(_, count)| count).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlySummary {
    /// Pool: every positive fixed amount recorded in the month.
    pub sum_fixed: Decimal,
    /// First non-zero overspend among the entries, in the given order.
    pub carryover: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
}

/// Aggregates one month of expense entries. The caller passes entries newest
/// first; the carryover takes the first non-zero value it sees, so a later
/// correction entry wins over an earlier one.
pub fn monthly_expense_balance(entries: &[ExpenseRecord]) -> MonthlySummary {
    let mut sum_fixed = Decimal::ZERO;
    let mut spent = Decimal::ZERO;
    let mut carryover = Decimal::ZERO;
    let mut carryover_found = false;

    for entry in entries {
        if let Some(fixed) = entry.fixed_amount {
            if fixed > Decimal::ZERO {
                sum_fixed += fixed;
            }
        }
        if !carryover_found {
            if let Some(over) = entry.previous_month_overspend {
                if over != Decimal::ZERO {
                    carryover = over;
                    carryover_found = true;
                }
            }
        }
        spent += entry.expenses;
    }

    MonthlySummary {
        sum_fixed,
        carryover,
        spent,
        remaining: sum_fixed - carryover - spent,
    }
}
