//! Latest-snapshot lookup per inventory bucket.
//!
//! A bucket is the identity a running balance rolls up under: the item name
//! for kits, the game name for games, gender+size for blazers. The resolver
//! only reads; whatever it returns is handed to the balance rules as an
//! explicit argument. A blank key or a brand-new bucket resolves to `None`,
//! which the rules treat as a zero baseline.

use crate::db::Db;
use crate::domain::{BlazerRecord, GameRecord, Gender, KitRecord};
use anyhow::Result;

#[derive(Debug, Clone, Copy)]
pub enum Bucket<'a> {
    Kit { item_name: &'a str },
    Game { game_details: &'a str },
    Blazer { gender: Gender, size: &'a str },
}

#[derive(Debug, Clone)]
pub enum PriorSnapshot {
    Kit(KitRecord),
    Game(GameRecord),
    Blazer(BlazerRecord),
}

/// Most recent stored row for the bucket, or `None` when the key is blank
/// or nothing has been recorded yet.
pub fn latest_for(db: &Db, bucket: &Bucket<'_>) -> Result<Option<PriorSnapshot>> {
    match bucket {
        Bucket::Kit { item_name } => {
            if item_name.trim().is_empty() {
                return Ok(None);
            }
            Ok(db.latest_kit_for_item(item_name)?.map(PriorSnapshot::Kit))
        }
        Bucket::Game { game_details } => {
            if game_details.trim().is_empty() {
                return Ok(None);
            }
            Ok(db
                .latest_game_for_name(game_details)?
                .map(PriorSnapshot::Game))
        }
        Bucket::Blazer { gender, size } => {
            if size.trim().is_empty() {
                return Ok(None);
            }
            Ok(db
                .latest_blazer_for_bucket(*gender, size)?
                .map(PriorSnapshot::Blazer))
        }
    }
}

/// Closing balance carried into a new kit entry for the item.
pub fn carried_opening(db: &Db, item_name: &str) -> Result<Option<i64>> {
    match latest_for(db, &Bucket::Kit { item_name })? {
        Some(PriorSnapshot::Kit(rec)) => Ok(Some(rec.closing_balance)),
        _ => Ok(None),
    }
}

/// In-stock count carried into a new game entry.
pub fn carried_stock(db: &Db, game_details: &str) -> Result<Option<i64>> {
    match latest_for(db, &Bucket::Game { game_details })? {
        Some(PriorSnapshot::Game(rec)) => Ok(Some(rec.in_stock)),
        _ => Ok(None),
    }
}

/// Office stock for the gender+size bucket, the baseline for a new movement.
pub fn carried_office_stock(db: &Db, gender: Gender, size: &str) -> Result<Option<i64>> {
    match latest_for(db, &Bucket::Blazer { gender, size })? {
        Some(PriorSnapshot::Blazer(rec)) => Ok(Some(rec.in_office_stock)),
        _ => Ok(None),
    }
}
