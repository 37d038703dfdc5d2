//! Seed lot model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Unit;

/// One received batch of seed of a single variety/supplier/code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedLot {
    pub id: Uuid,
    pub variety: String,
    pub supplier: String,
    pub lot_code: String,
    pub received_at: NaiveDate,
    /// Unit the intake was recorded in
    pub unit: Unit,
    /// Intake quantity in `unit`
    pub qty: f64,
    /// Intake converted to kilograms with the settings in force at
    /// creation or last edit; fixed otherwise
    pub qty_kg: f64,
}
