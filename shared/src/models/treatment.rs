//! Chemical treatment model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Unit;

/// A chemical application over part (or all) of a lot's quantity
///
/// `lot_id` is a back-reference for lookup and validation, not ownership:
/// deleting a lot with treatments attached is refused rather than cascaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Treatment {
    pub id: Uuid,
    pub lot_id: Uuid,
    pub product: String,
    pub dose_per_100kg: f64,
    pub operator: String,
    pub treated_at: NaiveDate,
    pub unit: Unit,
    pub qty: f64,
    pub qty_kg: f64,
}
