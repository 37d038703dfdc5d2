//! Outbound movement model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{DestinationType, Unit};

/// An outbound shipment of treated material from a lot to a destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    pub id: Uuid,
    pub lot_id: Uuid,
    pub destination_type: DestinationType,
    pub destination_name: String,
    pub moved_at: NaiveDate,
    pub unit: Unit,
    pub qty: f64,
    pub qty_kg: f64,
    pub notes: Option<String>,
}
