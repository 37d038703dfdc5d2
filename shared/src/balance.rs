//! Per-lot balance aggregates
//!
//! Every figure is recomputed on read by scanning the collections; nothing
//! is cached, so there is no counter to fall out of sync with the ledgers.
//! The kilogram figures are authoritative; sack and bag figures are derived
//! for display and never persisted.

use serde::Serialize;
use uuid::Uuid;

use crate::models::{Movement, SeedLot, Treatment, UnitSettings};
use crate::types::Unit;
use crate::units::from_kg;

/// Total kilograms already moved out of a lot
pub fn used_kg_in_movements(movements: &[Movement], lot_id: Uuid) -> f64 {
    movements
        .iter()
        .filter(|m| m.lot_id == lot_id)
        .map(|m| m.qty_kg)
        .sum()
}

/// Total kilograms of a lot that have been treated
pub fn treated_kg(treatments: &[Treatment], lot_id: Uuid) -> f64 {
    treatments
        .iter()
        .filter(|t| t.lot_id == lot_id)
        .map(|t| t.qty_kg)
        .sum()
}

/// Kilograms still on hand: intake minus moved out, floored at zero
pub fn balance_kg(lot: &SeedLot, movements: &[Movement]) -> f64 {
    (lot.qty_kg - used_kg_in_movements(movements, lot.id)).max(0.0)
}

/// Kilograms treated but not yet shipped, floored at zero
pub fn treated_available_kg(
    lot: &SeedLot,
    treatments: &[Treatment],
    movements: &[Movement],
) -> f64 {
    (treated_kg(treatments, lot.id) - used_kg_in_movements(movements, lot.id)).max(0.0)
}

/// One kilogram figure expressed in all three display units
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UnitBreakdown {
    pub kg: f64,
    pub sc: f64,
    pub bag: f64,
}

impl UnitBreakdown {
    pub fn from_kg_value(kg: f64, settings: &UnitSettings) -> Self {
        Self {
            kg,
            sc: from_kg(kg, Unit::Sc, settings),
            bag: from_kg(kg, Unit::Bag, settings),
        }
    }
}
