//! Unit conversion between kilograms, sacks, and bulk bags
//!
//! Pure functions; the ratios are passed in explicitly so conversions are
//! deterministic and testable without ambient state. No rounding beyond
//! native floating point: downstream comparisons absorb the drift with
//! [`EPSILON`].

use crate::models::UnitSettings;
use crate::types::Unit;

/// Tolerance applied to every balance comparison
///
/// Quantities are plain `f64`, so boundary-equal values can differ by a few
/// ulps after conversion. All gatekeeper checks compare against this slack.
pub const EPSILON: f64 = 1e-6;

/// Convert a quantity recorded in `unit` to kilograms
pub fn to_kg(qty: f64, unit: Unit, settings: &UnitSettings) -> f64 {
    match unit {
        Unit::Kg => qty,
        Unit::Sc => qty * settings.kg_per_sc,
        Unit::Bag => qty * settings.kg_per_bag,
    }
}

/// Convert kilograms to a quantity in `unit`
pub fn from_kg(kg: f64, unit: Unit, settings: &UnitSettings) -> f64 {
    match unit {
        Unit::Kg => kg,
        Unit::Sc => kg / settings.kg_per_sc,
        Unit::Bag => kg / settings.kg_per_bag,
    }
}
