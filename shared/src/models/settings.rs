//! Global unit conversion settings

use serde::{Deserialize, Serialize};

/// Conversion ratios between kilograms and the display units
///
/// A process-wide singleton: the last write wins and no history is kept.
/// Every conversion reads the ratios in force at that moment, so records
/// created under different settings keep the `qty_kg` they were computed
/// with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitSettings {
    /// Kilograms in one sack
    pub kg_per_sc: f64,
    /// Kilograms in one bulk bag
    pub kg_per_bag: f64,
}

impl Default for UnitSettings {
    fn default() -> Self {
        Self {
            kg_per_sc: 60.0,
            kg_per_bag: 1000.0,
        }
    }
}
