//! Input validation helpers
//!
//! Small pure checks shared by the mutation gatekeepers. Each returns a
//! static message suitable for a structured rejection.

use crate::models::UnitSettings;

/// Validate a recorded quantity: finite and strictly positive
pub fn validate_qty(qty: f64) -> Result<(), &'static str> {
    if !qty.is_finite() {
        return Err("Quantity must be a finite number");
    }
    if qty <= 0.0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a treatment dose: finite and non-negative
pub fn validate_dose(dose: f64) -> Result<(), &'static str> {
    if !dose.is_finite() {
        return Err("Dose must be a finite number");
    }
    if dose < 0.0 {
        return Err("Dose cannot be negative");
    }
    Ok(())
}

/// Validate a required free-text field
pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Field cannot be empty");
    }
    Ok(())
}

/// Validate unit settings: both ratios finite and strictly positive
pub fn validate_unit_settings(settings: &UnitSettings) -> Result<(), &'static str> {
    if !settings.kg_per_sc.is_finite() || settings.kg_per_sc <= 0.0 {
        return Err("kg_per_sc must be positive");
    }
    if !settings.kg_per_bag.is_finite() || settings.kg_per_bag <= 0.0 {
        return Err("kg_per_bag must be positive");
    }
    Ok(())
}
