//! Treatment service
//!
//! Treatments gate what may be shipped: the sum of a lot's treated
//! kilograms bounds its movements. Edits and deletions re-derive that
//! bound excluding the record being changed and reject anything that
//! would leave recorded movements uncovered.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::balance::used_kg_in_movements;
use shared::models::Treatment;
use shared::types::{AuditAction, EntityKind, Unit};
use shared::units::{to_kg, EPSILON};
use shared::validation::{validate_dose, validate_qty, validate_required};

use crate::error::{AppError, AppResult};
use crate::live::UpdateHub;
use crate::services::Ack;
use crate::store::{Ledger, Store};

/// Input for recording a treatment
#[derive(Debug, Deserialize)]
pub struct CreateTreatmentInput {
    pub lot_id: Uuid,
    pub product: String,
    pub dose_per_100kg: f64,
    pub operator: String,
    pub treated_at: NaiveDate,
    pub unit: Unit,
    pub qty: f64,
}

/// Input for editing a treatment; omitted fields keep their current value
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTreatmentInput {
    pub lot_id: Option<Uuid>,
    pub product: Option<String>,
    pub dose_per_100kg: Option<f64>,
    pub operator: Option<String>,
    pub treated_at: Option<NaiveDate>,
    pub unit: Option<Unit>,
    pub qty: Option<f64>,
}

/// Treatment enriched with a display label for its lot
#[derive(Debug, Clone, Serialize)]
pub struct TreatmentWithLot {
    #[serde(flatten)]
    pub treatment: Treatment,
    pub lot_label: String,
}

/// "variety • lot_code", falling back to the raw id for a dangling
/// reference
fn lot_label(ledger: &Ledger, lot_id: Uuid) -> String {
    ledger
        .lot(lot_id)
        .map(|l| format!("{} • {}", l.variety, l.lot_code))
        .unwrap_or_else(|| lot_id.to_string())
}

/// Treatment service
#[derive(Clone)]
pub struct TreatmentService {
    store: Store,
    hub: UpdateHub,
}

impl TreatmentService {
    pub fn new(store: Store, hub: UpdateHub) -> Self {
        Self { store, hub }
    }

    /// Record a treatment against an existing lot
    ///
    /// The treated total is not bounded by the lot's own intake here; only
    /// movements are bounded, against both treatments and intake.
    pub async fn create(&self, by: &str, input: CreateTreatmentInput) -> AppResult<TreatmentWithLot> {
        validate_required(&input.product).map_err(|m| AppError::validation("product", m))?;
        validate_required(&input.operator).map_err(|m| AppError::validation("operator", m))?;
        validate_dose(input.dose_per_100kg)
            .map_err(|m| AppError::validation("dose_per_100kg", m))?;
        validate_qty(input.qty).map_err(|m| AppError::validation("qty", m))?;

        let (treatment, event) = self
            .store
            .mutate(|ledger| {
                if ledger.lot(input.lot_id).is_none() {
                    return Err(AppError::NotFound("Lot".to_string()));
                }

                let qty_kg = to_kg(input.qty, input.unit, &ledger.settings);
                let treatment = Treatment {
                    id: Uuid::new_v4(),
                    lot_id: input.lot_id,
                    product: input.product,
                    dose_per_100kg: input.dose_per_100kg,
                    operator: input.operator,
                    treated_at: input.treated_at,
                    unit: input.unit,
                    qty: input.qty,
                    qty_kg,
                };
                ledger.treatments.push(treatment.clone());

                let event = ledger.record_event(
                    by,
                    EntityKind::Treatment,
                    AuditAction::Create,
                    treatment.id.to_string(),
                    serde_json::json!({
                        "lot_id": treatment.lot_id,
                        "product": treatment.product.clone(),
                    }),
                );
                let label = lot_label(ledger, treatment.lot_id);
                Ok((
                    TreatmentWithLot {
                        treatment,
                        lot_label: label,
                    },
                    event,
                ))
            })
            .await?;

        self.hub.data_update(EntityKind::Treatment);
        self.hub.data_update(EntityKind::Lot);
        self.hub.alarm(&event);
        Ok(treatment)
    }

    /// All treatments, each with its lot label
    pub async fn list(&self) -> Vec<TreatmentWithLot> {
        self.store
            .read(|ledger| {
                ledger
                    .treatments
                    .iter()
                    .map(|t| TreatmentWithLot {
                        treatment: t.clone(),
                        lot_label: lot_label(ledger, t.lot_id),
                    })
                    .collect()
            })
            .await
    }

    /// Edit a treatment, possibly re-parenting it to another lot
    ///
    /// The prospective treated total of the target lot (without this
    /// record, plus its new value) must still cover that lot's recorded
    /// movements.
    pub async fn update(
        &self,
        by: &str,
        id: Uuid,
        input: UpdateTreatmentInput,
    ) -> AppResult<TreatmentWithLot> {
        if let Some(ref product) = input.product {
            validate_required(product).map_err(|m| AppError::validation("product", m))?;
        }
        if let Some(ref operator) = input.operator {
            validate_required(operator).map_err(|m| AppError::validation("operator", m))?;
        }
        if let Some(dose) = input.dose_per_100kg {
            validate_dose(dose).map_err(|m| AppError::validation("dose_per_100kg", m))?;
        }
        if let Some(qty) = input.qty {
            validate_qty(qty).map_err(|m| AppError::validation("qty", m))?;
        }

        let (treatment, event) = self
            .store
            .mutate(|ledger| {
                let idx = ledger
                    .treatments
                    .iter()
                    .position(|t| t.id == id)
                    .ok_or_else(|| AppError::NotFound("Treatment".to_string()))?;

                let current = &ledger.treatments[idx];
                let unit = input.unit.unwrap_or(current.unit);
                let qty = input.qty.unwrap_or(current.qty);
                let lot_id = input.lot_id.unwrap_or(current.lot_id);
                let qty_kg = to_kg(qty, unit, &ledger.settings);

                let total_after: f64 = ledger
                    .treatments
                    .iter()
                    .filter(|t| t.id != id && t.lot_id == lot_id)
                    .map(|t| t.qty_kg)
                    .sum::<f64>()
                    + qty_kg;
                let already_moved = used_kg_in_movements(&ledger.movements, lot_id);
                if already_moved > total_after + EPSILON {
                    return Err(AppError::InvariantViolation(
                        "Edit would leave movements exceeding the treated volume".to_string(),
                    ));
                }

                let t = &mut ledger.treatments[idx];
                if let Some(product) = input.product {
                    t.product = product;
                }
                if let Some(dose) = input.dose_per_100kg {
                    t.dose_per_100kg = dose;
                }
                if let Some(operator) = input.operator {
                    t.operator = operator;
                }
                if let Some(treated_at) = input.treated_at {
                    t.treated_at = treated_at;
                }
                t.lot_id = lot_id;
                t.unit = unit;
                t.qty = qty;
                t.qty_kg = qty_kg;
                let updated = t.clone();

                let event = ledger.record_event(
                    by,
                    EntityKind::Treatment,
                    AuditAction::Update,
                    id.to_string(),
                    serde_json::json!({ "lot_id": lot_id, "product": updated.product.clone() }),
                );
                let label = lot_label(ledger, lot_id);
                Ok((
                    TreatmentWithLot {
                        treatment: updated,
                        lot_label: label,
                    },
                    event,
                ))
            })
            .await?;

        self.hub.data_update(EntityKind::Treatment);
        self.hub.data_update(EntityKind::Lot);
        self.hub.alarm(&event);
        Ok(treatment)
    }

    /// Delete a treatment
    ///
    /// Refused when the lot's remaining treated total would no longer
    /// cover its recorded movements.
    pub async fn delete(&self, by: &str, id: Uuid) -> AppResult<Ack> {
        let event = self
            .store
            .mutate(|ledger| {
                let idx = ledger
                    .treatments
                    .iter()
                    .position(|t| t.id == id)
                    .ok_or_else(|| AppError::NotFound("Treatment".to_string()))?;
                let lot_id = ledger.treatments[idx].lot_id;

                let remaining: f64 = ledger
                    .treatments
                    .iter()
                    .filter(|t| t.id != id && t.lot_id == lot_id)
                    .map(|t| t.qty_kg)
                    .sum();
                let already_moved = used_kg_in_movements(&ledger.movements, lot_id);
                if already_moved > remaining + EPSILON {
                    return Err(AppError::InvariantViolation(
                        "Deleting this treatment would leave shipped volume uncovered"
                            .to_string(),
                    ));
                }

                ledger.treatments.remove(idx);
                let event = ledger.record_event(
                    by,
                    EntityKind::Treatment,
                    AuditAction::Delete,
                    id.to_string(),
                    serde_json::json!({ "lot_id": lot_id }),
                );
                Ok(event)
            })
            .await?;

        self.hub.data_update(EntityKind::Treatment);
        self.hub.data_update(EntityKind::Lot);
        self.hub.alarm(&event);
        Ok(Ack::ok())
    }
}
