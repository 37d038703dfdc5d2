//! Movement service
//!
//! The central gatekeeper: a movement may only draw from material that has
//! been treated and not yet moved, and can never take a lot's total
//! shipped volume past its intake. Both checks are re-derived from the
//! ledgers on every attempt; nothing is cached.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use shared::balance::{treated_kg, used_kg_in_movements};
use shared::models::Movement;
use shared::types::{AuditAction, DestinationType, EntityKind, Unit};
use shared::units::{to_kg, EPSILON};
use shared::validation::{validate_qty, validate_required};

use crate::error::{AppError, AppResult};
use crate::live::UpdateHub;
use crate::services::Ack;
use crate::store::Store;

/// Input for recording an outbound movement
#[derive(Debug, Deserialize)]
pub struct CreateMovementInput {
    pub lot_id: Uuid,
    pub destination_type: DestinationType,
    pub destination_name: String,
    pub moved_at: NaiveDate,
    pub unit: Unit,
    pub qty: f64,
    pub notes: Option<String>,
}

/// Input for editing a movement; omitted fields keep their current value
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMovementInput {
    pub lot_id: Option<Uuid>,
    pub destination_type: Option<DestinationType>,
    pub destination_name: Option<String>,
    pub moved_at: Option<NaiveDate>,
    pub unit: Option<Unit>,
    pub qty: Option<f64>,
    pub notes: Option<String>,
}

/// Movement service
#[derive(Clone)]
pub struct MovementService {
    store: Store,
    hub: UpdateHub,
}

impl MovementService {
    pub fn new(store: Store, hub: UpdateHub) -> Self {
        Self { store, hub }
    }

    /// Record an outbound movement
    ///
    /// The requested kilograms must fit inside both headrooms: treated
    /// minus already moved, and intake minus already moved. Either check
    /// may fire first; in both cases nothing is written.
    pub async fn create(&self, by: &str, input: CreateMovementInput) -> AppResult<Movement> {
        validate_required(&input.destination_name)
            .map_err(|m| AppError::validation("destination_name", m))?;
        validate_qty(input.qty).map_err(|m| AppError::validation("qty", m))?;

        let (movement, event) = self
            .store
            .mutate(|ledger| {
                let lot = ledger
                    .lot(input.lot_id)
                    .ok_or_else(|| AppError::NotFound("Lot".to_string()))?;
                let lot_qty_kg = lot.qty_kg;

                let qty_kg = to_kg(input.qty, input.unit, &ledger.settings);
                let treated_total = treated_kg(&ledger.treatments, input.lot_id);
                let already_moved = used_kg_in_movements(&ledger.movements, input.lot_id);

                let treated_available = (treated_total - already_moved).max(0.0);
                if qty_kg > treated_available + EPSILON {
                    return Err(AppError::InvariantViolation(
                        "Quantity exceeds the treated volume available".to_string(),
                    ));
                }
                if qty_kg > lot_qty_kg - already_moved + EPSILON {
                    return Err(AppError::InvariantViolation(
                        "Quantity exceeds the lot balance".to_string(),
                    ));
                }

                let movement = Movement {
                    id: Uuid::new_v4(),
                    lot_id: input.lot_id,
                    destination_type: input.destination_type,
                    destination_name: input.destination_name,
                    moved_at: input.moved_at,
                    unit: input.unit,
                    qty: input.qty,
                    qty_kg,
                    notes: input.notes,
                };
                ledger.movements.push(movement.clone());

                let event = ledger.record_event(
                    by,
                    EntityKind::Movement,
                    AuditAction::Create,
                    movement.id.to_string(),
                    serde_json::json!({
                        "lot_id": movement.lot_id,
                        "destination": movement.destination_name.clone(),
                    }),
                );
                Ok((movement, event))
            })
            .await?;

        self.hub.data_update(EntityKind::Movement);
        self.hub.data_update(EntityKind::Lot);
        self.hub.alarm(&event);
        Ok(movement)
    }

    /// All movements, ordered by movement date
    pub async fn list(&self) -> Vec<Movement> {
        self.store
            .read(|ledger| {
                let mut rows = ledger.movements.clone();
                rows.sort_by_key(|m| m.moved_at);
                rows
            })
            .await
    }

    /// Edit a movement
    ///
    /// Both availability checks rerun against the prospective quantity
    /// with this record excluded from the already-moved total.
    pub async fn update(
        &self,
        by: &str,
        id: Uuid,
        input: UpdateMovementInput,
    ) -> AppResult<Movement> {
        if let Some(ref destination_name) = input.destination_name {
            validate_required(destination_name)
                .map_err(|m| AppError::validation("destination_name", m))?;
        }
        if let Some(qty) = input.qty {
            validate_qty(qty).map_err(|m| AppError::validation("qty", m))?;
        }

        let (movement, event) = self
            .store
            .mutate(|ledger| {
                let idx = ledger
                    .movements
                    .iter()
                    .position(|m| m.id == id)
                    .ok_or_else(|| AppError::NotFound("Movement".to_string()))?;

                let current = &ledger.movements[idx];
                let unit = input.unit.unwrap_or(current.unit);
                let qty = input.qty.unwrap_or(current.qty);
                let lot_id = input.lot_id.unwrap_or(current.lot_id);
                let qty_kg = to_kg(qty, unit, &ledger.settings);

                let used_without_this: f64 = ledger
                    .movements
                    .iter()
                    .filter(|m| m.id != id && m.lot_id == lot_id)
                    .map(|m| m.qty_kg)
                    .sum();

                let treated_total = treated_kg(&ledger.treatments, lot_id);
                if qty_kg > treated_total - used_without_this + EPSILON {
                    return Err(AppError::InvariantViolation(
                        "Quantity exceeds the treated volume available".to_string(),
                    ));
                }

                let lot = ledger
                    .lot(lot_id)
                    .ok_or_else(|| AppError::NotFound("Lot".to_string()))?;
                if qty_kg > lot.qty_kg - used_without_this + EPSILON {
                    return Err(AppError::InvariantViolation(
                        "Quantity exceeds the lot balance".to_string(),
                    ));
                }

                let m = &mut ledger.movements[idx];
                if let Some(destination_type) = input.destination_type {
                    m.destination_type = destination_type;
                }
                if let Some(destination_name) = input.destination_name {
                    m.destination_name = destination_name;
                }
                if let Some(moved_at) = input.moved_at {
                    m.moved_at = moved_at;
                }
                if let Some(notes) = input.notes {
                    m.notes = Some(notes);
                }
                m.lot_id = lot_id;
                m.unit = unit;
                m.qty = qty;
                m.qty_kg = qty_kg;
                let updated = m.clone();

                let event = ledger.record_event(
                    by,
                    EntityKind::Movement,
                    AuditAction::Update,
                    id.to_string(),
                    serde_json::json!({
                        "lot_id": updated.lot_id,
                        "destination": updated.destination_name.clone(),
                    }),
                );
                Ok((updated, event))
            })
            .await?;

        self.hub.data_update(EntityKind::Movement);
        self.hub.data_update(EntityKind::Lot);
        self.hub.alarm(&event);
        Ok(movement)
    }

    /// Delete a movement
    ///
    /// Always permitted for an existing record: removing a shipment only
    /// returns headroom, so neither availability check can fail.
    pub async fn delete(&self, by: &str, id: Uuid) -> AppResult<Ack> {
        let event = self
            .store
            .mutate(|ledger| {
                let idx = ledger
                    .movements
                    .iter()
                    .position(|m| m.id == id)
                    .ok_or_else(|| AppError::NotFound("Movement".to_string()))?;

                ledger.movements.remove(idx);
                let event = ledger.record_event(
                    by,
                    EntityKind::Movement,
                    AuditAction::Delete,
                    id.to_string(),
                    serde_json::json!({}),
                );
                Ok(event)
            })
            .await?;

        self.hub.data_update(EntityKind::Movement);
        self.hub.data_update(EntityKind::Lot);
        self.hub.alarm(&event);
        Ok(Ack::ok())
    }
}
