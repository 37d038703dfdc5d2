//! Seed lot service: intake, edit, and deletion guarded by the balance
//! engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::balance::{
    balance_kg, treated_available_kg, treated_kg, used_kg_in_movements, UnitBreakdown,
};
use shared::models::SeedLot;
use shared::types::{AuditAction, EntityKind, Unit};
use shared::units::{to_kg, EPSILON};
use shared::validation::{validate_qty, validate_required};

use crate::error::{AppError, AppResult};
use crate::live::UpdateHub;
use crate::store::Store;

/// Input for registering a received lot
#[derive(Debug, Deserialize)]
pub struct CreateLotInput {
    pub variety: String,
    pub supplier: String,
    pub lot_code: String,
    pub received_at: NaiveDate,
    pub unit: Unit,
    pub qty: f64,
}

/// Input for editing a lot; omitted fields keep their current value
#[derive(Debug, Default, Deserialize)]
pub struct UpdateLotInput {
    pub variety: Option<String>,
    pub supplier: Option<String>,
    pub lot_code: Option<String>,
    pub received_at: Option<NaiveDate>,
    pub unit: Option<Unit>,
    pub qty: Option<f64>,
}

/// Lot enriched with live balance figures in every display unit
///
/// The kilogram figures are authoritative; sack and bag are derived with
/// the settings in force at read time.
#[derive(Debug, Clone, Serialize)]
pub struct LotWithBalances {
    #[serde(flatten)]
    pub lot: SeedLot,
    pub intake: UnitBreakdown,
    pub moved_out: UnitBreakdown,
    pub balance: UnitBreakdown,
    pub treated: UnitBreakdown,
    pub treated_available: UnitBreakdown,
}

/// Response for a successful lot deletion
#[derive(Debug, Serialize)]
pub struct RemovedLot {
    pub ok: bool,
    pub removed_id: Uuid,
}

/// Lot service
#[derive(Clone)]
pub struct LotService {
    store: Store,
    hub: UpdateHub,
}

impl LotService {
    pub fn new(store: Store, hub: UpdateHub) -> Self {
        Self { store, hub }
    }

    /// Register a received lot
    ///
    /// `qty_kg` is computed with the settings at this moment and stays
    /// fixed until the lot is edited.
    pub async fn create(&self, by: &str, input: CreateLotInput) -> AppResult<SeedLot> {
        validate_required(&input.variety).map_err(|m| AppError::validation("variety", m))?;
        validate_required(&input.supplier).map_err(|m| AppError::validation("supplier", m))?;
        validate_required(&input.lot_code).map_err(|m| AppError::validation("lot_code", m))?;
        validate_qty(input.qty).map_err(|m| AppError::validation("qty", m))?;

        let (lot, event) = self
            .store
            .mutate(|ledger| {
                let qty_kg = to_kg(input.qty, input.unit, &ledger.settings);
                let lot = SeedLot {
                    id: Uuid::new_v4(),
                    variety: input.variety,
                    supplier: input.supplier,
                    lot_code: input.lot_code,
                    received_at: input.received_at,
                    unit: input.unit,
                    qty: input.qty,
                    qty_kg,
                };
                ledger.seed_lots.push(lot.clone());
                let event = ledger.record_event(
                    by,
                    EntityKind::Lot,
                    AuditAction::Create,
                    lot.id.to_string(),
                    serde_json::json!({
                        "variety": lot.variety.clone(),
                        "lot_code": lot.lot_code.clone(),
                    }),
                );
                Ok((lot, event))
            })
            .await?;

        self.hub.data_update(EntityKind::Lot);
        self.hub.alarm(&event);
        Ok(lot)
    }

    /// All lots with their intake / moved-out / balance / treated figures
    pub async fn list(&self) -> Vec<LotWithBalances> {
        self.store
            .read(|ledger| {
                ledger
                    .seed_lots
                    .iter()
                    .map(|lot| {
                        let moved = used_kg_in_movements(&ledger.movements, lot.id);
                        LotWithBalances {
                            lot: lot.clone(),
                            intake: UnitBreakdown::from_kg_value(lot.qty_kg, &ledger.settings),
                            moved_out: UnitBreakdown::from_kg_value(moved, &ledger.settings),
                            balance: UnitBreakdown::from_kg_value(
                                balance_kg(lot, &ledger.movements),
                                &ledger.settings,
                            ),
                            treated: UnitBreakdown::from_kg_value(
                                treated_kg(&ledger.treatments, lot.id),
                                &ledger.settings,
                            ),
                            treated_available: UnitBreakdown::from_kg_value(
                                treated_available_kg(lot, &ledger.treatments, &ledger.movements),
                                &ledger.settings,
                            ),
                        }
                    })
                    .collect()
            })
            .await
    }

    /// Edit a lot, recomputing `qty_kg` with the current settings
    ///
    /// Rejected when the new intake would undercut what already shipped.
    pub async fn update(&self, by: &str, id: Uuid, input: UpdateLotInput) -> AppResult<SeedLot> {
        if let Some(ref variety) = input.variety {
            validate_required(variety).map_err(|m| AppError::validation("variety", m))?;
        }
        if let Some(ref supplier) = input.supplier {
            validate_required(supplier).map_err(|m| AppError::validation("supplier", m))?;
        }
        if let Some(ref lot_code) = input.lot_code {
            validate_required(lot_code).map_err(|m| AppError::validation("lot_code", m))?;
        }
        if let Some(qty) = input.qty {
            validate_qty(qty).map_err(|m| AppError::validation("qty", m))?;
        }

        let (lot, event) = self
            .store
            .mutate(|ledger| {
                let settings = ledger.settings;
                let already_moved = used_kg_in_movements(&ledger.movements, id);

                let lot = ledger
                    .lot_mut(id)
                    .ok_or_else(|| AppError::NotFound("Lot".to_string()))?;

                let unit = input.unit.unwrap_or(lot.unit);
                let qty = input.qty.unwrap_or(lot.qty);
                let new_qty_kg = to_kg(qty, unit, &settings);

                if new_qty_kg < already_moved - EPSILON {
                    return Err(AppError::InvariantViolation(
                        "New volume is smaller than the quantity already shipped".to_string(),
                    ));
                }

                if let Some(variety) = input.variety {
                    lot.variety = variety;
                }
                if let Some(supplier) = input.supplier {
                    lot.supplier = supplier;
                }
                if let Some(lot_code) = input.lot_code {
                    lot.lot_code = lot_code;
                }
                if let Some(received_at) = input.received_at {
                    lot.received_at = received_at;
                }
                lot.unit = unit;
                lot.qty = qty;
                lot.qty_kg = new_qty_kg;

                let updated = lot.clone();
                let event = ledger.record_event(
                    by,
                    EntityKind::Lot,
                    AuditAction::Update,
                    id.to_string(),
                    serde_json::json!({
                        "variety": updated.variety.clone(),
                        "lot_code": updated.lot_code.clone(),
                    }),
                );
                Ok((updated, event))
            })
            .await?;

        self.hub.data_update(EntityKind::Lot);
        self.hub.alarm(&event);
        Ok(lot)
    }

    /// Delete a lot with no dependents
    ///
    /// Treatments and movements hold weak references; deletion is refused
    /// while any of them still points at this lot.
    pub async fn delete(&self, by: &str, id: Uuid) -> AppResult<RemovedLot> {
        let (removed_id, event) = self
            .store
            .mutate(|ledger| {
                let has_treatments = ledger.treatments.iter().any(|t| t.lot_id == id);
                let has_movements = ledger.movements.iter().any(|m| m.lot_id == id);
                if has_treatments || has_movements {
                    return Err(AppError::ReferentialIntegrity(
                        "Lot still has treatments or movements attached".to_string(),
                    ));
                }

                let idx = ledger
                    .seed_lots
                    .iter()
                    .position(|l| l.id == id)
                    .ok_or_else(|| AppError::NotFound("Lot".to_string()))?;

                let removed = ledger.seed_lots.remove(idx);
                let event = ledger.record_event(
                    by,
                    EntityKind::Lot,
                    AuditAction::Delete,
                    removed.id.to_string(),
                    serde_json::json!({}),
                );
                Ok((removed.id, event))
            })
            .await?;

        self.hub.data_update(EntityKind::Lot);
        self.hub.alarm(&event);
        Ok(RemovedLot {
            ok: true,
            removed_id,
        })
    }
}
