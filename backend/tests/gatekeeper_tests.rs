//! Mutation gatekeeper tests
//!
//! Exercises the ledger-consistency rules end to end through the services:
//! - movements are bounded by treated volume and lot balance
//! - lot edits cannot undercut shipped volume
//! - treatment edits/deletes cannot leave movements uncovered
//! - lot deletes respect referential integrity
//! - movement deletes are always permitted

use chrono::NaiveDate;
use proptest::prelude::*;
use uuid::Uuid;

use shared::balance::{treated_kg, used_kg_in_movements};
use shared::models::{Movement, SeedLot, Treatment, UnitSettings};
use shared::types::{DestinationType, Unit};
use shared::units::EPSILON;

use stt_server::error::AppError;
use stt_server::live::UpdateHub;
use stt_server::services::lot::{CreateLotInput, LotService, UpdateLotInput};
use stt_server::services::movement::{CreateMovementInput, MovementService, UpdateMovementInput};
use stt_server::services::treatment::{CreateTreatmentInput, TreatmentService};
use stt_server::store::Store;

struct TestApp {
    lots: LotService,
    treatments: TreatmentService,
    movements: MovementService,
    store: Store,
    _dir: tempfile::TempDir,
}

fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("ledger.json")).unwrap();
    let hub = UpdateHub::new();
    TestApp {
        lots: LotService::new(store.clone(), hub.clone()),
        treatments: TreatmentService::new(store.clone(), hub.clone()),
        movements: MovementService::new(store.clone(), hub),
        store,
        _dir: dir,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn lot_input(unit: Unit, qty: f64) -> CreateLotInput {
    CreateLotInput {
        variety: "Soy 6968".to_string(),
        supplier: "AgroSul".to_string(),
        lot_code: "L-001".to_string(),
        received_at: date(2025, 2, 10),
        unit,
        qty,
    }
}

fn treatment_input(lot_id: Uuid, unit: Unit, qty: f64) -> CreateTreatmentInput {
    CreateTreatmentInput {
        lot_id,
        product: "Standak Top".to_string(),
        dose_per_100kg: 0.2,
        operator: "jose".to_string(),
        treated_at: date(2025, 2, 11),
        unit,
        qty,
    }
}

fn movement_input(lot_id: Uuid, unit: Unit, qty: f64) -> CreateMovementInput {
    CreateMovementInput {
        lot_id,
        destination_type: DestinationType::Lavoura,
        destination_name: "Talhão 3".to_string(),
        moved_at: date(2025, 2, 12),
        unit,
        qty,
        notes: None,
    }
}

// ============================================================================
// Scenario Tests
// ============================================================================

/// Intake in bags converts with the settings in force at creation
#[tokio::test]
async fn test_intake_in_bags_converts_to_kg() {
    let app = test_app();

    let lot = app
        .lots
        .create("maria", lot_input(Unit::Bag, 2.0))
        .await
        .unwrap();

    assert_eq!(lot.qty_kg, 2000.0);
    assert_eq!(lot.qty, 2.0);
    assert_eq!(lot.unit, Unit::Bag);
}

/// A movement larger than the treated volume is rejected with no write
#[tokio::test]
async fn test_movement_exceeding_treated_volume_is_rejected() {
    let app = test_app();

    let lot = app
        .lots
        .create("maria", lot_input(Unit::Bag, 2.0))
        .await
        .unwrap();
    app.treatments
        .create("jose", treatment_input(lot.id, Unit::Kg, 500.0))
        .await
        .unwrap();

    let result = app
        .movements
        .create("maria", movement_input(lot.id, Unit::Kg, 600.0))
        .await;

    match result {
        Err(AppError::InvariantViolation(msg)) => {
            assert!(msg.contains("treated"), "unexpected message: {msg}");
        }
        other => panic!("expected invariant violation, got {:?}", other.map(|m| m.id)),
    }

    // Nothing was written
    assert!(app.store.read(|l| l.movements.is_empty()).await);
}

/// A movement inside the treated headroom is accepted and accounted
#[tokio::test]
async fn test_movement_within_treated_volume_is_accepted() {
    let app = test_app();

    let lot = app
        .lots
        .create("maria", lot_input(Unit::Bag, 2.0))
        .await
        .unwrap();
    app.treatments
        .create("jose", treatment_input(lot.id, Unit::Kg, 500.0))
        .await
        .unwrap();

    app.movements
        .create("maria", movement_input(lot.id, Unit::Kg, 400.0))
        .await
        .unwrap();

    app.store
        .read(|ledger| {
            assert_eq!(used_kg_in_movements(&ledger.movements, lot.id), 400.0);
            assert_eq!(treated_kg(&ledger.treatments, lot.id), 500.0);
        })
        .await;

    let rows = app.lots.list().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].moved_out.kg, 400.0);
    assert_eq!(rows[0].balance.kg, 1600.0);
    assert_eq!(rows[0].treated.kg, 500.0);
    assert_eq!(rows[0].treated_available.kg, 100.0);
}

/// Deleting the only treatment behind a recorded movement is refused
#[tokio::test]
async fn test_treatment_delete_leaving_movements_uncovered_is_rejected() {
    let app = test_app();

    let lot = app
        .lots
        .create("maria", lot_input(Unit::Bag, 2.0))
        .await
        .unwrap();
    let treatment = app
        .treatments
        .create("jose", treatment_input(lot.id, Unit::Kg, 500.0))
        .await
        .unwrap();
    app.movements
        .create("maria", movement_input(lot.id, Unit::Kg, 400.0))
        .await
        .unwrap();

    let result = app.treatments.delete("jose", treatment.treatment.id).await;
    assert!(matches!(result, Err(AppError::InvariantViolation(_))));

    // The treatment is still there
    assert_eq!(app.store.read(|l| l.treatments.len()).await, 1);
}

/// Shrinking a lot below its shipped volume is refused
#[tokio::test]
async fn test_lot_shrink_below_shipped_volume_is_rejected() {
    let app = test_app();

    let lot = app
        .lots
        .create("maria", lot_input(Unit::Bag, 2.0))
        .await
        .unwrap();
    app.treatments
        .create("jose", treatment_input(lot.id, Unit::Kg, 500.0))
        .await
        .unwrap();
    app.movements
        .create("maria", movement_input(lot.id, Unit::Kg, 400.0))
        .await
        .unwrap();

    let result = app
        .lots
        .update(
            "maria",
            lot.id,
            UpdateLotInput {
                unit: Some(Unit::Kg),
                qty: Some(300.0),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::InvariantViolation(_))));

    // The lot kept its original figures
    let stored = app
        .store
        .read(|l| l.seed_lots[0].clone())
        .await;
    assert_eq!(stored.qty_kg, 2000.0);
}

// ============================================================================
// Guard Tests
// ============================================================================

/// A movement may not exceed the lot balance even when treated covers it
#[tokio::test]
async fn test_movement_exceeding_lot_balance_is_rejected() {
    let app = test_app();

    let lot = app
        .lots
        .create("maria", lot_input(Unit::Kg, 100.0))
        .await
        .unwrap();
    // Over-treating is representable; shipping is still capped by intake.
    app.treatments
        .create("jose", treatment_input(lot.id, Unit::Kg, 500.0))
        .await
        .unwrap();

    let result = app
        .movements
        .create("maria", movement_input(lot.id, Unit::Kg, 200.0))
        .await;

    match result {
        Err(AppError::InvariantViolation(msg)) => {
            assert!(msg.contains("lot balance"), "unexpected message: {msg}");
        }
        other => panic!("expected invariant violation, got {:?}", other.map(|m| m.id)),
    }
}

/// Movements against an unknown lot are a 404, not an invariant error
#[tokio::test]
async fn test_movement_against_unknown_lot_is_not_found() {
    let app = test_app();

    let result = app
        .movements
        .create("maria", movement_input(Uuid::new_v4(), Unit::Kg, 10.0))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let result = app
        .treatments
        .create("jose", treatment_input(Uuid::new_v4(), Unit::Kg, 10.0))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

/// Deleting a movement is always permitted and returns headroom
#[tokio::test]
async fn test_movement_delete_always_succeeds() {
    let app = test_app();

    let lot = app
        .lots
        .create("maria", lot_input(Unit::Kg, 1000.0))
        .await
        .unwrap();
    app.treatments
        .create("jose", treatment_input(lot.id, Unit::Kg, 1000.0))
        .await
        .unwrap();
    let movement = app
        .movements
        .create("maria", movement_input(lot.id, Unit::Kg, 1000.0))
        .await
        .unwrap();

    let ack = app.movements.delete("maria", movement.id).await.unwrap();
    assert!(ack.ok);

    app.store
        .read(|ledger| {
            assert!(ledger.movements.is_empty());
            assert_eq!(used_kg_in_movements(&ledger.movements, lot.id), 0.0);
        })
        .await;
}

/// Editing a movement excludes its own volume from the already-moved total
#[tokio::test]
async fn test_movement_update_excludes_itself_from_used_total() {
    let app = test_app();

    let lot = app
        .lots
        .create("maria", lot_input(Unit::Kg, 1000.0))
        .await
        .unwrap();
    app.treatments
        .create("jose", treatment_input(lot.id, Unit::Kg, 500.0))
        .await
        .unwrap();
    let movement = app
        .movements
        .create("maria", movement_input(lot.id, Unit::Kg, 400.0))
        .await
        .unwrap();

    // 400 -> 500 fits exactly: the old 400 must not count against itself.
    let updated = app
        .movements
        .update(
            "maria",
            movement.id,
            UpdateMovementInput {
                qty: Some(500.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.qty_kg, 500.0);

    // 501 does not fit.
    let result = app
        .movements
        .update(
            "maria",
            movement.id,
            UpdateMovementInput {
                qty: Some(501.0),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::InvariantViolation(_))));
}

/// Deleting a lot with dependents is refused; without them it succeeds
#[tokio::test]
async fn test_lot_delete_respects_referential_integrity() {
    let app = test_app();

    let lot = app
        .lots
        .create("maria", lot_input(Unit::Kg, 1000.0))
        .await
        .unwrap();
    let treatment = app
        .treatments
        .create("jose", treatment_input(lot.id, Unit::Kg, 100.0))
        .await
        .unwrap();

    let result = app.lots.delete("maria", lot.id).await;
    assert!(matches!(result, Err(AppError::ReferentialIntegrity(_))));

    // The lot is still queryable, unchanged
    let rows = app.lots.list().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].lot.id, lot.id);

    // After removing the dependent, deletion goes through
    app.treatments
        .delete("jose", treatment.treatment.id)
        .await
        .unwrap();
    let removed = app.lots.delete("maria", lot.id).await.unwrap();
    assert!(removed.ok);
    assert_eq!(removed.removed_id, lot.id);
    assert!(app.lots.list().await.is_empty());
}

/// Re-parenting a treatment validates against the target lot's movements
#[tokio::test]
async fn test_treatment_reparent_validates_against_target_lot() {
    let app = test_app();

    let lot_a = app
        .lots
        .create("maria", lot_input(Unit::Kg, 1000.0))
        .await
        .unwrap();
    let mut input_b = lot_input(Unit::Kg, 1000.0);
    input_b.lot_code = "L-002".to_string();
    let lot_b = app.lots.create("maria", input_b).await.unwrap();

    let treatment = app
        .treatments
        .create("jose", treatment_input(lot_a.id, Unit::Kg, 500.0))
        .await
        .unwrap();
    app.movements
        .create("maria", movement_input(lot_a.id, Unit::Kg, 400.0))
        .await
        .unwrap();

    // Moving the treatment to lot B would strand lot A's movement, but the
    // check runs against the target lot, so the edit is accepted and the
    // label switches to lot B.
    let moved = app
        .treatments
        .update(
            "jose",
            treatment.treatment.id,
            stt_server::services::treatment::UpdateTreatmentInput {
                lot_id: Some(lot_b.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.treatment.lot_id, lot_b.id);
    assert!(moved.lot_label.contains("L-002"));
}

/// Validation failures surface the offending field
#[tokio::test]
async fn test_schema_validation_rejections() {
    let app = test_app();

    let mut input = lot_input(Unit::Kg, 100.0);
    input.variety = "  ".to_string();
    match app.lots.create("maria", input).await {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "variety"),
        other => panic!("expected validation error, got {:?}", other.map(|l| l.id)),
    }

    let input = lot_input(Unit::Kg, 0.0);
    match app.lots.create("maria", input).await {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "qty"),
        other => panic!("expected validation error, got {:?}", other.map(|l| l.id)),
    }
}

/// Settings updates are validated and applied wholesale
#[tokio::test]
async fn test_settings_replace_is_validated() {
    let app = test_app();
    let settings_service = stt_server::services::SettingsService::new(
        app.store.clone(),
        UpdateHub::new(),
    );

    let result = settings_service
        .replace(
            "maria",
            UnitSettings {
                kg_per_sc: 0.0,
                kg_per_bag: 1000.0,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation { .. })));

    let updated = settings_service
        .replace(
            "maria",
            UnitSettings {
                kg_per_sc: 50.0,
                kg_per_bag: 800.0,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.kg_per_sc, 50.0);

    // New intakes convert with the new ratios
    let lot = app
        .lots
        .create("maria", lot_input(Unit::Sc, 2.0))
        .await
        .unwrap();
    assert_eq!(lot.qty_kg, 100.0);
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod property_tests {
    use super::*;

    fn lot(qty_kg: f64) -> SeedLot {
        SeedLot {
            id: Uuid::new_v4(),
            variety: "Soy 6968".to_string(),
            supplier: "AgroSul".to_string(),
            lot_code: "L-001".to_string(),
            received_at: date(2025, 2, 10),
            unit: Unit::Kg,
            qty: qty_kg,
            qty_kg,
        }
    }

    fn treatment(lot_id: Uuid, qty_kg: f64) -> Treatment {
        Treatment {
            id: Uuid::new_v4(),
            lot_id,
            product: "Standak Top".to_string(),
            dose_per_100kg: 0.2,
            operator: "jose".to_string(),
            treated_at: date(2025, 2, 11),
            unit: Unit::Kg,
            qty: qty_kg,
            qty_kg,
        }
    }

    fn movement(lot_id: Uuid, qty_kg: f64) -> Movement {
        Movement {
            id: Uuid::new_v4(),
            lot_id,
            destination_type: DestinationType::Fazenda,
            destination_name: "Santa Rita".to_string(),
            moved_at: date(2025, 2, 12),
            unit: Unit::Kg,
            qty: qty_kg,
            qty_kg,
            notes: None,
        }
    }

    /// The create-movement admission rule, as the gatekeeper applies it
    fn movement_fits(
        lot: &SeedLot,
        treatments: &[Treatment],
        movements: &[Movement],
        qty_kg: f64,
    ) -> bool {
        let treated_total = treated_kg(treatments, lot.id);
        let already_moved = used_kg_in_movements(movements, lot.id);
        let treated_available = (treated_total - already_moved).max(0.0);

        qty_kg <= treated_available + EPSILON && qty_kg <= lot.qty_kg - already_moved + EPSILON
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// After any sequence of admitted movements, shipped volume stays
        /// within both the treated total and the intake
        #[test]
        fn prop_admitted_movements_preserve_invariants(
            intake in 100.0f64..50_000.0,
            treated_fraction in 0.0f64..1.5,
            requests in proptest::collection::vec(1.0f64..2_000.0, 1..30),
        ) {
            let l = lot(intake);
            let treatments = vec![treatment(l.id, intake * treated_fraction)];
            let mut movements: Vec<Movement> = Vec::new();

            for qty_kg in requests {
                if movement_fits(&l, &treatments, &movements, qty_kg) {
                    movements.push(movement(l.id, qty_kg));
                }
            }

            let used = used_kg_in_movements(&movements, l.id);
            prop_assert!(used <= treated_kg(&treatments, l.id) + EPSILON);
            prop_assert!(used <= l.qty_kg + EPSILON);
        }

        /// Removing any admitted movement can never break the invariants
        #[test]
        fn prop_movement_removal_is_always_safe(
            intake in 100.0f64..50_000.0,
            requests in proptest::collection::vec(1.0f64..2_000.0, 1..20),
            remove_idx in 0usize..20,
        ) {
            let l = lot(intake);
            let treatments = vec![treatment(l.id, intake)];
            let mut movements: Vec<Movement> = Vec::new();

            for qty_kg in requests {
                if movement_fits(&l, &treatments, &movements, qty_kg) {
                    movements.push(movement(l.id, qty_kg));
                }
            }

            if !movements.is_empty() {
                movements.remove(remove_idx % movements.len());
            }

            let used = used_kg_in_movements(&movements, l.id);
            prop_assert!(used <= treated_kg(&treatments, l.id) + EPSILON);
            prop_assert!(used <= l.qty_kg + EPSILON);
        }
    }
}
