//! Unit settings service

use shared::models::UnitSettings;
use shared::types::{AuditAction, EntityKind};
use shared::validation::validate_unit_settings;

use crate::error::{AppError, AppResult};
use crate::live::UpdateHub;
use crate::store::Store;

/// Service for reading and replacing the global unit ratios
#[derive(Clone)]
pub struct SettingsService {
    store: Store,
    hub: UpdateHub,
}

impl SettingsService {
    pub fn new(store: Store, hub: UpdateHub) -> Self {
        Self { store, hub }
    }

    /// Current ratios
    pub async fn get(&self) -> UnitSettings {
        self.store.read(|ledger| ledger.settings).await
    }

    /// Wholesale replace; last write wins, no history kept
    pub async fn replace(&self, by: &str, input: UnitSettings) -> AppResult<UnitSettings> {
        validate_unit_settings(&input).map_err(|m| AppError::validation("settings", m))?;

        let (settings, event) = self
            .store
            .mutate(|ledger| {
                ledger.settings = input;
                let event = ledger.record_event(
                    by,
                    EntityKind::Settings,
                    AuditAction::Update,
                    "settings",
                    serde_json::to_value(input)?,
                );
                Ok((ledger.settings, event))
            })
            .await?;

        self.hub.data_update(EntityKind::Settings);
        self.hub.alarm(&event);
        Ok(settings)
    }
}
