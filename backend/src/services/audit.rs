//! Audit trail queries

use shared::models::AuditEvent;

use crate::store::Store;

/// Default number of events returned when no limit is given
pub const DEFAULT_EVENT_LIMIT: usize = 50;

/// Hard cap on a single events query
pub const MAX_EVENT_LIMIT: usize = 200;

/// Read-side service over the append-only event log
#[derive(Clone)]
pub struct AuditService {
    store: Store,
}

impl AuditService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Most recent events first, limit clamped to `1..=MAX_EVENT_LIMIT`
    pub async fn recent(&self, limit: Option<usize>) -> Vec<AuditEvent> {
        let limit = limit
            .unwrap_or(DEFAULT_EVENT_LIMIT)
            .clamp(1, MAX_EVENT_LIMIT);
        self.store
            .read(|ledger| ledger.events.iter().rev().take(limit).cloned().collect())
            .await
    }
}
