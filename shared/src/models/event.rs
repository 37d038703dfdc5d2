//! Audit trail model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{AuditAction, EntityKind};

/// Append-only log entry recorded on every mutating operation
///
/// Events are write-once: never edited or deleted, read through a capped
/// most-recent-first query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub when: DateTime<Utc>,
    /// Caller identity, for audit only; carries no authorization
    pub by: String,
    pub entity: EntityKind,
    pub action: AuditAction,
    pub ref_id: String,
    pub details: serde_json::Value,
}

impl AuditEvent {
    /// Human-readable line broadcast to live clients as an alarm
    pub fn alarm_message(&self) -> String {
        format!(
            "[{}] {} {} {} ({})",
            self.when.format("%Y-%m-%d %H:%M:%S"),
            self.by,
            self.action.as_str(),
            self.entity.as_str(),
            self.ref_id
        )
    }
}
