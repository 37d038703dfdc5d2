//! File-backed ledger store
//!
//! The whole ledger is one JSON document on disk, loaded at boot and held
//! in memory behind a single global mutex. The lock is global rather than
//! per-lot because the gatekeeper invariants span all three collections
//! (movements are checked against treatments and lots), so every
//! read-validate-write sequence must see a consistent snapshot.
//!
//! Mutations are all-or-nothing: the closure runs against a working copy
//! that replaces the live ledger and reaches disk only if the closure and
//! the write both succeed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use shared::models::{AuditEvent, Movement, SeedLot, Treatment, UnitSettings};
use shared::types::{AuditAction, EntityKind};

use crate::error::AppResult;

/// Everything the tracker persists, as one document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub settings: UnitSettings,
    #[serde(default)]
    pub seed_lots: Vec<SeedLot>,
    #[serde(default)]
    pub treatments: Vec<Treatment>,
    #[serde(default)]
    pub movements: Vec<Movement>,
    #[serde(default)]
    pub events: Vec<AuditEvent>,
}

impl Ledger {
    /// Look up a lot by id
    pub fn lot(&self, id: Uuid) -> Option<&SeedLot> {
        self.seed_lots.iter().find(|l| l.id == id)
    }

    /// Look up a lot by id, mutably
    pub fn lot_mut(&mut self, id: Uuid) -> Option<&mut SeedLot> {
        self.seed_lots.iter_mut().find(|l| l.id == id)
    }

    /// Append an audit event and return it for broadcasting
    pub fn record_event(
        &mut self,
        by: &str,
        entity: EntityKind,
        action: AuditAction,
        ref_id: impl Into<String>,
        details: serde_json::Value,
    ) -> AuditEvent {
        let event = AuditEvent {
            id: Uuid::new_v4(),
            when: Utc::now(),
            by: by.to_string(),
            entity,
            action,
            ref_id: ref_id.into(),
            details,
        };
        self.events.push(event.clone());
        event
    }
}

/// Handle on the persisted ledger
#[derive(Clone)]
pub struct Store {
    ledger: Arc<Mutex<Ledger>>,
    path: Arc<PathBuf>,
}

impl Store {
    /// Open the ledger file, creating it with defaults on first boot
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }

        let ledger = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            let ledger = Ledger::default();
            persist(&path, &ledger)?;
            ledger
        };

        Ok(Self {
            ledger: Arc::new(Mutex::new(ledger)),
            path: Arc::new(path),
        })
    }

    /// Run a read-only closure against a consistent ledger snapshot
    pub async fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        let guard = self.ledger.lock().await;
        f(&guard)
    }

    /// Run a mutation as an all-or-nothing transaction
    ///
    /// The closure receives a working copy. On success the copy is written
    /// to disk and swapped in; on rejection (or a failed write) neither the
    /// in-memory ledger nor the file changes.
    pub async fn mutate<R>(&self, f: impl FnOnce(&mut Ledger) -> AppResult<R>) -> AppResult<R> {
        let mut guard = self.ledger.lock().await;
        let mut draft = guard.clone();
        let out = f(&mut draft)?;
        persist(&self.path, &draft)?;
        *guard = draft;
        Ok(out)
    }
}

fn persist(path: &Path, ledger: &Ledger) -> AppResult<()> {
    let raw = serde_json::to_string_pretty(ledger)?;
    std::fs::write(path, raw)?;
    Ok(())
}
