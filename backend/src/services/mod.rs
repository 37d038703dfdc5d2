//! Business logic services for the Seed Treatment Tracker
//!
//! One service per entity; each re-derives the affected lot's aggregates
//! on every mutation attempt and rejects before anything is written.

pub mod audit;
pub mod lot;
pub mod movement;
pub mod settings;
pub mod treatment;

pub use audit::AuditService;
pub use lot::LotService;
pub use movement::MovementService;
pub use settings::SettingsService;
pub use treatment::TreatmentService;

use serde::Serialize;

/// Minimal acknowledgement body for deletes
#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}
