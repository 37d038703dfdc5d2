//! Domain models for the Seed Treatment Tracker

pub mod event;
pub mod lot;
pub mod movement;
pub mod settings;
pub mod treatment;

pub use event::AuditEvent;
pub use lot::SeedLot;
pub use movement::Movement;
pub use settings::UnitSettings;
pub use treatment::Treatment;
