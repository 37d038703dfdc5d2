//! Shared types and domain logic for the Seed Treatment Tracker
//!
//! This crate contains the models, unit conversion, and balance arithmetic
//! shared between the backend and any future frontend components. It does
//! no I/O; every function takes its inputs explicitly so the logic is
//! testable in isolation.

pub mod balance;
pub mod models;
pub mod types;
pub mod units;
pub mod validation;

pub use balance::*;
pub use models::*;
pub use types::*;
pub use units::*;
pub use validation::*;
