//! Common enums used across the tracker

use serde::{Deserialize, Serialize};

/// Measurement unit a quantity was recorded in
///
/// `sc` (sack) and `bag` (bulk bag) convert to kilograms via the global
/// unit settings; `kg` is the authoritative unit everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Sc,
    Bag,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::Sc => "sc",
            Unit::Bag => "bag",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "kg" => Some(Unit::Kg),
            "sc" => Some(Unit::Sc),
            "bag" => Some(Unit::Bag),
            _ => None,
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an outbound movement is headed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationType {
    /// A crop field
    Lavoura,
    /// A farm
    Fazenda,
}

impl DestinationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DestinationType::Lavoura => "lavoura",
            DestinationType::Fazenda => "fazenda",
        }
    }
}

/// Entity kind attached to audit events and live-update notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Settings,
    Lot,
    Treatment,
    Movement,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Settings => "settings",
            EntityKind::Lot => "lot",
            EntityKind::Treatment => "treatment",
            EntityKind::Movement => "movement",
        }
    }
}

/// What a mutation did, for the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }
}
