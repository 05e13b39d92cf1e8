//! Shared domain contracts for the raw-material reception workflow
//!
//! These types are pure data: the decision logic that creates and consumes
//! them lives in `reception-core`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Humidity reading above this value flags elevated risk for the verdict.
pub const HIGH_HUMIDITY_THRESHOLD: f64 = 15.0;

/// Upper bound of a plausible humidity reading in percent.
pub const MAX_HUMIDITY_READING: f64 = 30.0;

/// A raw-material delivery registered by the procurement system.
///
/// Read-only to the reception core: the workflow references it but never
/// mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockReceptionOrder {
    pub id: String,
    pub supplier: String,
    pub material: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_price: f64,
    pub date: DateTime<Utc>,
}

/// Plant roles recognised by the access policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    TechnicalResponsibility,
    FrontDesk,
    Manager,
}

/// The acting person, as supplied by the identity directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorIdentity {
    pub name: String,
    pub role: Role,
}

impl ActorIdentity {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// Phase-1 quality verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityStatus {
    Conforme,
    AVerifier,
    NonConforme,
}

/// Material grade selected during the gravel inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialGrade {
    Fine,
    Medium,
    Coarse,
}

/// Result of the humidity test step
///
/// The reading is only meaningful once a photo of the test strip has been
/// captured; the constructor enforces the plausible range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumidityTest {
    pub photo_captured: bool,
    pub reading: f64,
}

impl HumidityTest {
    /// Build a humidity test result, rejecting readings outside `(0, 30]`
    pub fn new(photo_captured: bool, reading: f64) -> Result<Self, String> {
        if reading <= 0.0 || reading > MAX_HUMIDITY_READING {
            return Err(format!(
                "Humidity reading {} out of range (expected 0 < r <= {})",
                reading, MAX_HUMIDITY_READING
            ));
        }
        Ok(Self {
            photo_captured,
            reading,
        })
    }

    /// Elevated humidity flag, derived from the reading alone
    pub fn is_high_humidity(&self) -> bool {
        self.reading > HIGH_HUMIDITY_THRESHOLD
    }
}

/// Result of the gravel/material inspection step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GravelInspection {
    pub photo_captured: bool,
    pub grade: MaterialGrade,
}

/// The immutable Phase-1 verdict record
///
/// Created once when the technician submits the assessment; the validation
/// gate reads it but never rewrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityCheckData {
    pub humidity: HumidityTest,
    pub gravel: GravelInspection,
    pub status: QualityStatus,
    pub notes: Option<String>,
    pub technician: ActorIdentity,
    pub recorded_at: DateTime<Utc>,
}

/// Action recommended by the front desk after verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationAction {
    AcceptWithConditions,
    Reject,
    RequestNewInspection,
}

/// Disposition recorded by the front desk when a delivery is turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionAction {
    ReturnToSupplier,
    PartialUse,
    AdditionalInspection,
}

/// Evidence collected by a sub-flow: justification, photo and a chosen action
///
/// The verification and rejection sub-flows share this shape and differ only
/// in their action enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceForm<A> {
    pub reason: String,
    pub photo_captured: bool,
    pub action: A,
    pub notes: Option<String>,
    pub submitted_by: ActorIdentity,
    pub submitted_at: DateTime<Utc>,
}

pub type VerificationFormData = EvidenceForm<VerificationAction>;
pub type RejectionFormData = EvidenceForm<RejectionAction>;

/// Terminal result handed to the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReceptionOutcome {
    Validated {
        order_id: String,
        confirmed_quantity: f64,
        total_amount: f64,
    },
    Rejected {
        order_id: String,
        form: RejectionFormData,
    },
}

impl ReceptionOutcome {
    pub fn order_id(&self) -> &str {
        match self {
            Self::Validated { order_id, .. } => order_id,
            Self::Rejected { order_id, .. } => order_id,
        }
    }
}
