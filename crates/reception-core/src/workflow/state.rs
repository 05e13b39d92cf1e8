//! Workflow aggregate state and its status machine

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reception_types::{
    QualityCheckData, ReceptionOutcome, RejectionFormData, StockReceptionOrder,
    VerificationFormData,
};

/// Strongly typed WorkflowId
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowId(String);

impl WorkflowId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|_| Self(s.to_string()))
            .map_err(|e| format!("Invalid WorkflowId format: {}", e))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WorkflowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse phase of a reception workflow, for progress rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceptionPhase {
    TechnicalInspection,
    CommercialValidation,
    Closed,
}

/// Status machine of the two-phase reception workflow
///
/// Phase 1 submission moves `AwaitingTechnical` to one of the verdict
/// states; the validation gate drives everything after that. `Validated`
/// and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    AwaitingTechnical,
    VerdictConforme,
    VerdictNeedsVerification,
    VerdictNonConforme,
    VerifiedAccepted,
    VerifiedRejected,
    VerifiedReinspect,
    RejectionRecorded,
    Validated,
    Rejected,
}

impl WorkflowStatus {
    pub const ALL: [WorkflowStatus; 10] = [
        Self::AwaitingTechnical,
        Self::VerdictConforme,
        Self::VerdictNeedsVerification,
        Self::VerdictNonConforme,
        Self::VerifiedAccepted,
        Self::VerifiedRejected,
        Self::VerifiedReinspect,
        Self::RejectionRecorded,
        Self::Validated,
        Self::Rejected,
    ];

    /// Get directory name for file storage
    pub fn directory_name(&self) -> &'static str {
        match self {
            Self::AwaitingTechnical => "awaiting_technical",
            Self::VerdictConforme => "verdict_conforme",
            Self::VerdictNeedsVerification => "verdict_needs_verification",
            Self::VerdictNonConforme => "verdict_non_conforme",
            Self::VerifiedAccepted => "verified_accepted",
            Self::VerifiedRejected => "verified_rejected",
            Self::VerifiedReinspect => "verified_reinspect",
            Self::RejectionRecorded => "rejection_recorded",
            Self::Validated => "validated",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_directory_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.directory_name() == name)
    }

    /// Terminal statuses accept no further mutation
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Validated | Self::Rejected)
    }

    pub fn phase(&self) -> ReceptionPhase {
        match self {
            Self::AwaitingTechnical => ReceptionPhase::TechnicalInspection,
            Self::Validated | Self::Rejected => ReceptionPhase::Closed,
            _ => ReceptionPhase::CommercialValidation,
        }
    }
}

/// Aggregate record for one delivery's reception workflow
///
/// Carries the verdict, the optional sub-flow outputs and the confirmed
/// quantity. Mutated only through the two engines; once a terminal status
/// is reached the engines refuse every further mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub workflow_id: WorkflowId,
    pub order: StockReceptionOrder,
    pub status: WorkflowStatus,
    pub quality_check: Option<QualityCheckData>,
    pub verification_form: Option<VerificationFormData>,
    pub rejection_form: Option<RejectionFormData>,
    pub confirmed_quantity: Option<f64>,

    /// Terminal outcome staged for the persistence collaborator; kept here
    /// so a failed finalize can be retried without redoing the workflow.
    pub pending_outcome: Option<ReceptionOutcome>,

    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowState {
    /// Open a fresh workflow for a delivery awaiting technical inspection
    pub fn new(order: StockReceptionOrder) -> Self {
        let now = Utc::now();
        Self {
            workflow_id: WorkflowId::new(),
            order,
            status: WorkflowStatus::AwaitingTechnical,
            quality_check: None,
            verification_form: None,
            rejection_form: None,
            confirmed_quantity: None,
            pending_outcome: None,
            started_at: now,
            updated_at: now,
        }
    }

    pub fn phase(&self) -> ReceptionPhase {
        self.status.phase()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
