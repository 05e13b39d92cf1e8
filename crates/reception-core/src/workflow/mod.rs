//! Two-phase reception workflow: technical inspection, then commercial
//! validation gated on the quality verdict

pub mod assessment;
pub mod gate;
pub mod state;
pub mod store;
pub mod subflows;
pub mod traits;

pub use assessment::{AssessmentStep, AssessmentSummary, QualityAssessment};
pub use gate::{blocking_reason, can_validate, is_blocked, ValidationGate, WorkflowProgress};
pub use state::{ReceptionPhase, WorkflowId, WorkflowState, WorkflowStatus};
pub use store::{HealthCheckResult, HealthStatus, StatusCountMap, WorkflowStore};
pub use subflows::{RejectionSubflow, VerificationSubflow};
pub use traits::{EvidenceCapture, EvidenceKind, IdentityDirectory, ReceptionPersistence};
