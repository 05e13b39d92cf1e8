//! Reception core library
//!
//! Decision logic for the two-phase raw-material reception workflow: a
//! technical quality inspection whose verdict gates the front desk's
//! commercial validation. Rendering, image storage and the commercial
//! system of record are external collaborators behind traits.

pub mod config;
pub mod directory;
pub mod error;
pub mod paths;
pub mod roles;
pub mod workflow;

// Re-export main types for easy access
pub use config::ReceptionConfig;
pub use directory::StaticDirectory;
pub use error::{ReceptionError, Result};
pub use roles::{Capability, RoleAccessPolicy};

pub use workflow::{
    blocking_reason,
    can_validate,
    is_blocked,
    AssessmentStep,
    EvidenceCapture,
    EvidenceKind,
    HealthCheckResult,
    HealthStatus,
    IdentityDirectory,
    QualityAssessment,
    ReceptionPersistence,
    ReceptionPhase,
    RejectionSubflow,
    StatusCountMap,
    ValidationGate,
    VerificationSubflow,
    WorkflowId,
    WorkflowProgress,
    WorkflowState,
    WorkflowStatus,
    WorkflowStore,
};
