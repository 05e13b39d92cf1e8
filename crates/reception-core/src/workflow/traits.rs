//! Collaborator seams for the reception workflow
//!
//! Everything the decision logic needs from the outside world comes in
//! through these traits, so the engines stay testable with mocks.

use async_trait::async_trait;

use reception_types::{ActorIdentity, ReceptionOutcome};

use crate::error::Result;

/// Which workflow step a photo capture belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceKind {
    Humidity,
    Gravel,
    Verification,
    Rejection,
}

impl EvidenceKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Humidity => "humidity",
            Self::Gravel => "gravel",
            Self::Verification => "verification",
            Self::Rejection => "rejection",
        }
    }
}

/// External identity/role provider
///
/// The core only needs the current actor and the technician pool; in
/// production this fronts the plant's auth directory.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn current_actor(&self) -> Result<ActorIdentity>;

    /// The technical-responsibility pool an inspector is chosen from
    async fn technicians(&self) -> Result<Vec<ActorIdentity>>;
}

/// Evidence-capture collaborator
///
/// Resolves to whether a photo was actually captured. Abandoning a capture
/// mid-flight is modeled by dropping the returned future; the dependent
/// workflow step then simply stays disabled.
#[async_trait]
pub trait EvidenceCapture: Send + Sync {
    async fn capture_photo(&self, order_id: &str, kind: EvidenceKind) -> Result<bool>;
}

/// Persistence collaborator committing the terminal outcome
///
/// Called once per workflow at the terminal transition. A failure leaves
/// the in-memory state untouched so the call can be retried; to make the
/// retry safe, implementations should be idempotent keyed by order id.
#[async_trait]
pub trait ReceptionPersistence: Send + Sync {
    async fn finalize(&self, outcome: &ReceptionOutcome) -> Result<()>;
}
