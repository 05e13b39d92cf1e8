//! Error types for the reception core

use thiserror::Error;

/// Main error type for all reception workflow operations
#[derive(Error, Debug)]
pub enum ReceptionError {
    /// A required field is missing or out of range. Callers normally avoid
    /// this by consulting the `can_*` guards before acting.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// An actor attempted an action its role does not grant. This is a
    /// caller bug, not recoverable user input.
    #[error("Policy violation: {0}")]
    Policy(String),

    #[error("Workflow error: {0}")]
    Workflow(String),

    /// The workflow already reached `Validated` or `Rejected`
    #[error("Workflow is terminal: {0}")]
    Terminal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The persistence collaborator refused the finalize call. The
    /// in-memory state is preserved so the call can be retried.
    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Result type for reception operations
pub type Result<T> = std::result::Result<T, ReceptionError>;
