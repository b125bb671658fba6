//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the registry invariants.
/// These are independent of I/O and configuration concerns.
///
/// Ids are carried in their rendered form so the error type stays
/// independent of the key type a builder is instantiated with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("duplicate node id: {0}")]
    DuplicateId(String),

    #[error("node {child} already has parent {parent}")]
    AlreadyHasParent { child: String, parent: String },

    #[error("node cannot be its own parent: {0}")]
    SelfParent(String),

    #[error("self edge rejected for node: {0}")]
    SelfEdge(String),

    #[error("cycle detected in hierarchy at: {0}")]
    CycleDetected(String),
}

impl DomainError {
    /// True for the compile-time validation failure, as opposed to usage
    /// errors raised while the registry is being populated.
    pub fn is_cycle(&self) -> bool {
        matches!(self, DomainError::CycleDetected(_))
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
