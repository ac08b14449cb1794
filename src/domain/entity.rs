//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.
//! All entities must have a unique ID and be thread-safe.

use serde::{Deserialize, Serialize};

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Clone + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
///
/// Remote failures carry the provider's message verbatim; there are no
/// structured error codes beyond the variant itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainError {
    NotFound(String),
    InvalidInput(String),
    /// A bounded collection refused another entry
    Capacity(String),
    /// Another unit of work already holds the submission token
    Conflict(String),
    /// The operation deadline elapsed before the remote call returned
    Timeout(String),
    Database(String),
    Storage(String),
    Capture(String),
    Internal(String),
}

impl DomainError {
    /// The underlying message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            DomainError::NotFound(msg)
            | DomainError::InvalidInput(msg)
            | DomainError::Capacity(msg)
            | DomainError::Conflict(msg)
            | DomainError::Timeout(msg)
            | DomainError::Database(msg)
            | DomainError::Storage(msg)
            | DomainError::Capture(msg)
            | DomainError::Internal(msg) => msg,
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            DomainError::Capacity(msg) => write!(f, "Capacity reached: {}", msg),
            DomainError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            DomainError::Timeout(msg) => {
                write!(f, "Timed out: {} - check your connection", msg)
            }
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::Storage(msg) => write!(f, "Storage error: {}", msg),
            DomainError::Capture(msg) => write!(f, "Capture error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
