//! Error taxonomy of the matching and fulfillment engine

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by engine operations
///
/// Every operation either commits its whole transaction or returns exactly
/// one of these after rolling back.
#[derive(Error, Debug)]
pub enum MatchingError {
    /// The entity does not exist or is not in the state the operation needs
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// The caller does not own the entity
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Nothing can be transferred between the request and the resource
    #[error(
        "insufficient quantity: request {request_id} needs {outstanding}, resource {resource_id} has {available}"
    )]
    InsufficientQuantity {
        request_id: Uuid,
        resource_id: Uuid,
        outstanding: i32,
        available: i32,
    },

    /// A unique constraint rejected the insert
    #[error("conflict: {0}")]
    Conflict(String),

    /// The input refers to something that cannot take part in the operation
    #[error("invalid input: {0}")]
    Validation(String),

    /// Store or connectivity failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl MatchingError {
    pub(crate) fn not_found(entity: &'static str, id: Uuid) -> Self {
        MatchingError::NotFound { entity, id }
    }
}

/// Type alias for Result with MatchingError
pub type MatchingResult<T> = Result<T, MatchingError>;
