//! Error types for the Procura system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcuraError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("User {user_id} has no signature on file")]
    NoSignatureOnFile { user_id: String },

    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("Nothing to revert: {role} slot is not signed")]
    NothingToRevert { role: String },

    #[error("Concurrent modification of {entity} with id {id}")]
    ConcurrentModification { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProcuraResult<T> = Result<T, ProcuraError>;
