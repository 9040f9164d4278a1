//! Database-specific error types and conversions.

use procura_core::error::ProcuraError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Version conflict on {entity} with id {id}")]
    Conflict { entity: String, id: String },

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<DbError> for ProcuraError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ProcuraError::NotFound { entity, id },
            DbError::Conflict { entity, id } => ProcuraError::ConcurrentModification { entity, id },
            DbError::Sqlx(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                ProcuraError::AlreadyExists {
                    entity: e.table().unwrap_or("record").to_string(),
                }
            }
            other => ProcuraError::Database(other.to_string()),
        }
    }
}
