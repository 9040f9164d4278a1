//! Department domain model.
//!
//! Departments scope purchase order numbering and restrict what
//! `user`-tier accounts can see.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    /// Short prefix used in purchase order numbers (e.g., `OPS`).
    pub code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDepartment {
    pub name: String,
    pub code: String,
}
