//! Purchase order domain model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProcuraError;
use crate::models::signature::Signatures;

/// Lifecycle status of a purchase order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PoStatus {
    Pending,
    Approved,
    Rejected,
    /// Legacy value found in historical data. Behaves as `Pending`.
    Signed,
}

impl PoStatus {
    /// The status as seen by the workflow: legacy `Signed` reads as `Pending`.
    pub fn effective(self) -> Self {
        match self {
            PoStatus::Signed => PoStatus::Pending,
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PoStatus::Pending => "Pending",
            PoStatus::Approved => "Approved",
            PoStatus::Rejected => "Rejected",
            PoStatus::Signed => "Signed",
        }
    }
}

impl fmt::Display for PoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoStatus {
    type Err = ProcuraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(PoStatus::Pending),
            "Approved" => Ok(PoStatus::Approved),
            "Rejected" => Ok(PoStatus::Rejected),
            "Signed" => Ok(PoStatus::Signed),
            other => Err(ProcuraError::Validation {
                message: format!("unknown purchase order status: {other}"),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Uuid,
    /// Department-scoped sequence string, assigned once at creation.
    pub po_number: String,
    pub status: PoStatus,
    pub department_id: Uuid,
    pub description: String,
    /// Vendor, line items and totals. Opaque to the workflow.
    pub details: serde_json::Value,
    pub created_by: Uuid,
    pub signatures: Signatures,
    /// Bumped on every write; used as the optimistic-concurrency guard.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Purchase order content supplied by the caller of the workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchaseOrder {
    pub department_id: Uuid,
    pub description: String,
    pub details: Option<serde_json::Value>,
}

/// Fields required to persist a new purchase order.
///
/// `po_number` and `version` are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePurchaseOrder {
    pub department_id: Uuid,
    pub description: String,
    pub details: serde_json::Value,
    pub created_by: Uuid,
    pub signatures: Signatures,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_signed_is_effectively_pending() {
        assert_eq!(PoStatus::Signed.effective(), PoStatus::Pending);
        assert_eq!(PoStatus::Approved.effective(), PoStatus::Approved);
    }

    #[test]
    fn status_parses_stored_names() {
        assert_eq!("Rejected".parse::<PoStatus>().unwrap(), PoStatus::Rejected);
        assert!("approved".parse::<PoStatus>().is_err());
    }
}
