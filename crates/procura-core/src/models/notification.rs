//! Notification events emitted by the approval workflow.
//!
//! The workflow only decides that a notification is required; templating
//! and transport belong to whoever consumes these events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::signature::Role;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NotificationKind {
    /// The designated submitter must sign the purchase order.
    SubmitterSignRequired { submitter_id: Uuid },
    /// The submitter has signed; approvers can now act.
    ApproversNotificationRequired { submitter_id: Uuid },
    /// An approver signed their slot; tell the submitter.
    ApproverSignedNotifySubmitter {
        role: Role,
        approver_id: Uuid,
        submitter_id: Option<Uuid>,
    },
}

impl NotificationKind {
    pub fn name(&self) -> &'static str {
        match self {
            NotificationKind::SubmitterSignRequired { .. } => "SubmitterSignRequired",
            NotificationKind::ApproversNotificationRequired { .. } => {
                "ApproversNotificationRequired"
            }
            NotificationKind::ApproverSignedNotifySubmitter { .. } => {
                "ApproverSignedNotifySubmitter"
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkflowEvent {
    pub po_id: Uuid,
    pub po_number: String,
    pub kind: NotificationKind,
    pub occurred_at: DateTime<Utc>,
}
