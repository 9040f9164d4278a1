//! Mapping from workflow transitions to notification events.
//!
//! Events are keyed on the observed slot edge rather than on the call
//! that produced it, so repeating a sign that already took effect
//! yields no event.

use chrono::{DateTime, Utc};
use procura_core::models::notification::{NotificationKind, WorkflowEvent};
use procura_core::models::purchase_order::PurchaseOrder;
use procura_core::models::signature::Role;
use uuid::Uuid;

use crate::state_machine::SlotTransition;

pub fn event_for(po: &PurchaseOrder, kind: NotificationKind, at: DateTime<Utc>) -> WorkflowEvent {
    WorkflowEvent {
        po_id: po.id,
        po_number: po.po_number.clone(),
        kind,
        occurred_at: at,
    }
}

/// The notification a sign or revert calls for, if any.
///
/// Only an unsigned → signed edge notifies: the submitter signing
/// releases the approvers, an approver signing informs the submitter.
/// Reverts never notify.
pub fn signature_event(
    po: &PurchaseOrder,
    transition: &SlotTransition,
    actor_id: Uuid,
    at: DateTime<Utc>,
) -> Option<WorkflowEvent> {
    if !transition.became_signed() {
        return None;
    }

    let kind = match transition.role {
        Role::Submitter => NotificationKind::ApproversNotificationRequired {
            submitter_id: actor_id,
        },
        role @ (Role::Manager | Role::GeneralManager | Role::FinanceDepartment) => {
            NotificationKind::ApproverSignedNotifySubmitter {
                role,
                approver_id: actor_id,
                submitter_id: po.signatures.submitter.signed_by,
            }
        }
    };

    Some(event_for(po, kind, at))
}
