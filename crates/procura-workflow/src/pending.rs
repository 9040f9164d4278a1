//! "Waiting on me": which purchase orders need a given user's action.

use procura_core::models::purchase_order::PurchaseOrder;
use procura_core::models::signature::Role;
use procura_core::models::user::{SignatureRole, User};
use uuid::Uuid;

/// What a user is expected to act on, derived from their signature role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingScope {
    /// Purchase orders designating this submitter that they have not signed.
    Submitter(Uuid),
    /// Purchase orders in the workflow with any slot unsigned.
    Override,
    /// Purchase orders in the workflow whose slot for this role is unsigned.
    Approver(Role),
}

impl PendingScope {
    /// `None` when the user holds no signature role.
    pub fn for_user(user: &User) -> Option<Self> {
        match user.signature_role? {
            SignatureRole::Submitter => Some(PendingScope::Submitter(user.id)),
            SignatureRole::OverrideSigner => Some(PendingScope::Override),
            SignatureRole::Manager => Some(PendingScope::Approver(Role::Manager)),
            SignatureRole::GeneralManager => Some(PendingScope::Approver(Role::GeneralManager)),
            SignatureRole::FinanceDepartment => {
                Some(PendingScope::Approver(Role::FinanceDepartment))
            }
        }
    }

    pub fn matches(&self, po: &PurchaseOrder) -> bool {
        let submitter = &po.signatures.submitter;
        match self {
            PendingScope::Submitter(user_id) => {
                submitter.signed_by == Some(*user_id) && !submitter.is_signed()
            }
            PendingScope::Override => {
                submitter.signed_by.is_some() && po.signatures.any_unsigned()
            }
            // Keys on the submitter being designated, not on them having
            // signed: approvers see a purchase order as soon as it enters
            // the workflow.
            PendingScope::Approver(role) => {
                submitter.signed_by.is_some() && !po.signatures.get(*role).is_signed()
            }
        }
    }
}

/// Whether `user` may see purchase orders of `department_id`.
///
/// Only the restricted `user` tier is scoped, and only when it has at
/// least one department assigned.
pub fn is_user_scoped_to_department(user: &User, department_id: Uuid) -> bool {
    if !user.permission_role.is_restricted() || user.departments.is_empty() {
        return true;
    }
    user.departments.contains(&department_id)
}

/// Filter `pos` down to those awaiting `user`, newest first.
pub fn pending_for(
    user: &User,
    pos: impl IntoIterator<Item = PurchaseOrder>,
) -> Vec<PurchaseOrder> {
    let Some(scope) = PendingScope::for_user(user) else {
        return Vec::new();
    };

    let mut pending: Vec<PurchaseOrder> = pos
        .into_iter()
        .filter(|po| scope.matches(po))
        .filter(|po| is_user_scoped_to_department(user, po.department_id))
        .collect();
    pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    pending
}
