//! Signature slot transitions and the purchase order status they drive.
//!
//! Transitions are computed from the purchase order as read; nothing here
//! touches storage. The resulting [`SlotChange`] is persisted as a
//! field-scoped write, and its [`SlotTransition`] tells the caller
//! whether the slot actually flipped.
//!
//! Status rules:
//! - signing `generalManager` sets `Approved`, whatever the prior status;
//! - reverting `generalManager` sets `Pending`;
//! - other roles never move the status;
//! - [`toggle`] is the administrative override and the only way to reach
//!   `Rejected`.

use chrono::{DateTime, Utc};
use procura_core::models::purchase_order::{PoStatus, PurchaseOrder};
use procura_core::models::signature::{Role, SignatureSlot};
use procura_core::models::user::User;
use procura_core::repository::SlotWrite;

use crate::error::WorkflowError;

/// Signed-ness of one slot before and after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTransition {
    pub role: Role,
    pub was_signed: bool,
    pub is_signed: bool,
}

impl SlotTransition {
    /// Unsigned → signed. This is the edge notifications fire on.
    pub fn became_signed(&self) -> bool {
        !self.was_signed && self.is_signed
    }
}

/// The outcome of a sign or revert: the new slot contents, the status to
/// store alongside it (if it changes), and the observed edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotChange {
    pub role: Role,
    pub slot: SignatureSlot,
    pub status: Option<PoStatus>,
    pub transition: SlotTransition,
}

impl SlotChange {
    /// Turn the change into a storage write guarded by `expected_version`.
    pub fn into_write(self, expected_version: i64) -> SlotWrite {
        SlotWrite {
            role: self.role,
            slot: self.slot,
            status: self.status,
            expected_version: Some(expected_version),
        }
    }
}

/// Sign `role`'s slot as `signer`.
///
/// Signing an already-signed slot overwrites it; the returned transition
/// then reports no edge.
pub fn sign(
    po: &PurchaseOrder,
    role: Role,
    signer: &User,
    now: DateTime<Utc>,
) -> Result<SlotChange, WorkflowError> {
    let image = signer
        .signed_image
        .clone()
        .ok_or(WorkflowError::NoSignatureOnFile { user_id: signer.id })?;

    let was_signed = po.signatures.get(role).is_signed();
    let status = match role {
        Role::GeneralManager => Some(PoStatus::Approved),
        Role::Submitter | Role::Manager | Role::FinanceDepartment => None,
    };

    Ok(SlotChange {
        role,
        slot: SignatureSlot::signed(image, signer.id, now),
        status,
        transition: SlotTransition {
            role,
            was_signed,
            is_signed: true,
        },
    })
}

/// Clear `role`'s slot.
pub fn revert(po: &PurchaseOrder, role: Role) -> Result<SlotChange, WorkflowError> {
    if !po.signatures.get(role).is_signed() {
        return Err(WorkflowError::NothingToRevert { role });
    }

    let status = match role {
        Role::GeneralManager => Some(PoStatus::Pending),
        Role::Submitter | Role::Manager | Role::FinanceDepartment => None,
    };

    Ok(SlotChange {
        role,
        slot: SignatureSlot::default(),
        status,
        transition: SlotTransition {
            role,
            was_signed: true,
            is_signed: false,
        },
    })
}

/// Administrative status flip, independent of any slot. Legacy `Signed`
/// toggles like `Pending`.
pub fn toggle(status: PoStatus) -> PoStatus {
    match status.effective() {
        PoStatus::Approved => PoStatus::Rejected,
        PoStatus::Rejected => PoStatus::Approved,
        PoStatus::Pending | PoStatus::Signed => PoStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{purchase_order, user};
    use procura_core::models::signature::Signatures;
    use procura_core::models::user::{PermissionRole, SignatureRole};

    fn apply(change: SlotChange, po: &mut PurchaseOrder) {
        *po.signatures.get_mut(change.role) = change.slot;
        if let Some(status) = change.status {
            po.status = status;
        }
    }

    #[test]
    fn sign_then_revert_restores_the_slot() {
        let mut po = purchase_order(Signatures::default());
        let before = po.signatures.manager.clone();
        let manager = user(PermissionRole::User, Some(SignatureRole::Manager));

        let change = sign(&po, Role::Manager, &manager, Utc::now()).unwrap();
        apply(change, &mut po);
        assert!(po.signatures.manager.is_signed());
        assert_eq!(po.signatures.manager.signed_by, Some(manager.id));

        apply(revert(&po, Role::Manager).unwrap(), &mut po);
        assert_eq!(po.signatures.manager, before);
        assert_eq!(po.status, PoStatus::Pending);
    }

    #[test]
    fn general_manager_signature_drives_status() {
        let mut po = purchase_order(Signatures::default());
        let gm = user(PermissionRole::User, Some(SignatureRole::GeneralManager));

        let change = sign(&po, Role::GeneralManager, &gm, Utc::now()).unwrap();
        apply(change, &mut po);
        assert_eq!(po.status, PoStatus::Approved);

        apply(revert(&po, Role::GeneralManager).unwrap(), &mut po);
        assert_eq!(po.status, PoStatus::Pending);
    }

    #[test]
    fn general_manager_sign_approves_even_when_rejected() {
        let mut po = purchase_order(Signatures::default());
        po.status = PoStatus::Rejected;
        let gm = user(PermissionRole::User, Some(SignatureRole::GeneralManager));

        let change = sign(&po, Role::GeneralManager, &gm, Utc::now()).unwrap();
        assert_eq!(change.status, Some(PoStatus::Approved));
    }

    #[test]
    fn other_roles_leave_status_alone() {
        let mut po = purchase_order(Signatures::default());
        po.status = PoStatus::Approved;
        let finance = user(PermissionRole::User, Some(SignatureRole::FinanceDepartment));

        let change = sign(&po, Role::FinanceDepartment, &finance, Utc::now()).unwrap();
        assert_eq!(change.status, None);
        apply(change, &mut po);

        let change = revert(&po, Role::FinanceDepartment).unwrap();
        assert_eq!(change.status, None);
    }

    #[test]
    fn resigning_reports_no_edge() {
        let mut po = purchase_order(Signatures::default());
        let manager = user(PermissionRole::User, Some(SignatureRole::Manager));

        let first = sign(&po, Role::Manager, &manager, Utc::now()).unwrap();
        assert!(first.transition.became_signed());
        apply(first, &mut po);

        let second = sign(&po, Role::Manager, &manager, Utc::now()).unwrap();
        assert!(!second.transition.became_signed());
        assert!(second.transition.was_signed);
    }

    #[test]
    fn revert_reports_unsigned_edge() {
        let mut po = purchase_order(Signatures::default());
        let manager = user(PermissionRole::User, Some(SignatureRole::Manager));
        let change = sign(&po, Role::Manager, &manager, Utc::now()).unwrap();
        apply(change, &mut po);

        let change = revert(&po, Role::Manager).unwrap();
        assert!(change.transition.was_signed);
        assert!(!change.transition.is_signed);
        assert!(!change.transition.became_signed());
    }

    #[test]
    fn revert_of_unsigned_slot_fails() {
        let po = purchase_order(Signatures::default());
        assert_eq!(
            revert(&po, Role::Manager).unwrap_err(),
            WorkflowError::NothingToRevert { role: Role::Manager }
        );
    }

    #[test]
    fn toggle_flips_between_approved_and_rejected() {
        assert_eq!(toggle(PoStatus::Approved), PoStatus::Rejected);
        assert_eq!(toggle(PoStatus::Rejected), PoStatus::Approved);
        assert_eq!(toggle(PoStatus::Pending), PoStatus::Pending);
        assert_eq!(toggle(PoStatus::Signed), PoStatus::Pending);
    }

    #[test]
    fn into_write_carries_the_version_guard() {
        let po = purchase_order(Signatures::default());
        let gm = user(PermissionRole::User, Some(SignatureRole::GeneralManager));

        let write = sign(&po, Role::GeneralManager, &gm, Utc::now())
            .unwrap()
            .into_write(7);
        assert_eq!(write.expected_version, Some(7));
        assert_eq!(write.status, Some(PoStatus::Approved));
        assert_eq!(write.role, Role::GeneralManager);
    }
}
