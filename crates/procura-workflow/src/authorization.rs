//! Who may sign or revert which slot.
//!
//! These checks are pure: they read the acting user and the slot as
//! currently persisted and either allow the operation or name the rule
//! that forbids it. Nothing is mutated on either path.

use procura_core::models::signature::{Role, SignatureSlot};
use procura_core::models::user::User;

use crate::error::WorkflowError;

/// Check whether `actor` may sign `role`'s slot.
///
/// The actor needs a signature on file and must either hold `role` or be
/// an override signer. The submitter slot can additionally only be
/// signed by the user designated on it (or an override signer).
pub fn authorize_sign(actor: &User, role: Role, slot: &SignatureSlot) -> Result<(), WorkflowError> {
    if actor.signed_image.is_none() {
        return Err(WorkflowError::NoSignatureOnFile { user_id: actor.id });
    }

    if actor.is_override_signer() {
        return Ok(());
    }

    let held = actor.signature_role.and_then(|r| r.as_role());
    if held != Some(role) {
        return Err(WorkflowError::RoleMismatch {
            required: role,
            actual: actor.signature_role,
        });
    }

    match role {
        Role::Submitter if slot.signed_by != Some(actor.id) => {
            Err(WorkflowError::NotDesignatedSubmitter)
        }
        Role::Submitter | Role::Manager | Role::GeneralManager | Role::FinanceDepartment => Ok(()),
    }
}

/// Check whether `actor` may revert `role`'s slot.
///
/// Admins and override signers may revert any signed slot. Otherwise the
/// original signer may revert an approver slot, and nobody else may
/// revert the submitter slot.
pub fn authorize_revert(
    actor: &User,
    role: Role,
    slot: &SignatureSlot,
) -> Result<(), WorkflowError> {
    if !slot.is_signed() {
        return Err(WorkflowError::NothingToRevert { role });
    }

    if actor.is_admin() || actor.is_override_signer() {
        return Ok(());
    }

    match role {
        Role::Submitter => Err(WorkflowError::SubmitterRevertRestricted),
        Role::Manager | Role::GeneralManager | Role::FinanceDepartment => {
            if slot.signed_by == Some(actor.id) {
                Ok(())
            } else {
                Err(WorkflowError::NotOriginalSigner { role })
            }
        }
    }
}
