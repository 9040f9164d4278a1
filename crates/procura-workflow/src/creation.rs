//! Initial signature slots for a new purchase order.

use chrono::{DateTime, Utc};
use procura_core::models::notification::NotificationKind;
use procura_core::models::signature::{SignatureSlot, Signatures};
use procura_core::models::user::{SignatureRole, User};
use uuid::Uuid;

/// How a new purchase order starts out, and which notification its
/// creation requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationPlan {
    pub signatures: Signatures,
    pub notification: NotificationKind,
}

impl CreationPlan {
    pub fn auto_signed(&self) -> bool {
        self.signatures.submitter.is_signed()
    }
}

/// Decide how the submitter slot is initialized.
///
/// A submitter creating their own purchase order signs it immediately if
/// their signature is on file. Anyone creating on behalf of another user
/// only designates that user; their signature is never applied for them.
pub fn plan_creation(creator: &User, submitter_id: Uuid, now: DateTime<Utc>) -> CreationPlan {
    let self_submitting =
        creator.id == submitter_id && creator.signature_role == Some(SignatureRole::Submitter);

    let (submitter, notification) = match (&creator.signed_image, self_submitting) {
        (Some(image), true) => (
            SignatureSlot::signed(image.clone(), creator.id, now),
            NotificationKind::ApproversNotificationRequired {
                submitter_id: creator.id,
            },
        ),
        (None, true) => (
            SignatureSlot::designated(creator.id),
            NotificationKind::SubmitterSignRequired {
                submitter_id: creator.id,
            },
        ),
        (_, false) => (
            SignatureSlot::designated(submitter_id),
            NotificationKind::SubmitterSignRequired { submitter_id },
        ),
    };

    CreationPlan {
        signatures: Signatures {
            submitter,
            ..Signatures::default()
        },
        notification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::user;
    use procura_core::models::signature::Role;
    use procura_core::models::user::PermissionRole;

    #[test]
    fn submitter_with_signature_auto_signs() {
        let creator = user(PermissionRole::User, Some(SignatureRole::Submitter));
        let plan = plan_creation(&creator, creator.id, Utc::now());

        assert!(plan.auto_signed());
        assert_eq!(plan.signatures.submitter.signed_by, Some(creator.id));
        assert!(plan.signatures.submitter.signed_at.is_some());
        assert_eq!(
            plan.notification,
            NotificationKind::ApproversNotificationRequired { submitter_id: creator.id }
        );
    }

    #[test]
    fn submitter_without_signature_is_designated() {
        let mut creator = user(PermissionRole::User, Some(SignatureRole::Submitter));
        creator.signed_image = None;
        let plan = plan_creation(&creator, creator.id, Utc::now());

        assert!(!plan.auto_signed());
        assert_eq!(plan.signatures.submitter, SignatureSlot::designated(creator.id));
        assert_eq!(
            plan.notification,
            NotificationKind::SubmitterSignRequired { submitter_id: creator.id }
        );
    }

    #[test]
    fn creating_on_behalf_never_auto_signs() {
        let admin = user(PermissionRole::Admin, Some(SignatureRole::Submitter));
        let submitter = Uuid::new_v4();
        let plan = plan_creation(&admin, submitter, Utc::now());

        assert!(!plan.auto_signed());
        assert_eq!(plan.signatures.submitter, SignatureSlot::designated(submitter));
        assert_eq!(
            plan.notification,
            NotificationKind::SubmitterSignRequired { submitter_id: submitter }
        );
    }

    #[test]
    fn self_creation_without_submitter_role_is_designated() {
        let manager = user(PermissionRole::User, Some(SignatureRole::Manager));
        let plan = plan_creation(&manager, manager.id, Utc::now());

        assert!(!plan.auto_signed());
        assert_eq!(plan.signatures.submitter.signed_by, Some(manager.id));
    }

    #[test]
    fn approver_slots_start_empty() {
        let creator = user(PermissionRole::User, Some(SignatureRole::Submitter));
        let plan = plan_creation(&creator, creator.id, Utc::now());

        for role in [Role::Manager, Role::GeneralManager, Role::FinanceDepartment] {
            assert_eq!(plan.signatures.get(role), &SignatureSlot::default());
        }
    }
}
