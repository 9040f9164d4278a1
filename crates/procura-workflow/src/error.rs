//! Workflow rule violations.

use procura_core::error::ProcuraError;
use procura_core::models::signature::Role;
use procura_core::models::user::SignatureRole;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("user {user_id} has no signature on file")]
    NoSignatureOnFile { user_id: Uuid },

    #[error("signature role {actual:?} cannot sign the {required} slot")]
    RoleMismatch {
        required: Role,
        actual: Option<SignatureRole>,
    },

    #[error("only the designated submitter may sign the submitter slot")]
    NotDesignatedSubmitter,

    #[error("submitter signatures can only be reverted by an admin or override signer")]
    SubmitterRevertRestricted,

    #[error("only the original signer, an admin or an override signer may revert the {role} slot")]
    NotOriginalSigner { role: Role },

    #[error("the {role} slot is not signed")]
    NothingToRevert { role: Role },
}

impl From<WorkflowError> for ProcuraError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::NoSignatureOnFile { user_id } => ProcuraError::NoSignatureOnFile {
                user_id: user_id.to_string(),
            },
            WorkflowError::NothingToRevert { role } => ProcuraError::NothingToRevert {
                role: role.to_string(),
            },
            WorkflowError::RoleMismatch { .. }
            | WorkflowError::NotDesignatedSubmitter
            | WorkflowError::SubmitterRevertRestricted
            | WorkflowError::NotOriginalSigner { .. } => ProcuraError::Unauthorized {
                reason: err.to_string(),
            },
        }
    }
}
