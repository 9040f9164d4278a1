//! User domain model, as consumed by the approval workflow.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProcuraError;
use crate::models::signature::Role;

/// Application permission tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PermissionRole {
    Admin,
    PowerUser,
    /// Restricted tier: purchase order visibility is scoped to the
    /// user's departments.
    User,
}

impl PermissionRole {
    pub fn is_restricted(&self) -> bool {
        matches!(self, PermissionRole::User)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionRole::Admin => "admin",
            PermissionRole::PowerUser => "poweruser",
            PermissionRole::User => "user",
        }
    }
}

impl FromStr for PermissionRole {
    type Err = ProcuraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(PermissionRole::Admin),
            "poweruser" => Ok(PermissionRole::PowerUser),
            "user" => Ok(PermissionRole::User),
            other => Err(ProcuraError::Validation {
                message: format!("unknown permission role: {other}"),
            }),
        }
    }
}

/// The signing capacity a user holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SignatureRole {
    Submitter,
    Manager,
    GeneralManager,
    FinanceDepartment,
    /// May act as any of the four purchase order roles.
    OverrideSigner,
}

impl SignatureRole {
    /// The purchase order role this capacity maps to, if it is one.
    pub fn as_role(&self) -> Option<Role> {
        match self {
            SignatureRole::Submitter => Some(Role::Submitter),
            SignatureRole::Manager => Some(Role::Manager),
            SignatureRole::GeneralManager => Some(Role::GeneralManager),
            SignatureRole::FinanceDepartment => Some(Role::FinanceDepartment),
            SignatureRole::OverrideSigner => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureRole::Submitter => "submitter",
            SignatureRole::Manager => "manager",
            SignatureRole::GeneralManager => "generalManager",
            SignatureRole::FinanceDepartment => "financeDepartment",
            SignatureRole::OverrideSigner => "overrideSigner",
        }
    }
}

impl From<Role> for SignatureRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Submitter => SignatureRole::Submitter,
            Role::Manager => SignatureRole::Manager,
            Role::GeneralManager => SignatureRole::GeneralManager,
            Role::FinanceDepartment => SignatureRole::FinanceDepartment,
        }
    }
}

impl fmt::Display for SignatureRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureRole {
    type Err = ProcuraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overrideSigner" => Ok(SignatureRole::OverrideSigner),
            other => other.parse::<Role>().map(SignatureRole::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub permission_role: PermissionRole,
    pub signature_role: Option<SignatureRole>,
    /// Reference to the user's on-file signature image.
    pub signed_image: Option<String>,
    /// Departments the user belongs to. Only restricts visibility for
    /// [`PermissionRole::User`].
    pub departments: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.permission_role == PermissionRole::Admin
    }

    pub fn is_override_signer(&self) -> bool {
        self.signature_role == Some(SignatureRole::OverrideSigner)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub permission_role: PermissionRole,
    pub signature_role: Option<SignatureRole>,
    pub signed_image: Option<String>,
    pub departments: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_role_maps_to_po_role() {
        assert_eq!(SignatureRole::Manager.as_role(), Some(Role::Manager));
        assert_eq!(SignatureRole::OverrideSigner.as_role(), None);
    }

    #[test]
    fn signature_role_parses_override_and_roles() {
        assert_eq!(
            "overrideSigner".parse::<SignatureRole>().unwrap(),
            SignatureRole::OverrideSigner
        );
        assert_eq!(
            "generalManager".parse::<SignatureRole>().unwrap(),
            SignatureRole::GeneralManager
        );
        assert!("ceo".parse::<SignatureRole>().is_err());
    }

    #[test]
    fn only_user_tier_is_restricted() {
        assert!(PermissionRole::User.is_restricted());
        assert!(!PermissionRole::PowerUser.is_restricted());
        assert!(!PermissionRole::Admin.is_restricted());
    }
}
