//! Signature slots and the workflow roles that own them.
//!
//! Every purchase order carries exactly one [`SignatureSlot`] per
//! [`Role`]. A slot is "signed" when it holds a signature image; the
//! submitter slot may additionally carry a `signed_by` without an image,
//! which designates the user expected to sign it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProcuraError;

/// A signing role on a purchase order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Submitter,
    Manager,
    GeneralManager,
    FinanceDepartment,
}

impl Role {
    /// All roles, in workflow order.
    pub const ALL: [Role; 4] = [
        Role::Submitter,
        Role::Manager,
        Role::GeneralManager,
        Role::FinanceDepartment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Submitter => "submitter",
            Role::Manager => "manager",
            Role::GeneralManager => "generalManager",
            Role::FinanceDepartment => "financeDepartment",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ProcuraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitter" => Ok(Role::Submitter),
            "manager" => Ok(Role::Manager),
            "generalManager" => Ok(Role::GeneralManager),
            "financeDepartment" => Ok(Role::FinanceDepartment),
            other => Err(ProcuraError::InvalidRole(other.to_string())),
        }
    }
}

/// Per-role signature record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignatureSlot {
    /// Opaque reference to the signature image. Present iff signed.
    pub signed_image: Option<String>,
    pub signed_by: Option<Uuid>,
    pub signed_at: Option<DateTime<Utc>>,
}

impl SignatureSlot {
    /// An unsigned slot that names the user expected to sign it.
    pub fn designated(user_id: Uuid) -> Self {
        Self {
            signed_image: None,
            signed_by: Some(user_id),
            signed_at: None,
        }
    }

    pub fn signed(image: String, user_id: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            signed_image: Some(image),
            signed_by: Some(user_id),
            signed_at: Some(at),
        }
    }

    pub fn is_signed(&self) -> bool {
        self.signed_image.is_some()
    }
}

/// The full set of slots on a purchase order, one per [`Role`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Signatures {
    pub submitter: SignatureSlot,
    pub manager: SignatureSlot,
    pub general_manager: SignatureSlot,
    pub finance_department: SignatureSlot,
}

impl Signatures {
    pub fn get(&self, role: Role) -> &SignatureSlot {
        match role {
            Role::Submitter => &self.submitter,
            Role::Manager => &self.manager,
            Role::GeneralManager => &self.general_manager,
            Role::FinanceDepartment => &self.finance_department,
        }
    }

    pub fn get_mut(&mut self, role: Role) -> &mut SignatureSlot {
        match role {
            Role::Submitter => &mut self.submitter,
            Role::Manager => &mut self.manager,
            Role::GeneralManager => &mut self.general_manager,
            Role::FinanceDepartment => &mut self.finance_department,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &SignatureSlot)> {
        Role::ALL.into_iter().map(|role| (role, self.get(role)))
    }

    pub fn any_unsigned(&self) -> bool {
        self.iter().any(|(_, slot)| !slot.is_signed())
    }
}
