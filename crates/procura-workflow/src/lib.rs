//! Procura Workflow — the purchase order approval engine: signature
//! authorization, slot/status transitions, creation-time slot setup,
//! the "pending for me" query and notification event shaping.

pub mod authorization;
pub mod config;
pub mod creation;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod pending;
pub mod service;
pub mod state_machine;

pub use config::WorkflowConfig;
pub use dispatcher::{ChannelDispatcher, DispatchError, LogDispatcher, NotificationDispatcher};
pub use error::WorkflowError;
pub use service::WorkflowService;

#[cfg(test)]
pub(crate) mod testing {
    use chrono::Utc;
    use procura_core::models::purchase_order::{PoStatus, PurchaseOrder};
    use procura_core::models::signature::Signatures;
    use procura_core::models::user::{PermissionRole, SignatureRole, User};
    use uuid::Uuid;

    /// A user with a signature image on file.
    pub fn user(permission_role: PermissionRole, signature_role: Option<SignatureRole>) -> User {
        let id = Uuid::new_v4();
        User {
            id,
            username: format!("user-{id}"),
            email: format!("{id}@example.com"),
            permission_role,
            signature_role,
            signed_image: Some(format!("signatures/{id}.png")),
            departments: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn purchase_order(signatures: Signatures) -> PurchaseOrder {
        PurchaseOrder {
            id: Uuid::new_v4(),
            po_number: "OPS-00001".into(),
            status: PoStatus::Pending,
            department_id: Uuid::new_v4(),
            description: "Office chairs".into(),
            details: serde_json::json!({}),
            created_by: Uuid::new_v4(),
            signatures,
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
