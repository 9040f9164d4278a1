//! SQLite repository implementations.

mod department;
mod purchase_order;
mod user;

pub use department::SqliteDepartmentRepository;
pub use purchase_order::SqlitePurchaseOrderRepository;
pub use user::SqliteUserRepository;

use uuid::Uuid;

use crate::error::DbError;

pub(crate) fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Corrupt(format!("invalid {field} UUID: {e}")))
}
