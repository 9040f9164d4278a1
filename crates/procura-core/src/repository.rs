//! Repository trait definitions for data access abstraction.
//!
//! The approval workflow only needs to load and store purchase orders,
//! look users up, and resolve departments. All operations are async.

use uuid::Uuid;

use crate::error::ProcuraResult;
use crate::models::{
    department::{CreateDepartment, Department},
    purchase_order::{CreatePurchaseOrder, PoStatus, PurchaseOrder},
    signature::{Role, SignatureSlot},
    user::{CreateUser, User},
};

/// A field-scoped write of one signature slot.
///
/// Only the named role's slot (and optionally the status) is written;
/// the other slots keep whatever is currently persisted.
#[derive(Debug, Clone)]
pub struct SlotWrite {
    pub role: Role,
    pub slot: SignatureSlot,
    /// New status to store in the same write, if the transition changes it.
    pub status: Option<PoStatus>,
    /// When set, the write fails with `ConcurrentModification` unless the
    /// persisted version still matches.
    pub expected_version: Option<i64>,
}

pub trait DepartmentRepository: Send + Sync {
    fn create(
        &self,
        input: CreateDepartment,
    ) -> impl Future<Output = ProcuraResult<Department>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ProcuraResult<Department>> + Send;
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = ProcuraResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ProcuraResult<User>> + Send;
}

pub trait PurchaseOrderRepository: Send + Sync {
    /// Insert a new purchase order with status `Pending`, assigning the
    /// next number in its department's sequence.
    fn create(
        &self,
        input: CreatePurchaseOrder,
    ) -> impl Future<Output = ProcuraResult<PurchaseOrder>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ProcuraResult<PurchaseOrder>> + Send;
    /// Atomically set one slot's fields. Returns the purchase order as
    /// persisted after the write.
    fn save_slot(
        &self,
        id: Uuid,
        write: SlotWrite,
    ) -> impl Future<Output = ProcuraResult<PurchaseOrder>> + Send;
    fn set_status(
        &self,
        id: Uuid,
        status: PoStatus,
        expected_version: Option<i64>,
    ) -> impl Future<Output = ProcuraResult<PurchaseOrder>> + Send;
    /// Purchase orders whose submitter slot names a user, newest first.
    fn list_in_workflow(&self) -> impl Future<Output = ProcuraResult<Vec<PurchaseOrder>>> + Send;
}
