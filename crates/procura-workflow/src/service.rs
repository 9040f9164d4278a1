//! Workflow service — the mutating surface of the approval engine.

use chrono::Utc;
use procura_core::error::{ProcuraError, ProcuraResult};
use procura_core::models::notification::WorkflowEvent;
use procura_core::models::purchase_order::{CreatePurchaseOrder, NewPurchaseOrder, PurchaseOrder};
use procura_core::models::signature::Role;
use procura_core::models::user::User;
use procura_core::repository::{PurchaseOrderRepository, UserRepository};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::authorization;
use crate::config::WorkflowConfig;
use crate::creation;
use crate::dispatcher::NotificationDispatcher;
use crate::error::WorkflowError;
use crate::events;
use crate::pending;
use crate::state_machine::{self, SlotChange};

/// Approval workflow service.
///
/// Generic over repository and dispatcher implementations so that the
/// workflow has no dependency on the database crate or on any
/// notification transport.
pub struct WorkflowService<P, U, D>
where
    P: PurchaseOrderRepository,
    U: UserRepository,
    D: NotificationDispatcher,
{
    po_repo: P,
    user_repo: U,
    dispatcher: D,
    config: WorkflowConfig,
}

impl<P, U, D> WorkflowService<P, U, D>
where
    P: PurchaseOrderRepository,
    U: UserRepository,
    D: NotificationDispatcher,
{
    pub fn new(po_repo: P, user_repo: U, dispatcher: D, config: WorkflowConfig) -> Self {
        Self {
            po_repo,
            user_repo,
            dispatcher,
            config,
        }
    }

    /// Create a purchase order on behalf of `submitter_id` (defaults to
    /// the creator) and initialize its signature slots.
    pub async fn create_purchase_order(
        &self,
        creator_id: Uuid,
        submitter_id: Option<Uuid>,
        input: NewPurchaseOrder,
    ) -> ProcuraResult<PurchaseOrder> {
        let creator = self.user_repo.get_by_id(creator_id).await?;
        let submitter_id = submitter_id.unwrap_or(creator.id);
        if submitter_id != creator.id {
            // The designated submitter has to exist.
            self.user_repo.get_by_id(submitter_id).await?;
        }

        let now = Utc::now();
        let plan = creation::plan_creation(&creator, submitter_id, now);
        let auto_signed = plan.auto_signed();

        let po = self
            .po_repo
            .create(CreatePurchaseOrder {
                department_id: input.department_id,
                description: input.description,
                details: input
                    .details
                    .unwrap_or(serde_json::Value::Object(Default::default())),
                created_by: creator.id,
                signatures: plan.signatures,
            })
            .await?;

        info!(
            po_id = %po.id,
            po_number = %po.po_number,
            creator_id = %creator.id,
            submitter_id = %submitter_id,
            auto_signed,
            "Purchase order created"
        );

        self.notify(events::event_for(&po, plan.notification, now))
            .await;
        Ok(po)
    }

    /// Sign `role`'s slot as the acting user.
    pub async fn sign_role(
        &self,
        po_id: Uuid,
        acting_user_id: Uuid,
        role: Role,
    ) -> ProcuraResult<PurchaseOrder> {
        let actor = self.user_repo.get_by_id(acting_user_id).await?;
        self.write_slot(po_id, &actor, role, |po, now| {
            authorization::authorize_sign(&actor, role, po.signatures.get(role))?;
            state_machine::sign(po, role, &actor, now)
        })
        .await
    }

    /// Clear `role`'s slot as the acting user.
    pub async fn revert_role(
        &self,
        po_id: Uuid,
        acting_user_id: Uuid,
        role: Role,
    ) -> ProcuraResult<PurchaseOrder> {
        let actor = self.user_repo.get_by_id(acting_user_id).await?;
        self.write_slot(po_id, &actor, role, |po, _| {
            authorization::authorize_revert(&actor, role, po.signatures.get(role))?;
            state_machine::revert(po, role)
        })
        .await
    }

    /// Administrative status flip between `Approved` and `Rejected`;
    /// anything else goes back to `Pending`.
    pub async fn toggle_status(&self, po_id: Uuid) -> ProcuraResult<PurchaseOrder> {
        let mut attempt = 0;
        loop {
            let po = self.po_repo.get_by_id(po_id).await?;
            let next = state_machine::toggle(po.status);

            match self.po_repo.set_status(po_id, next, Some(po.version)).await {
                Ok(saved) => {
                    info!(
                        po_id = %po_id,
                        from = %po.status,
                        to = %saved.status,
                        "Purchase order status toggled"
                    );
                    return Ok(saved);
                }
                Err(ProcuraError::ConcurrentModification { .. })
                    if attempt < self.config.max_conflict_retries =>
                {
                    attempt += 1;
                    debug!(po_id = %po_id, attempt, "Status toggle conflicted, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Purchase orders awaiting action from `user_id`, newest first.
    pub async fn get_pending_for_user(&self, user_id: Uuid) -> ProcuraResult<Vec<PurchaseOrder>> {
        let user = self.user_repo.get_by_id(user_id).await?;
        if pending::PendingScope::for_user(&user).is_none() {
            return Ok(Vec::new());
        }

        let candidates = self.po_repo.list_in_workflow().await?;
        Ok(pending::pending_for(&user, candidates))
    }

    pub async fn get_purchase_order(&self, po_id: Uuid) -> ProcuraResult<PurchaseOrder> {
        self.po_repo.get_by_id(po_id).await
    }

    /// Read, check, transition and persist one slot, re-reading on
    /// version conflicts. The notification (if any) goes out only after
    /// the write has been committed.
    async fn write_slot<F>(
        &self,
        po_id: Uuid,
        actor: &User,
        role: Role,
        compute: F,
    ) -> ProcuraResult<PurchaseOrder>
    where
        F: Fn(&PurchaseOrder, chrono::DateTime<Utc>) -> Result<SlotChange, WorkflowError>,
    {
        let mut attempt = 0;
        loop {
            let po = self.po_repo.get_by_id(po_id).await?;
            let now = Utc::now();
            let change = compute(&po, now)?;
            let transition = change.transition;

            match self
                .po_repo
                .save_slot(po_id, change.into_write(po.version))
                .await
            {
                Ok(saved) => {
                    info!(
                        po_id = %po_id,
                        role = %role,
                        actor_id = %actor.id,
                        was_signed = transition.was_signed,
                        is_signed = transition.is_signed,
                        status = %saved.status,
                        "Signature slot updated"
                    );
                    if let Some(event) = events::signature_event(&saved, &transition, actor.id, now)
                    {
                        self.notify(event).await;
                    }
                    return Ok(saved);
                }
                Err(ProcuraError::ConcurrentModification { .. })
                    if attempt < self.config.max_conflict_retries =>
                {
                    attempt += 1;
                    debug!(
                        po_id = %po_id,
                        role = %role,
                        attempt,
                        "Signature write conflicted, retrying against fresh state"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Dispatch failures are logged only; the persisted purchase order
    /// stays authoritative.
    async fn notify(&self, event: WorkflowEvent) {
        if let Err(e) = self.dispatcher.dispatch(&event).await {
            warn!(
                po_id = %event.po_id,
                kind = event.kind.name(),
                error = %e,
                "Notification dispatch failed"
            );
        }
    }
}
