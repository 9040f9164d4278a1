//! SQLite implementation of [`PurchaseOrderRepository`].
//!
//! Signature slots live in `po_signature`, one row per role. Writes to a
//! slot touch only that row plus the purchase order's `version`,
//! `updated_at` and (optionally) `status` columns, so concurrent writers
//! of different roles never clobber each other. The version bump doubles
//! as the optimistic-concurrency check.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use procura_core::error::ProcuraResult;
use procura_core::models::purchase_order::{CreatePurchaseOrder, PoStatus, PurchaseOrder};
use procura_core::models::signature::{Role, SignatureSlot, Signatures};
use procura_core::repository::{PurchaseOrderRepository, SlotWrite};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

const PO_COLUMNS: &str = "po.id, po.po_number, po.status, po.department_id, po.description, \
                          po.details, po.created_by, po.version, po.created_at, po.updated_at";

#[derive(Debug, FromRow)]
struct PurchaseOrderRow {
    id: String,
    po_number: String,
    status: String,
    department_id: String,
    description: String,
    details: String,
    created_by: String,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct SignatureRow {
    po_id: String,
    role: String,
    signed_image: Option<String>,
    signed_by: Option<String>,
    signed_at: Option<DateTime<Utc>>,
}

impl SignatureRow {
    fn try_into_slot(self) -> Result<(Role, SignatureSlot), DbError> {
        let role = self
            .role
            .parse::<Role>()
            .map_err(|e| DbError::Corrupt(e.to_string()))?;
        let signed_by = self
            .signed_by
            .as_deref()
            .map(|s| parse_uuid("signer", s))
            .transpose()?;

        Ok((
            role,
            SignatureSlot {
                signed_image: self.signed_image,
                signed_by,
                signed_at: self.signed_at,
            },
        ))
    }
}

impl PurchaseOrderRow {
    fn try_into_purchase_order(self, rows: Vec<SignatureRow>) -> Result<PurchaseOrder, DbError> {
        let mut signatures = Signatures::default();
        let mut seen = Vec::with_capacity(Role::ALL.len());
        for row in rows {
            let (role, slot) = row.try_into_slot()?;
            *signatures.get_mut(role) = slot;
            seen.push(role);
        }
        if let Some(missing) = Role::ALL.into_iter().find(|r| !seen.contains(r)) {
            return Err(DbError::Corrupt(format!(
                "purchase order {} has no {missing} slot",
                self.id
            )));
        }

        let status = self
            .status
            .parse::<PoStatus>()
            .map_err(|e| DbError::Corrupt(e.to_string()))?;
        let details = serde_json::from_str(&self.details)
            .map_err(|e| DbError::Corrupt(format!("invalid details JSON: {e}")))?;

        Ok(PurchaseOrder {
            id: parse_uuid("purchase order", &self.id)?,
            po_number: self.po_number,
            status,
            department_id: parse_uuid("department", &self.department_id)?,
            description: self.description,
            details,
            created_by: parse_uuid("creator", &self.created_by)?,
            signatures,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn not_found(id: &str) -> DbError {
    DbError::NotFound {
        entity: "purchase_order".into(),
        id: id.to_string(),
    }
}

async fn fetch_one(conn: &mut SqliteConnection, id: &str) -> Result<PurchaseOrder, DbError> {
    let row: Option<PurchaseOrderRow> = sqlx::query_as(&format!(
        "SELECT {PO_COLUMNS} FROM purchase_order po WHERE po.id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    let row = row.ok_or_else(|| not_found(id))?;

    let signatures: Vec<SignatureRow> = sqlx::query_as(
        "SELECT po_id, role, signed_image, signed_by, signed_at \
         FROM po_signature WHERE po_id = ?1",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    row.try_into_purchase_order(signatures)
}

/// After a guarded update matched no row, tell a stale version apart
/// from a missing purchase order.
async fn miss_reason(conn: &mut SqliteConnection, id: &str) -> Result<DbError, DbError> {
    let version: Option<i64> =
        sqlx::query_scalar("SELECT version FROM purchase_order WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(match version {
        Some(current) => {
            debug!(po_id = %id, current, "Purchase order version moved on");
            DbError::Conflict {
                entity: "purchase_order".into(),
                id: id.to_string(),
            }
        }
        None => not_found(id),
    })
}

/// SQLite implementation of the PurchaseOrder repository.
#[derive(Clone)]
pub struct SqlitePurchaseOrderRepository {
    pool: SqlitePool,
}

impl SqlitePurchaseOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl PurchaseOrderRepository for SqlitePurchaseOrderRepository {
    async fn create(&self, input: CreatePurchaseOrder) -> ProcuraResult<PurchaseOrder> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let department_id = input.department_id.to_string();
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let sequence: Option<(String, i64)> = sqlx::query_as(
            "UPDATE department SET po_sequence = po_sequence + 1 \
             WHERE id = ?1 RETURNING code, po_sequence",
        )
        .bind(&department_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DbError::from)?;

        let (code, seq) = sequence.ok_or_else(|| DbError::NotFound {
            entity: "department".into(),
            id: department_id.clone(),
        })?;
        let po_number = format!("{code}-{seq:05}");

        sqlx::query(
            "INSERT INTO purchase_order \
             (id, po_number, status, department_id, description, details, created_by, \
              version, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)",
        )
        .bind(&id_str)
        .bind(&po_number)
        .bind(PoStatus::Pending.as_str())
        .bind(&department_id)
        .bind(input.description)
        .bind(input.details.to_string())
        .bind(input.created_by.to_string())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        for (role, slot) in input.signatures.iter() {
            sqlx::query(
                "INSERT INTO po_signature (po_id, role, signed_image, signed_by, signed_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&id_str)
            .bind(role.as_str())
            .bind(slot.signed_image.clone())
            .bind(slot.signed_by.map(|u| u.to_string()))
            .bind(slot.signed_at)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;
        }

        let po = fetch_one(&mut *tx, &id_str).await?;
        tx.commit().await.map_err(DbError::from)?;

        Ok(po)
    }

    async fn get_by_id(&self, id: Uuid) -> ProcuraResult<PurchaseOrder> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let po = fetch_one(&mut *tx, &id.to_string()).await?;
        tx.commit().await.map_err(DbError::from)?;
        Ok(po)
    }

    async fn save_slot(&self, id: Uuid, write: SlotWrite) -> ProcuraResult<PurchaseOrder> {
        let id_str = id.to_string();
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let bumped = sqlx::query(
            "UPDATE purchase_order SET \
             version = version + 1, updated_at = ?1, status = COALESCE(?2, status) \
             WHERE id = ?3 AND (?4 IS NULL OR version = ?4)",
        )
        .bind(Utc::now())
        .bind(write.status.map(|s| s.as_str()))
        .bind(&id_str)
        .bind(write.expected_version)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        if bumped.rows_affected() == 0 {
            return Err(miss_reason(&mut *tx, &id_str).await?.into());
        }

        sqlx::query(
            "UPDATE po_signature SET signed_image = ?1, signed_by = ?2, signed_at = ?3 \
             WHERE po_id = ?4 AND role = ?5",
        )
        .bind(write.slot.signed_image)
        .bind(write.slot.signed_by.map(|u| u.to_string()))
        .bind(write.slot.signed_at)
        .bind(&id_str)
        .bind(write.role.as_str())
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        let po = fetch_one(&mut *tx, &id_str).await?;
        tx.commit().await.map_err(DbError::from)?;

        Ok(po)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: PoStatus,
        expected_version: Option<i64>,
    ) -> ProcuraResult<PurchaseOrder> {
        let id_str = id.to_string();
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let updated = sqlx::query(
            "UPDATE purchase_order SET \
             version = version + 1, updated_at = ?1, status = ?2 \
             WHERE id = ?3 AND (?4 IS NULL OR version = ?4)",
        )
        .bind(Utc::now())
        .bind(status.as_str())
        .bind(&id_str)
        .bind(expected_version)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        if updated.rows_affected() == 0 {
            return Err(miss_reason(&mut *tx, &id_str).await?.into());
        }

        let po = fetch_one(&mut *tx, &id_str).await?;
        tx.commit().await.map_err(DbError::from)?;

        Ok(po)
    }

    async fn list_in_workflow(&self) -> ProcuraResult<Vec<PurchaseOrder>> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let rows: Vec<PurchaseOrderRow> = sqlx::query_as(&format!(
            "SELECT {PO_COLUMNS} FROM purchase_order po \
             JOIN po_signature s ON s.po_id = po.id AND s.role = 'submitter' \
             WHERE s.signed_by IS NOT NULL \
             ORDER BY po.created_at DESC, po.rowid DESC"
        ))
        .fetch_all(&mut *tx)
        .await
        .map_err(DbError::from)?;

        let signature_rows: Vec<SignatureRow> = sqlx::query_as(
            "SELECT s.po_id, s.role, s.signed_image, s.signed_by, s.signed_at \
             FROM po_signature s \
             JOIN po_signature sub ON sub.po_id = s.po_id AND sub.role = 'submitter' \
             WHERE sub.signed_by IS NOT NULL",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(DbError::from)?;

        tx.commit().await.map_err(DbError::from)?;

        let mut by_po: HashMap<String, Vec<SignatureRow>> = HashMap::new();
        for row in signature_rows {
            by_po.entry(row.po_id.clone()).or_default().push(row);
        }

        let pos = rows
            .into_iter()
            .map(|row| {
                let signatures = by_po.remove(&row.id).unwrap_or_default();
                row.try_into_purchase_order(signatures)
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(pos)
    }
}
