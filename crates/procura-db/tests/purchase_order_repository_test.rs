//! Integration tests for the PurchaseOrder repository using in-memory
//! SQLite.

use chrono::Utc;
use procura_core::error::ProcuraError;
use procura_core::models::department::CreateDepartment;
use procura_core::models::purchase_order::{CreatePurchaseOrder, PoStatus};
use procura_core::models::signature::{Role, SignatureSlot, Signatures};
use procura_core::repository::{DepartmentRepository, PurchaseOrderRepository, SlotWrite};
use procura_db::repository::{SqliteDepartmentRepository, SqlitePurchaseOrderRepository};
use procura_db::{DbConfig, DbManager};
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, create a department.
async fn setup() -> (SqlitePurchaseOrderRepository, SqliteDepartmentRepository, Uuid) {
    let db = DbManager::connect(&DbConfig::in_memory()).await.unwrap();
    procura_db::run_migrations(db.pool()).await.unwrap();

    let departments = SqliteDepartmentRepository::new(db.pool().clone());
    let ops = departments
        .create(CreateDepartment {
            name: "Operations".into(),
            code: "OPS".into(),
        })
        .await
        .unwrap();

    (
        SqlitePurchaseOrderRepository::new(db.pool().clone()),
        departments,
        ops.id,
    )
}

fn new_po(department_id: Uuid, submitter: Option<Uuid>) -> CreatePurchaseOrder {
    CreatePurchaseOrder {
        department_id,
        description: "Standing desks".into(),
        details: serde_json::json!({ "vendor": "Acme", "lines": [{ "qty": 4 }] }),
        created_by: Uuid::new_v4(),
        signatures: Signatures {
            submitter: submitter.map(SignatureSlot::designated).unwrap_or_default(),
            ..Signatures::default()
        },
    }
}

fn signed(user: Uuid) -> SignatureSlot {
    SignatureSlot::signed(format!("signatures/{user}.png"), user, Utc::now())
}

#[tokio::test]
async fn create_and_get_purchase_order() {
    let (repo, _, dept) = setup().await;
    let submitter = Uuid::new_v4();

    let po = repo.create(new_po(dept, Some(submitter))).await.unwrap();
    assert_eq!(po.status, PoStatus::Pending);
    assert_eq!(po.version, 1);
    assert_eq!(po.department_id, dept);
    assert_eq!(po.details["vendor"], "Acme");
    assert_eq!(po.signatures.submitter, SignatureSlot::designated(submitter));
    assert_eq!(po.signatures.manager, SignatureSlot::default());

    let fetched = repo.get_by_id(po.id).await.unwrap();
    assert_eq!(fetched.po_number, po.po_number);
    assert_eq!(fetched.signatures, po.signatures);
}

#[tokio::test]
async fn po_numbers_follow_department_sequence() {
    let (repo, departments, ops) = setup().await;
    let fin = departments
        .create(CreateDepartment {
            name: "Finance".into(),
            code: "FIN".into(),
        })
        .await
        .unwrap();

    let first = repo.create(new_po(ops, None)).await.unwrap();
    let second = repo.create(new_po(ops, None)).await.unwrap();
    let other = repo.create(new_po(fin.id, None)).await.unwrap();

    assert_eq!(first.po_number, "OPS-00001");
    assert_eq!(second.po_number, "OPS-00002");
    assert_eq!(other.po_number, "FIN-00001");
}

#[tokio::test]
async fn create_in_unknown_department_fails() {
    let (repo, _, _) = setup().await;
    let result = repo.create(new_po(Uuid::new_v4(), None)).await;
    assert!(matches!(
        result,
        Err(ProcuraError::NotFound { ref entity, .. }) if entity == "department"
    ));
}

#[tokio::test]
async fn save_slot_touches_only_its_role() {
    let (repo, _, dept) = setup().await;
    let submitter = Uuid::new_v4();
    let manager = Uuid::new_v4();
    let po = repo.create(new_po(dept, Some(submitter))).await.unwrap();

    let saved = repo
        .save_slot(
            po.id,
            SlotWrite {
                role: Role::Manager,
                slot: signed(manager),
                status: None,
                expected_version: Some(po.version),
            },
        )
        .await
        .unwrap();

    assert_eq!(saved.version, po.version + 1);
    assert!(saved.signatures.manager.is_signed());
    assert_eq!(saved.signatures.manager.signed_by, Some(manager));
    assert_eq!(saved.signatures.submitter, po.signatures.submitter);
    assert_eq!(saved.status, PoStatus::Pending);
}

#[tokio::test]
async fn save_slot_writes_status_in_the_same_update() {
    let (repo, _, dept) = setup().await;
    let po = repo.create(new_po(dept, Some(Uuid::new_v4()))).await.unwrap();

    let saved = repo
        .save_slot(
            po.id,
            SlotWrite {
                role: Role::GeneralManager,
                slot: signed(Uuid::new_v4()),
                status: Some(PoStatus::Approved),
                expected_version: Some(po.version),
            },
        )
        .await
        .unwrap();

    assert_eq!(saved.status, PoStatus::Approved);
    assert!(saved.signatures.general_manager.is_signed());
}

#[tokio::test]
async fn stale_version_is_a_conflict_and_changes_nothing() {
    let (repo, _, dept) = setup().await;
    let po = repo.create(new_po(dept, Some(Uuid::new_v4()))).await.unwrap();

    repo.save_slot(
        po.id,
        SlotWrite {
            role: Role::Manager,
            slot: signed(Uuid::new_v4()),
            status: None,
            expected_version: Some(po.version),
        },
    )
    .await
    .unwrap();

    let result = repo
        .save_slot(
            po.id,
            SlotWrite {
                role: Role::FinanceDepartment,
                slot: signed(Uuid::new_v4()),
                status: None,
                expected_version: Some(po.version),
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(ProcuraError::ConcurrentModification { .. })
    ));

    let current = repo.get_by_id(po.id).await.unwrap();
    assert!(!current.signatures.finance_department.is_signed());
    assert_eq!(current.version, po.version + 1);
}

#[tokio::test]
async fn unguarded_write_applies_to_current_state() {
    let (repo, _, dept) = setup().await;
    let po = repo.create(new_po(dept, Some(Uuid::new_v4()))).await.unwrap();

    for role in [Role::Manager, Role::FinanceDepartment] {
        repo.save_slot(
            po.id,
            SlotWrite {
                role,
                slot: signed(Uuid::new_v4()),
                status: None,
                expected_version: None,
            },
        )
        .await
        .unwrap();
    }

    let current = repo.get_by_id(po.id).await.unwrap();
    assert!(current.signatures.manager.is_signed());
    assert!(current.signatures.finance_department.is_signed());
    assert_eq!(current.version, 3);
}

#[tokio::test]
async fn save_slot_on_missing_po_is_not_found() {
    let (repo, _, _) = setup().await;
    let result = repo
        .save_slot(
            Uuid::new_v4(),
            SlotWrite {
                role: Role::Manager,
                slot: SignatureSlot::default(),
                status: None,
                expected_version: Some(1),
            },
        )
        .await;
    assert!(matches!(result, Err(ProcuraError::NotFound { .. })));
}

#[tokio::test]
async fn set_status_is_version_guarded() {
    let (repo, _, dept) = setup().await;
    let po = repo.create(new_po(dept, None)).await.unwrap();

    let rejected = repo
        .set_status(po.id, PoStatus::Rejected, Some(po.version))
        .await
        .unwrap();
    assert_eq!(rejected.status, PoStatus::Rejected);
    assert_eq!(rejected.version, po.version + 1);

    let stale = repo
        .set_status(po.id, PoStatus::Approved, Some(po.version))
        .await;
    assert!(matches!(
        stale,
        Err(ProcuraError::ConcurrentModification { .. })
    ));
}

#[tokio::test]
async fn list_in_workflow_requires_designated_submitter() {
    let (repo, _, dept) = setup().await;

    let outside = repo.create(new_po(dept, None)).await.unwrap();
    let older = repo.create(new_po(dept, Some(Uuid::new_v4()))).await.unwrap();
    let newer = repo.create(new_po(dept, Some(Uuid::new_v4()))).await.unwrap();

    let listed = repo.list_in_workflow().await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|po| po.id).collect();

    assert_eq!(ids, vec![newer.id, older.id]);
    assert!(!ids.contains(&outside.id));
    assert!(listed.iter().all(|po| po.signatures.submitter.signed_by.is_some()));
}
