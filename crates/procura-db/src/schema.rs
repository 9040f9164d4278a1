//! Schema definitions and migration runner for SQLite.
//!
//! UUIDs and enums are stored as text; enums are guarded with CHECK
//! constraints. Each purchase order keeps one `po_signature` row per role
//! so a slot can be written without touching the others.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
CREATE TABLE IF NOT EXISTS _migration (
    version INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
";

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Departments
-- =======================================================================
CREATE TABLE department (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    code TEXT NOT NULL UNIQUE,
    po_sequence INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

-- =======================================================================
-- Users
-- =======================================================================
CREATE TABLE app_user (
    id TEXT PRIMARY KEY NOT NULL,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    permission_role TEXT NOT NULL
        CHECK (permission_role IN ('admin', 'poweruser', 'user')),
    signature_role TEXT
        CHECK (signature_role IS NULL OR signature_role IN
            ('submitter', 'manager', 'generalManager', 'financeDepartment',
             'overrideSigner')),
    signed_image TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE user_department (
    user_id TEXT NOT NULL REFERENCES app_user (id) ON DELETE CASCADE,
    department_id TEXT NOT NULL REFERENCES department (id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, department_id)
);

-- =======================================================================
-- Purchase orders
-- =======================================================================
CREATE TABLE purchase_order (
    id TEXT PRIMARY KEY NOT NULL,
    po_number TEXT NOT NULL UNIQUE,
    status TEXT NOT NULL
        CHECK (status IN ('Pending', 'Approved', 'Rejected', 'Signed')),
    department_id TEXT NOT NULL REFERENCES department (id),
    description TEXT NOT NULL,
    details TEXT NOT NULL DEFAULT '{}',
    created_by TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX idx_purchase_order_created_at ON purchase_order (created_at);

CREATE TABLE po_signature (
    po_id TEXT NOT NULL REFERENCES purchase_order (id) ON DELETE CASCADE,
    role TEXT NOT NULL
        CHECK (role IN ('submitter', 'manager', 'generalManager',
                        'financeDepartment')),
    signed_image TEXT,
    signed_by TEXT,
    signed_at TEXT,
    PRIMARY KEY (po_id, role),
    CHECK (signed_image IS NULL
           OR (signed_by IS NOT NULL AND signed_at IS NOT NULL))
);

CREATE INDEX idx_po_signature_role_signer ON po_signature (role, signed_by);
";

/// Run all pending migrations.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum. Every
/// migration runs in its own transaction together with its tracking row.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
    sqlx::raw_sql(MIGRATION_TABLE_DDL)
        .execute(pool)
        .await
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let current_version: i64 =
        sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM _migration")
            .fetch_one(pool)
            .await?;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );

            let mut tx = pool.begin().await?;
            sqlx::raw_sql(migration.sql)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    DbError::Migration(format!(
                        "Migration v{} '{}' failed: {}",
                        migration.version, migration.name, e,
                    ))
                })?;

            sqlx::query("INSERT INTO _migration (version, name) VALUES (?1, ?2)")
                .bind(migration.version)
                .bind(migration.name)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    DbError::Migration(format!(
                        "Failed to record migration v{}: {}",
                        migration.version, e,
                    ))
                })?;
            tx.commit().await?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
