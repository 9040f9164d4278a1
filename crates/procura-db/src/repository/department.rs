//! SQLite implementation of [`DepartmentRepository`].

use chrono::{DateTime, Utc};
use procura_core::error::ProcuraResult;
use procura_core::models::department::{CreateDepartment, Department};
use procura_core::repository::DepartmentRepository;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, FromRow)]
struct DepartmentRow {
    id: String,
    name: String,
    code: String,
    created_at: DateTime<Utc>,
}

impl DepartmentRow {
    fn try_into_department(self) -> Result<Department, DbError> {
        Ok(Department {
            id: parse_uuid("department", &self.id)?,
            name: self.name,
            code: self.code,
            created_at: self.created_at,
        })
    }
}

/// SQLite implementation of the Department repository.
#[derive(Clone)]
pub struct SqliteDepartmentRepository {
    pool: SqlitePool,
}

impl SqliteDepartmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl DepartmentRepository for SqliteDepartmentRepository {
    async fn create(&self, input: CreateDepartment) -> ProcuraResult<Department> {
        let id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO department (id, name, code, po_sequence, created_at) \
             VALUES (?1, ?2, ?3, 0, ?4)",
        )
        .bind(id.to_string())
        .bind(input.name)
        .bind(input.code)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> ProcuraResult<Department> {
        let row: Option<DepartmentRow> = sqlx::query_as(
            "SELECT id, name, code, created_at FROM department WHERE id = ?1",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        let row = row.ok_or_else(|| DbError::NotFound {
            entity: "department".into(),
            id: id.to_string(),
        })?;

        Ok(row.try_into_department()?)
    }
}
