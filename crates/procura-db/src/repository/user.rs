//! SQLite implementation of [`UserRepository`].

use chrono::{DateTime, Utc};
use procura_core::error::ProcuraResult;
use procura_core::models::user::{CreateUser, PermissionRole, SignatureRole, User};
use procura_core::repository::UserRepository;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    username: String,
    email: String,
    permission_role: String,
    signature_role: Option<String>,
    signed_image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self, department_ids: Vec<String>) -> Result<User, DbError> {
        let permission_role = self
            .permission_role
            .parse::<PermissionRole>()
            .map_err(|e| DbError::Corrupt(e.to_string()))?;
        let signature_role = self
            .signature_role
            .as_deref()
            .map(str::parse::<SignatureRole>)
            .transpose()
            .map_err(|e| DbError::Corrupt(e.to_string()))?;
        let departments = department_ids
            .iter()
            .map(|d| parse_uuid("department", d))
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(User {
            id: parse_uuid("user", &self.id)?,
            username: self.username,
            email: self.email,
            permission_role,
            signature_role,
            signed_image: self.signed_image,
            departments,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SQLite implementation of the User repository.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl UserRepository for SqliteUserRepository {
    async fn create(&self, input: CreateUser) -> ProcuraResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        sqlx::query(
            "INSERT INTO app_user \
             (id, username, email, permission_role, signature_role, signed_image, \
              created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        )
        .bind(&id_str)
        .bind(input.username)
        .bind(input.email)
        .bind(input.permission_role.as_str())
        .bind(input.signature_role.map(|r| r.as_str()))
        .bind(input.signed_image)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        for department_id in &input.departments {
            sqlx::query("INSERT INTO user_department (user_id, department_id) VALUES (?1, ?2)")
                .bind(&id_str)
                .bind(department_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(DbError::from)?;
        }

        tx.commit().await.map_err(DbError::from)?;

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> ProcuraResult<User> {
        let id_str = id.to_string();

        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, email, permission_role, signature_role, signed_image, \
             created_at, updated_at \
             FROM app_user WHERE id = ?1",
        )
        .bind(&id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        let row = row.ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str.clone(),
        })?;

        let departments: Vec<String> = sqlx::query_scalar(
            "SELECT department_id FROM user_department WHERE user_id = ?1 \
             ORDER BY department_id",
        )
        .bind(&id_str)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(row.try_into_user(departments)?)
    }
}
