//! PostgreSQL-based account storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Role;

use super::store::{UserRepository, UserStoreError};
use super::types::{ApiKey, User};

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, email, password_hash, role, has_website_permission, is_banned,
           email_verified, created_at
    FROM users
"#;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    has_website_permission: bool,
    is_banned: bool,
    email_verified: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let role = row.role.parse::<Role>().unwrap_or_else(|_| {
            tracing::warn!(
                user_id = %row.id,
                role = %row.role,
                "Unknown role in database, treating as USER"
            );
            Role::User
        });

        User {
            id: row.id,
            name: row.name,
            email: row.email,
            role,
            has_website_permission: row.has_website_permission,
            is_banned: row.is_banned,
            email_verified: row.email_verified,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserStore {
    fn backend_type(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, user: &User) -> Result<(), UserStoreError> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, name, email, password_hash, role, has_website_permission, is_banned,
                 email_verified, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.has_website_permission)
        .bind(user.is_banned)
        .bind(user.email_verified)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                UserStoreError::DuplicateEmail(user.email.clone())
            }
            _ => UserStoreError::Database(e),
        })?;

        Ok(())
    }

    async fn update(&self, user: &User) -> Result<bool, UserStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, role = $3, has_website_permission = $4, is_banned = $5,
                email_verified = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(user.has_website_permission)
        .bind(user.is_banned)
        .bind(user.email_verified)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, UserStoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserStoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    async fn list(&self) -> Result<Vec<User>, UserStoreError> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC"))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn count(&self) -> Result<u64, UserStoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn insert_api_key(&self, key: &ApiKey) -> Result<(), UserStoreError> {
        sqlx::query(
            "INSERT INTO api_keys (id, key, user_id, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(key.id)
        .bind(&key.key)
        .bind(key.user_id)
        .bind(key.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
