use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::store::{ContactRepository, ContactStoreError};
use super::types::Contact;

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: Uuid,
    name: String,
    email: String,
    country: String,
    message: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Contact {
            id: row.id,
            name: row.name,
            email: row.email,
            country: row.country,
            message: row.message,
            created_at: row.created_at,
        }
    }
}

pub struct PostgresContactStore {
    pool: PgPool,
}

impl PostgresContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepository for PostgresContactStore {
    fn backend_type(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, contact: &Contact) -> Result<(), ContactStoreError> {
        sqlx::query(
            r#"
            INSERT INTO contacts (id, name, email, country, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(contact.id)
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.country)
        .bind(&contact.message)
        .bind(contact.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Contact>, ContactStoreError> {
        let row: Option<ContactRow> = sqlx::query_as(
            r#"
            DELETE FROM contacts WHERE id = $1
            RETURNING id, name, email, country, message, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Contact::from))
    }

    async fn list(&self) -> Result<Vec<Contact>, ContactStoreError> {
        let rows: Vec<ContactRow> = sqlx::query_as(
            "SELECT id, name, email, country, message, created_at FROM contacts ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Contact::from).collect())
    }
}
