//! PostgreSQL-based template storage.
//!
//! Variables are stored as a JSONB array of `{key, defaultValue}` objects.
//! Slug uniqueness is enforced by the `templates.slug` unique index.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::store::{DeleteOutcome, TemplateRepository, TemplateStoreError};
use super::types::{Template, TemplateFlag, TemplateVariableDef};

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, slug, html, category, thumbnail, pro_only, is_published,
           variables, created_at, updated_at
    FROM templates
"#;

#[derive(sqlx::FromRow)]
struct TemplateRow {
    id: Uuid,
    name: String,
    slug: String,
    html: String,
    category: Option<String>,
    thumbnail: Option<String>,
    pro_only: bool,
    is_published: bool,
    variables: sqlx::types::Json<Vec<TemplateVariableDef>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TemplateRow> for Template {
    fn from(row: TemplateRow) -> Self {
        Template {
            id: row.id,
            name: row.name,
            slug: row.slug,
            html: row.html,
            category: row.category,
            thumbnail: row.thumbnail,
            pro_only: row.pro_only,
            is_published: row.is_published,
            variables: row.variables.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL-based template storage
pub struct PostgresTemplateStore {
    pool: PgPool,
}

impl PostgresTemplateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique violation on the slug index to `DuplicateSlug`.
fn map_write_error(err: sqlx::Error, slug: &str) -> TemplateStoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return TemplateStoreError::DuplicateSlug(slug.to_string());
        }
    }
    TemplateStoreError::Database(err)
}

#[async_trait]
impl TemplateRepository for PostgresTemplateStore {
    fn backend_type(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, template: &Template) -> Result<(), TemplateStoreError> {
        let variables = serde_json::to_value(&template.variables)?;

        sqlx::query(
            r#"
            INSERT INTO templates
                (id, name, slug, html, category, thumbnail, pro_only, is_published,
                 variables, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(template.id)
        .bind(&template.name)
        .bind(&template.slug)
        .bind(&template.html)
        .bind(&template.category)
        .bind(&template.thumbnail)
        .bind(template.pro_only)
        .bind(template.is_published)
        .bind(variables)
        .bind(template.created_at)
        .bind(template.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &template.slug))?;

        tracing::debug!(template_id = %template.id, slug = %template.slug, "Template inserted");
        Ok(())
    }

    async fn replace(&self, template: &Template) -> Result<bool, TemplateStoreError> {
        let variables = serde_json::to_value(&template.variables)?;

        let result = sqlx::query(
            r#"
            UPDATE templates
            SET name = $2, slug = $3, html = $4, category = $5, thumbnail = $6,
                pro_only = $7, is_published = $8, variables = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(template.id)
        .bind(&template.name)
        .bind(&template.slug)
        .bind(&template.html)
        .bind(&template.category)
        .bind(&template.thumbnail)
        .bind(template.pro_only)
        .bind(template.is_published)
        .bind(variables)
        .bind(template.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &template.slug))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_unpublished(&self, id: Uuid) -> Result<DeleteOutcome, TemplateStoreError> {
        let deleted: Option<TemplateRow> = sqlx::query_as(
            r#"
            DELETE FROM templates
            WHERE id = $1 AND is_published = FALSE
            RETURNING id, name, slug, html, category, thumbnail, pro_only, is_published,
                      variables, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = deleted {
            return Ok(DeleteOutcome::Deleted(row.into()));
        }

        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM templates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match exists {
            Some(_) => DeleteOutcome::Published,
            None => DeleteOutcome::NotFound,
        })
    }

    async fn toggle(
        &self,
        id: Uuid,
        flag: TemplateFlag,
    ) -> Result<Option<Template>, TemplateStoreError> {
        let column = match flag {
            TemplateFlag::ProOnly => "pro_only",
            TemplateFlag::Published => "is_published",
        };

        let query = format!(
            r#"
            UPDATE templates
            SET {column} = NOT {column}, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, slug, html, category, thumbnail, pro_only, is_published,
                      variables, created_at, updated_at
            "#
        );

        let row: Option<TemplateRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Template::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Template>, TemplateStoreError> {
        let row: Option<TemplateRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Template::from))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Template>, TemplateStoreError> {
        let row: Option<TemplateRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE slug = $1"))
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Template::from))
    }

    async fn list(&self) -> Result<Vec<Template>, TemplateStoreError> {
        let rows: Vec<TemplateRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC"))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Template::from).collect())
    }

    async fn count(&self) -> Result<u64, TemplateStoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM templates")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}
