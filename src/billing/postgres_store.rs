//! PostgreSQL-based billing storage.
//!
//! Activation runs in a transaction: the payment update is guarded by
//! `status = 'CREATED'` and the partial unique index on active
//! subscriptions rejects a second ACTIVE row for the same user.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::store::{BillingRepository, BillingStoreError};
use super::types::{Payment, PaymentStatus, Subscription, SubscriptionStatus};

const PAYMENT_COLUMNS: &str =
    "id, order_id, payment_id, signature, amount, currency, status, user_id, created_at";

const SUBSCRIPTION_COLUMNS: &str = "id, plan, status, start_date, end_date, user_id, payment_id";

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    order_id: String,
    payment_id: Option<String>,
    signature: Option<String>,
    amount: f64,
    currency: String,
    status: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        let status = row.status.parse().unwrap_or_else(|e: String| {
            tracing::warn!(
                payment_id = %row.id,
                error = %e,
                "Unknown payment status, treating as FAILED"
            );
            PaymentStatus::Failed
        });

        Payment {
            id: row.id,
            order_id: row.order_id,
            payment_id: row.payment_id,
            signature: row.signature,
            amount: row.amount,
            currency: row.currency,
            status,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    plan: String,
    status: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    user_id: Uuid,
    payment_id: Uuid,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        let status = row.status.parse().unwrap_or_else(|e: String| {
            tracing::warn!(
                subscription_id = %row.id,
                error = %e,
                "Unknown subscription status, treating as EXPIRED"
            );
            SubscriptionStatus::Expired
        });

        Subscription {
            id: row.id,
            plan: row.plan,
            status,
            start_date: row.start_date,
            end_date: row.end_date,
            user_id: row.user_id,
            payment_id: row.payment_id,
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

pub struct PostgresBillingStore {
    pool: PgPool,
}

impl PostgresBillingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BillingRepository for PostgresBillingStore {
    fn backend_type(&self) -> &'static str {
        "postgres"
    }

    async fn insert_payment(&self, payment: &Payment) -> Result<(), BillingStoreError> {
        sqlx::query(&format!(
            "INSERT INTO payments ({PAYMENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(payment.id)
        .bind(&payment.order_id)
        .bind(&payment.payment_id)
        .bind(&payment.signature)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(payment.status.as_str())
        .bind(payment.user_id)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BillingStoreError::DuplicateOrder(payment.order_id.clone())
            } else {
                BillingStoreError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn find_payment_by_order_id(
        &self,
        order_id: &str,
    ) -> Result<Option<Payment>, BillingStoreError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE order_id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Payment::from))
    }

    async fn activate(
        &self,
        payment_record_id: Uuid,
        gateway_payment_id: &str,
        signature: &str,
        subscription: &Subscription,
    ) -> Result<Option<Payment>, BillingStoreError> {
        let mut tx = self.pool.begin().await?;

        let updated: Option<PaymentRow> = sqlx::query_as(&format!(
            r#"
            UPDATE payments
            SET status = 'SUCCESS', payment_id = $2, signature = $3
            WHERE id = $1 AND status = 'CREATED'
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment_record_id)
        .bind(gateway_payment_id)
        .bind(signature)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = updated else {
            tx.rollback().await?;
            return Ok(None);
        };

        let inserted = sqlx::query(&format!(
            "INSERT INTO subscriptions ({SUBSCRIPTION_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        ))
        .bind(subscription.id)
        .bind(&subscription.plan)
        .bind(subscription.status.as_str())
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .bind(subscription.user_id)
        .bind(subscription.payment_id)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            tx.rollback().await?;
            return Err(if is_unique_violation(&e) {
                BillingStoreError::ActiveSubscriptionExists
            } else {
                BillingStoreError::Database(e)
            });
        }

        tx.commit().await?;
        Ok(Some(updated.into()))
    }

    async fn mark_failed(&self, payment_record_id: Uuid) -> Result<bool, BillingStoreError> {
        let result =
            sqlx::query("UPDATE payments SET status = 'FAILED' WHERE id = $1 AND status = 'CREATED'")
                .bind(payment_record_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_active_subscription(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Subscription>, BillingStoreError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE user_id = $1 AND status = 'ACTIVE'"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Subscription::from))
    }

    async fn latest_subscription(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Subscription>, BillingStoreError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE user_id = $1 \
             ORDER BY start_date DESC LIMIT 1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Subscription::from))
    }

    async fn list_payments(&self) -> Result<Vec<Payment>, BillingStoreError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Payment::from).collect())
    }

    async fn count_subscriptions(&self) -> Result<u64, BillingStoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscriptions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}
