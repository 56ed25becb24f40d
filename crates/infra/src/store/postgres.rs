//! Postgres-backed order store.
//!
//! One table, one row per record. Customer details and badge options are
//! stored as `jsonb`; money columns are `numeric` so nothing is lost to
//! float round-tripping.
//!
//! ## Error Mapping
//!
//! `sqlx::Error::RowNotFound` maps to `StoreError::NotFound`; everything
//! else (connectivity, constraint violations, pool shutdown) maps to
//! `StoreError::Backend` with the failing operation named in the message.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use badgekit_core::OrderId;
use badgekit_orders::{CustomerDetails, OrderRecord, OrderStatus, RecordKind};
use badgekit_pricing::OrderOptions;

use super::{OrderStore, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS order_records (
    id                 UUID PRIMARY KEY,
    kind               TEXT NOT NULL,
    customer           JSONB NOT NULL,
    options            JSONB NOT NULL,
    total_quantity     INTEGER NOT NULL CHECK (total_quantity >= 0),
    total_cost         NUMERIC(12, 2) NOT NULL,
    gst_amount         NUMERIC(12, 2) NOT NULL,
    co2_savings_kg     NUMERIC(12, 2) NOT NULL,
    status             TEXT NOT NULL,
    payment_intent_id  TEXT,
    created_at         TIMESTAMPTZ NOT NULL,
    updated_at         TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_order_records_created_at
    ON order_records (created_at DESC);
"#;

/// Postgres-backed order store.
///
/// All operations go through the sqlx connection pool, which handles
/// thread-safe connection management.
#[derive(Debug, Clone)]
pub struct PostgresOrderStore {
    pool: Arc<PgPool>,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the backing table and indexes if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        for statement in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[instrument(skip(self, record), fields(id = %record.id), err)]
    async fn insert(&self, record: &OrderRecord) -> Result<(), StoreError> {
        let customer = serde_json::to_value(&record.customer)
            .map_err(|e| StoreError::Corrupt(format!("customer serialization failed: {e}")))?;
        let options = serde_json::to_value(record.options)
            .map_err(|e| StoreError::Corrupt(format!("options serialization failed: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO order_records (
                id, kind, customer, options,
                total_quantity, total_cost, gst_amount, co2_savings_kg,
                status, payment_intent_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(kind_as_str(record.kind))
        .bind(customer)
        .bind(options)
        .bind(record.total_quantity as i32)
        .bind(record.total_cost)
        .bind(record.gst_amount)
        .bind(record.co2_savings_kg)
        .bind(status_as_str(record.status))
        .bind(record.payment_intent_id.as_deref())
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", e))?;

        Ok(())
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn get(&self, id: OrderId) -> Result<OrderRecord, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, kind, customer, options,
                   total_quantity, total_cost, gst_amount, co2_savings_kg,
                   status, payment_intent_id, created_at, updated_at
            FROM order_records
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;

        record_from_row(&row)
    }

    #[instrument(skip(self), fields(id = %id, status = ?status), err)]
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE order_records SET status = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(status_as_str(status))
        .bind(updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_status", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self, payment_intent_id), fields(id = %id, status = ?status), err)]
    async fn set_payment_intent(
        &self,
        id: OrderId,
        payment_intent_id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE order_records
            SET payment_intent_id = $2, status = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(payment_intent_id)
        .bind(status_as_str(status))
        .bind(updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("set_payment_intent", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list_recent(&self, limit: usize) -> Result<Vec<OrderRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, kind, customer, options,
                   total_quantity, total_cost, gst_amount, co2_savings_kg,
                   status, payment_intent_id, created_at, updated_at
            FROM order_records
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_recent", e))?;

        rows.iter().map(record_from_row).collect()
    }
}

fn record_from_row(row: &PgRow) -> Result<OrderRecord, StoreError> {
    let id: Uuid = column(row, "id")?;
    let kind: String = column(row, "kind")?;
    let customer: serde_json::Value = column(row, "customer")?;
    let options: serde_json::Value = column(row, "options")?;
    let total_quantity: i32 = column(row, "total_quantity")?;
    let total_cost: Decimal = column(row, "total_cost")?;
    let gst_amount: Decimal = column(row, "gst_amount")?;
    let co2_savings_kg: Decimal = column(row, "co2_savings_kg")?;
    let status: String = column(row, "status")?;
    let payment_intent_id: Option<String> = column(row, "payment_intent_id")?;
    let created_at: DateTime<Utc> = column(row, "created_at")?;
    let updated_at: DateTime<Utc> = column(row, "updated_at")?;

    let customer: CustomerDetails = serde_json::from_value(customer)
        .map_err(|e| StoreError::Corrupt(format!("customer column: {e}")))?;
    let options: OrderOptions = serde_json::from_value(options)
        .map_err(|e| StoreError::Corrupt(format!("options column: {e}")))?;

    Ok(OrderRecord {
        id: OrderId::from(id),
        kind: kind_from_str(&kind)?,
        customer,
        options,
        total_quantity: total_quantity.max(0) as u32,
        total_cost,
        gst_amount,
        co2_savings_kg,
        status: status_from_str(&status)?,
        payment_intent_id,
        created_at,
        updated_at,
    })
}

fn column<'r, T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>>(
    row: &'r PgRow,
    name: &str,
) -> Result<T, StoreError> {
    row.try_get(name)
        .map_err(|e| StoreError::Corrupt(format!("column '{name}': {e}")))
}

fn kind_as_str(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Quote => "quote",
        RecordKind::Order => "order",
    }
}

fn kind_from_str(s: &str) -> Result<RecordKind, StoreError> {
    match s {
        "quote" => Ok(RecordKind::Quote),
        "order" => Ok(RecordKind::Order),
        other => Err(StoreError::Corrupt(format!("unknown record kind '{other}'"))),
    }
}

fn status_as_str(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Submitted => "submitted",
        OrderStatus::PaymentPending => "payment_pending",
        OrderStatus::Paid => "paid",
        OrderStatus::PaymentFailed => "payment_failed",
    }
}

fn status_from_str(s: &str) -> Result<OrderStatus, StoreError> {
    match s {
        "submitted" => Ok(OrderStatus::Submitted),
        "payment_pending" => Ok(OrderStatus::PaymentPending),
        "paid" => Ok(OrderStatus::Paid),
        "payment_failed" => Ok(OrderStatus::PaymentFailed),
        other => Err(StoreError::Corrupt(format!("unknown status '{other}'"))),
    }
}

fn map_sqlx_error(operation: &str, error: sqlx::Error) -> StoreError {
    match error {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => StoreError::Backend(format!("{operation}: {other}")),
    }
}
