//! Order persistence.
//!
//! One row per saved quote or submitted order. The store never computes
//! anything: pricing fields arrive already settled by the engine and are
//! written back verbatim.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use badgekit_core::OrderId;
use badgekit_orders::{OrderRecord, OrderStatus};

mod in_memory;
mod postgres;

pub use in_memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;

/// Order store operation error.
///
/// These are infrastructure errors (storage, connectivity) as opposed to
/// domain errors (validation, invariants). `NotFound` is the one case the
/// API surfaces distinctly.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("stored record is malformed: {0}")]
    Corrupt(String),
}

/// Persistence boundary for quotes and orders.
///
/// Status transitions are validated by `OrderRecord` before they reach the
/// store; implementations persist what they are given.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a freshly created record.
    async fn insert(&self, record: &OrderRecord) -> Result<(), StoreError>;

    /// Load a record by id.
    async fn get(&self, id: OrderId) -> Result<OrderRecord, StoreError>;

    /// Persist a status change.
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Attach a payment intent and persist the accompanying status change.
    async fn set_payment_intent(
        &self,
        id: OrderId,
        payment_intent_id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Most recent records first, capped at `limit`.
    async fn list_recent(&self, limit: usize) -> Result<Vec<OrderRecord>, StoreError>;
}

#[async_trait]
impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    async fn insert(&self, record: &OrderRecord) -> Result<(), StoreError> {
        (**self).insert(record).await
    }

    async fn get(&self, id: OrderId) -> Result<OrderRecord, StoreError> {
        (**self).get(id).await
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        (**self).update_status(id, status, updated_at).await
    }

    async fn set_payment_intent(
        &self,
        id: OrderId,
        payment_intent_id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        (**self)
            .set_payment_intent(id, payment_intent_id, status, updated_at)
            .await
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<OrderRecord>, StoreError> {
        (**self).list_recent(limit).await
    }
}
