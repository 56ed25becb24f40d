use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use badgekit_core::OrderId;
use badgekit_orders::{OrderRecord, OrderStatus};

use super::{OrderStore, StoreError};

/// In-memory order store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    records: Mutex<HashMap<OrderId, OrderRecord>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_record<T>(
        &self,
        id: OrderId,
        f: impl FnOnce(&mut OrderRecord) -> T,
    ) -> Result<T, StoreError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound)?;
        Ok(f(record))
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, record: &OrderRecord) -> Result<(), StoreError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        if records.contains_key(&record.id) {
            return Err(StoreError::Backend(format!(
                "duplicate record id {}",
                record.id
            )));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<OrderRecord, StoreError> {
        let records = self
            .records
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        records.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.with_record(id, |record| {
            record.status = status;
            record.updated_at = updated_at;
        })
    }

    async fn set_payment_intent(
        &self,
        id: OrderId,
        payment_intent_id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.with_record(id, |record| {
            record.payment_intent_id = Some(payment_intent_id.to_string());
            record.status = status;
            record.updated_at = updated_at;
        })
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<OrderRecord>, StoreError> {
        let records = self
            .records
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        let mut all: Vec<OrderRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.truncate(limit);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use badgekit_orders::{CustomerDetails, RecordKind};
    use badgekit_pricing::{
        BadgeSize, Calculator, InkCoverage, Lanyards, OrderOptions, PrintedSides, ShippingMethod,
    };

    fn sample_record() -> OrderRecord {
        let options = OrderOptions {
            with_guest_names: 100,
            without_guest_names: 0,
            size: BadgeSize::A7,
            printed_sides: PrintedSides::Single,
            ink_coverage: InkCoverage::UpTo40,
            lanyards: Lanyards::Included,
            shipping: ShippingMethod::Standard,
        };
        let summary = Calculator::new().summarize(&options);
        OrderRecord::new(
            RecordKind::Order,
            CustomerDetails {
                name: "Dana Smith".to_string(),
                email: "dana@example.com".to_string(),
                company: None,
                phone: None,
                event_name: None,
            },
            options,
            &summary,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn insert_then_get_roundtrips() {
        let store = InMemoryOrderStore::new();
        let record = sample_record();
        store.insert(&record).await.unwrap();
        let loaded = store.get(record.id).await.unwrap();
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = InMemoryOrderStore::new();
        let record = sample_record();
        store.insert(&record).await.unwrap();
        assert!(matches!(
            store.insert(&record).await,
            Err(StoreError::Backend(_))
        ));
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let store = InMemoryOrderStore::new();
        assert!(matches!(
            store.get(OrderId::new()).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn payment_fields_are_persisted() {
        let store = InMemoryOrderStore::new();
        let record = sample_record();
        store.insert(&record).await.unwrap();

        let now = Utc::now();
        store
            .set_payment_intent(record.id, "pi_123", OrderStatus::PaymentPending, now)
            .await
            .unwrap();
        let loaded = store.get(record.id).await.unwrap();
        assert_eq!(loaded.payment_intent_id.as_deref(), Some("pi_123"));
        assert_eq!(loaded.status, OrderStatus::PaymentPending);

        store
            .update_status(record.id, OrderStatus::Paid, Utc::now())
            .await
            .unwrap();
        let loaded = store.get(record.id).await.unwrap();
        assert_eq!(loaded.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn list_recent_orders_newest_first() {
        let store = InMemoryOrderStore::new();
        let mut ids = Vec::new();
        for i in 0..5 {
            let mut record = sample_record();
            record.created_at = Utc::now() + chrono::Duration::seconds(i);
            record.updated_at = record.created_at;
            ids.push(record.id);
            store.insert(&record).await.unwrap();
        }

        let recent = store.list_recent(3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].id, ids[4]);
        assert_eq!(recent[2].id, ids[2]);
    }
}
