//! Local step-record store contract.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, TransactionId};
use saga::Result;
use tokio::sync::RwLock;

/// Per-participant store tying an (order, transaction) key to the
/// participant's own committed effect.
///
/// Existence of a record for a key is the idempotency fact the guard
/// checks. Records are created on the first step attempt, updated in
/// place during compensation, and never deleted. The store's own
/// transaction support makes check-then-write atomic for a key; the
/// engine additionally serializes all events per participant.
#[async_trait]
pub trait StepRecordStore<R>: Send + Sync
where
    R: Clone + Send + Sync + 'static,
{
    /// True if a record exists for the key.
    async fn exists(&self, order_id: OrderId, transaction_id: TransactionId) -> Result<bool>;

    /// Fetches the record for the key, if any.
    async fn find(&self, order_id: OrderId, transaction_id: TransactionId)
    -> Result<Option<R>>;

    /// Inserts or replaces the record for the key.
    async fn save(
        &self,
        order_id: OrderId,
        transaction_id: TransactionId,
        record: R,
    ) -> Result<()>;
}

/// In-memory step-record store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStepRecordStore<R> {
    records: Arc<RwLock<HashMap<(OrderId, TransactionId), R>>>,
}

impl<R> InMemoryStepRecordStore<R>
where
    R: Clone + Send + Sync + 'static,
{
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of stored records.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl<R> StepRecordStore<R> for InMemoryStepRecordStore<R>
where
    R: Clone + Send + Sync + 'static,
{
    async fn exists(&self, order_id: OrderId, transaction_id: TransactionId) -> Result<bool> {
        Ok(self
            .records
            .read()
            .await
            .contains_key(&(order_id, transaction_id)))
    }

    async fn find(
        &self,
        order_id: OrderId,
        transaction_id: TransactionId,
    ) -> Result<Option<R>> {
        Ok(self
            .records
            .read()
            .await
            .get(&(order_id, transaction_id))
            .cloned())
    }

    async fn save(
        &self,
        order_id: OrderId,
        transaction_id: TransactionId,
        record: R,
    ) -> Result<()> {
        self.records
            .write()
            .await
            .insert((order_id, transaction_id), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exists_find_save() {
        let store = InMemoryStepRecordStore::<u32>::new();
        let order_id = OrderId::new();
        let transaction_id = TransactionId::new();

        assert!(!store.exists(order_id, transaction_id).await.unwrap());
        assert!(store.find(order_id, transaction_id).await.unwrap().is_none());

        store.save(order_id, transaction_id, 7).await.unwrap();
        assert!(store.exists(order_id, transaction_id).await.unwrap());
        assert_eq!(store.find(order_id, transaction_id).await.unwrap(), Some(7));
        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn test_save_replaces_in_place() {
        let store = InMemoryStepRecordStore::<u32>::new();
        let order_id = OrderId::new();
        let transaction_id = TransactionId::new();

        store.save(order_id, transaction_id, 1).await.unwrap();
        store.save(order_id, transaction_id, 2).await.unwrap();

        assert_eq!(store.find(order_id, transaction_id).await.unwrap(), Some(2));
        assert_eq!(store.record_count().await, 1);
    }

    #[tokio::test]
    async fn test_keys_are_per_transaction() {
        let store = InMemoryStepRecordStore::<u32>::new();
        let order_id = OrderId::new();

        store.save(order_id, TransactionId::new(), 1).await.unwrap();
        // A retried saga attempt uses a fresh transaction ID.
        assert!(
            !store
                .exists(order_id, TransactionId::new())
                .await
                .unwrap()
        );
    }
}
