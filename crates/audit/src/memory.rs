use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{EventId, OrderId, TransactionId};
use saga::Event;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::AuditStore;

/// In-memory audit store for tests and the demo server.
///
/// Stores documents keyed by event ID and provides the same query
/// surface as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryAuditStore {
    events: Arc<RwLock<HashMap<EventId, Event>>>,
}

impl InMemoryAuditStore {
    /// Creates a new empty audit store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored event documents.
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn save(&self, event: &Event) -> Result<()> {
        self.events.write().await.insert(event.id, event.clone());
        Ok(())
    }

    async fn find_latest_by_order_id(&self, order_id: OrderId) -> Result<Option<Event>> {
        Ok(self
            .events
            .read()
            .await
            .values()
            .filter(|e| e.order_id == order_id)
            .max_by_key(|e| e.created_at)
            .cloned())
    }

    async fn find_latest_by_transaction_id(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<Event>> {
        Ok(self
            .events
            .read()
            .await
            .values()
            .filter(|e| e.transaction_id == transaction_id)
            .max_by_key(|e| e.created_at)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Event>> {
        let mut events: Vec<Event> = self.events.read().await.values().cloned().collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }
}
