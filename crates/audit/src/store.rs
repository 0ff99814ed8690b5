//! Audit store contract.

use async_trait::async_trait;
use common::{OrderId, TransactionId};
use saga::Event;

use crate::error::Result;

/// Document-oriented store of full saga events.
///
/// Saving is an upsert keyed by the event ID: the order service saves
/// the event once at saga start and once more with the final history
/// when the completion notice arrives.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Inserts or replaces the event document.
    async fn save(&self, event: &Event) -> Result<()>;

    /// Most recent event for the order, by creation time.
    async fn find_latest_by_order_id(&self, order_id: OrderId) -> Result<Option<Event>>;

    /// Most recent event for the transaction, by creation time.
    async fn find_latest_by_transaction_id(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<Event>>;

    /// All events, ordered by creation time descending.
    async fn find_all(&self) -> Result<Vec<Event>>;
}
