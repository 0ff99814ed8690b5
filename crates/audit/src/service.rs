//! Order-service event handling: saga start and completion notice.

use chrono::Utc;
use saga::{Event, Order, Participant, SagaStatus};

use crate::error::{AuditError, Result};
use crate::store::AuditStore;

/// Filters for querying the audit trail.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventFilters {
    pub order_id: Option<common::OrderId>,
    pub transaction_id: Option<common::TransactionId>,
}

/// The order service's view of the saga: it creates the first event and
/// absorbs the terminal one, persisting both to the audit store.
pub struct EventService<A> {
    store: A,
}

impl<A> EventService<A>
where
    A: AuditStore,
{
    /// Creates the service over an audit store.
    pub fn new(store: A) -> Self {
        Self { store }
    }

    /// Starts a saga for the given order.
    ///
    /// Builds the first event (source = order service, status SUCCESS,
    /// "Saga started!" history) and records it. The caller publishes it
    /// to the first forward topic.
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn create_event(&self, order: Order) -> Result<Event> {
        let event = Event::start(order);
        self.store.save(&event).await?;
        tracing::info!(
            event_id = %event.id,
            transaction_id = %event.transaction_id,
            "saga started"
        );
        Ok(event)
    }

    /// Absorbs the completion notice ending a saga.
    ///
    /// Stamps the order service as the final source, appends the
    /// terminal history entry, and persists the finished document. The
    /// event is not published again: the saga is over.
    #[tracing::instrument(skip(self, event), fields(order_id = %event.order_id))]
    pub async fn notify_ending(&self, mut event: Event) -> Result<Event> {
        event.source = Participant::OrderService;
        event.created_at = Utc::now();

        if event.status == SagaStatus::Success {
            metrics::counter!("sagas_finished_total", "outcome" => "success").increment(1);
            tracing::info!(event_id = %event.id, "saga finished successfully");
            event.add_history("Saga finished successfully!");
        } else {
            metrics::counter!("sagas_finished_total", "outcome" => "fail").increment(1);
            tracing::warn!(event_id = %event.id, status = %event.status, "saga finished with errors");
            event.add_history("Saga finished with errors!");
        }

        self.store.save(&event).await?;
        Ok(event)
    }

    /// Finds the most recent event matching the filters.
    ///
    /// The order ID takes precedence when both filters are present; at
    /// least one must be informed.
    pub async fn find_by_filters(&self, filters: EventFilters) -> Result<Event> {
        if let Some(order_id) = filters.order_id {
            self.store
                .find_latest_by_order_id(order_id)
                .await?
                .ok_or(AuditError::NotFoundByOrder(order_id))
        } else if let Some(transaction_id) = filters.transaction_id {
            self.store
                .find_latest_by_transaction_id(transaction_id)
                .await?
                .ok_or(AuditError::NotFoundByTransaction(transaction_id))
        } else {
            Err(AuditError::MissingFilters)
        }
    }

    /// All recorded events, newest first.
    pub async fn find_all(&self) -> Result<Vec<Event>> {
        self.store.find_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryAuditStore;
    use common::Money;
    use saga::{OrderProduct, Product};

    fn sample_order() -> Order {
        Order::new(vec![OrderProduct::new(
            Product::new("MUSIC", Money::from_cents(900)),
            1,
        )])
    }

    fn service() -> EventService<InMemoryAuditStore> {
        EventService::new(InMemoryAuditStore::new())
    }

    #[tokio::test]
    async fn test_create_event_persists_started_saga() {
        let service = service();
        let event = service.create_event(sample_order()).await.unwrap();

        assert_eq!(event.source, Participant::OrderService);
        assert_eq!(event.status, SagaStatus::Success);
        assert_eq!(event.history[0].message, "Saga started!");

        let loaded = service
            .find_by_filters(EventFilters {
                order_id: Some(event.order_id),
                transaction_id: None,
            })
            .await
            .unwrap();
        assert_eq!(loaded.id, event.id);
    }

    #[tokio::test]
    async fn test_notify_ending_success_appends_terminal_history() {
        let service = service();
        let started = service.create_event(sample_order()).await.unwrap();

        let finished = service.notify_ending(started).await.unwrap();
        assert_eq!(finished.source, Participant::OrderService);
        assert_eq!(
            finished.history.last().unwrap().message,
            "Saga finished successfully!"
        );
    }

    #[tokio::test]
    async fn test_notify_ending_failure_appends_error_history() {
        let service = service();
        let mut started = service.create_event(sample_order()).await.unwrap();
        started.mark_fail(Participant::ProductValidationService);

        let finished = service.notify_ending(started).await.unwrap();
        assert_eq!(finished.status, SagaStatus::Fail);
        assert_eq!(
            finished.history.last().unwrap().message,
            "Saga finished with errors!"
        );
    }

    #[tokio::test]
    async fn test_find_by_filters_requires_a_filter() {
        let service = service();
        let result = service.find_by_filters(EventFilters::default()).await;
        assert!(matches!(result, Err(AuditError::MissingFilters)));
    }

    #[tokio::test]
    async fn test_find_by_transaction_id() {
        let service = service();
        let event = service.create_event(sample_order()).await.unwrap();

        let loaded = service
            .find_by_filters(EventFilters {
                order_id: None,
                transaction_id: Some(event.transaction_id),
            })
            .await
            .unwrap();
        assert_eq!(loaded.id, event.id);
    }

    #[tokio::test]
    async fn test_find_by_unknown_order_is_not_found() {
        let service = service();
        let result = service
            .find_by_filters(EventFilters {
                order_id: Some(common::OrderId::new()),
                transaction_id: None,
            })
            .await;
        assert!(matches!(result, Err(AuditError::NotFoundByOrder(_))));
    }
}
