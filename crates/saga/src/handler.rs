//! Per-participant event handling: execute or compensate, then route.

use std::sync::Arc;

use crate::broker::Publisher;
use crate::error::Result;
use crate::event::Event;
use crate::router::SagaRouter;
use crate::step::SagaStep;

/// Glues one participant's step executor to the router and transport.
///
/// Whatever the step's outcome, the resulting event is published to the
/// topic the router selects; publication is the only way a saga makes
/// progress, forward or backward.
pub struct StepHandler<S, P> {
    step: S,
    router: Arc<SagaRouter>,
    publisher: P,
}

impl<S, P> StepHandler<S, P>
where
    S: SagaStep,
    P: Publisher,
{
    /// Creates a handler for one participant.
    pub fn new(step: S, router: Arc<SagaRouter>, publisher: P) -> Self {
        Self {
            step,
            router,
            publisher,
        }
    }

    /// Handles an event from the participant's forward input topic.
    ///
    /// Returns the event as published, which tests use to observe the
    /// routing decision.
    #[tracing::instrument(skip(self, event), fields(order_id = %event.order_id))]
    pub async fn handle_execute(&self, event: Event) -> Result<Event> {
        let event = self.step.execute(event).await;
        self.route_and_publish(event).await
    }

    /// Handles an event from the participant's compensation input topic.
    #[tracing::instrument(skip(self, event), fields(order_id = %event.order_id))]
    pub async fn handle_compensate(&self, event: Event) -> Result<Event> {
        let event = self.step.compensate(event).await;
        self.route_and_publish(event).await
    }

    async fn route_and_publish(&self, event: Event) -> Result<Event> {
        let topic = self.router.next_topic(event.status, event.source);
        tracing::info!(
            current_saga = %event.source,
            status = %event.status,
            next_topic = %topic,
            order_id = %event.order_id,
            transaction_id = %event.transaction_id,
            event_id = %event.id,
            "routing saga event"
        );
        self.publisher.publish(topic, event.clone()).await?;
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::InMemoryBroker;
    use crate::error::SagaError;
    use crate::event::{Order, OrderProduct, Product};
    use crate::participant::Participant;
    use crate::router::{Topic, topics};
    use crate::status::SagaStatus;
    use async_trait::async_trait;
    use common::{Money, OrderId, TransactionId};

    struct FlakyInventoryStep {
        fail: bool,
    }

    #[async_trait]
    impl SagaStep for FlakyInventoryStep {
        fn participant(&self) -> Participant {
            Participant::InventoryService
        }

        fn label(&self) -> &'static str {
            "inventory"
        }

        async fn already_processed(&self, _: OrderId, _: TransactionId) -> Result<bool> {
            Ok(false)
        }

        async fn apply(&self, _event: &mut Event) -> Result<String> {
            if self.fail {
                Err(SagaError::validation("Product is out of stock"))
            } else {
                Ok("Inventory updated successfully!".to_string())
            }
        }

        async fn reverse(&self, _event: &mut Event) -> Result<()> {
            Ok(())
        }
    }

    fn sample_event() -> Event {
        Event::start(Order::new(vec![OrderProduct::new(
            Product::new("MUSIC", Money::from_cents(900)),
            1,
        )]))
    }

    #[tokio::test]
    async fn test_success_is_published_to_advance_topic() {
        let broker = InMemoryBroker::new();
        let mut ending = broker.subscribe(&Topic::from(topics::NOTIFY_ENDING));
        let handler = StepHandler::new(
            FlakyInventoryStep { fail: false },
            Arc::new(SagaRouter::order_fulfillment()),
            broker.clone(),
        );

        let published = handler.handle_execute(sample_event()).await.unwrap();
        assert_eq!(published.status, SagaStatus::Success);

        let delivered = ending.recv().await.unwrap();
        assert_eq!(delivered.id, published.id);
    }

    #[tokio::test]
    async fn test_failure_is_published_to_own_compensation_topic() {
        let broker = InMemoryBroker::new();
        let mut fail_rx = broker.subscribe(&Topic::from(topics::INVENTORY_FAIL));
        let handler = StepHandler::new(
            FlakyInventoryStep { fail: true },
            Arc::new(SagaRouter::order_fulfillment()),
            broker.clone(),
        );

        let published = handler.handle_execute(sample_event()).await.unwrap();
        assert_eq!(published.status, SagaStatus::RollbackPending);
        assert_eq!(published.source, Participant::InventoryService);

        let delivered = fail_rx.recv().await.unwrap();
        assert_eq!(delivered.id, published.id);
    }

    #[tokio::test]
    async fn test_compensation_is_published_backward() {
        let broker = InMemoryBroker::new();
        let mut payment_fail = broker.subscribe(&Topic::from(topics::PAYMENT_FAIL));
        let handler = StepHandler::new(
            FlakyInventoryStep { fail: true },
            Arc::new(SagaRouter::order_fulfillment()),
            broker.clone(),
        );

        let published = handler.handle_compensate(sample_event()).await.unwrap();
        assert_eq!(published.status, SagaStatus::Fail);

        let delivered = payment_fail.recv().await.unwrap();
        assert_eq!(delivered.id, published.id);
    }

    #[tokio::test]
    async fn test_missing_subscriber_surfaces_as_transport_error() {
        let broker = InMemoryBroker::new();
        let handler = StepHandler::new(
            FlakyInventoryStep { fail: false },
            Arc::new(SagaRouter::order_fulfillment()),
            broker,
        );

        let result = handler.handle_execute(sample_event()).await;
        assert!(matches!(result, Err(SagaError::Transport(_))));
    }
}
