//! Transport seam between participants.
//!
//! The real deployment would publish to a message broker with per-key
//! ordered, at-least-once delivery; that transport is an external
//! collaborator. [`Publisher`] is the seam, and [`InMemoryBroker`] is
//! the in-process implementation used by tests and the demo server.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{Result, SagaError};
use crate::event::Event;
use crate::router::Topic;

/// Publishes a saga event to a topic.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Hands the event to the transport. Publishing is fire-and-forget:
    /// the caller never waits for the next participant.
    async fn publish(&self, topic: &Topic, event: Event) -> Result<()>;
}

/// In-memory pub/sub broker backed by unbounded channels.
///
/// Delivery is FIFO per topic, which gives the per-transaction ordering
/// the protocol expects as long as each topic has a single consumer.
#[derive(Clone, Default)]
pub struct InMemoryBroker {
    subscribers: Arc<RwLock<HashMap<Topic, mpsc::UnboundedSender<Event>>>>,
}

impl InMemoryBroker {
    /// Creates a new broker with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to a topic, replacing any previous subscriber.
    pub fn subscribe(&self, topic: &Topic) -> mpsc::UnboundedReceiver<Event> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(topic.clone(), tx);
        rx
    }

    /// Returns the number of subscribed topics.
    pub fn topic_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Publisher for InMemoryBroker {
    async fn publish(&self, topic: &Topic, event: Event) -> Result<()> {
        let sender = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .cloned()
            .ok_or_else(|| SagaError::Transport(format!("no subscriber for topic {topic}")))?;

        sender
            .send(event)
            .map_err(|_| SagaError::Transport(format!("subscriber for topic {topic} is gone")))?;

        metrics::counter!("saga_events_published_total", "topic" => topic.as_str().to_string())
            .increment(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Order, OrderProduct, Product};
    use common::Money;

    fn sample_event() -> Event {
        Event::start(Order::new(vec![OrderProduct::new(
            Product::new("MOVIES", Money::from_cents(700)),
            1,
        )]))
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber_in_order() {
        let broker = InMemoryBroker::new();
        let topic = Topic::from("payment-success");
        let mut rx = broker.subscribe(&topic);

        let first = sample_event();
        let second = sample_event();
        broker.publish(&topic, first.clone()).await.unwrap();
        broker.publish(&topic, second.clone()).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().id, first.id);
        assert_eq!(rx.recv().await.unwrap().id, second.id);
    }

    #[tokio::test]
    async fn test_publish_without_subscriber_is_a_transport_error() {
        let broker = InMemoryBroker::new();
        let result = broker
            .publish(&Topic::from("inventory-success"), sample_event())
            .await;
        assert!(matches!(result, Err(SagaError::Transport(_))));
    }

    #[tokio::test]
    async fn test_topic_count() {
        let broker = InMemoryBroker::new();
        assert_eq!(broker.topic_count(), 0);
        let _rx = broker.subscribe(&Topic::from("notify-ending"));
        assert_eq!(broker.topic_count(), 1);
    }
}
