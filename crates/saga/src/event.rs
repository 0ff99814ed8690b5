//! The saga event and its embedded audit history.
//!
//! The event is the unit of saga state. It travels between participants
//! by value; participants only ever set `status`/`source` and append to
//! `history` — entries are never mutated, reordered, or removed once
//! appended, because the history is the audit trail proving which
//! compensations ran.

use chrono::{DateTime, Utc};
use common::{EventId, Money, OrderId, ProductCode, TransactionId};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SagaError};
use crate::participant::Participant;
use crate::status::SagaStatus;

/// A product as referenced by an order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog code of the product.
    pub code: ProductCode,
    /// Price of one unit.
    pub unit_value: Money,
}

impl Product {
    /// Creates a new product reference.
    pub fn new(code: impl Into<ProductCode>, unit_value: Money) -> Self {
        Self {
            code: code.into(),
            unit_value,
        }
    }
}

/// One order line: a product and the quantity ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderProduct {
    pub product: Product,
    pub quantity: u32,
}

impl OrderProduct {
    /// Creates a new order line.
    pub fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }
}

/// The order snapshot carried in the event payload.
///
/// `total_amount` and `total_items` start at zero and are filled in by
/// the payment step; this is the one place cross-step data flows
/// forward through the saga.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub transaction_id: TransactionId,
    pub products: Vec<OrderProduct>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub total_amount: Money,
    #[serde(default)]
    pub total_items: u32,
}

impl Order {
    /// Creates a new order snapshot with a fresh order and transaction ID.
    pub fn new(products: Vec<OrderProduct>) -> Self {
        Self {
            id: OrderId::new(),
            transaction_id: TransactionId::new(),
            products,
            created_at: Utc::now(),
            total_amount: Money::zero(),
            total_items: 0,
        }
    }
}

/// One audit entry, appended exactly once per step attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    /// The participant that wrote this entry.
    pub source: Participant,
    /// The event status at the time of the attempt.
    pub status: SagaStatus,
    /// Human-readable outcome of the attempt.
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// The unit of saga state, passed by value between participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub order_id: OrderId,
    pub transaction_id: TransactionId,
    pub payload: Order,
    /// The participant that last wrote this event.
    pub source: Participant,
    pub status: SagaStatus,
    /// Append-only audit trail, ordered oldest first.
    #[serde(default)]
    pub history: Vec<History>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Creates the first event of a saga from an order snapshot.
    ///
    /// Done once, by the initiating order service: the event starts in
    /// `SUCCESS` with a single "Saga started!" history entry.
    pub fn start(payload: Order) -> Self {
        let mut event = Self {
            id: EventId::new(),
            order_id: payload.id,
            transaction_id: payload.transaction_id,
            payload,
            source: Participant::OrderService,
            status: SagaStatus::Success,
            history: Vec::new(),
            created_at: Utc::now(),
        };
        event.add_history("Saga started!");
        event
    }

    /// Appends a history entry stamped with the current source and status.
    pub fn add_history(&mut self, message: impl Into<String>) {
        self.history.push(History {
            source: self.source,
            status: self.status,
            message: message.into(),
            created_at: Utc::now(),
        });
    }

    /// Records a successful step: status `SUCCESS`, new source, history entry.
    pub fn mark_success(&mut self, source: Participant, message: impl Into<String>) {
        self.status = SagaStatus::Success;
        self.source = source;
        self.add_history(message);
    }

    /// Records a failed step: status `ROLLBACK_PENDING`, new source,
    /// history entry carrying the error message.
    pub fn mark_rollback_pending(&mut self, source: Participant, message: impl Into<String>) {
        self.status = SagaStatus::RollbackPending;
        self.source = source;
        self.add_history(message);
    }

    /// Stamps the event as failing at the given participant.
    ///
    /// Compensation appends its own history entry afterwards, so none is
    /// added here.
    pub fn mark_fail(&mut self, source: Participant) {
        self.status = SagaStatus::Fail;
        self.source = source;
    }

    /// Checks the structural preconditions every step requires.
    pub fn validate_structure(&self) -> Result<()> {
        if self.payload.products.is_empty() {
            return Err(SagaError::validation("Product list is empty!"));
        }
        if self.payload.id != self.order_id || self.payload.transaction_id != self.transaction_id {
            return Err(SagaError::validation(
                "OrderId and transactionId must match the payload!",
            ));
        }
        Ok(())
    }

    /// The saga key identifying this business transaction.
    pub fn key(&self) -> (OrderId, TransactionId) {
        (self.order_id, self.transaction_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        Order::new(vec![OrderProduct::new(
            Product::new("COMIC_BOOKS", Money::from_cents(500)),
            2,
        )])
    }

    #[test]
    fn test_start_appends_saga_started() {
        let event = Event::start(sample_order());

        assert_eq!(event.source, Participant::OrderService);
        assert_eq!(event.status, SagaStatus::Success);
        assert_eq!(event.order_id, event.payload.id);
        assert_eq!(event.transaction_id, event.payload.transaction_id);
        assert_eq!(event.history.len(), 1);
        assert_eq!(event.history[0].message, "Saga started!");
        assert_eq!(event.history[0].source, Participant::OrderService);
    }

    #[test]
    fn test_history_is_append_only_and_ordered() {
        let mut event = Event::start(sample_order());
        event.mark_success(
            Participant::ProductValidationService,
            "Products are validated successfully!",
        );
        event.mark_rollback_pending(Participant::PaymentService, "Fail to realize payment");

        let messages: Vec<&str> = event.history.iter().map(|h| h.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Saga started!",
                "Products are validated successfully!",
                "Fail to realize payment"
            ]
        );
        assert_eq!(event.history[1].status, SagaStatus::Success);
        assert_eq!(event.history[2].status, SagaStatus::RollbackPending);
    }

    #[test]
    fn test_mark_fail_sets_no_history() {
        let mut event = Event::start(sample_order());
        event.mark_fail(Participant::InventoryService);

        assert_eq!(event.status, SagaStatus::Fail);
        assert_eq!(event.source, Participant::InventoryService);
        assert_eq!(event.history.len(), 1);
    }

    #[test]
    fn test_validate_structure_rejects_empty_product_list() {
        let event = Event::start(Order::new(Vec::new()));
        let err = event.validate_structure().unwrap_err();
        assert_eq!(err.to_string(), "Product list is empty!");
    }

    #[test]
    fn test_validate_structure_rejects_mismatched_ids() {
        let mut event = Event::start(sample_order());
        event.order_id = OrderId::new();
        assert!(event.validate_structure().is_err());
    }

    #[test]
    fn test_serialization_preserves_field_identity_and_history_order() {
        let mut event = Event::start(sample_order());
        event.mark_success(Participant::ProductValidationService, "validated");

        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let event = Event::start(sample_order());
        let mut value = serde_json::to_value(&event).unwrap();
        value["someFutureField"] = serde_json::json!({"nested": true});

        let back: Event = serde_json::from_value(value).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn test_wire_form_is_camel_case() {
        let event = Event::start(sample_order());
        let value = serde_json::to_value(&event).unwrap();
        assert!(value.get("orderId").is_some());
        assert!(value.get("transactionId").is_some());
        assert_eq!(value["source"], "ORDER_SERVICE");
        assert_eq!(value["status"], "SUCCESS");
    }
}
