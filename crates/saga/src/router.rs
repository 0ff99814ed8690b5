//! Pure routing of saga events to topics.
//!
//! Routing looks only at the event status and the participant that last
//! wrote the event — never at the payload. Which topic sits forward or
//! backward of a participant is configuration, supplied per participant
//! through [`Routes`].

use crate::participant::Participant;
use crate::status::SagaStatus;

/// Identity of a pub/sub channel. Configuration, not protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
    /// Creates a topic from its configured name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the topic name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Topic {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The three destinations configured for one participant.
#[derive(Debug, Clone)]
pub struct Routes {
    /// Where a `SUCCESS` event goes: the next forward participant's
    /// input, or the completion topic for the final participant.
    pub advance: Topic,
    /// Where a `ROLLBACK_PENDING` event goes: this participant's own
    /// compensation input, so it can compensate itself first.
    pub compensation: Topic,
    /// Where a `FAIL` event goes: the previous participant's
    /// compensation input.
    pub backward: Topic,
}

/// Total mapping from (status, source participant) to the next topic.
///
/// Total by construction: every participant has all three routes, and
/// every status maps onto exactly one of them.
#[derive(Debug, Clone)]
pub struct SagaRouter {
    order: Routes,
    product_validation: Routes,
    payment: Routes,
    inventory: Routes,
}

impl SagaRouter {
    /// Builds a router from explicit per-participant routes.
    pub fn new(
        order: Routes,
        product_validation: Routes,
        payment: Routes,
        inventory: Routes,
    ) -> Self {
        Self {
            order,
            product_validation,
            payment,
            inventory,
        }
    }

    /// The standard order fulfillment topology.
    ///
    /// Forward chain: order → product validation → payment → inventory
    /// → completion notice. The order service absorbs both terminal
    /// outcomes on the `notify-ending` topic.
    pub fn order_fulfillment() -> Self {
        let notify_ending = Topic::from(topics::NOTIFY_ENDING);
        Self::new(
            Routes {
                advance: Topic::from(topics::PRODUCT_VALIDATION_START),
                // The initiator has nothing to compensate; both rollback
                // routes terminate the saga at the order service.
                compensation: notify_ending.clone(),
                backward: notify_ending.clone(),
            },
            Routes {
                advance: Topic::from(topics::PAYMENT_SUCCESS),
                compensation: Topic::from(topics::PRODUCT_VALIDATION_FAIL),
                backward: notify_ending.clone(),
            },
            Routes {
                advance: Topic::from(topics::INVENTORY_SUCCESS),
                compensation: Topic::from(topics::PAYMENT_FAIL),
                backward: Topic::from(topics::PRODUCT_VALIDATION_FAIL),
            },
            Routes {
                advance: notify_ending,
                compensation: Topic::from(topics::INVENTORY_FAIL),
                backward: Topic::from(topics::PAYMENT_FAIL),
            },
        )
    }

    /// Returns the configured routes for a participant.
    pub fn routes_for(&self, participant: Participant) -> &Routes {
        match participant {
            Participant::OrderService => &self.order,
            Participant::ProductValidationService => &self.product_validation,
            Participant::PaymentService => &self.payment,
            Participant::InventoryService => &self.inventory,
        }
    }

    /// The pure routing function: next topic for an event with the given
    /// status last written by the given participant.
    pub fn next_topic(&self, status: SagaStatus, source: Participant) -> &Topic {
        let routes = self.routes_for(source);
        match status {
            SagaStatus::Success => &routes.advance,
            SagaStatus::RollbackPending => &routes.compensation,
            SagaStatus::Fail => &routes.backward,
        }
    }
}

/// Topic names of the standard order fulfillment topology.
pub mod topics {
    pub const PRODUCT_VALIDATION_START: &str = "product-validation-start";
    pub const PRODUCT_VALIDATION_FAIL: &str = "product-validation-fail";
    pub const PAYMENT_SUCCESS: &str = "payment-success";
    pub const PAYMENT_FAIL: &str = "payment-fail";
    pub const INVENTORY_SUCCESS: &str = "inventory-success";
    pub const INVENTORY_FAIL: &str = "inventory-fail";
    pub const NOTIFY_ENDING: &str = "notify-ending";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_is_total_and_deterministic() {
        let router = SagaRouter::order_fulfillment();
        let statuses = [
            SagaStatus::Success,
            SagaStatus::RollbackPending,
            SagaStatus::Fail,
        ];

        for status in statuses {
            for participant in Participant::ALL {
                let first = router.next_topic(status, participant).clone();
                let second = router.next_topic(status, participant).clone();
                assert_eq!(first, second);
                assert!(!first.as_str().is_empty());
            }
        }
    }

    #[test]
    fn test_success_advances_forward() {
        let router = SagaRouter::order_fulfillment();
        assert_eq!(
            router
                .next_topic(SagaStatus::Success, Participant::OrderService)
                .as_str(),
            topics::PRODUCT_VALIDATION_START
        );
        assert_eq!(
            router
                .next_topic(SagaStatus::Success, Participant::ProductValidationService)
                .as_str(),
            topics::PAYMENT_SUCCESS
        );
        assert_eq!(
            router
                .next_topic(SagaStatus::Success, Participant::PaymentService)
                .as_str(),
            topics::INVENTORY_SUCCESS
        );
        assert_eq!(
            router
                .next_topic(SagaStatus::Success, Participant::InventoryService)
                .as_str(),
            topics::NOTIFY_ENDING
        );
    }

    #[test]
    fn test_rollback_pending_is_self_addressed() {
        let router = SagaRouter::order_fulfillment();
        assert_eq!(
            router
                .next_topic(SagaStatus::RollbackPending, Participant::InventoryService)
                .as_str(),
            topics::INVENTORY_FAIL
        );
        assert_eq!(
            router
                .next_topic(SagaStatus::RollbackPending, Participant::PaymentService)
                .as_str(),
            topics::PAYMENT_FAIL
        );
        assert_eq!(
            router
                .next_topic(
                    SagaStatus::RollbackPending,
                    Participant::ProductValidationService
                )
                .as_str(),
            topics::PRODUCT_VALIDATION_FAIL
        );
    }

    #[test]
    fn test_fail_retreats_backward() {
        let router = SagaRouter::order_fulfillment();
        assert_eq!(
            router
                .next_topic(SagaStatus::Fail, Participant::InventoryService)
                .as_str(),
            topics::PAYMENT_FAIL
        );
        assert_eq!(
            router
                .next_topic(SagaStatus::Fail, Participant::PaymentService)
                .as_str(),
            topics::PRODUCT_VALIDATION_FAIL
        );
        assert_eq!(
            router
                .next_topic(SagaStatus::Fail, Participant::ProductValidationService)
                .as_str(),
            topics::NOTIFY_ENDING
        );
    }
}
