//! Saga participant identities.

use serde::{Deserialize, Serialize};

/// One service-step in the saga.
///
/// The fixed forward order is
/// [order, product validation, payment, inventory]; the order service
/// both starts the saga and absorbs its completion notice. The identity
/// stamped into `Event::source` is what the router combines with the
/// status to pick the next topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Participant {
    /// The initiating order service (also the completion sink).
    OrderService,

    /// Validates that the ordered products exist in the catalog.
    ProductValidationService,

    /// Computes totals and realizes the payment.
    PaymentService,

    /// Reserves stock for the ordered products.
    InventoryService,
}

impl Participant {
    /// All participants, in forward saga order.
    pub const ALL: [Participant; 4] = [
        Participant::OrderService,
        Participant::ProductValidationService,
        Participant::PaymentService,
        Participant::InventoryService,
    ];

    /// Returns the participant name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Participant::OrderService => "ORDER_SERVICE",
            Participant::ProductValidationService => "PRODUCT_VALIDATION_SERVICE",
            Participant::PaymentService => "PAYMENT_SERVICE",
            Participant::InventoryService => "INVENTORY_SERVICE",
        }
    }
}

impl std::fmt::Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Participant::OrderService.to_string(), "ORDER_SERVICE");
        assert_eq!(
            Participant::ProductValidationService.to_string(),
            "PRODUCT_VALIDATION_SERVICE"
        );
        assert_eq!(Participant::PaymentService.to_string(), "PAYMENT_SERVICE");
        assert_eq!(
            Participant::InventoryService.to_string(),
            "INVENTORY_SERVICE"
        );
    }

    #[test]
    fn test_wire_form() {
        let json = serde_json::to_string(&Participant::PaymentService).unwrap();
        assert_eq!(json, "\"PAYMENT_SERVICE\"");
        let back: Participant = serde_json::from_str("\"INVENTORY_SERVICE\"").unwrap();
        assert_eq!(back, Participant::InventoryService);
    }

    #[test]
    fn test_all_is_forward_order() {
        assert_eq!(Participant::ALL[0], Participant::OrderService);
        assert_eq!(Participant::ALL[3], Participant::InventoryService);
    }
}
