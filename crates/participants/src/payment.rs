//! Payment participant, the second forward step.

use async_trait::async_trait;
use common::{Money, OrderId, TransactionId};
use saga::{Event, Participant, Result, SagaError, SagaStep};
use serde::{Deserialize, Serialize};

use crate::store::StepRecordStore;

/// Lifecycle of a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Record created, amount not yet confirmed.
    #[default]
    Pending,
    /// Payment realized.
    Success,
    /// Payment reversed during compensation.
    Refund,
}

/// The payment participant's local step record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub total_amount: Money,
    pub total_items: u32,
    pub status: PaymentStatus,
}

/// Step executor computing order totals and realizing the payment.
pub struct PaymentStep<S> {
    store: S,
    min_amount: Money,
}

/// Smallest payable amount accepted by default (0.10).
pub const DEFAULT_MIN_AMOUNT: Money = Money::from_cents(10);

impl<S> PaymentStep<S>
where
    S: StepRecordStore<PaymentRecord>,
{
    /// Creates the payment step with the default minimum amount.
    pub fn new(store: S) -> Self {
        Self::with_min_amount(store, DEFAULT_MIN_AMOUNT)
    }

    /// Creates the payment step with a configured minimum payable amount.
    pub fn with_min_amount(store: S, min_amount: Money) -> Self {
        Self { store, min_amount }
    }

    fn totals(event: &Event) -> (Money, u32) {
        let total_amount = event
            .payload
            .products
            .iter()
            .map(|line| line.product.unit_value.times(line.quantity))
            .sum();
        let total_items = event.payload.products.iter().map(|line| line.quantity).sum();
        (total_amount, total_items)
    }
}

#[async_trait]
impl<S> SagaStep for PaymentStep<S>
where
    S: StepRecordStore<PaymentRecord>,
{
    fn participant(&self) -> Participant {
        Participant::PaymentService
    }

    fn label(&self) -> &'static str {
        "payment"
    }

    async fn already_processed(
        &self,
        order_id: OrderId,
        transaction_id: TransactionId,
    ) -> Result<bool> {
        self.store.exists(order_id, transaction_id).await
    }

    async fn apply(&self, event: &mut Event) -> Result<String> {
        let (total_amount, total_items) = Self::totals(event);

        // The pending record is committed before the amount check, so a
        // below-minimum payment still leaves a refundable record.
        let mut record = PaymentRecord {
            total_amount,
            total_items,
            status: PaymentStatus::Pending,
        };
        self.store
            .save(event.order_id, event.transaction_id, record.clone())
            .await?;

        // Totals computed here flow forward inside the payload.
        event.payload.total_amount = total_amount;
        event.payload.total_items = total_items;

        if total_amount < self.min_amount {
            return Err(SagaError::validation(format!(
                "The minimum amount available is {}",
                self.min_amount
            )));
        }

        record.status = PaymentStatus::Success;
        self.store
            .save(event.order_id, event.transaction_id, record)
            .await?;
        Ok("Payment realized successfully!".to_string())
    }

    async fn reverse(&self, event: &mut Event) -> Result<()> {
        let mut record = self
            .store
            .find(event.order_id, event.transaction_id)
            .await?
            .ok_or_else(|| {
                SagaError::validation("Payment not found by orderId and transactionId")
            })?;

        record.status = PaymentStatus::Refund;
        event.payload.total_amount = record.total_amount;
        event.payload.total_items = record.total_items;
        self.store
            .save(event.order_id, event.transaction_id, record)
            .await
    }
}
