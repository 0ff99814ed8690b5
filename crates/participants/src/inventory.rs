//! Inventory participant, the final forward step.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, ProductCode, TransactionId};
use saga::{Event, Participant, Result, SagaError, SagaStep};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::store::StepRecordStore;

/// One reserved product, with its total ordered quantity and the stock
/// level before and after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationLine {
    pub product_code: ProductCode,
    pub order_quantity: u32,
    pub old_quantity: u32,
    pub new_quantity: u32,
}

/// The inventory participant's local step record.
///
/// Holds every line of the reservation so compensation can restore each
/// product's availability to its exact pre-step quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub lines: Vec<ReservationLine>,
}

/// Stock levels owned by the inventory participant.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Available quantity for a product, or `None` if untracked.
    async fn available(&self, code: &ProductCode) -> Result<Option<u32>>;

    /// Sets the available quantity for a product.
    async fn set_available(&self, code: &ProductCode, quantity: u32) -> Result<()>;
}

/// In-memory stock store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryStore {
    stock: Arc<RwLock<HashMap<ProductCode, u32>>>,
}

impl InMemoryInventoryStore {
    /// Creates an empty stock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stock store pre-filled with (code, available) pairs.
    pub fn with_stock<I, T>(stock: I) -> Self
    where
        I: IntoIterator<Item = (T, u32)>,
        T: Into<ProductCode>,
    {
        let stock: HashMap<ProductCode, u32> =
            stock.into_iter().map(|(code, qty)| (code.into(), qty)).collect();
        Self {
            stock: Arc::new(RwLock::new(stock)),
        }
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn available(&self, code: &ProductCode) -> Result<Option<u32>> {
        Ok(self.stock.read().await.get(code).copied())
    }

    async fn set_available(&self, code: &ProductCode, quantity: u32) -> Result<()> {
        self.stock.write().await.insert(code.clone(), quantity);
        Ok(())
    }
}

/// Step executor reserving stock for the ordered products.
pub struct InventoryStep<I, S> {
    inventory: I,
    store: S,
}

impl<I, S> InventoryStep<I, S>
where
    I: InventoryStore,
    S: StepRecordStore<ReservationRecord>,
{
    /// Creates the inventory step with its stock and local stores.
    pub fn new(inventory: I, store: S) -> Self {
        Self { inventory, store }
    }
}

#[async_trait]
impl<I, S> SagaStep for InventoryStep<I, S>
where
    I: InventoryStore,
    S: StepRecordStore<ReservationRecord>,
{
    fn participant(&self) -> Participant {
        Participant::InventoryService
    }

    fn label(&self) -> &'static str {
        "inventory"
    }

    async fn already_processed(
        &self,
        order_id: OrderId,
        transaction_id: TransactionId,
    ) -> Result<bool> {
        self.store.exists(order_id, transaction_id).await
    }

    async fn apply(&self, event: &mut Event) -> Result<String> {
        // An order may list the same product on several lines; the stock
        // check must see their sum, not each line against a fresh read.
        let mut wanted: Vec<(ProductCode, u32)> = Vec::new();
        for line in &event.payload.products {
            match wanted.iter_mut().find(|(code, _)| code == &line.product.code) {
                Some((_, quantity)) => *quantity += line.quantity,
                None => wanted.push((line.product.code.clone(), line.quantity)),
            }
        }

        // Resolve and validate every product before touching any stock,
        // so a domain failure leaves no partial decrement behind.
        let mut lines = Vec::with_capacity(wanted.len());
        for (code, quantity) in wanted {
            let available = self
                .inventory
                .available(&code)
                .await?
                .ok_or_else(|| {
                    SagaError::validation(format!("Inventory not found for product {code}"))
                })?;
            if quantity > available {
                return Err(SagaError::validation("Product is out of stock"));
            }
            lines.push(ReservationLine {
                product_code: code,
                order_quantity: quantity,
                old_quantity: available,
                new_quantity: available - quantity,
            });
        }

        self.store
            .save(
                event.order_id,
                event.transaction_id,
                ReservationRecord { lines: lines.clone() },
            )
            .await?;
        for line in &lines {
            self.inventory
                .set_available(&line.product_code, line.new_quantity)
                .await?;
        }
        Ok("Inventory updated successfully!".to_string())
    }

    async fn reverse(&self, event: &mut Event) -> Result<()> {
        // No record means the forward step never committed: nothing to
        // restore, but the rollback is still historized by the skeleton.
        let Some(record) = self.store.find(event.order_id, event.transaction_id).await? else {
            return Ok(());
        };

        for line in &record.lines {
            self.inventory
                .set_available(&line.product_code, line.old_quantity)
                .await?;
            tracing::info!(
                order_id = %event.order_id,
                product = %line.product_code,
                from = line.new_quantity,
                to = line.old_quantity,
                "restored inventory"
            );
        }
        Ok(())
    }
}
