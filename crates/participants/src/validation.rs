//! Product validation participant, the first forward step.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, ProductCode, TransactionId};
use saga::{Event, Participant, Result, SagaError, SagaStep};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::store::StepRecordStore;

/// The validation participant's local step record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRecord {
    /// True while the validation stands; flipped to false on rollback.
    pub success: bool,
}

/// Read-only product catalog the validation step checks against.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// True if a product with the given code exists.
    async fn exists_by_code(&self, code: &ProductCode) -> Result<bool>;
}

/// In-memory product catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductCatalog {
    codes: Arc<RwLock<HashSet<ProductCode>>>,
}

impl InMemoryProductCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog pre-filled with the given product codes.
    pub fn with_products<I, T>(codes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ProductCode>,
    {
        let codes: HashSet<ProductCode> = codes.into_iter().map(Into::into).collect();
        Self {
            codes: Arc::new(RwLock::new(codes)),
        }
    }

    /// Adds a product code to the catalog.
    pub async fn add(&self, code: impl Into<ProductCode>) {
        self.codes.write().await.insert(code.into());
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn exists_by_code(&self, code: &ProductCode) -> Result<bool> {
        Ok(self.codes.read().await.contains(code))
    }
}

/// Step executor validating that every ordered product exists.
pub struct ProductValidationStep<C, S> {
    catalog: C,
    store: S,
}

impl<C, S> ProductValidationStep<C, S>
where
    C: ProductCatalog,
    S: StepRecordStore<ValidationRecord>,
{
    /// Creates the validation step with its catalog and local store.
    pub fn new(catalog: C, store: S) -> Self {
        Self { catalog, store }
    }
}

#[async_trait]
impl<C, S> SagaStep for ProductValidationStep<C, S>
where
    C: ProductCatalog,
    S: StepRecordStore<ValidationRecord>,
{
    fn participant(&self) -> Participant {
        Participant::ProductValidationService
    }

    fn label(&self) -> &'static str {
        "product validation"
    }

    async fn already_processed(
        &self,
        order_id: OrderId,
        transaction_id: TransactionId,
    ) -> Result<bool> {
        self.store.exists(order_id, transaction_id).await
    }

    async fn apply(&self, event: &mut Event) -> Result<String> {
        for line in &event.payload.products {
            if line.product.code.is_empty() {
                return Err(SagaError::validation("Product must be informed!"));
            }
            if !self.catalog.exists_by_code(&line.product.code).await? {
                return Err(SagaError::validation(format!(
                    "Product {} does not exist in the catalog!",
                    line.product.code
                )));
            }
        }

        self.store
            .save(
                event.order_id,
                event.transaction_id,
                ValidationRecord { success: true },
            )
            .await?;
        Ok("Products are validated successfully!".to_string())
    }

    async fn reverse(&self, event: &mut Event) -> Result<()> {
        // Flip an existing record to failed, or record the failed
        // validation if the forward step never committed one.
        let record = match self.store.find(event.order_id, event.transaction_id).await? {
            Some(mut record) => {
                record.success = false;
                record
            }
            None => ValidationRecord { success: false },
        };
        self.store
            .save(event.order_id, event.transaction_id, record)
            .await
    }
}
