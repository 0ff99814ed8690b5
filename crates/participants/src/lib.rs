//! Concrete saga participants for order fulfillment.
//!
//! Product validation, payment, and inventory are three instances of
//! the one [`saga::SagaStep`] shape; each owns its local step records
//! exclusively and never reads another participant's store —
//! cross-participant data travels only inside the event.

pub mod inventory;
pub mod payment;
pub mod store;
pub mod validation;

pub use inventory::{
    InMemoryInventoryStore, InventoryStep, InventoryStore, ReservationLine, ReservationRecord,
};
pub use payment::{PaymentRecord, PaymentStatus, PaymentStep};
pub use store::{InMemoryStepRecordStore, StepRecordStore};
pub use validation::{
    InMemoryProductCatalog, ProductCatalog, ProductValidationStep, ValidationRecord,
};
