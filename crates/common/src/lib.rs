//! Shared types used across the order saga workspace.

pub mod types;

pub use types::{EventId, Money, OrderId, ProductCode, TransactionId};
