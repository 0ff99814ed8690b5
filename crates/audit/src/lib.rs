//! Audit trail for saga events.
//!
//! The order service keeps every saga event as a full document so the
//! history embedded in it can be inspected after the fact. This crate
//! provides the document store contract, an in-memory and a PostgreSQL
//! implementation, and the order-service logic that starts sagas and
//! absorbs their completion notices.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod service;
pub mod store;

pub use error::{AuditError, Result};
pub use memory::InMemoryAuditStore;
pub use postgres::PostgresAuditStore;
pub use service::{EventFilters, EventService};
pub use store::AuditStore;
