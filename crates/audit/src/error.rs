use common::{OrderId, TransactionId};
use thiserror::Error;

/// Errors that can occur when interacting with the audit trail.
#[derive(Debug, Error)]
pub enum AuditError {
    /// No event recorded for the given order.
    #[error("Event not found by orderId {0}")]
    NotFoundByOrder(OrderId),

    /// No event recorded for the given transaction.
    #[error("Event not found by transactionId {0}")]
    NotFoundByTransaction(TransactionId),

    /// A query was issued without any filter.
    #[error("OrderId or transactionId must be informed")]
    MissingFilters,

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;
