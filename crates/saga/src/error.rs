//! Saga error types.

use thiserror::Error;

/// Errors that can occur while a participant processes a saga event.
///
/// Every variant is a validation-class failure from the protocol's point
/// of view: the step executor catches it, flips the event to
/// `ROLLBACK_PENDING`, and records the message in the history. Nothing
/// here escapes a step executor.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The (order, transaction) pair was already processed by this
    /// participant.
    #[error("there's another transactionId for this validation")]
    DuplicateTransaction,

    /// A structural or domain precondition failed.
    #[error("{0}")]
    Validation(String),

    /// The participant's local store failed.
    #[error("store error: {0}")]
    Store(String),

    /// The event could not be handed to the transport.
    #[error("transport error: {0}")]
    Transport(String),
}

impl SagaError {
    /// Convenience constructor for validation failures.
    pub fn validation(message: impl Into<String>) -> Self {
        SagaError::Validation(message.into())
    }
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = SagaError::validation("Product is out of stock");
        assert_eq!(err.to_string(), "Product is out of stock");
    }

    #[test]
    fn test_duplicate_transaction_message() {
        assert_eq!(
            SagaError::DuplicateTransaction.to_string(),
            "there's another transactionId for this validation"
        );
    }
}
