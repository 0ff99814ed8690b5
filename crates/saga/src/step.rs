//! The step executor contract shared by every participant.
//!
//! Each participant implements the three domain hooks
//! ([`SagaStep::already_processed`], [`SagaStep::apply`],
//! [`SagaStep::reverse`]); the provided [`SagaStep::execute`] and
//! [`SagaStep::compensate`] methods supply the one
//! validate → guard → effect → history skeleton, so the protocol
//! behavior cannot drift between participants.

use async_trait::async_trait;
use common::{OrderId, TransactionId};

use crate::error::{Result, SagaError};
use crate::event::Event;
use crate::participant::Participant;

/// A participant's forward and compensating local transaction.
#[async_trait]
pub trait SagaStep: Send + Sync {
    /// The identity stamped into events this step writes.
    fn participant(&self) -> Participant;

    /// Short name used in history messages ("payment", "inventory", ...).
    fn label(&self) -> &'static str;

    /// The idempotency guard: true if this participant already holds a
    /// local record for the (order, transaction) pair.
    ///
    /// Called before any local effect. A true result makes the step fail
    /// fast with [`SagaError::DuplicateTransaction`] and skips
    /// [`SagaStep::apply`] entirely.
    async fn already_processed(
        &self,
        order_id: OrderId,
        transaction_id: TransactionId,
    ) -> Result<bool>;

    /// Runs the domain checks and commits the local effect.
    ///
    /// Returns the success message to historize. Implementations must
    /// commit the local record completely or not at all; a returned
    /// error means no local effect was applied.
    async fn apply(&self, event: &mut Event) -> Result<String>;

    /// Reverses the local effect, if one was committed.
    ///
    /// A missing local record is a no-op, not an error. Errors are
    /// historized by the skeleton but never escalated: the saga must
    /// always finish unwinding.
    async fn reverse(&self, event: &mut Event) -> Result<()>;

    /// Executes the forward step: structural validation, idempotency
    /// guard, domain effect, then outcome recording.
    ///
    /// Never returns an error; every failure becomes a
    /// `ROLLBACK_PENDING` status plus a history entry.
    async fn execute(&self, mut event: Event) -> Event {
        let participant = self.participant();
        metrics::counter!("saga_steps_total", "participant" => participant.as_str()).increment(1);

        match run_forward(self, &mut event).await {
            Ok(message) => {
                tracing::info!(
                    %participant,
                    order_id = %event.order_id,
                    transaction_id = %event.transaction_id,
                    "saga step executed"
                );
                event.mark_success(participant, message);
            }
            Err(err) => {
                metrics::counter!("saga_step_failures_total", "participant" => participant.as_str())
                    .increment(1);
                tracing::error!(
                    %participant,
                    order_id = %event.order_id,
                    transaction_id = %event.transaction_id,
                    error = %err,
                    "saga step failed"
                );
                event.mark_rollback_pending(
                    participant,
                    format!("Fail to execute {}: {}", self.label(), err),
                );
            }
        }
        event
    }

    /// Runs the compensating step.
    ///
    /// The status becomes `FAIL` unconditionally: a compensation request
    /// is not itself failable from the saga's point of view. A failed
    /// reversal is recorded in the history and the event still moves on.
    async fn compensate(&self, mut event: Event) -> Event {
        let participant = self.participant();
        metrics::counter!("saga_compensations_total", "participant" => participant.as_str())
            .increment(1);
        event.mark_fail(participant);

        match self.reverse(&mut event).await {
            Ok(()) => {
                tracing::info!(
                    %participant,
                    order_id = %event.order_id,
                    transaction_id = %event.transaction_id,
                    "rollback executed"
                );
                event.add_history(format!("Rollback executed for {}", self.label()));
            }
            Err(err) => {
                tracing::warn!(
                    %participant,
                    order_id = %event.order_id,
                    transaction_id = %event.transaction_id,
                    error = %err,
                    "rollback not executed"
                );
                event.add_history(format!(
                    "Rollback not executed for {}: {}",
                    self.label(),
                    err
                ));
            }
        }
        event
    }
}

/// The shared forward skeleton: structure, guard, then domain effect.
async fn run_forward<S: SagaStep + ?Sized>(step: &S, event: &mut Event) -> Result<String> {
    event.validate_structure()?;
    if step
        .already_processed(event.order_id, event.transaction_id)
        .await?
    {
        return Err(SagaError::DuplicateTransaction);
    }
    step.apply(event).await
}
