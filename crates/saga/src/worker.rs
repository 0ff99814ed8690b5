//! Worker loop driving one participant.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::broker::Publisher;
use crate::event::Event;
use crate::handler::StepHandler;
use crate::step::SagaStep;

/// Spawns the single worker task for one participant.
///
/// The worker drains both the forward and the compensation input topic
/// through one loop, so every event this participant sees is processed
/// serially — two events for the same (order, transaction) key can
/// never race the idempotency guard or the local record update. The
/// task exits once both inputs are closed and drained.
pub fn spawn_step_worker<S, P>(
    handler: Arc<StepHandler<S, P>>,
    mut forward: UnboundedReceiver<Event>,
    mut compensation: UnboundedReceiver<Event>,
) -> JoinHandle<()>
where
    S: SagaStep + 'static,
    P: Publisher + 'static,
{
    tokio::spawn(async move {
        let mut forward_open = true;
        let mut compensation_open = true;

        while forward_open || compensation_open {
            tokio::select! {
                maybe = forward.recv(), if forward_open => match maybe {
                    Some(event) => {
                        if let Err(err) = handler.handle_execute(event).await {
                            tracing::error!(error = %err, "failed to publish saga event");
                        }
                    }
                    None => forward_open = false,
                },
                maybe = compensation.recv(), if compensation_open => match maybe {
                    Some(event) => {
                        if let Err(err) = handler.handle_compensate(event).await {
                            tracing::error!(error = %err, "failed to publish saga event");
                        }
                    }
                    None => compensation_open = false,
                },
            }
        }
    })
}
