//! Audit trail query endpoints.

use std::sync::Arc;

use audit::{AuditStore, EventFilters};
use axum::Json;
use axum::extract::{Query, State};
use common::{OrderId, TransactionId};
use saga::Event;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::orders::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSearchQuery {
    pub order_id: Option<Uuid>,
    pub transaction_id: Option<Uuid>,
}

/// Lists all recorded saga events, newest first.
pub async fn list<A: AuditStore>(
    State(state): State<Arc<AppState<A>>>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state.event_service.find_all().await?;
    Ok(Json(events))
}

/// Finds the latest event for an order or transaction.
///
/// At least one of `orderId` and `transactionId` must be informed; the
/// order ID takes precedence when both are present.
pub async fn search<A: AuditStore>(
    State(state): State<Arc<AppState<A>>>,
    Query(query): Query<EventSearchQuery>,
) -> Result<Json<Event>, ApiError> {
    let filters = EventFilters {
        order_id: query.order_id.map(OrderId::from_uuid),
        transaction_id: query.transaction_id.map(TransactionId::from_uuid),
    };
    let event = state.event_service.find_by_filters(filters).await?;
    Ok(Json(event))
}
