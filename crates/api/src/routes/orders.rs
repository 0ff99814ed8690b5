//! Order submission endpoint: creating an order starts a saga.

use std::sync::Arc;

use audit::{AuditStore, EventService};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::Money;
use saga::{
    InMemoryBroker, Order, OrderProduct, Participant, Product, Publisher, SagaRouter, SagaStatus,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<A: AuditStore> {
    pub event_service: Arc<EventService<A>>,
    pub publisher: InMemoryBroker,
    pub router: Arc<SagaRouter>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub products: Vec<OrderLineRequest>,
}

#[derive(Deserialize)]
pub struct OrderLineRequest {
    pub code: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderCreatedResponse {
    pub order_id: String,
    pub transaction_id: String,
    pub event_id: String,
}

/// Creates an order and publishes the saga's first event.
pub async fn create<A: AuditStore>(
    State(state): State<Arc<AppState<A>>>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderCreatedResponse>), ApiError> {
    if request.products.is_empty() {
        return Err(ApiError::BadRequest("Product list is empty!".to_string()));
    }

    let products = request
        .products
        .into_iter()
        .map(|line| {
            OrderProduct::new(
                Product::new(line.code, Money::from_cents(line.unit_price_cents)),
                line.quantity,
            )
        })
        .collect();

    let event = state.event_service.create_event(Order::new(products)).await?;

    let topic = state
        .router
        .next_topic(SagaStatus::Success, Participant::OrderService);
    state.publisher.publish(topic, event.clone()).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderCreatedResponse {
            order_id: event.order_id.to_string(),
            transaction_id: event.transaction_id.to_string(),
            event_id: event.id.to_string(),
        }),
    ))
}
