//! HTTP API server and in-process wiring for the order fulfillment saga.
//!
//! Exposes order submission and audit trail queries over REST, with
//! structured logging (tracing) and Prometheus metrics. The saga
//! participants run as worker tasks over an in-memory broker, one
//! worker per participant so events for the same transaction are
//! always processed serially.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use audit::{AuditStore, EventService};
use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use participants::{
    InMemoryInventoryStore, InMemoryProductCatalog, InMemoryStepRecordStore, InventoryStep,
    PaymentStep, ProductValidationStep,
};
use saga::{SagaRouter, StepHandler, Topic, spawn_step_worker, topics};
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<A: AuditStore + 'static>(
    state: Arc<AppState<A>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<A>))
        .route("/events", get(routes::events::list::<A>))
        .route("/events/search", get(routes::events::search::<A>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the full saga topology over an in-memory broker.
///
/// Subscribes every topic of the order fulfillment topology, spawns one
/// worker per participant (draining its forward and compensation inputs
/// through a single loop) plus the completion worker that absorbs
/// `notify-ending`, and returns the shared state the HTTP handlers use
/// to start sagas and query the audit trail.
pub fn create_state<A: AuditStore + 'static>(
    store: A,
    catalog: InMemoryProductCatalog,
    stock: InMemoryInventoryStore,
) -> (Arc<AppState<A>>, Vec<JoinHandle<()>>) {
    let broker = saga::InMemoryBroker::new();
    let router = Arc::new(SagaRouter::order_fulfillment());
    let event_service = Arc::new(EventService::new(store));

    let validation_start = broker.subscribe(&Topic::from(topics::PRODUCT_VALIDATION_START));
    let validation_fail = broker.subscribe(&Topic::from(topics::PRODUCT_VALIDATION_FAIL));
    let payment_success = broker.subscribe(&Topic::from(topics::PAYMENT_SUCCESS));
    let payment_fail = broker.subscribe(&Topic::from(topics::PAYMENT_FAIL));
    let inventory_success = broker.subscribe(&Topic::from(topics::INVENTORY_SUCCESS));
    let inventory_fail = broker.subscribe(&Topic::from(topics::INVENTORY_FAIL));
    let mut notify_ending = broker.subscribe(&Topic::from(topics::NOTIFY_ENDING));

    let validation_handler = Arc::new(StepHandler::new(
        ProductValidationStep::new(catalog, InMemoryStepRecordStore::new()),
        router.clone(),
        broker.clone(),
    ));
    let payment_handler = Arc::new(StepHandler::new(
        PaymentStep::new(InMemoryStepRecordStore::new()),
        router.clone(),
        broker.clone(),
    ));
    let inventory_handler = Arc::new(StepHandler::new(
        InventoryStep::new(stock, InMemoryStepRecordStore::new()),
        router.clone(),
        broker.clone(),
    ));

    let completion_service = event_service.clone();
    let completion_worker = tokio::spawn(async move {
        while let Some(event) = notify_ending.recv().await {
            if let Err(err) = completion_service.notify_ending(event).await {
                tracing::error!(error = %err, "failed to record saga completion");
            }
        }
    });

    let workers = vec![
        spawn_step_worker(validation_handler, validation_start, validation_fail),
        spawn_step_worker(payment_handler, payment_success, payment_fail),
        spawn_step_worker(inventory_handler, inventory_success, inventory_fail),
        completion_worker,
    ];

    let state = Arc::new(AppState {
        event_service,
        publisher: broker,
        router,
    });

    (state, workers)
}

/// Creates the application state with the demo catalog and stock.
pub fn create_default_state<A: AuditStore + 'static>(
    store: A,
) -> (Arc<AppState<A>>, Vec<JoinHandle<()>>) {
    let catalog =
        InMemoryProductCatalog::with_products(["COMIC_BOOKS", "BOOKS", "MOVIES", "MUSIC"]);
    let stock = InMemoryInventoryStore::with_stock([
        ("COMIC_BOOKS", 100),
        ("BOOKS", 100),
        ("MOVIES", 100),
        ("MUSIC", 100),
    ]);
    create_state(store, catalog, stock)
}
