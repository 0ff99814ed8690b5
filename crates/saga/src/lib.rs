//! Choreography engine for the order fulfillment saga.
//!
//! This crate provides the Saga Pattern as a choreography: there is no
//! central coordinator. Each participant reacts to an inbound event,
//! performs a strictly local transaction, appends a history entry, and
//! publishes the event to the topic a pure routing function selects from
//! the event's status and its originating participant.
//!
//! The order fulfillment saga advances through these steps:
//! 1. Validate the ordered products
//! 2. Realize the payment
//! 3. Update the inventory
//!
//! If any step fails, the event travels backward through the same
//! participants so each one can run its compensating transaction, until
//! the initiating order service absorbs the terminal failure.

pub mod broker;
pub mod error;
pub mod event;
pub mod handler;
pub mod participant;
pub mod router;
pub mod status;
pub mod step;
pub mod worker;

pub use broker::{InMemoryBroker, Publisher};
pub use error::{Result, SagaError};
pub use event::{Event, History, Order, OrderProduct, Product};
pub use handler::StepHandler;
pub use participant::Participant;
pub use router::{Routes, SagaRouter, Topic, topics};
pub use status::SagaStatus;
pub use step::SagaStep;
pub use worker::spawn_step_worker;
