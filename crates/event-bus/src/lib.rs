//! Event bus for order lifecycle notifications.
//!
//! Publishers hand [`EventEnvelope`]s to an [`EventPublisher`]. Delivery is
//! fire-and-forget: callers log a failed publish and carry on. The
//! in-process [`InMemoryEventBus`] fans envelopes out to every subscriber on
//! the single [`EVENTS_CHANNEL`].

pub mod envelope;
pub mod error;
pub mod memory;
pub mod publisher;

pub use envelope::{
    EVENTS_CHANNEL, EventEnvelope, ORDER_CANCELLED, ORDER_CREATED, ORDER_STATUS_CHANGED,
};
pub use error::PublishError;
pub use memory::{EventSubscription, InMemoryEventBus};
pub use publisher::EventPublisher;
