//! Wire envelope for published events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the single pub/sub channel all envelopes travel on.
pub const EVENTS_CHANNEL: &str = "events";

/// An order was placed.
pub const ORDER_CREATED: &str = "order.created";

/// An order moved to a new status.
pub const ORDER_STATUS_CHANGED: &str = "order.status_changed";

/// An order was cancelled and its stock released.
pub const ORDER_CANCELLED: &str = "order.cancelled";

/// JSON envelope `{type, data, timestamp}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Dotted event name, e.g. `order.created`.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Event payload.
    pub data: serde_json::Value,

    /// When the event was published.
    pub timestamp: DateTime<Utc>,
}

impl EventEnvelope {
    /// Builds an envelope stamped with the current time.
    pub fn new(
        event_type: impl Into<String>,
        data: &impl Serialize,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_type: event_type.into(),
            data: serde_json::to_value(data)?,
            timestamp: Utc::now(),
        })
    }

    /// Encodes the envelope as a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
