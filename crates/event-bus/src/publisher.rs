//! Publisher trait.

use async_trait::async_trait;

use crate::envelope::EventEnvelope;
use crate::error::PublishError;

/// Sink for lifecycle events.
///
/// Implementations are constructed once at start-up and passed to the
/// components that publish.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes one envelope on the events channel.
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), PublishError>;
}
