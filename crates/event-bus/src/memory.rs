//! In-process event bus backed by a tokio broadcast channel.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};

use crate::envelope::{EVENTS_CHANNEL, EventEnvelope};
use crate::error::PublishError;
use crate::publisher::EventPublisher;

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug)]
struct BusState {
    history: VecDeque<EventEnvelope>,
    history_limit: usize,
    fail_on_publish: bool,
}

impl BusState {
    fn record(&mut self, envelope: EventEnvelope) {
        if self.history.len() == self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(envelope);
    }
}

/// Fan-out event bus living inside one process.
///
/// Every published envelope is delivered to all live subscribers. The most
/// recent `capacity` envelopes are also kept in a history that tests and
/// diagnostics can inspect. Publishing with no subscribers is not an error.
#[derive(Debug, Clone)]
pub struct InMemoryEventBus {
    sender: broadcast::Sender<EventEnvelope>,
    state: Arc<RwLock<BusState>>,
}

impl InMemoryEventBus {
    /// Creates a bus buffering up to `capacity` envelopes per slow subscriber
    /// and in its history.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            state: Arc::new(RwLock::new(BusState {
                history: VecDeque::new(),
                history_limit: capacity,
                fail_on_publish: false,
            })),
        }
    }

    /// Subscribes to envelopes published after this call.
    pub fn subscribe(&self) -> EventSubscription {
        EventSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Returns the number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Returns the retained envelopes, oldest first.
    pub async fn published(&self) -> Vec<EventEnvelope> {
        self.state.read().await.history.iter().cloned().collect()
    }

    /// Returns the published envelopes of one type.
    pub async fn published_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.state
            .read()
            .await
            .history
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    /// Configures the bus to reject publishes.
    pub async fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().await.fail_on_publish = fail;
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), PublishError> {
        let mut state = self.state.write().await;
        if state.fail_on_publish {
            return Err(PublishError::Unavailable(format!(
                "channel '{EVENTS_CHANNEL}' is not accepting events"
            )));
        }

        state.record(envelope.clone());
        // No subscribers is fine; the envelope is simply dropped.
        let delivered = self.sender.send(envelope.clone()).unwrap_or(0);

        metrics::counter!("events_published_total", "type" => envelope.event_type.clone())
            .increment(1);
        tracing::info!(
            channel = EVENTS_CHANNEL,
            event_type = %envelope.event_type,
            delivered,
            "published event"
        );
        Ok(())
    }
}

/// Receiving half of an [`InMemoryEventBus`] subscription.
#[derive(Debug)]
pub struct EventSubscription {
    receiver: broadcast::Receiver<EventEnvelope>,
}

impl EventSubscription {
    /// Waits for the next envelope.
    ///
    /// Returns `None` once the bus has been dropped. Envelopes missed because
    /// this subscriber fell behind are skipped with a warning.
    pub async fn recv(&mut self) -> Option<EventEnvelope> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) => return Some(envelope),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next envelope if one is already buffered.
    pub fn try_recv(&mut self) -> Option<EventEnvelope> {
        loop {
            match self.receiver.try_recv() {
                Ok(envelope) => return Some(envelope),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event subscriber lagged");
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{ORDER_CANCELLED, ORDER_CREATED};

    fn envelope(event_type: &str, order_id: i64) -> EventEnvelope {
        EventEnvelope::new(event_type, &serde_json::json!({ "order_id": order_id })).unwrap()
    }

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let bus = InMemoryEventBus::new(16);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(envelope(ORDER_CREATED, 1)).await.unwrap();

        assert_eq!(first.recv().await.unwrap().event_type, ORDER_CREATED);
        assert_eq!(second.recv().await.unwrap().event_type, ORDER_CREATED);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_recorded() {
        let bus = InMemoryEventBus::default();
        bus.publish(envelope(ORDER_CREATED, 1)).await.unwrap();
        bus.publish(envelope(ORDER_CANCELLED, 1)).await.unwrap();

        assert_eq!(bus.published().await.len(), 2);
        assert_eq!(bus.published_of_type(ORDER_CANCELLED).await.len(), 1);
    }

    #[tokio::test]
    async fn test_fail_on_publish() {
        let bus = InMemoryEventBus::default();
        let mut sub = bus.subscribe();
        bus.set_fail_on_publish(true).await;

        let result = bus.publish(envelope(ORDER_CREATED, 1)).await;
        assert!(matches!(result, Err(PublishError::Unavailable(_))));
        assert!(bus.published().await.is_empty());
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_history_keeps_only_latest_envelopes() {
        let bus = InMemoryEventBus::new(3);

        for id in 1..=10 {
            bus.publish(envelope(ORDER_CREATED, id)).await.unwrap();
        }

        let history = bus.published().await;
        assert_eq!(history.len(), 3);
        let ids: Vec<i64> = history
            .iter()
            .map(|e| e.data["order_id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![8, 9, 10]);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips_to_retained_events() {
        let bus = InMemoryEventBus::new(2);
        let mut sub = bus.subscribe();

        for id in 1..=4 {
            bus.publish(envelope(ORDER_CREATED, id)).await.unwrap();
        }

        let next = sub.try_recv().unwrap();
        assert_eq!(next.data["order_id"], 3);
    }
}
