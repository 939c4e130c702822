use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::DocumentEvent;

/// In-process event bus backed by `tokio::broadcast`. Single-node; a
/// publish with no subscribers is not an error.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<DocumentEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publish an event to all current subscribers. Returns how many
    /// subscribers received it.
    pub fn publish(&self, event: DocumentEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<DocumentEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::DocumentType;
    use crate::events::types::DocumentChanged;
    use uuid::Uuid;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let delivered = bus.publish(DocumentEvent::Created(DocumentChanged::new(
            Uuid::new_v4(),
            DocumentType::Terms,
            false,
        )));
        assert_eq!(delivered, 1);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, DocumentEvent::Created(_)));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let bus = EventBus::new(16);
        let delivered = bus.publish(DocumentEvent::Deleted(DocumentChanged::new(
            Uuid::new_v4(),
            DocumentType::Custom,
            false,
        )));
        assert_eq!(delivered, 0);
    }
}
