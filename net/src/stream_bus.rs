use shared::NarrationEvent;
use tokio::sync::broadcast;
use tracing::trace;

/// Broadcast channel for narration events.
#[derive(Clone)]
pub struct StreamBus {
    tx: broadcast::Sender<NarrationEvent>,
}

impl StreamBus {
    /// Default number of events buffered per subscriber.
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Create a new bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to the stream.
    pub fn subscribe(&self) -> broadcast::Receiver<NarrationEvent> {
        self.tx.subscribe()
    }

    /// Broadcast an event to all subscribers.
    ///
    /// Having nobody listening is not an error.
    pub fn notify(&self, event: NarrationEvent) {
        if self.tx.send(event).is_err() {
            trace!("no listeners for narration event");
        }
    }

    /// Number of live subscribers.
    pub fn listeners(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for StreamBus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
