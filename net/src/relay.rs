//! Command delivery with bounded retry.

use backon::{ConstantBuilder, Retryable};
use shared::{NarrationCommand, NarrationEvent, Reply};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::stream_bus::StreamBus;
use crate::transport::{Transport, TransportError};

/// How often and how patiently transient failures are retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: usize,
    /// Fixed pause between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_RETRIES: usize = 5;
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    fn backoff(&self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(self.delay)
            .with_max_times(self.max_retries)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_RETRIES, Self::DEFAULT_DELAY)
    }
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{action} not delivered after {attempts} attempt(s): {source}")]
    Delivery {
        action: &'static str,
        attempts: usize,
        #[source]
        source: TransportError,
    },
}

impl RelayError {
    /// Number of delivery attempts made before giving up.
    pub fn attempts(&self) -> usize {
        match self {
            Self::Delivery { attempts, .. } => *attempts,
        }
    }
}

/// Sends commands over a [`Transport`] and publishes events on a [`StreamBus`].
pub struct Relay<T> {
    transport: T,
    policy: RetryPolicy,
    events: StreamBus,
}

impl<T: Transport> Relay<T> {
    pub fn new(transport: T, policy: RetryPolicy, events: StreamBus) -> Self {
        Self {
            transport,
            policy,
            events,
        }
    }

    /// Deliver `command`, retrying while the channel is closed.
    ///
    /// A refusal by the receiver is returned immediately.
    pub async fn send(&self, command: NarrationCommand) -> Result<Reply, RelayError> {
        let action = command.action();
        let attempts = AtomicUsize::new(0);
        let (transport, command, counter) = (&self.transport, &command, &attempts);
        let result = (|| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            transport.deliver(command.clone()).await
        })
        .retry(self.policy.backoff())
        .when(|e: &TransportError| e.is_transient())
        .notify(|err: &TransportError, dur: Duration| {
            warn!(
                action,
                error = %err,
                attempt = attempts.load(Ordering::SeqCst),
                retry_delay_ms = dur.as_millis() as u64,
                "retrying command delivery"
            );
        })
        .await;

        result.map_err(|source| RelayError::Delivery {
            action,
            attempts: attempts.load(Ordering::SeqCst),
            source,
        })
    }

    /// Deliver `command`, logging and dropping it on failure.
    pub async fn send_logged(&self, command: NarrationCommand) -> Option<Reply> {
        match self.send(command).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                warn!(error = %e, "dropping undeliverable command");
                None
            }
        }
    }

    /// Publish `event` to listeners, best effort.
    pub fn notify(&self, event: NarrationEvent) {
        debug!(?event, "relaying event");
        self.events.notify(event);
    }

    /// Subscribe to events published by either side.
    pub fn subscribe(&self) -> broadcast::Receiver<NarrationEvent> {
        self.events.subscribe()
    }
}
