//! In-process transport backed by tokio channels.
//!
//! The receiving half can go away and come back: [`ChannelTransport::attach`]
//! installs a fresh [`Inbox`], dropping the previous one. While no inbox is
//! attached every delivery fails with [`TransportError::ChannelClosed`].

use async_trait::async_trait;
use shared::{NarrationCommand, Reply};
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc, oneshot};
use tracing::debug;

use crate::transport::{Transport, TransportError};

type ReplySender = oneshot::Sender<Result<Reply, String>>;

/// A command waiting to be handled by the receiving side.
#[derive(Debug)]
pub struct Incoming {
    pub command: NarrationCommand,
    reply: ReplySender,
}

impl Incoming {
    /// Answer the sender. Refusals surface as [`TransportError::Rejected`].
    pub fn respond(self, reply: Result<Reply, String>) {
        if self.reply.send(reply).is_err() {
            debug!(action = self.command.action(), "sender stopped waiting for reply");
        }
    }
}

/// Receiving half of a [`ChannelTransport`].
pub struct Inbox {
    rx: mpsc::Receiver<Incoming>,
}

impl Inbox {
    /// Wait for the next command. Returns `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<Incoming> {
        self.rx.recv().await
    }
}

/// Sending half, shareable between producers.
#[derive(Clone)]
pub struct ChannelTransport {
    tx: Arc<RwLock<Option<mpsc::Sender<Incoming>>>>,
    capacity: usize,
}

impl ChannelTransport {
    /// Default number of undelivered commands buffered.
    pub const DEFAULT_CAPACITY: usize = 32;

    /// Create a connected transport and its inbox.
    pub fn new(capacity: usize) -> (Self, Inbox) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let transport = Self {
            tx: Arc::new(RwLock::new(Some(tx))),
            capacity: capacity.max(1),
        };
        (transport, Inbox { rx })
    }

    /// Create a transport with no receiving side yet.
    pub fn detached(capacity: usize) -> Self {
        Self {
            tx: Arc::new(RwLock::new(None)),
            capacity: capacity.max(1),
        }
    }

    /// Install a new receiving side, replacing any previous one.
    pub async fn attach(&self) -> Inbox {
        let (tx, rx) = mpsc::channel(self.capacity);
        *self.tx.write().await = Some(tx);
        Inbox { rx }
    }

    /// Drop the receiving side's sender so deliveries fail until re-attached.
    pub async fn detach(&self) {
        self.tx.write().await.take();
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn deliver(&self, command: NarrationCommand) -> Result<Reply, TransportError> {
        let tx = self
            .tx
            .read()
            .await
            .clone()
            .ok_or(TransportError::ChannelClosed)?;
        let (reply, response) = oneshot::channel();
        tx.send(Incoming { command, reply })
            .await
            .map_err(|_| TransportError::ChannelClosed)?;
        match response.await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(reason)) => Err(TransportError::Rejected(reason)),
            Err(_) => Err(TransportError::ChannelClosed),
        }
    }
}
