use async_trait::async_trait;
use shared::{NarrationCommand, Reply};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The receiving side is not reachable right now.
    #[error("message channel closed")]
    ChannelClosed,
    /// The receiving side handled the command and refused it.
    #[error("command rejected: {0}")]
    Rejected(String),
}

impl TransportError {
    /// Whether delivering again may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ChannelClosed)
    }
}

/// Delivers commands to the context owning the narration engine.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `command` and wait for the receiver's reply.
    async fn deliver(&self, command: NarrationCommand) -> Result<Reply, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn deliver(&self, command: NarrationCommand) -> Result<Reply, TransportError> {
        (**self).deliver(command).await
    }
}
