use async_trait::async_trait;

/// Media the narration paused, resumed once the queue drains.
#[async_trait]
pub trait PlaybackControl: Send + Sync {
    async fn resume(&self);
}
