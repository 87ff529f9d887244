use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::info;

use crate::engine::{NarrationEngine, VoiceSettings};
use crate::{NarrationError, Result};

/// [`NarrationEngine`] that logs each utterance instead of producing audio.
///
/// It holds for `word_delay` per word, scaled by the speech rate, so the
/// pacing of a real voice is kept.
pub struct LogEngine {
    word_delay: Duration,
    speaking: AtomicBool,
    stop: Notify,
}

impl LogEngine {
    pub fn new(word_delay: Duration) -> Self {
        Self {
            word_delay,
            speaking: AtomicBool::new(false),
            stop: Notify::new(),
        }
    }

    fn hold_for(&self, text: &str, settings: &VoiceSettings) -> Duration {
        let words = text.split_whitespace().count() as f32;
        self.word_delay.mul_f32(words / settings.clamped().rate)
    }
}

impl Default for LogEngine {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

#[async_trait]
impl NarrationEngine for LogEngine {
    async fn speak(&self, text: &str, settings: &VoiceSettings) -> Result<()> {
        let stopped = self.stop.notified();
        tokio::pin!(stopped);
        stopped.as_mut().enable();

        info!(target: "narration", rate = settings.rate, "{}", text);
        self.speaking.store(true, Ordering::SeqCst);
        let outcome = tokio::select! {
            _ = tokio::time::sleep(self.hold_for(text, settings)) => Ok(()),
            _ = &mut stopped => Err(NarrationError::Interrupted),
        };
        self.speaking.store(false, Ordering::SeqCst);
        outcome
    }

    async fn stop(&self) {
        self.stop.notify_waiters();
    }

    async fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }
}
