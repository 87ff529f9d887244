use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Voice parameters read from the settings store.
///
/// Ranges follow the browser speech API: rate 0.1–10, pitch 0–2 and
/// volume 0–1, each defaulting to 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VoiceSettings {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub voice_name: Option<String>,
    pub language: Option<String>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            voice_name: None,
            language: None,
        }
    }
}

impl VoiceSettings {
    /// Copy with every numeric field forced into its valid range.
    pub fn clamped(&self) -> Self {
        Self {
            rate: self.rate.clamp(0.1, 10.0),
            pitch: self.pitch.clamp(0.0, 2.0),
            volume: self.volume.clamp(0.0, 1.0),
            ..self.clone()
        }
    }
}

/// Platform text-to-speech capability.
///
/// Callers must not start a new utterance before the previous `speak`
/// resolved; engines are not required to queue.
#[async_trait]
pub trait NarrationEngine: Send + Sync {
    /// Speak `text`. Resolves with `Ok` on the end event and `Err` on error.
    async fn speak(&self, text: &str, settings: &VoiceSettings) -> Result<()>;
    /// Halt any in-flight speech. Safe to call when idle.
    async fn stop(&self);
    /// Platform view of whether speech is being produced.
    async fn is_speaking(&self) -> bool;
}
