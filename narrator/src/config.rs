use clap::{Parser, ValueEnum};
use net::RetryPolicy;
use std::path::PathBuf;
use std::time::Duration;
use tts::VoiceSettings;

/// Speech backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// `espeak-ng` process per line, falling back to `log` when missing.
    Espeak,
    /// Write lines to the log at speaking pace.
    Log,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Narrate streamed text line by line")]
pub struct Config {
    /// Read text from this file instead of stdin
    #[arg(long)]
    pub input: Option<PathBuf>,

    #[arg(long, value_enum, env = "NARRATOR_ENGINE", default_value_t = EngineKind::Espeak)]
    pub engine: EngineKind,

    /// Path to the espeak-ng binary
    #[arg(long, env = "ESPEAK_BIN")]
    pub espeak_bin: Option<PathBuf>,

    /// Speech rate, 1.0 is normal
    #[arg(long, env = "NARRATOR_RATE", default_value_t = 1.0)]
    pub rate: f32,

    #[arg(long, env = "NARRATOR_PITCH", default_value_t = 1.0)]
    pub pitch: f32,

    #[arg(long, env = "NARRATOR_VOLUME", default_value_t = 1.0)]
    pub volume: f32,

    #[arg(long, env = "NARRATOR_VOICE")]
    pub voice: Option<String>,

    #[arg(long, env = "NARRATOR_LANGUAGE")]
    pub language: Option<String>,

    /// Time the log engine holds per word
    #[arg(long, env = "NARRATOR_WORD_DELAY_MS", default_value_t = 250)]
    pub word_delay_ms: u64,

    /// Resume paused playback once narration drains
    #[arg(long)]
    pub resume_playback: bool,

    /// Bytes read from the input at a time
    #[arg(long, default_value_t = 64)]
    pub chunk_size: usize,

    /// Retries after a failed command delivery
    #[arg(long, env = "NARRATOR_RETRY_MAX", default_value_t = RetryPolicy::DEFAULT_MAX_RETRIES)]
    pub retry_max: usize,

    #[arg(long, env = "NARRATOR_RETRY_DELAY_MS", default_value_t = 3000)]
    pub retry_delay_ms: u64,

    /// Events buffered per listener
    #[arg(long, default_value_t = net::StreamBus::DEFAULT_CAPACITY)]
    pub event_capacity: usize,
}

impl Config {
    pub fn voice_settings(&self) -> VoiceSettings {
        VoiceSettings {
            rate: self.rate,
            pitch: self.pitch,
            volume: self.volume,
            voice_name: self.voice.clone(),
            language: self.language.clone(),
        }
        .clamped()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_max, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn word_delay(&self) -> Duration {
        Duration::from_millis(self.word_delay_ms)
    }
}
