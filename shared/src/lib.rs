//! Messages exchanged between the text producer and the narration side.
//!
//! The wire names follow the extension message protocol, including the
//! historical `ttsEnableAccpetMessage` spelling.

use serde::{Deserialize, Serialize};

/// One indexed unit of text submitted for narration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub index: u64,
}

impl Utterance {
    pub fn new(text: impl Into<String>, index: u64) -> Self {
        Self {
            text: text.into(),
            index,
        }
    }

    /// Whether the text is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Commands accepted by the narration side.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "action")]
pub enum NarrationCommand {
    /// Discard the current session and prepare for a new one.
    #[serde(rename = "resetWhenPageChange")]
    Reset,
    #[serde(rename = "speak")]
    Speak { text: String, index: u64 },
    /// Like [`NarrationCommand::Speak`], resuming the video once the queue drains.
    #[serde(rename = "speakAndPlayVideo")]
    SpeakAndResume { text: String, index: u64 },
    /// Drop queued utterances whose index is greater than `index`.
    #[serde(rename = "ttsDeleteQueueLargerThanMarkIndex")]
    DeleteAfter { index: u64 },
    #[serde(rename = "ttsStop")]
    Stop,
    #[serde(rename = "ttsCheckSpeaking")]
    CheckSpeaking,
}

impl NarrationCommand {
    /// Wire name of the command, used in logs.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Reset => "resetWhenPageChange",
            Self::Speak { .. } => "speak",
            Self::SpeakAndResume { .. } => "speakAndPlayVideo",
            Self::DeleteAfter { .. } => "ttsDeleteQueueLargerThanMarkIndex",
            Self::Stop => "ttsStop",
            Self::CheckSpeaking => "ttsCheckSpeaking",
        }
    }

    pub fn speak(utterance: Utterance) -> Self {
        Self::Speak {
            text: utterance.text,
            index: utterance.index,
        }
    }

    pub fn speak_and_resume(utterance: Utterance) -> Self {
        Self::SpeakAndResume {
            text: utterance.text,
            index: utterance.index,
        }
    }
}

/// Events published by the narration side for listening UIs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "action")]
pub enum NarrationEvent {
    /// The utterance at `index` has begun speaking.
    #[serde(rename = "ttsSpeakingText")]
    SpeakingText { index: u64 },
    /// Speaking state changed.
    #[serde(rename = "ttsCheckSpeaking")]
    SpeakingState { speaking: bool },
    /// The producer may submit text beyond `index`.
    #[serde(rename = "ttsEnableAccpetMessage")]
    AcceptMore { index: u64 },
}

/// Acknowledgement returned for a delivered command.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Reply {
    Ack,
    Speaking { speaking: bool },
}
