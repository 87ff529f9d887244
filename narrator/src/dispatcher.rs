//! Page-side producer of narration commands.
//!
//! The [`Dispatcher`] sits between the generation stream and the [`Relay`].
//! It cuts incoming chunks into lines, sends the spoken copy of each line to
//! the narration side and hands the display copy back to the caller.

use lingproc::{LineSplitter, narration_copy};
use net::{Relay, RelayError, Transport};
use shared::{NarrationCommand, Reply, Utterance};
use std::sync::Arc;
use tracing::{debug, info};

pub struct Dispatcher<T> {
    relay: Arc<Relay<T>>,
    splitter: LineSplitter,
    resume_playback: bool,
}

impl<T: Transport> Dispatcher<T> {
    /// With `resume_playback`, lines are sent as `speakAndPlayVideo`.
    pub fn new(relay: Arc<Relay<T>>, resume_playback: bool) -> Self {
        Self {
            relay,
            splitter: LineSplitter::new(),
            resume_playback,
        }
    }

    /// Start a new session, resetting the narration side.
    pub async fn begin(&mut self) -> Result<Reply, RelayError> {
        self.splitter = LineSplitter::new();
        info!("narration session begins");
        self.relay.send(NarrationCommand::Reset).await
    }

    /// Feed a chunk of generated text.
    ///
    /// Returns the display copies of the lines it completed. Lines that
    /// cannot be delivered are logged and dropped.
    pub async fn push(&mut self, chunk: &str) -> Vec<Utterance> {
        let lines = self.splitter.push_str(chunk);
        for line in &lines {
            self.submit(line).await;
        }
        lines
    }

    /// Signal the end of the stream, flushing the unfinished last line.
    pub async fn finish(&mut self) -> Option<Utterance> {
        let splitter = std::mem::take(&mut self.splitter);
        let next_index = splitter.next_index();
        let last = splitter.finish();
        self.splitter = LineSplitter::starting_at(next_index);
        if let Some(line) = &last {
            self.submit(line).await;
        }
        last
    }

    /// Drop queued lines after `index`, e.g. when the user edits the prompt.
    pub async fn skip_to(&self, index: u64) -> Result<Reply, RelayError> {
        self.relay
            .send(NarrationCommand::DeleteAfter { index })
            .await
    }

    pub async fn stop(&self) -> Result<Reply, RelayError> {
        self.relay.send(NarrationCommand::Stop).await
    }

    /// Ask the narration side whether speech is playing.
    pub async fn is_speaking(&self) -> Result<bool, RelayError> {
        let reply = self.relay.send(NarrationCommand::CheckSpeaking).await?;
        Ok(matches!(reply, Reply::Speaking { speaking: true }))
    }

    /// Index the next line will carry.
    pub fn next_index(&self) -> u64 {
        self.splitter.next_index()
    }

    async fn submit(&self, line: &Utterance) {
        let spoken = narration_copy(line);
        if spoken.is_blank() {
            debug!(index = line.index, "nothing to narrate after markup");
            return;
        }
        let command = if self.resume_playback {
            NarrationCommand::speak_and_resume(spoken)
        } else {
            NarrationCommand::speak(spoken)
        };
        self.relay.send_logged(command).await;
    }
}
