//! The playback coordinator.
//!
//! A single task owns the [`UtteranceQueue`], the session flags and the
//! [`NarrationEngine`]. Callers talk to it through [`PlaybackCoordinator`],
//! a cloneable handle; every request is acknowledged after the task applied
//! it, so state read after an `.await` already reflects the request.
//!
//! The utterance being spoken is a future polled by the task next to its
//! request channel. Requests such as stop or delete are therefore handled
//! while speech is in flight, and the next utterance is dispatched only once
//! the engine reported end or error for the previous one.

use futures::future::BoxFuture;
use shared::{NarrationEvent, Utterance};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::{NarrationEngine, VoiceSettings};
use crate::playback::PlaybackControl;
use crate::queue::UtteranceQueue;
use crate::{CoordinatorError, NarrationError};
use net::StreamBus;

/// Coarse lifecycle of the coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing queued and nothing being spoken.
    Idle,
    /// Utterances are being handed to the engine.
    Draining,
    /// Stopped by request; ignores new text until reset.
    Stopped,
}

/// Snapshot of the coordinator's internal state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoordinatorStatus {
    pub state: PlaybackState,
    pub pending: Vec<Utterance>,
    pub current: Option<Utterance>,
    pub last_spoken: Option<u64>,
    pub processing: bool,
    pub stop_requested: bool,
    /// No utterance has been dispatched since the last reset.
    pub fresh_session: bool,
}

enum Op {
    Stream { utterance: Utterance, resume: bool },
    DeleteAfter(u64),
    Stop,
    Reset,
    IsSpeaking,
    Status,
}

enum Answer {
    Done,
    Speaking(bool),
    Status(CoordinatorStatus),
}

struct Request {
    op: Op,
    reply: oneshot::Sender<Answer>,
}

type Spoken = (u64, Utterance, Result<(), NarrationError>);
type InFlight = BoxFuture<'static, Spoken>;

/// Handle to the coordinator task.
#[derive(Clone)]
pub struct PlaybackCoordinator {
    tx: mpsc::UnboundedSender<Request>,
    state: watch::Receiver<PlaybackState>,
}

impl PlaybackCoordinator {
    /// Start the coordinator task.
    ///
    /// The task ends once every handle is dropped.
    pub fn spawn(
        engine: Arc<dyn NarrationEngine>,
        events: StreamBus,
        playback: Arc<dyn PlaybackControl>,
        settings: watch::Receiver<VoiceSettings>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(PlaybackState::Idle);
        let drain = Drain {
            engine,
            events,
            playback,
            settings,
            state: state_tx,
            queue: UtteranceQueue::new(),
            current: None,
            last_spoken: None,
            processing: false,
            stop_requested: false,
            fresh_session: true,
            resume_on_drain: false,
            speaking: false,
            session: 0,
        };
        let handle = tokio::spawn(drain.run(rx));
        (Self { tx, state }, handle)
    }

    async fn request(&self, op: Op) -> Result<Answer, CoordinatorError> {
        let (reply, answer) = oneshot::channel();
        self.tx
            .send(Request { op, reply })
            .map_err(|_| CoordinatorError)?;
        answer.await.map_err(|_| CoordinatorError)
    }

    /// Queue `text` for narration. Ignored while stopped or when blank.
    pub async fn stream_text(
        &self,
        text: impl Into<String>,
        index: u64,
    ) -> Result<(), CoordinatorError> {
        let utterance = Utterance::new(text, index);
        self.request(Op::Stream {
            utterance,
            resume: false,
        })
        .await
        .map(|_| ())
    }

    /// Like [`stream_text`](Self::stream_text), resuming playback once the
    /// queue drains.
    pub async fn stream_text_and_resume(
        &self,
        text: impl Into<String>,
        index: u64,
    ) -> Result<(), CoordinatorError> {
        let utterance = Utterance::new(text, index);
        self.request(Op::Stream {
            utterance,
            resume: true,
        })
        .await
        .map(|_| ())
    }

    /// Drop queued utterances with an index above `mark`.
    ///
    /// The utterance already being spoken finishes normally.
    pub async fn delete_after(&self, mark: u64) -> Result<(), CoordinatorError> {
        self.request(Op::DeleteAfter(mark)).await.map(|_| ())
    }

    /// Halt speech, empty the queue and refuse new text until reset.
    pub async fn stop(&self) -> Result<(), CoordinatorError> {
        self.request(Op::Stop).await.map(|_| ())
    }

    /// Start a new session, invalidating everything queued before.
    pub async fn reset(&self) -> Result<(), CoordinatorError> {
        self.request(Op::Reset).await.map(|_| ())
    }

    /// Ask the engine whether it is producing speech.
    pub async fn is_speaking(&self) -> Result<bool, CoordinatorError> {
        match self.request(Op::IsSpeaking).await? {
            Answer::Speaking(speaking) => Ok(speaking),
            _ => Err(CoordinatorError),
        }
    }

    pub async fn status(&self) -> Result<CoordinatorStatus, CoordinatorError> {
        match self.request(Op::Status).await? {
            Answer::Status(status) => Ok(status),
            _ => Err(CoordinatorError),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PlaybackState {
        *self.state.borrow()
    }

    /// Wait until the coordinator is no longer draining.
    pub async fn wait_idle(&self) -> Result<PlaybackState, CoordinatorError> {
        let mut state = self.state.clone();
        let settled = state
            .wait_for(|s| *s != PlaybackState::Draining)
            .await
            .map_err(|_| CoordinatorError)?;
        Ok(*settled)
    }
}

struct Drain {
    engine: Arc<dyn NarrationEngine>,
    events: StreamBus,
    playback: Arc<dyn PlaybackControl>,
    settings: watch::Receiver<VoiceSettings>,
    state: watch::Sender<PlaybackState>,
    queue: UtteranceQueue,
    current: Option<Utterance>,
    last_spoken: Option<u64>,
    processing: bool,
    stop_requested: bool,
    fresh_session: bool,
    resume_on_drain: bool,
    /// Last speaking state announced to listeners.
    speaking: bool,
    session: u64,
}

async fn next_spoken(in_flight: &mut Option<InFlight>) -> Spoken {
    match in_flight {
        Some(fut) => fut.await,
        None => std::future::pending().await,
    }
}

impl Drain {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Request>) {
        let mut in_flight: Option<InFlight> = None;
        loop {
            // Completions first, so requests observe an up to date engine.
            tokio::select! {
                biased;
                (session, utterance, result) = next_spoken(&mut in_flight) => {
                    in_flight = None;
                    self.finished(session, utterance, result, &mut in_flight).await;
                }
                req = rx.recv() => match req {
                    Some(Request { op, reply }) => {
                        let answer = self.handle(op, &mut in_flight).await;
                        if reply.send(answer).is_err() {
                            debug!("requester went away before the answer");
                        }
                    }
                    None => break,
                },
            }
        }
        self.engine.stop().await;
        debug!("playback coordinator stopped");
    }

    async fn handle(&mut self, op: Op, in_flight: &mut Option<InFlight>) -> Answer {
        match op {
            Op::Stream { utterance, resume } => {
                self.stream(utterance, resume, in_flight).await;
                Answer::Done
            }
            Op::DeleteAfter(mark) => {
                let before = self.queue.len();
                self.queue.delete_larger_than(mark);
                debug!(mark, removed = before - self.queue.len(), "trimmed queue");
                Answer::Done
            }
            Op::Stop => {
                self.stop().await;
                Answer::Done
            }
            Op::Reset => {
                self.reset().await;
                Answer::Done
            }
            Op::IsSpeaking => Answer::Speaking(self.engine.is_speaking().await),
            Op::Status => Answer::Status(self.status()),
        }
    }

    async fn stream(
        &mut self,
        utterance: Utterance,
        resume: bool,
        in_flight: &mut Option<InFlight>,
    ) {
        if self.stop_requested {
            debug!(index = utterance.index, "stopped; ignoring text");
            return;
        }
        if utterance.is_blank() {
            debug!(index = utterance.index, "dropping blank text");
            return;
        }
        if resume {
            self.resume_on_drain = true;
        }
        self.queue.enqueue(utterance);
        if !self.processing {
            self.processing = true;
            self.set_state(PlaybackState::Draining);
        }
        if in_flight.is_none() {
            self.dispatch_next(in_flight).await;
        }
    }

    async fn finished(
        &mut self,
        session: u64,
        utterance: Utterance,
        result: Result<(), NarrationError>,
        in_flight: &mut Option<InFlight>,
    ) {
        if session != self.session {
            debug!(index = utterance.index, "utterance from previous session ended");
            if self.processing {
                self.dispatch_next(in_flight).await;
            }
            return;
        }

        match result {
            Ok(()) => debug!(index = utterance.index, "utterance finished"),
            Err(NarrationError::Interrupted) => {
                debug!(index = utterance.index, "utterance interrupted")
            }
            Err(e) => warn!(index = utterance.index, error = %e, "narration failed; advancing"),
        }
        self.current = None;
        self.events.notify(NarrationEvent::AcceptMore {
            index: utterance.index,
        });

        if self.stop_requested {
            return;
        }
        self.dispatch_next(in_flight).await;
    }

    /// Hand the queue head to the engine, or wrap up when nothing is left.
    async fn dispatch_next(&mut self, in_flight: &mut Option<InFlight>) {
        let Some(utterance) = self.queue.dequeue() else {
            self.drained().await;
            return;
        };

        let settings = self.settings.borrow().clone();
        if self.fresh_session {
            info!(index = utterance.index, "narration session started");
            self.fresh_session = false;
        }
        self.last_spoken = Some(
            self.last_spoken
                .map_or(utterance.index, |last| last.max(utterance.index)),
        );
        self.current = Some(utterance.clone());
        self.events.notify(NarrationEvent::SpeakingText {
            index: utterance.index,
        });
        self.announce_speaking(true);

        let engine = Arc::clone(&self.engine);
        let session = self.session;
        *in_flight = Some(Box::pin(async move {
            let result = engine.speak(&utterance.text, &settings).await;
            (session, utterance, result)
        }));
    }

    async fn drained(&mut self) {
        self.current = None;
        let was_processing = std::mem::replace(&mut self.processing, false);
        self.announce_speaking(false);
        if was_processing {
            debug!(last_spoken = ?self.last_spoken, "queue drained");
        }
        if std::mem::take(&mut self.resume_on_drain) {
            info!("resuming playback");
            self.playback.resume().await;
        }
        self.set_state(PlaybackState::Idle);
    }

    async fn stop(&mut self) {
        self.stop_requested = true;
        self.processing = false;
        self.resume_on_drain = false;
        self.queue.clear();
        self.current = None;
        self.engine.stop().await;
        self.announce_speaking(false);
        self.set_state(PlaybackState::Stopped);
        info!("narration stopped");
    }

    async fn reset(&mut self) {
        self.session += 1;
        self.stop_requested = false;
        self.processing = false;
        self.resume_on_drain = false;
        self.fresh_session = true;
        self.queue.clear();
        self.current = None;
        self.last_spoken = None;
        self.engine.stop().await;
        self.announce_speaking(false);
        self.set_state(PlaybackState::Idle);
        info!(session = self.session, "narration reset");
    }

    fn announce_speaking(&mut self, speaking: bool) {
        if self.speaking != speaking {
            self.speaking = speaking;
            self.events.notify(NarrationEvent::SpeakingState { speaking });
        }
    }

    fn set_state(&self, state: PlaybackState) {
        self.state.send_replace(state);
    }

    fn status(&self) -> CoordinatorStatus {
        CoordinatorStatus {
            state: *self.state.borrow(),
            pending: self.queue.iter().cloned().collect(),
            current: self.current.clone(),
            last_spoken: self.last_spoken,
            processing: self.processing,
            stop_requested: self.stop_requested,
            fresh_session: self.fresh_session,
        }
    }
}
