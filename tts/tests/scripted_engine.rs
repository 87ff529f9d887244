#![allow(dead_code)]

use async_trait::async_trait;
use net::StreamBus;
use shared::NarrationEvent;
use std::collections::VecDeque;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tts::{NarrationEngine, NarrationError, PlaybackControl, PlaybackCoordinator, VoiceSettings};

type Finish = oneshot::Sender<Result<(), NarrationError>>;

/// Engine whose utterances end only when the test says so.
pub struct ScriptedEngine {
    spoken: Mutex<Vec<(String, VoiceSettings)>>,
    pending: Mutex<VecDeque<Finish>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    stops: AtomicUsize,
    started: mpsc::UnboundedSender<String>,
}

impl ScriptedEngine {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (started, rx) = mpsc::unbounded_channel();
        let engine = Arc::new(Self {
            spoken: Mutex::new(Vec::new()),
            pending: Mutex::new(VecDeque::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            started,
        });
        (engine, rx)
    }

    /// End the oldest in-flight utterance with `result`.
    pub fn finish(&self, result: Result<(), NarrationError>) -> bool {
        let next = self.pending.lock().unwrap().pop_front();
        match next {
            Some(tx) => tx.send(result).is_ok(),
            None => false,
        }
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .map(|(t, _)| t.clone())
            .collect()
    }

    pub fn settings(&self) -> Vec<VoiceSettings> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .map(|(_, s)| s.clone())
            .collect()
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NarrationEngine for ScriptedEngine {
    async fn speak(&self, text: &str, settings: &VoiceSettings) -> Result<(), NarrationError> {
        let (tx, rx) = oneshot::channel();
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), settings.clone()));
        self.pending.lock().unwrap().push_back(tx);
        let _ = self.started.send(text.to_string());
        let result = rx.await.unwrap_or(Err(NarrationError::Interrupted));
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        let pending: Vec<Finish> = self.pending.lock().unwrap().drain(..).collect();
        for tx in pending {
            let _ = tx.send(Err(NarrationError::Interrupted));
        }
    }

    async fn is_speaking(&self) -> bool {
        self.active.load(Ordering::SeqCst) > 0
    }
}

#[derive(Default)]
pub struct CountingPlayback {
    resumes: AtomicUsize,
}

impl CountingPlayback {
    pub fn resumes(&self) -> usize {
        self.resumes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaybackControl for CountingPlayback {
    async fn resume(&self) {
        self.resumes.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub coordinator: PlaybackCoordinator,
    pub engine: Arc<ScriptedEngine>,
    pub started: mpsc::UnboundedReceiver<String>,
    pub events: broadcast::Receiver<NarrationEvent>,
    pub playback: Arc<CountingPlayback>,
    pub settings: watch::Sender<VoiceSettings>,
    pub bus: StreamBus,
}

impl Harness {
    pub fn new() -> Self {
        let (engine, started) = ScriptedEngine::new();
        let bus = StreamBus::new(64);
        let events = bus.subscribe();
        let playback = Arc::new(CountingPlayback::default());
        let (settings, settings_rx) = watch::channel(VoiceSettings::default());
        let (coordinator, _task) = PlaybackCoordinator::spawn(
            engine.clone(),
            bus.clone(),
            playback.clone(),
            settings_rx,
        );
        Self {
            coordinator,
            engine,
            started,
            events,
            playback,
            settings,
            bus,
        }
    }

    /// Wait for the engine to start the next utterance.
    pub async fn next_started(&mut self) -> String {
        self.started.recv().await.expect("engine dropped")
    }

    /// Events published so far.
    pub fn drain_events(&mut self) -> Vec<NarrationEvent> {
        let mut out = Vec::new();
        while let Ok(evt) = self.events.try_recv() {
            out.push(evt);
        }
        out
    }
}
