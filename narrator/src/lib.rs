//! Streaming narration of generated text.
//!
//! [`run`] wires both sides together in one process: the page side feeds
//! input through a [`Dispatcher`] and a [`Relay`], the narration side serves
//! those commands with a [`PlaybackCoordinator`]. Every event is written to
//! the output as one JSON line.

pub mod config;
pub mod dispatcher;
pub mod input;
mod logging;

pub use config::{Config, EngineKind};
pub use dispatcher::Dispatcher;
pub use input::ChunkDecoder;
pub use logging::init_logging;

use async_trait::async_trait;
use net::{ChannelTransport, Relay, StreamBus, Transport};
use shared::NarrationEvent;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use tts::{
    EspeakEngine, LogEngine, NarrationEngine, PlaybackControl, PlaybackCoordinator, service,
};

/// Narrate `input` until it is exhausted and spoken, or until `shutdown`
/// resolves, in which case speech is stopped.
///
/// Returns `output` once every event was written to it.
pub async fn run<R, W, F>(config: Config, input: R, output: W, shutdown: F) -> anyhow::Result<W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
    F: Future<Output = ()>,
{
    let bus = StreamBus::new(config.event_capacity);
    let (transport, inbox) = ChannelTransport::new(ChannelTransport::DEFAULT_CAPACITY);
    let relay = Arc::new(Relay::new(transport, config.retry_policy(), bus.clone()));
    let printer = tokio::spawn(print_events(relay.subscribe(), output));

    let (_settings, settings_rx) = watch::channel(config.voice_settings());
    let (coordinator, coordinator_task) = PlaybackCoordinator::spawn(
        build_engine(&config),
        bus.clone(),
        Arc::new(LoggedPlayback),
        settings_rx,
    );

    let service_task = tokio::spawn(service::serve(inbox, coordinator.clone()));
    let mut dispatcher = Dispatcher::new(relay, config.resume_playback);

    let narrate = async {
        dispatcher.begin().await?;
        feed(&mut dispatcher, input, config.chunk_size).await?;
        dispatcher.finish().await;
        coordinator.wait_idle().await?;
        anyhow::Ok(())
    };
    tokio::pin!(shutdown);
    let interrupted = tokio::select! {
        res = narrate => {
            res?;
            false
        }
        _ = &mut shutdown => true,
    };
    if interrupted {
        info!("shutdown requested; stopping narration");
        dispatcher.stop().await?;
    }

    drop(dispatcher);
    service_task.await?;
    drop(coordinator);
    coordinator_task.await?;
    drop(bus);
    let output = printer.await??;
    Ok(output)
}

async fn feed<R, T>(
    dispatcher: &mut Dispatcher<T>,
    mut input: R,
    chunk_size: usize,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    T: Transport,
{
    let mut decoder = ChunkDecoder::new();
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        let n = input.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        let text = decoder.decode(&buf[..n]);
        for line in dispatcher.push(&text).await {
            debug!(index = line.index, text = %line.text, "line");
        }
    }
    let tail = decoder.finish();
    if !tail.is_empty() {
        dispatcher.push(&tail).await;
    }
    Ok(())
}

/// Write each event as a JSON line until the bus closes.
async fn print_events<W>(
    mut events: broadcast::Receiver<NarrationEvent>,
    mut output: W,
) -> std::io::Result<W>
where
    W: AsyncWrite + Unpin,
{
    loop {
        match events.recv().await {
            Ok(event) => {
                let mut line = serde_json::to_vec(&event)?;
                line.push(b'\n');
                output.write_all(&line).await?;
                output.flush().await?;
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "event output fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    Ok(output)
}

fn build_engine(config: &Config) -> Arc<dyn NarrationEngine> {
    let espeak = match config.engine {
        EngineKind::Log => None,
        EngineKind::Espeak => match &config.espeak_bin {
            Some(bin) => Some(EspeakEngine::new(bin.clone())),
            None => {
                let found = EspeakEngine::detect();
                if found.is_none() {
                    warn!("espeak-ng not found; narrating to the log");
                }
                found
            }
        },
    };
    match espeak {
        Some(engine) => Arc::new(engine),
        None => Arc::new(LogEngine::new(config.word_delay())),
    }
}

/// Stand-in for a media player: resuming is only logged.
struct LoggedPlayback;

#[async_trait]
impl PlaybackControl for LoggedPlayback {
    async fn resume(&self) {
        info!("resuming playback");
    }
}
