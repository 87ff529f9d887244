//! [`NarrationEngine`] backed by the `espeak-ng` command line synthesizer.
//!
//! Each utterance runs one `espeak-ng --stdin` process; `stop` kills it.
//! The binary is taken from `ESPEAK_BIN` or looked up on `PATH`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::Notify;
use tracing::{debug, info};

use crate::engine::{NarrationEngine, VoiceSettings};
use crate::{NarrationError, Result};

pub struct EspeakEngine {
    bin: PathBuf,
    speaking: AtomicBool,
    stop: Notify,
}

impl EspeakEngine {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        let bin = bin.into();
        info!(bin = ?bin, "using espeak-ng binary");
        Self {
            bin,
            speaking: AtomicBool::new(false),
            stop: Notify::new(),
        }
    }

    /// Locate the synthesizer via `ESPEAK_BIN`, then `espeak-ng` or `espeak` on `PATH`.
    pub fn detect() -> Option<Self> {
        if let Ok(p) = std::env::var("ESPEAK_BIN") {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Some(Self::new(pb));
            }
        }
        find_on_path("espeak-ng")
            .or_else(|| find_on_path("espeak"))
            .map(Self::new)
    }

    pub fn bin(&self) -> &Path {
        &self.bin
    }

    /// Command line arguments for `settings`.
    ///
    /// espeak takes words per minute (default 175), pitch 0–99 and
    /// amplitude 0–200.
    pub fn command_args(settings: &VoiceSettings) -> Vec<String> {
        let s = settings.clamped();
        let wpm = (175.0 * s.rate).round().clamp(80.0, 450.0) as u32;
        let pitch = (50.0 * s.pitch).round().clamp(0.0, 99.0) as u32;
        let amplitude = (100.0 * s.volume).round() as u32;
        let mut args = vec![
            "--stdin".to_string(),
            "-s".to_string(),
            wpm.to_string(),
            "-p".to_string(),
            pitch.to_string(),
            "-a".to_string(),
            amplitude.to_string(),
        ];
        if let Some(voice) = s.voice_name.as_ref().or(s.language.as_ref()) {
            args.push("-v".to_string());
            args.push(voice.clone());
        }
        args
    }
}

fn find_on_path(bin: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(bin))
        .find(|candidate| candidate.exists())
}

#[async_trait]
impl NarrationEngine for EspeakEngine {
    async fn speak(&self, text: &str, settings: &VoiceSettings) -> Result<()> {
        let stopped = self.stop.notified();
        tokio::pin!(stopped);
        stopped.as_mut().enable();

        let mut child = Command::new(&self.bin)
            .args(Self::command_args(settings))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        self.speaking.store(true, Ordering::SeqCst);

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(text.as_bytes()).await {
                debug!(error = %e, "espeak closed stdin early");
            }
        }

        let outcome = tokio::select! {
            status = child.wait() => match status {
                Ok(status) if status.success() => Ok(()),
                Ok(status) => Err(NarrationError::Failed(format!(
                    "{} exited with {status}",
                    self.bin.display()
                ))),
                Err(e) => Err(e.into()),
            },
            _ = &mut stopped => {
                if let Err(e) = child.kill().await {
                    debug!(error = %e, "espeak already exited");
                }
                Err(NarrationError::Interrupted)
            }
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
