//! Incremental line splitting for streamed model output.
//!
//! Generated text arrives in arbitrary chunks. [`LineSplitter`] buffers the
//! chunks and hands out one [`Utterance`] per completed line, each tagged with
//! the next index of the session. The unfinished tail is kept until more text
//! arrives or [`LineSplitter::finish`] flushes it.

use futures::{Stream, StreamExt};
use shared::Utterance;

/// Stateful splitter turning text chunks into indexed line utterances.
#[derive(Debug, Default)]
pub struct LineSplitter {
    buf: String,
    next_index: u64,
}

impl LineSplitter {
    /// Create a splitter whose first utterance gets index 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a splitter whose first utterance gets `index`.
    pub fn starting_at(index: u64) -> Self {
        Self {
            buf: String::new(),
            next_index: index,
        }
    }

    /// Index the next emitted utterance will carry.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Text received since the last complete line.
    pub fn pending(&self) -> &str {
        &self.buf
    }

    /// Push a chunk and return every line it completed.
    ///
    /// Blank lines are skipped and do not consume an index.
    pub fn push_str(&mut self, chunk: &str) -> Vec<Utterance> {
        self.buf.push_str(chunk);
        let Some(last_newline) = self.buf.rfind('\n') else {
            return Vec::new();
        };
        let rest = self.buf.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buf, rest);

        let mut out = Vec::new();
        for line in complete.split('\n') {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            out.push(self.emit(line.to_string()));
        }
        out
    }

    /// Flush the remainder as a final, newline-terminated utterance.
    pub fn finish(mut self) -> Option<Utterance> {
        if self.buf.trim().is_empty() {
            return None;
        }
        let mut last = std::mem::take(&mut self.buf);
        last.push('\n');
        Some(self.emit(last))
    }

    fn emit(&mut self, text: String) -> Utterance {
        let utterance = Utterance::new(text, self.next_index);
        self.next_index += 1;
        utterance
    }
}

/// Yield line utterances from a stream of text chunks.
pub fn line_stream<S>(input: S) -> impl Stream<Item = Utterance>
where
    S: Stream<Item = String> + Unpin,
{
    use futures::stream::unfold;
    use std::collections::VecDeque;

    let pending: VecDeque<Utterance> = VecDeque::new();
    unfold(
        (input, Some(LineSplitter::new()), pending),
        |(mut input, mut splitter, mut pending)| async move {
            loop {
                if let Some(next) = pending.pop_front() {
                    return Some((next, (input, splitter, pending)));
                }
                let current = splitter.as_mut()?;
                match input.next().await {
                    Some(chunk) => pending.extend(current.push_str(&chunk)),
                    None => {
                        let last = splitter.take().and_then(LineSplitter::finish);
                        pending.extend(last);
                    }
                }
            }
        },
    )
}
