use shared::Utterance;
use std::collections::VecDeque;

/// FIFO of utterances awaiting narration.
///
/// Playback follows arrival order. Indices are only consulted when trimming
/// stale entries with [`UtteranceQueue::delete_larger_than`].
#[derive(Debug, Default, Clone)]
pub struct UtteranceQueue {
    items: VecDeque<Utterance>,
}

impl UtteranceQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an utterance to the tail.
    pub fn enqueue(&mut self, utterance: Utterance) {
        self.items.push_back(utterance);
    }

    /// Pop the head, if any.
    pub fn dequeue(&mut self) -> Option<Utterance> {
        self.items.pop_front()
    }

    /// Remove every entry whose index is greater than `mark`.
    pub fn delete_larger_than(&mut self, mark: u64) {
        self.items.retain(|u| u.index <= mark);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Utterance> {
        self.items.iter()
    }
}
