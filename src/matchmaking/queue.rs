use std::collections::{HashMap, VecDeque};

/// Result of entering the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEntry {
    /// Enqueued at the back of an empty bucket.
    Waiting,
    /// The requester is already in this bucket.
    AlreadyWaiting,
    /// The head of the bucket was popped as the requester's opponent.
    Paired(String),
    /// The requester is waiting in a different bucket.
    WaitingElsewhere(String),
}

/// FIFO of waiting identities per time option. An identity sits in at most
/// one bucket.
#[derive(Debug, Default)]
pub struct MatchmakingQueue {
    buckets: HashMap<String, VecDeque<String>>,
}

impl MatchmakingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, identity: &str, time_option: &str) -> QueueEntry {
        if let Some(bucket) = self.bucket_of(identity) {
            return if bucket == time_option {
                QueueEntry::AlreadyWaiting
            } else {
                QueueEntry::WaitingElsewhere(bucket.to_string())
            };
        }

        let bucket = self.buckets.entry(time_option.to_string()).or_default();
        let Some(opponent) = bucket.pop_front() else {
            bucket.push_back(identity.to_string());
            return QueueEntry::Waiting;
        };

        if opponent == identity {
            bucket.push_back(opponent);
            return QueueEntry::AlreadyWaiting;
        }

        if bucket.is_empty() {
            self.buckets.remove(time_option);
        }
        QueueEntry::Paired(opponent)
    }

    /// Removes `identity` from whichever bucket holds it.
    pub fn leave(&mut self, identity: &str) -> Option<String> {
        let option = self.bucket_of(identity)?.to_string();
        if let Some(bucket) = self.buckets.get_mut(&option) {
            bucket.retain(|waiting| waiting != identity);
            if bucket.is_empty() {
                self.buckets.remove(&option);
            }
        }
        Some(option)
    }

    /// Puts a popped opponent back at the head of its bucket.
    pub fn requeue_front(&mut self, time_option: &str, identity: &str) {
        self.buckets
            .entry(time_option.to_string())
            .or_default()
            .push_front(identity.to_string());
    }

    pub fn bucket_of(&self, identity: &str) -> Option<&str> {
        self.buckets
            .iter()
            .find(|(_, waiting)| waiting.iter().any(|w| w == identity))
            .map(|(option, _)| option.as_str())
    }

    pub fn waiting(&self, time_option: &str) -> Vec<String> {
        self.buckets
            .get(time_option)
            .map(|bucket| bucket.iter().cloned().collect())
            .unwrap_or_default()
    }
}
