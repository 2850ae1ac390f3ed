//! Epoch-keyed retry timers.
//!
//! Pending receive requests wait here until their deadline. Every entry
//! remembers the session epoch it was scheduled in; entries from an older
//! epoch are never run again and only have their continuation resolved with
//! an empty message.

use std::time::Instant;

/// Receives the next message, or an empty string when none is coming
pub type Continuation = Box<dyn FnOnce(String) + Send>;

struct PendingRetry {
    due: Instant,
    epoch: u64,
    continuation: Continuation,
}

/// Retry timers ordered by deadline
#[derive(Default)]
pub struct RetryQueue {
    // Kept sorted by `due`; equal deadlines keep insertion order.
    entries: Vec<PendingRetry>,
}

impl RetryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn schedule(&mut self, due: Instant, epoch: u64, continuation: Continuation) {
        let index = self.entries.partition_point(|entry| entry.due <= due);
        self.entries.insert(
            index,
            PendingRetry {
                due,
                epoch,
                continuation,
            },
        );
    }

    /// Earliest deadline, if anything is waiting
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.first().map(|entry| entry.due)
    }

    /// Remove every entry due at `now` that belongs to `epoch`.
    ///
    /// Due entries from other epochs are resolved with an empty message.
    pub fn take_due(&mut self, now: Instant, epoch: u64) -> Vec<Continuation> {
        let split = self.entries.partition_point(|entry| entry.due <= now);
        let mut ready = Vec::with_capacity(split);

        for entry in self.entries.drain(..split) {
            if entry.epoch == epoch {
                ready.push(entry.continuation);
            } else {
                tracing::debug!("Dropping stale retry from epoch {}", entry.epoch);
                (entry.continuation)(String::new());
            }
        }
        ready
    }

    /// Remove every pending entry regardless of deadline
    pub fn cancel_all(&mut self) -> Vec<Continuation> {
        self.entries
            .drain(..)
            .map(|entry| entry.continuation)
            .collect()
    }
}

impl std::fmt::Debug for RetryQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryQueue")
            .field("pending", &self.entries.len())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn tagged(tag: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Continuation {
        let log = Arc::clone(log);
        Box::new(move |msg: String| log.lock().unwrap().push(format!("{}={}", tag, msg)))
    }

    #[test]
    fn test_take_due_respects_deadline_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let t0 = Instant::now();
        let mut queue = RetryQueue::new();
        queue.schedule(t0 + Duration::from_millis(20), 0, tagged("b", &log));
        queue.schedule(t0 + Duration::from_millis(10), 0, tagged("a", &log));
        queue.schedule(t0 + Duration::from_millis(30), 0, tagged("c", &log));

        assert_eq!(queue.next_deadline(), Some(t0 + Duration::from_millis(10)));

        let due = queue.take_due(t0 + Duration::from_millis(20), 0);
        assert_eq!(due.len(), 2);
        for (cont, msg) in due.into_iter().zip(["x", "y"]) {
            cont(msg.to_string());
        }
        assert_eq!(*log.lock().unwrap(), vec!["a=x", "b=y"]);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_stale_epoch_is_resolved_empty_not_returned() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let t0 = Instant::now();
        let mut queue = RetryQueue::new();
        queue.schedule(t0, 1, tagged("old", &log));

        assert!(queue.take_due(t0, 2).is_empty());
        assert_eq!(*log.lock().unwrap(), vec!["old="]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_cancel_all() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let t0 = Instant::now();
        let mut queue = RetryQueue::new();
        queue.schedule(t0 + Duration::from_secs(5), 0, tagged("a", &log));
        queue.schedule(t0 + Duration::from_secs(9), 0, tagged("b", &log));

        let cancelled = queue.cancel_all();
        assert_eq!(cancelled.len(), 2);
        assert!(queue.is_empty());
        assert_eq!(queue.next_deadline(), None);
    }
}
