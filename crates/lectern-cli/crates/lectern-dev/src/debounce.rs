//! Timer state for the watch loop: a single debounce deadline plus per-file
//! write settling. Both take the current instant as a parameter, so the state
//! transitions are testable without sleeping.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// One-shot debounce timer. At most one deadline is pending at a time, and
/// re-arming always restarts the full interval, so a burst of changes
/// collapses into a single fire. Consecutive re-arms can push the deadline
/// out indefinitely; there is no maximum-wait cap.
#[derive(Debug)]
pub(crate) struct Debounce {
    interval: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// Arm the timer, cancelling any pending deadline.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Return to idle after the deadline has fired.
    pub fn disarm(&mut self) {
        self.deadline = None;
    }
}

/// Tracks files that are still being written. A path only counts as changed
/// once no event has touched it for the threshold, which keeps partial
/// writes from triggering builds.
#[derive(Debug)]
pub(crate) struct WriteSettle {
    threshold: Duration,
    pending: HashMap<PathBuf, Instant>,
}

impl WriteSettle {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            pending: HashMap::new(),
        }
    }

    /// Note an event on `path`, restarting its quiet period.
    pub fn record(&mut self, path: PathBuf, now: Instant) {
        self.pending.insert(path, now);
    }

    /// Remove and return the paths that have been quiet long enough.
    pub fn take_settled(&mut self, now: Instant) -> Vec<PathBuf> {
        let settled: Vec<PathBuf> = self
            .pending
            .iter()
            .filter(|(_, last)| now.duration_since(**last) >= self.threshold)
            .map(|(path, _)| path.clone())
            .collect();
        for path in &settled {
            self.pending.remove(path);
        }
        settled
    }
}
