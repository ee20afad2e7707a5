#![forbid(unsafe_code)]

//! Deterministic single-shot task scheduler.
//!
//! A [`Scheduler`] holds deferred tasks ("after the animation") and an
//! internal clock that only moves when the caller ticks it. Nothing here
//! reads wall-clock time, so every timing path can be replayed exactly in
//! tests.
//!
//! # Example
//!
//! ```rust
//! use reel_runtime::scheduler::Scheduler;
//! use std::time::Duration;
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.schedule(Duration::from_millis(400), "after");
//! assert!(scheduler.tick(Duration::from_millis(399)).is_empty());
//! assert_eq!(scheduler.tick(Duration::from_millis(1)), ["after"]);
//! ```
//!
//! # Invariants
//!
//! 1. A task fires at most once, on the first tick where `now >= due`.
//! 2. Due tasks come out ordered by due time, then by scheduling order.
//! 3. A cancelled task never fires.
//!
//! # Failure Modes
//!
//! - Cancelling an unknown or already-fired id returns `None`.
//! - Clock overflow saturates at `Duration::MAX`.

use std::time::Duration;

/// Handle of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    id: TaskId,
    due: Duration,
    task: T,
}

/// Pending tasks plus a manually advanced clock.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    /// Empty scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `task` to fire `delay` from now.
    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let due = self.now.saturating_add(delay);
        tracing::trace!(task = id.0, delay_ms = delay.as_millis() as u64, "task scheduled");
        self.pending.push(Pending { id, due, task });
        id
    }

    /// Cancel a pending task, returning it.
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        let pos = self.pending.iter().position(|p| p.id == id)?;
        tracing::trace!(task = id.0, "task cancelled");
        Some(self.pending.remove(pos).task)
    }

    /// Cancel every pending task. Returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        if n > 0 {
            tracing::trace!(count = n, "all tasks cancelled");
        }
        self.pending.clear();
        n
    }

    /// Whether `id` is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Time until the earliest pending task is due.
    #[must_use]
    pub fn next_due_in(&self) -> Option<Duration> {
        self.pending
            .iter()
            .map(|p| p.due.saturating_sub(self.now))
            .min()
    }

    /// Advance the clock by `dt` and return every task now due.
    pub fn tick(&mut self, dt: Duration) -> Vec<T> {
        self.now = self.now.saturating_add(dt);
        let now = self.now;
        self.take_where(|p| p.due <= now)
    }

    /// Return every pending task regardless of due time, moving the clock
    /// to the latest due time among them.
    pub fn drain(&mut self) -> Vec<T> {
        if let Some(latest) = self.pending.iter().map(|p| p.due).max() {
            self.now = self.now.max(latest);
        }
        self.take_where(|_| true)
    }

    fn take_where(&mut self, mut due: impl FnMut(&Pending<T>) -> bool) -> Vec<T> {
        let (mut fired, rest): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|p| due(p));
        self.pending = rest;
        fired.sort_by_key(|p| (p.due, p.id));
        fired.into_iter().map(|p| p.task).collect()
    }
}
