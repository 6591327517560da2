//! Runtime abstraction layer for frame scheduling
//!
//! Animations never block: every tick is a task posted to a
//! [`FrameScheduler`]. This module provides the clocks and schedulers the
//! crate ships with, so the helpers work under tokio, inside a host-pumped
//! frame loop, or against virtual time in tests.

use crate::traits::{Clock, FrameScheduler, FrameTask};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Handle to a scheduled chain of work
pub trait TaskHandle: Send + Sync {
    /// Check if the task ran to completion
    fn is_finished(&self) -> bool;

    /// Cancel the task
    fn cancel(&self);
}

/// Cancels every task that has not finished yet. Returns how many were
/// still unfinished.
pub fn cancel_unfinished<H, I>(handles: I) -> usize
where
    H: TaskHandle,
    I: IntoIterator<Item = H>,
{
    let mut cancelled = 0;
    for handle in handles.into_iter().filter(|handle| !handle.is_finished()) {
        handle.cancel();
        cancelled += 1;
    }
    cancelled
}

/// Monotonic wall clock, wasm-friendly through the `instant` crate
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: instant::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: instant::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Virtual clock that only moves when told to
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }

    /// Moves the clock to `to`; the clock never goes backwards
    pub fn set(&self, to: Duration) {
        if let Ok(mut now) = self.now.lock() {
            if to > *now {
                *now = to;
            }
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.lock().map(|now| *now).unwrap_or_default()
    }
}

struct ScheduledTask {
    due: Duration,
    seq: u64,
    task: FrameTask,
}

impl PartialEq for ScheduledTask {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // Earliest due time first, then post order
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Scheduler pumped by its owner against a [`ManualClock`].
///
/// Hosts with their own frame loop call [`ManualScheduler::run_due`] once per
/// frame; tests use [`ManualScheduler::advance`] to step virtual time.
pub struct ManualScheduler {
    clock: ManualClock,
    queue: Mutex<BinaryHeap<ScheduledTask>>,
    next_seq: AtomicU64,
}

impl ManualScheduler {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            queue: Mutex::new(BinaryHeap::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.queue.lock().map(|queue| queue.len()).unwrap_or(0)
    }

    fn pop_due(&self, deadline: Duration) -> Option<ScheduledTask> {
        let mut queue = self.queue.lock().ok()?;
        if queue.peek().map_or(false, |next| next.due <= deadline) {
            queue.pop()
        } else {
            None
        }
    }

    fn next_due(&self) -> Option<Duration> {
        self.queue
            .lock()
            .ok()
            .and_then(|queue| queue.peek().map(|next| next.due))
    }

    /// Runs every task that is due at the current time. Returns how many ran.
    pub fn run_due(&self) -> usize {
        let mut ran = 0;
        // The lock is released before each task runs so tasks can repost
        while let Some(scheduled) = self.pop_due(self.clock.now()) {
            (scheduled.task)();
            ran += 1;
        }
        ran
    }

    /// Steps virtual time forward by `by`, stopping at each due time on the
    /// way so every task observes the clock at its own due time.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.clock.now() + by;
        let mut ran = 0;
        while let Some(scheduled) = self.pop_due(target) {
            self.clock.set(scheduled.due);
            (scheduled.task)();
            ran += 1;
        }
        self.clock.set(target);
        ran
    }

    /// Keeps jumping to the next due time until the queue drains or
    /// `max_tasks` have run. Returns how many ran.
    pub fn run_until_idle(&self, max_tasks: usize) -> usize {
        let mut ran = 0;
        while ran < max_tasks {
            let Some(due) = self.next_due() else {
                break;
            };
            self.clock.set(due);
            match self.pop_due(due) {
                Some(scheduled) => {
                    (scheduled.task)();
                    ran += 1;
                }
                None => break,
            }
        }
        ran
    }
}

impl FrameScheduler for ManualScheduler {
    fn post_delayed(&self, delay: Duration, task: FrameTask) {
        let seq = self.next_seq.fetch_add(1, AtomicOrdering::Relaxed);
        let due = self.clock.now() + delay;
        if let Ok(mut queue) = self.queue.lock() {
            queue.push(ScheduledTask { due, seq, task });
        }
    }
}

/// Default scheduler implementations
pub mod spawners {
    #[cfg(feature = "tokio-runtime")]
    pub mod tokio_impl {
        use crate::traits::{FrameScheduler, FrameTask};
        use crate::{MapError, Result};
        use std::time::Duration;

        /// Tokio-based frame scheduler: each post becomes a task that
        /// sleeps for the delay and then runs the callback
        #[derive(Debug, Clone)]
        pub struct TokioScheduler {
            handle: ::tokio::runtime::Handle,
        }

        impl TokioScheduler {
            pub fn new(handle: ::tokio::runtime::Handle) -> Self {
                Self { handle }
            }

            /// Scheduler on the runtime the caller is running in
            pub fn current() -> Result<Self> {
                ::tokio::runtime::Handle::try_current()
                    .map(Self::new)
                    .map_err(|e| MapError::Runtime(e.to_string()))
            }
        }

        impl FrameScheduler for TokioScheduler {
            fn post_delayed(&self, delay: Duration, task: FrameTask) {
                self.handle.spawn(async move {
                    if !delay.is_zero() {
                        ::tokio::time::sleep(delay).await;
                    }
                    task();
                });
            }
        }
    }
}

#[cfg(feature = "tokio-runtime")]
pub use spawners::tokio_impl::TokioScheduler;

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<(u32, Duration)>>>, ManualClock) {
        (Arc::new(Mutex::new(Vec::new())), ManualClock::new())
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);
        clock.advance(Duration::from_millis(40));
        clock.set(Duration::from_millis(10));
        assert_eq!(clock.now(), Duration::from_millis(40));
    }

    #[test]
    fn test_manual_scheduler_orders_by_due_time() {
        let (log, clock) = recorder();
        let scheduler = ManualScheduler::new(clock.clone());

        for (label, delay) in [(1, 30), (2, 10), (3, 10)] {
            let log = log.clone();
            let clock = clock.clone();
            scheduler.post_delayed(
                Duration::from_millis(delay),
                Box::new(move || log.lock().unwrap().push((label, clock.now()))),
            );
        }

        assert_eq!(scheduler.advance(Duration::from_millis(5)), 0);
        assert_eq!(scheduler.advance(Duration::from_millis(100)), 3);

        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            vec![
                (2, Duration::from_millis(10)),
                (3, Duration::from_millis(10)),
                (1, Duration::from_millis(30)),
            ]
        );
        assert_eq!(clock.now(), Duration::from_millis(105));
    }

    #[test]
    fn test_tasks_can_repost_themselves() {
        fn chain(scheduler: Arc<ManualScheduler>, remaining: Arc<Mutex<u32>>) {
            let mut left = remaining.lock().unwrap();
            if *left == 0 {
                return;
            }
            *left -= 1;
            drop(left);
            let next = scheduler.clone();
            scheduler.post_delayed(
                Duration::from_millis(16),
                Box::new(move || chain(next, remaining)),
            );
        }

        let scheduler = Arc::new(ManualScheduler::new(ManualClock::new()));
        let remaining = Arc::new(Mutex::new(5));
        chain(scheduler.clone(), remaining.clone());

        assert_eq!(scheduler.run_until_idle(100), 5);
        assert_eq!(*remaining.lock().unwrap(), 0);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.clock().now(), Duration::from_millis(80));
    }

    struct FlagTask {
        finished: bool,
        cancelled: Arc<Mutex<u32>>,
    }

    impl TaskHandle for FlagTask {
        fn is_finished(&self) -> bool {
            self.finished
        }

        fn cancel(&self) {
            *self.cancelled.lock().unwrap() += 1;
        }
    }

    #[test]
    fn test_cancel_unfinished_skips_finished_tasks() {
        let cancelled = Arc::new(Mutex::new(0));
        let tasks = [true, false, false].map(|finished| FlagTask {
            finished,
            cancelled: cancelled.clone(),
        });

        assert_eq!(cancel_unfinished(tasks), 2);
        assert_eq!(*cancelled.lock().unwrap(), 2);
    }

    #[test]
    fn test_run_due_only_runs_ready_tasks() {
        let scheduler = ManualScheduler::new(ManualClock::new());
        let hits = Arc::new(Mutex::new(0));
        for delay in [0, 50] {
            let hits = hits.clone();
            scheduler.post_delayed(
                Duration::from_millis(delay),
                Box::new(move || *hits.lock().unwrap() += 1),
            );
        }

        assert_eq!(scheduler.run_due(), 1);
        assert_eq!(scheduler.pending(), 1);
        scheduler.clock().advance(Duration::from_millis(50));
        assert_eq!(scheduler.run_due(), 1);
        assert_eq!(*hits.lock().unwrap(), 2);
    }

    #[cfg(feature = "tokio-runtime")]
    #[::tokio::test]
    async fn test_tokio_scheduler() {
        let scheduler = TokioScheduler::current().unwrap();
        let (tx, rx) = ::tokio::sync::oneshot::channel();
        scheduler.post_delayed(
            Duration::from_millis(5),
            Box::new(move || {
                let _ = tx.send(42);
            }),
        );
        assert_eq!(rx.await.unwrap(), 42);
    }
}
