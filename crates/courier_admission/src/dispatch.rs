//! Rate-limited, concurrency-capped dispatch with two priority lanes.
//!
//! Chat-send APIs cap both simultaneous connections and requests per second.
//! A single FIFO queue would let a bulk broadcast monopolize that budget and
//! park every interactive user behind thousands of sends. Two lanes sharing
//! one [`SharedQuota`] solve this with a constant-size mechanism: the high
//! lane always wins ties, so dialog replies never wait on broadcast traffic.
//!
//! The high lane's total precedence is deliberate: a continuous stream of
//! high-priority jobs can delay normal-lane jobs indefinitely. There is no
//! starvation guard.

use crate::{AdmissionError, AdmissionErrorKind};
use futures::future::BoxFuture;
use serde::Serialize;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::debug;

/// Trailing window over which dispatch starts are counted.
const RATE_WINDOW: Duration = Duration::from_millis(1000);

/// Traffic class of a [`DispatchQueue`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    /// Interactive dialog replies; always dispatched before normal jobs
    High,
    /// Bulk deliveries such as broadcasts
    #[default]
    Normal,
}

/// A consistent point-in-time snapshot of dispatch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    /// Jobs currently executing
    pub active: usize,
    /// Jobs waiting in the high lane
    pub queued_high: usize,
    /// Jobs waiting in the normal lane
    pub queued_normal: usize,
    /// Deepest combined backlog observed since creation
    pub observed_max_queue: usize,
}

type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

#[derive(Default)]
struct QuotaState {
    high: VecDeque<Job>,
    normal: VecDeque<Job>,
    active: usize,
    recent_starts: VecDeque<Instant>,
    observed_max_queue: usize,
    rate_wait_scheduled: bool,
}

struct QuotaInner {
    max_parallel: usize,
    max_rps: usize,
    state: Mutex<QuotaState>,
}

/// The concurrency and rate budget shared by cooperating queue instances.
///
/// Cloning is cheap and shares the same state. Two independently constructed
/// [`DispatchQueue`]s, one per traffic class, enforce one combined budget
/// by being built over clones of the same quota.
#[derive(Clone)]
pub struct SharedQuota {
    inner: Arc<QuotaInner>,
}

impl std::fmt::Debug for SharedQuota {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("SharedQuota")
            .field("max_parallel", &self.inner.max_parallel)
            .field("max_rps", &self.inner.max_rps)
            .field("active", &stats.active)
            .field("queued_high", &stats.queued_high)
            .field("queued_normal", &stats.queued_normal)
            .finish()
    }
}

impl SharedQuota {
    /// Create a quota allowing `max_parallel` concurrent jobs and `max_rps`
    /// dispatch starts per trailing second. Both are clamped to at least 1.
    pub fn new(max_parallel: usize, max_rps: usize) -> Self {
        Self {
            inner: Arc::new(QuotaInner {
                max_parallel: max_parallel.max(1),
                max_rps: max_rps.max(1),
                state: Mutex::new(QuotaState::default()),
            }),
        }
    }

    /// Take a consistent snapshot of the quota's counters.
    pub fn stats(&self) -> DispatchStats {
        let state = self.inner.state.lock().unwrap();
        DispatchStats {
            active: state.active,
            queued_high: state.high.len(),
            queued_normal: state.normal.len(),
            observed_max_queue: state.observed_max_queue,
        }
    }

    fn enqueue(&self, priority: Priority, job: Job) {
        let mut state = self.inner.state.lock().unwrap();
        match priority {
            Priority::High => state.high.push_back(job),
            Priority::Normal => state.normal.push_back(job),
        }
        let depth = state.high.len() + state.normal.len();
        if depth > state.observed_max_queue {
            state.observed_max_queue = depth;
        }
    }

    /// Start as many queued jobs as the budget allows.
    ///
    /// Invoked after every enqueue and every job completion. When the rate
    /// window is full, one delayed re-pump is scheduled for the moment the
    /// oldest start leaves the window; only the pump waits, never a caller's
    /// other queued work.
    fn pump(&self) {
        loop {
            let job = {
                let mut state = self.inner.state.lock().unwrap();
                if state.active >= self.inner.max_parallel {
                    return;
                }
                if state.high.is_empty() && state.normal.is_empty() {
                    return;
                }
                let now = Instant::now();
                while state
                    .recent_starts
                    .front()
                    .is_some_and(|start| now.duration_since(*start) >= RATE_WINDOW)
                {
                    state.recent_starts.pop_front();
                }
                if state.recent_starts.len() >= self.inner.max_rps {
                    if let Some(oldest) = state.recent_starts.front().copied() {
                        if !state.rate_wait_scheduled {
                            state.rate_wait_scheduled = true;
                            let wake = oldest + RATE_WINDOW;
                            let delay = wake.saturating_duration_since(now);
                            let quota = self.clone();
                            drop(state);
                            debug!(
                                delay_ms = delay.as_millis() as u64,
                                "rate window full, pausing dispatch"
                            );
                            tokio::spawn(async move {
                                tokio::time::sleep_until(wake).await;
                                quota.inner.state.lock().unwrap().rate_wait_scheduled = false;
                                quota.pump();
                            });
                        }
                    }
                    return;
                }
                // High lane wins whenever both are non-empty.
                let job = match state.high.pop_front() {
                    Some(job) => job,
                    None => match state.normal.pop_front() {
                        Some(job) => job,
                        None => return,
                    },
                };
                state.recent_starts.push_back(now);
                state.active += 1;
                job
            };
            let guard = ActiveGuard {
                quota: self.clone(),
            };
            tokio::spawn(async move {
                let _guard = guard;
                job().await;
            });
        }
    }
}

/// Corrects `active` and re-pumps when a job finishes, even on panic.
struct ActiveGuard {
    quota: SharedQuota,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        {
            let mut state = self.quota.inner.state.lock().unwrap();
            state.active = state.active.saturating_sub(1);
        }
        self.quota.pump();
    }
}

/// One traffic class's entry point into a [`SharedQuota`].
///
/// # Examples
///
/// ```
/// use courier_admission::{DispatchQueue, Priority, SharedQuota};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let quota = SharedQuota::new(2, 25);
/// let dialog = DispatchQueue::with_quota(quota.clone(), Priority::High);
/// let broadcast = DispatchQueue::with_quota(quota, Priority::Normal);
///
/// let sent = dialog.schedule(|| async { "ok" }).await.unwrap();
/// assert_eq!(sent, "ok");
/// # let _ = broadcast;
/// # }
/// ```
pub struct DispatchQueue {
    quota: SharedQuota,
    priority: Priority,
}

impl std::fmt::Debug for DispatchQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchQueue")
            .field("priority", &self.priority)
            .field("quota", &self.quota)
            .finish()
    }
}

impl DispatchQueue {
    /// Create a normal-priority queue over a fresh, unshared quota.
    pub fn new(max_parallel: usize, max_rps: usize) -> Self {
        Self::with_quota(SharedQuota::new(max_parallel, max_rps), Priority::default())
    }

    /// Create a queue of the given traffic class over an existing quota.
    pub fn with_quota(quota: SharedQuota, priority: Priority) -> Self {
        Self { quota, priority }
    }

    /// The quota this queue dispatches against.
    pub fn quota(&self) -> &SharedQuota {
        &self.quota
    }

    /// This queue's traffic class.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Enqueue `task` on this queue's lane and resolve with its output.
    ///
    /// The task runs once a concurrency slot and a rate-window slot are both
    /// available, after every earlier job in its lane. Whatever the task
    /// returns, including an `Err` of its own, is handed back verbatim;
    /// the queue only governs *when* the task runs. [`AdmissionErrorKind::TaskLost`]
    /// is reported only if the task dies without producing an output (e.g. a
    /// panic inside the task).
    pub async fn schedule<F, Fut, O>(&self, task: F) -> Result<O, AdmissionError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = O> + Send + 'static,
        O: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            Box::pin(async move {
                let output = task().await;
                let _ = tx.send(output);
            })
        });
        self.quota.enqueue(self.priority, job);
        self.quota.pump();
        rx.await
            .map_err(|_| AdmissionError::new(AdmissionErrorKind::TaskLost))
    }

    /// Run `task` immediately, bypassing the queue and the rate window.
    ///
    /// For fire-and-forget signals like typing indicators, which must never
    /// be delayed behind a backlog of sends.
    pub async fn bypass<F, Fut, O>(&self, task: F) -> O
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = O>,
    {
        task().await
    }
}
