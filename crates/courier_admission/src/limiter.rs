//! Bounded-concurrency admission with a capped FIFO wait queue.
//!
//! The limiter answers one question per call: proceed now, wait, or give up.
//! Callers that find a free slot proceed immediately; callers that find the
//! slots busy wait in a strictly FIFO queue; callers that find the queue at
//! capacity are rejected on the spot and never granted later. The three-way
//! split is what lets the retry layer tell "wait a bit" apart from "degrade
//! gracefully".

use crate::hooks::AdmissionHooks;
use crate::{AdmissionError, AdmissionErrorKind};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, warn};

/// A consistent point-in-time snapshot of limiter state.
///
/// Pure read: taking a snapshot never mutates the limiter. Health-check and
/// diagnostics endpoints report these numbers verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LimiterStats {
    /// Calls currently holding a slot
    pub active: usize,
    /// Calls waiting in the FIFO queue
    pub queued: usize,
    /// Calls rejected since the limiter was created
    pub dropped: u64,
    /// Slot capacity
    pub max_concurrency: usize,
    /// Wait queue capacity
    pub max_queue_size: usize,
}

/// A waiter parked in the FIFO queue.
///
/// Created on `acquire` when no slot is free, consumed exactly once when a
/// slot frees up, never mutated in between.
struct Waiter {
    enqueued_at: Instant,
    grant: oneshot::Sender<Granted>,
}

/// A slot grant delivered to a parked waiter.
struct Granted {
    permit: SlotPermit,
    stats: LimiterStats,
    queue_wait: Duration,
}

#[derive(Default)]
struct LimiterState {
    active: usize,
    dropped: u64,
    queue: VecDeque<Waiter>,
}

struct Inner {
    max_concurrency: usize,
    max_queue_size: usize,
    state: Mutex<LimiterState>,
}

impl Inner {
    fn snapshot(&self, state: &LimiterState) -> LimiterStats {
        LimiterStats {
            active: state.active,
            queued: state.queue.len(),
            dropped: state.dropped,
            max_concurrency: self.max_concurrency,
            max_queue_size: self.max_queue_size,
        }
    }

    /// Return a slot to the pool, handing it to the earliest live waiter.
    ///
    /// When a waiter takes the slot, `active` is left untouched: the slot
    /// transfers owners without ever being free, so `active` can never
    /// overshoot `max_concurrency`. Waiters whose receiving end has gone
    /// away are skipped.
    fn release(inner: &Arc<Inner>) {
        loop {
            let (waiter, stats) = {
                let mut state = inner.state.lock().unwrap();
                match state.queue.pop_front() {
                    Some(waiter) => {
                        let stats = inner.snapshot(&state);
                        (waiter, stats)
                    }
                    None => {
                        state.active = state.active.saturating_sub(1);
                        return;
                    }
                }
            };
            let queue_wait = waiter.enqueued_at.elapsed();
            let granted = Granted {
                permit: SlotPermit::new(inner.clone()),
                stats,
                queue_wait,
            };
            match waiter.grant.send(granted) {
                Ok(()) => return,
                Err(lost) => {
                    // The waiter's caller went away while queued. Defuse the
                    // permit we minted for it so its drop doesn't release a
                    // slot nobody held, then offer the slot to the next one.
                    lost.permit.defuse();
                }
            }
        }
    }
}

/// Bounded semaphore with a capped FIFO wait queue and a drop policy.
///
/// Cloning is cheap and shares the same state; all mutation goes through a
/// single internal lock, and ordering of grants by enqueue time is part of
/// the contract.
///
/// # Examples
///
/// ```
/// use courier_admission::ConcurrencyLimiter;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let limiter = ConcurrencyLimiter::new(2, 16);
/// let permit = limiter.acquire().await.unwrap();
/// assert_eq!(limiter.stats().active, 1);
/// permit.release();
/// assert_eq!(limiter.stats().active, 0);
/// # }
/// ```
#[derive(Clone)]
pub struct ConcurrencyLimiter {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ConcurrencyLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("ConcurrencyLimiter")
            .field("active", &stats.active)
            .field("queued", &stats.queued)
            .field("dropped", &stats.dropped)
            .field("max_concurrency", &stats.max_concurrency)
            .field("max_queue_size", &stats.max_queue_size)
            .finish()
    }
}

impl ConcurrencyLimiter {
    /// Create a limiter with the given slot and wait-queue capacities.
    ///
    /// `max_concurrency` is clamped to at least 1. A `max_queue_size` of 0
    /// means no waiting at all: every call beyond capacity is rejected.
    pub fn new(max_concurrency: usize, max_queue_size: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                max_concurrency: max_concurrency.max(1),
                max_queue_size,
                state: Mutex::new(LimiterState::default()),
            }),
        }
    }

    /// Acquire a slot without observer hooks.
    pub async fn acquire(&self) -> Result<SlotPermit, AdmissionError> {
        self.acquire_with_hooks(&()).await
    }

    /// Acquire a slot, reporting the admission outcome through `hooks`.
    ///
    /// Resolves with a [`SlotPermit`] once a slot is held. Rejects with
    /// [`AdmissionErrorKind::QueueFull`] when both the slots and the wait
    /// queue are at capacity; such a call is never granted later.
    pub async fn acquire_with_hooks(
        &self,
        hooks: &dyn AdmissionHooks,
    ) -> Result<SlotPermit, AdmissionError> {
        let rx = {
            let mut state = self.inner.state.lock().unwrap();
            if state.active < self.inner.max_concurrency {
                state.active += 1;
                let stats = self.inner.snapshot(&state);
                drop(state);
                debug!(active = stats.active, "admission slot granted");
                hooks.on_acquire(&stats, Duration::ZERO);
                return Ok(SlotPermit::new(self.inner.clone()));
            }
            if state.queue.len() < self.inner.max_queue_size {
                let (tx, rx) = oneshot::channel();
                state.queue.push_back(Waiter {
                    enqueued_at: Instant::now(),
                    grant: tx,
                });
                let stats = self.inner.snapshot(&state);
                drop(state);
                debug!(queued = stats.queued, "no free slot, caller queued");
                hooks.on_queue(&stats);
                rx
            } else {
                state.dropped += 1;
                let stats = self.inner.snapshot(&state);
                drop(state);
                warn!(
                    dropped = stats.dropped,
                    queued = stats.queued,
                    "wait queue full, rejecting caller"
                );
                hooks.on_drop(&stats);
                return Err(AdmissionError::new(AdmissionErrorKind::QueueFull {
                    queued: stats.queued,
                    dropped: stats.dropped,
                }));
            }
        };

        match rx.await {
            Ok(granted) => {
                debug!(
                    queue_wait_ms = granted.queue_wait.as_millis() as u64,
                    "queued caller granted a slot"
                );
                hooks.on_acquire(&granted.stats, granted.queue_wait);
                Ok(granted.permit)
            }
            Err(_) => Err(AdmissionError::new(AdmissionErrorKind::SlotRevoked)),
        }
    }

    /// Take a consistent snapshot of the limiter's counters.
    ///
    /// The snapshot may transiently count waiters whose callers have since
    /// gone away; those entries are skipped when a slot frees up.
    pub fn stats(&self) -> LimiterStats {
        let state = self.inner.state.lock().unwrap();
        self.inner.snapshot(&state)
    }
}

/// Exclusive handle to one held slot.
///
/// Releasing is idempotent: the slot goes back exactly once, whether through
/// an explicit [`release`](SlotPermit::release), a drop, or both.
pub struct SlotPermit {
    inner: Arc<Inner>,
    released: bool,
}

impl SlotPermit {
    fn new(inner: Arc<Inner>) -> Self {
        Self {
            inner,
            released: false,
        }
    }

    /// Return the slot to the limiter.
    pub fn release(mut self) {
        self.released = true;
        Inner::release(&self.inner);
    }

    /// Consume the permit without releasing the slot.
    fn defuse(mut self) {
        self.released = true;
    }
}

impl std::fmt::Debug for SlotPermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotPermit")
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl Drop for SlotPermit {
    fn drop(&mut self) {
        if !self.released {
            self.released = true;
            Inner::release(&self.inner);
        }
    }
}
