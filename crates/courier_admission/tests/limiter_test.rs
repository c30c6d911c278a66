//! Tests for the bounded-concurrency limiter.

use courier_admission::{AdmissionErrorKind, AdmissionHooks, ConcurrencyLimiter, LimiterStats};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Counts admission events and remembers the last reported queue wait.
#[derive(Default)]
struct CountingHooks {
    queued: AtomicUsize,
    acquired: AtomicUsize,
    dropped: AtomicUsize,
    last_wait: Mutex<Option<Duration>>,
}

impl AdmissionHooks for CountingHooks {
    fn on_queue(&self, _stats: &LimiterStats) {
        self.queued.fetch_add(1, Ordering::SeqCst);
    }

    fn on_acquire(&self, _stats: &LimiterStats, queue_wait: Duration) {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        *self.last_wait.lock().unwrap() = Some(queue_wait);
    }

    fn on_drop(&self, _stats: &LimiterStats) {
        self.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test(start_paused = true)]
async fn test_active_never_exceeds_capacity() -> anyhow::Result<()> {
    let limiter = ConcurrencyLimiter::new(2, 8);
    let peak = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..6 {
        let limiter = limiter.clone();
        let peak = peak.clone();
        handles.push(tokio::spawn(async move {
            let permit = limiter.acquire().await.unwrap();
            peak.fetch_max(limiter.stats().active, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            permit.release();
        }));
    }
    for handle in handles {
        handle.await?;
    }

    assert!(peak.load(Ordering::SeqCst) <= 2);
    let stats = limiter.stats();
    assert_eq!(stats.active, 0);
    assert_eq!(stats.queued, 0);
    assert_eq!(stats.dropped, 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_fifo_grant_order() -> anyhow::Result<()> {
    let limiter = ConcurrencyLimiter::new(1, 64);
    let first = limiter.acquire().await?;

    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let mut handles = Vec::new();
    for name in ["A", "B", "C"] {
        let limiter = limiter.clone();
        let order = order.clone();
        handles.push(tokio::spawn(async move {
            let permit = limiter.acquire().await.unwrap();
            order.lock().unwrap().push(name);
            tokio::time::sleep(Duration::from_millis(10)).await;
            permit.release();
        }));
        // let the task park itself before enqueueing the next one
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    assert_eq!(limiter.stats().queued, 3);

    first.release();
    for handle in handles {
        handle.await?;
    }

    assert_eq!(*order.lock().unwrap(), vec!["A", "B", "C"]);
    assert_eq!(limiter.stats().active, 0);
    Ok(())
}

#[tokio::test]
async fn test_drop_boundary_rejects_immediately() -> anyhow::Result<()> {
    let limiter = ConcurrencyLimiter::new(1, 0);
    let held = limiter.acquire().await?;

    let err = limiter
        .acquire()
        .await
        .expect_err("a zero-length queue must reject the second caller");
    assert!(err.is_queue_full());
    assert!(matches!(
        err.kind(),
        AdmissionErrorKind::QueueFull { queued: 0, .. }
    ));

    let stats = limiter.stats();
    assert_eq!(stats.active, 1);
    assert_eq!(stats.dropped, 1);

    held.release();
    assert_eq!(limiter.stats().active, 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_release_is_idempotent() -> anyhow::Result<()> {
    let limiter = ConcurrencyLimiter::new(1, 4);
    let permit = limiter.acquire().await?;

    let limiter_for_waiter = limiter.clone();
    let waiter = tokio::spawn(async move {
        let permit = limiter_for_waiter.acquire().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        permit.release();
    });
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(limiter.stats().queued, 1);

    // Explicit release consumes the permit; the drop that follows inside
    // release() must not free the slot a second time.
    permit.release();
    tokio::time::sleep(Duration::from_millis(1)).await;

    let stats = limiter.stats();
    assert_eq!(stats.active, 1, "the waiter holds the slot exactly once");
    assert_eq!(stats.queued, 0);

    waiter.await?;
    assert_eq!(limiter.stats().active, 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_drop_of_permit_releases_slot() -> anyhow::Result<()> {
    let limiter = ConcurrencyLimiter::new(1, 4);
    let permit = limiter.acquire().await?;
    assert_eq!(limiter.stats().active, 1);

    drop(permit);
    assert_eq!(limiter.stats().active, 0);

    // the slot is usable again
    let permit = limiter.acquire().await?;
    assert_eq!(limiter.stats().active, 1);
    permit.release();
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_hooks_report_queue_wait() -> anyhow::Result<()> {
    let limiter = ConcurrencyLimiter::new(1, 4);
    let held = limiter.acquire().await?;

    let hooks = Arc::new(CountingHooks::default());
    let limiter_for_waiter = limiter.clone();
    let hooks_for_waiter = hooks.clone();
    let waiter = tokio::spawn(async move {
        let permit = limiter_for_waiter
            .acquire_with_hooks(&*hooks_for_waiter)
            .await
            .unwrap();
        permit.release();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(hooks.queued.load(Ordering::SeqCst), 1);
    assert_eq!(hooks.acquired.load(Ordering::SeqCst), 0);

    held.release();
    waiter.await?;

    assert_eq!(hooks.acquired.load(Ordering::SeqCst), 1);
    let wait = hooks
        .last_wait
        .lock()
        .unwrap()
        .expect("on_acquire must report the measured wait");
    assert!(wait >= Duration::from_millis(50));
    Ok(())
}

#[tokio::test]
async fn test_hooks_on_drop_and_zero_wait() -> anyhow::Result<()> {
    let limiter = ConcurrencyLimiter::new(1, 0);
    let hooks = CountingHooks::default();

    let permit = limiter.acquire_with_hooks(&hooks).await?;
    assert_eq!(hooks.acquired.load(Ordering::SeqCst), 1);
    assert_eq!(
        hooks.last_wait.lock().unwrap().unwrap(),
        Duration::ZERO,
        "an immediate grant reports zero queue wait"
    );

    let err = limiter
        .acquire_with_hooks(&hooks)
        .await
        .expect_err("queue full");
    assert!(err.is_queue_full());
    assert_eq!(hooks.dropped.load(Ordering::SeqCst), 1);

    permit.release();
    Ok(())
}
