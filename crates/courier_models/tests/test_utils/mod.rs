//! Test doubles for the completion client.
//!
//! `MockTransport` plays back a script of upstream behaviors, one step per
//! attempt, while counting calls and tracking peak in-flight concurrency.
//! `FixedJitter` pins the backoff factor so delays are exact.

#![allow(dead_code)]

use async_trait::async_trait;
use courier_error::HttpError;
use courier_interface::{HttpCall, HttpReply, HttpTransport, JitterSource};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted upstream behavior.
pub enum MockStep {
    /// Respond immediately with this status and body
    Reply(u16, String),
    /// Respond with this status and body after a delay
    DelayedReply(Duration, u16, String),
    /// Fail before any status exists
    NetworkError(String),
    /// Never respond; the attempt must be cancelled by its timeout
    Hang,
}

struct MockInner {
    script: Mutex<VecDeque<MockStep>>,
    seen: Mutex<Vec<HttpCall>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// Decrements the in-flight gauge even when the attempt future is dropped
/// by its cancellation timeout.
struct InFlightGuard<'a>(&'a MockInner);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Scripted HTTP transport double.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<MockInner>,
}

impl MockTransport {
    pub fn new(script: Vec<MockStep>) -> Self {
        Self {
            inner: Arc::new(MockInner {
                script: Mutex::new(script.into()),
                seen: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
            }),
        }
    }

    /// Total attempts issued against this transport.
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously in-flight attempts observed.
    pub fn peak_in_flight(&self) -> usize {
        self.inner.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Every call body seen, in order.
    pub fn seen(&self) -> Vec<HttpCall> {
        self.inner.seen.lock().unwrap().clone()
    }

    /// A minimal success body with a consolidated text field.
    pub fn success_body(text: &str) -> String {
        format!(
            r#"{{"id":"resp_1","status":"completed","output_text":"{}"}}"#,
            text
        )
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, call: &HttpCall) -> Result<HttpReply, HttpError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.seen.lock().unwrap().push(call.clone());

        let current = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.inner);

        let step = self.inner.script.lock().unwrap().pop_front();
        match step {
            Some(MockStep::Reply(status, body)) => Ok(HttpReply { status, body }),
            Some(MockStep::DelayedReply(delay, status, body)) => {
                tokio::time::sleep(delay).await;
                Ok(HttpReply { status, body })
            }
            Some(MockStep::NetworkError(message)) => Err(HttpError::new(message)),
            Some(MockStep::Hang) => {
                tokio::time::sleep(Duration::from_secs(86_400)).await;
                Err(HttpError::new("hang step completed unexpectedly"))
            }
            None => Ok(HttpReply {
                status: 500,
                body: "script exhausted".to_string(),
            }),
        }
    }
}

/// Deterministic jitter source.
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn factor(&self) -> f64 {
        self.0
    }
}
