//! In-memory fakes for poller tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::channels::Notifier;
use crate::error::{ChannelError, TransportError};
use crate::poller::Clock;
use crate::remote::{Fetcher, RawResponse, StatusRequest};

/// Notifier that records every text it is asked to send.
pub struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
    attempts: AtomicUsize,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub fn failing() -> Self {
        let notifier = Self::new();
        notifier.set_failing(true);
        notifier
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Texts that were delivered successfully.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, text: &str) -> Result<(), ChannelError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ChannelError::DeliveryFailed {
                channel: "recording".to_string(),
                reason: "chat unreachable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Fetcher that replays a queue of canned responses.
///
/// Once the queue is empty every fetch fails with a transport error.
pub struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    cursors: Mutex<Vec<i64>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            cursors: Mutex::new(Vec::new()),
        }
    }

    pub fn push_json(self, body: serde_json::Value) -> Self {
        self.push(Ok(RawResponse::new(200, body.to_string())))
    }

    pub fn push(self, response: Result<RawResponse, TransportError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// `from_date` of every request received so far.
    pub fn cursors(&self) -> Vec<i64> {
        self.cursors.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &StatusRequest) -> Result<RawResponse, TransportError> {
        self.cursors.lock().unwrap().push(request.from_date);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted response".to_string())))
    }
}

/// Clock that only moves when slept on.
pub struct ManualClock {
    now: AtomicI64,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now_unix(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        self.now
            .fetch_add(duration.as_secs() as i64, Ordering::SeqCst);
    }
}
