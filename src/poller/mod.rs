//! The poll loop.
//!
//! Each cycle:
//! 1. fetches statuses newer than the cursor,
//! 2. validates the payload,
//! 3. turns the first (latest) homework into a notification,
//! 4. advances the cursor to the server's `current_date`,
//! 5. offers the notification to the dedup layer.
//!
//! Any failure in steps 1-3 is logged and turned into a
//! `Program failure: ...` notification that goes through the same dedup
//! layer. The cursor moves whenever the payload validates, including when
//! the latest homework cannot be read; a fetch or validation failure leaves
//! it unchanged. The loop sleeps for the retry period after every cycle,
//! whatever its outcome.

mod clock;
mod dedup;
mod outcome;
#[cfg(test)]
pub(crate) mod testing;

pub use clock::{Clock, SystemClock};
pub use dedup::{DedupPolicy, Delivery, LastMessage};
pub use outcome::CycleOutcome;

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use crate::channels::Notifier;
use crate::error::{PollError, PollErrorKind};
use crate::remote::{self, Fetcher, StatusRequest};

/// Static settings for a [`Poller`].
#[derive(Debug)]
pub struct PollerConfig {
    /// Status endpoint URL.
    pub endpoint: String,
    /// OAuth token for the endpoint.
    pub token: SecretString,
    /// Delay after every cycle.
    pub retry_period: Duration,
    pub dedup_policy: DedupPolicy,
}

/// Mutable state carried from one cycle to the next.
#[derive(Debug, Clone)]
pub struct PollState {
    /// Lower bound of the next fetch window.
    pub cursor: i64,
    pub last_message: LastMessage,
}

/// What a validated fetch produced, before any state is touched.
#[derive(Debug, Clone)]
pub struct PollUpdate {
    /// Notification for the latest homework, if there was any, or the
    /// reason the latest homework could not be read.
    pub notification: Result<Option<String>, PollError>,
    /// Number of homework items in the window.
    pub items: usize,
    /// Next cursor value.
    pub current_date: i64,
}

/// Loop controller owning the cursor and the last delivered message.
pub struct Poller {
    config: PollerConfig,
    fetcher: Arc<dyn Fetcher>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    state: PollState,
}

impl Poller {
    /// Create a poller whose cursor starts at the clock's current time.
    pub fn new(
        config: PollerConfig,
        fetcher: Arc<dyn Fetcher>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let state = PollState {
            cursor: clock.now_unix(),
            last_message: LastMessage::new(config.dedup_policy),
        };
        Self {
            config,
            fetcher,
            notifier,
            clock,
            state,
        }
    }

    /// Replace the initial state.
    pub fn with_state(mut self, state: PollState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn cursor(&self) -> i64 {
        self.state.cursor
    }

    /// Fetch and interpret one batch of statuses. Does not touch state.
    ///
    /// Fails only when the payload cannot be fetched or validated. A
    /// validated payload always yields its `current_date`, even when the
    /// latest homework cannot be turned into a notification.
    pub async fn poll_once(&self) -> Result<PollUpdate, PollError> {
        let request =
            StatusRequest::new(&self.config.endpoint, &self.config.token, self.state.cursor);
        let raw = remote::fetch_status(self.fetcher.as_ref(), &request).await?;

        tracing::debug!("Validating status response");
        let response = remote::validate_response(&raw)?;

        // Only the latest homework is reported; older ones in the same
        // window are skipped.
        let notification = response
            .homeworks
            .first()
            .map(remote::extract_notification)
            .transpose();

        Ok(PollUpdate {
            notification,
            items: response.homeworks.len(),
            current_date: response.current_date,
        })
    }

    /// Run one cycle and apply its effects to the state.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let update = match self.poll_once().await {
            Ok(update) => update,
            Err(error) => return self.report_failure(error).await,
        };

        tracing::debug!(
            items = update.items,
            from = self.state.cursor,
            to = update.current_date,
            "Advancing cursor"
        );
        self.state.cursor = update.current_date;

        match update.notification {
            Ok(Some(message)) => {
                let delivery = self
                    .state
                    .last_message
                    .maybe_notify(self.notifier.as_ref(), &message)
                    .await;
                CycleOutcome::StatusChange { message, delivery }
            }
            Ok(None) => {
                tracing::debug!("No homework status changes");
                CycleOutcome::Idle
            }
            Err(error) => self.report_failure(error).await,
        }
    }

    /// Log a failed cycle and offer the error notification to the channel.
    async fn report_failure(&mut self, error: PollError) -> CycleOutcome {
        let cursor = self.state.cursor;
        match error.kind() {
            PollErrorKind::Transport => {
                tracing::warn!(error = %error, cursor, "Status endpoint unreachable");
            }
            PollErrorKind::Protocol => {
                tracing::error!(
                    error = %error,
                    cursor,
                    "Status endpoint returned an unusable response"
                );
            }
            PollErrorKind::Data => {
                tracing::error!(error = %error, cursor, "Status response failed validation");
            }
        }

        let message = failure_message(&error);
        let delivery = self
            .state
            .last_message
            .maybe_notify(self.notifier.as_ref(), &message)
            .await;
        CycleOutcome::Failed { error, delivery }
    }

    /// Run cycles until `max_cycles` is reached, or forever when `None`.
    ///
    /// The retry period is slept after every cycle, including failed ones.
    pub async fn run_for(&mut self, max_cycles: Option<u64>) {
        tracing::info!(
            endpoint = %self.config.endpoint,
            channel = self.notifier.name(),
            retry_period = ?self.config.retry_period,
            cursor = self.state.cursor,
            "Starting poll loop"
        );

        let mut completed: u64 = 0;
        while max_cycles.is_none_or(|max| completed < max) {
            let outcome = self.run_cycle().await;
            completed += 1;
            tracing::debug!(
                cycle = completed,
                sent = outcome.sent(),
                failed = outcome.is_failure(),
                "Cycle finished"
            );

            self.clock.sleep(self.config.retry_period).await;
        }
    }

    /// Run until the process is terminated.
    pub async fn run(&mut self) {
        self.run_for(None).await;
    }
}

/// Operator-facing text for a failed cycle.
pub fn failure_message(error: &PollError) -> String {
    format!("Program failure: {error}")
}
