//! Duplicate suppression for outgoing notifications.

use crate::channels::Notifier;
use crate::error::ChannelError;

/// When a notification counts as "already sent" for deduplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DedupPolicy {
    /// Remember the text as soon as delivery was attempted, even if it
    /// failed. A failing message is attempted once, then suppressed until
    /// the text changes.
    #[default]
    OnAttempt,
    /// Remember the text only after confirmed delivery. A failing message
    /// is attempted again on every cycle.
    OnDelivery,
}

/// Result of offering a candidate text to [`LastMessage::maybe_notify`].
#[derive(Debug, Clone)]
pub enum Delivery {
    /// The notifier accepted the text.
    Sent,
    /// The text equals the last message; the notifier was not called.
    Duplicate,
    /// The notifier was called and failed.
    Failed(ChannelError),
}

impl Delivery {
    /// Whether the notifier was invoked.
    pub fn attempted(&self) -> bool {
        !matches!(self, Self::Duplicate)
    }
}

/// The most recent notification text handed to the notifier.
#[derive(Debug, Clone, Default)]
pub struct LastMessage {
    text: String,
    policy: DedupPolicy,
}

impl LastMessage {
    pub fn new(policy: DedupPolicy) -> Self {
        Self {
            text: String::new(),
            policy,
        }
    }

    /// Start from a known previous message.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Send `candidate` unless it repeats the last message.
    ///
    /// Delivery failures are logged and returned, never propagated as
    /// errors, and never retried within the call.
    pub async fn maybe_notify(&mut self, notifier: &dyn Notifier, candidate: &str) -> Delivery {
        if candidate == self.text {
            tracing::debug!("Notification unchanged, not sending");
            return Delivery::Duplicate;
        }

        match notifier.notify(candidate).await {
            Ok(()) => {
                tracing::info!(channel = notifier.name(), text = candidate, "Notification sent");
                self.text = candidate.to_string();
                Delivery::Sent
            }
            Err(err) => {
                tracing::error!(
                    channel = notifier.name(),
                    error = %err,
                    "Failed to send notification"
                );
                if self.policy == DedupPolicy::OnAttempt {
                    self.text = candidate.to_string();
                }
                Delivery::Failed(err)
            }
        }
    }
}
