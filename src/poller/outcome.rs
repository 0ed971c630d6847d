//! Result of a single poll cycle.

use crate::error::PollError;
use crate::poller::dedup::Delivery;

/// What one cycle did.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// The endpoint reported no new homework.
    Idle,

    /// The latest homework status was offered to the channel.
    StatusChange {
        /// Notification text.
        message: String,
        /// What the dedup layer did with it.
        delivery: Delivery,
    },

    /// The cycle failed; an error notification was offered instead.
    Failed {
        /// The failure.
        error: PollError,
        /// What the dedup layer did with the error notification.
        delivery: Delivery,
    },
}

impl CycleOutcome {
    /// Whether the notifier accepted a message this cycle.
    pub fn sent(&self) -> bool {
        match self {
            Self::Idle => false,
            Self::StatusChange { delivery, .. } | Self::Failed { delivery, .. } => {
                matches!(delivery, Delivery::Sent)
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn error(&self) -> Option<&PollError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}
