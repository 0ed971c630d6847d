//! Error types for the notifier.

/// Startup configuration errors. All of these are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error("Invalid URL for {name}: {reason}")]
    InvalidUrl { name: &'static str, reason: String },

    #[error("Retry period must be at least one second")]
    InvalidRetryPeriod,
}

/// Raw failure reported by a fetch transport before any response arrived.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Errors raised while running a single poll cycle.
///
/// None of these terminate the process; the cycle handler turns each one
/// into a log entry and an error notification.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PollError {
    #[error("Status endpoint unavailable: {0}")]
    EndpointUnavailable(TransportError),

    #[error("Unexpected response code {code} ({reason})")]
    InvalidResponseCode { code: u16, reason: String },

    #[error("Response body is not valid JSON: {0}")]
    MalformedResponseBody(String),

    #[error("Response is not a JSON object")]
    NotAMapping,

    #[error("Response has no \"{0}\" key")]
    MissingKey(&'static str),

    #[error("Response has no \"current_date\" key")]
    MissingCursorKey,

    #[error("\"current_date\" is not an integer: {0}")]
    CursorNotInteger(String),

    #[error("\"homeworks\" is not a list")]
    HomeworksNotASequence,

    #[error("Homework has no \"{0}\" field")]
    MissingField(&'static str),

    #[error("Unknown homework status: {0}")]
    UnknownStatus(String),
}

/// Coarse classification of a [`PollError`], used to pick the log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollErrorKind {
    /// The endpoint could not be reached at all.
    Transport,
    /// The endpoint answered, but not with a usable HTTP/JSON payload.
    Protocol,
    /// The payload parsed but does not have the documented shape.
    Data,
}

impl PollError {
    pub fn kind(&self) -> PollErrorKind {
        match self {
            Self::EndpointUnavailable(_) => PollErrorKind::Transport,
            Self::InvalidResponseCode { .. } | Self::MalformedResponseBody(_) => {
                PollErrorKind::Protocol
            }
            Self::NotAMapping
            | Self::MissingKey(_)
            | Self::MissingCursorKey
            | Self::CursorNotInteger(_)
            | Self::HomeworksNotASequence
            | Self::MissingField(_)
            | Self::UnknownStatus(_) => PollErrorKind::Data,
        }
    }
}

/// Notification channel errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChannelError {
    #[error("Notification delivery via {channel} failed: {reason}")]
    DeliveryFailed { channel: String, reason: String },
}
