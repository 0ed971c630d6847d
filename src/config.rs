//! Startup configuration and the credential gate.
//!
//! Values come from command-line flags or the environment (a `.env` file is
//! loaded by `main` before parsing). Credentials are checked once, before the
//! poll loop starts; a missing credential is fatal.

use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;

use crate::error::ConfigError;
use crate::poller::DedupPolicy;

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_RETRY_PERIOD_SECS: u64 = 600;

const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Command-line interface.
#[derive(Debug, Parser)]
#[command(name = "review-notifier", version, about)]
pub struct Cli {
    /// OAuth token for the homework status API.
    #[arg(long, env = "PRACTICUM_TOKEN", hide_env_values = true)]
    pub practicum_token: Option<String>,

    /// Telegram bot token.
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Chat that receives notifications.
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    /// Homework status endpoint.
    #[arg(long, env = "HOMEWORK_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Base URL of the Telegram Bot API.
    #[arg(long, env = "TELEGRAM_API_URL", default_value = DEFAULT_TELEGRAM_API_URL)]
    pub telegram_api_url: String,

    /// Seconds to wait between poll cycles.
    #[arg(long, env = "RETRY_PERIOD_SECS", default_value_t = DEFAULT_RETRY_PERIOD_SECS)]
    pub retry_period_secs: u64,

    /// Only remember a notification as sent once delivery is confirmed.
    #[arg(long, env = "DEDUP_ON_DELIVERY")]
    pub dedup_on_delivery: bool,

    /// Emit logs as JSON lines.
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

/// Credentials as read from the environment, before validation.
#[derive(Debug, Default, Clone)]
pub struct RawCredentials {
    pub practicum_token: Option<String>,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

/// Validated credentials. Every field is known to be non-empty.
#[derive(Debug)]
pub struct Credentials {
    pub practicum_token: SecretString,
    pub telegram_token: SecretString,
    pub telegram_chat_id: String,
}

/// Check that all three credentials are present.
///
/// Every missing credential is logged on its own, then a single error naming
/// all of them is returned.
pub fn check_credentials(raw: RawCredentials) -> Result<Credentials, ConfigError> {
    tracing::info!("Checking credentials");

    let present = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let practicum_token = present(&raw.practicum_token);
    let telegram_token = present(&raw.telegram_token);
    let telegram_chat_id = present(&raw.telegram_chat_id);

    let missing: Vec<&'static str> = [
        (PRACTICUM_TOKEN, practicum_token.is_none()),
        (TELEGRAM_TOKEN, telegram_token.is_none()),
        (TELEGRAM_CHAT_ID, telegram_chat_id.is_none()),
    ]
    .into_iter()
    .filter(|(_, absent)| *absent)
    .map(|(name, _)| name)
    .collect();

    for name in &missing {
        tracing::error!(variable = *name, "Missing required environment variable");
    }

    match (practicum_token, telegram_token, telegram_chat_id) {
        (Some(practicum_token), Some(telegram_token), Some(telegram_chat_id)) => Ok(Credentials {
            practicum_token: SecretString::from(practicum_token),
            telegram_token: SecretString::from(telegram_token),
            telegram_chat_id,
        }),
        _ => Err(ConfigError::MissingCredentials(missing)),
    }
}

/// Fully validated runtime configuration.
#[derive(Debug)]
pub struct Config {
    pub credentials: Credentials,
    pub endpoint: String,
    pub telegram_api_url: String,
    pub retry_period: Duration,
    pub dedup_policy: DedupPolicy,
}

impl Config {
    /// Validate parsed command-line values.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let credentials = check_credentials(RawCredentials {
            practicum_token: cli.practicum_token,
            telegram_token: cli.telegram_token,
            telegram_chat_id: cli.telegram_chat_id,
        })?;

        validate_url("HOMEWORK_ENDPOINT", &cli.endpoint)?;
        validate_url("TELEGRAM_API_URL", &cli.telegram_api_url)?;

        if cli.retry_period_secs == 0 {
            return Err(ConfigError::InvalidRetryPeriod);
        }

        let dedup_policy = if cli.dedup_on_delivery {
            DedupPolicy::OnDelivery
        } else {
            DedupPolicy::OnAttempt
        };

        Ok(Self {
            credentials,
            endpoint: cli.endpoint,
            telegram_api_url: cli.telegram_api_url.trim_end_matches('/').to_string(),
            retry_period: Duration::from_secs(cli.retry_period_secs),
            dedup_policy,
        })
    }
}

fn validate_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        name,
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            name,
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
