//! Telegram Bot API channel.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::channels::Notifier;
use crate::error::ChannelError;

/// Telegram rejects messages longer than this many characters.
const MAX_MESSAGE_CHARS: usize = 4096;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends notifications to a single Telegram chat.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: SecretString,
    chat_id: String,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    /// Create a notifier for `chat_id` using the bot `token`.
    ///
    /// `api_base` is normally `https://api.telegram.org`.
    pub fn new(
        api_base: impl Into<String>,
        token: SecretString,
        chat_id: impl Into<String>,
    ) -> Result<Self, ChannelError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| delivery_failed(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
            chat_id: chat_id.into(),
        })
    }

    async fn send_chunk(&self, text: &str) -> Result<(), ChannelError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base,
            self.token.expose_secret()
        );
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
        };

        // reqwest errors carry the request URL, which embeds the bot token.
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                delivery_failed(format!("sendMessage request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        let body: BotApiResponse = response.json().await.map_err(|e| {
            delivery_failed(format!(
                "sendMessage returned unreadable body (HTTP {status}): {}",
                e.without_url()
            ))
        })?;

        if !body.ok {
            return Err(delivery_failed(
                body.description
                    .unwrap_or_else(|| format!("sendMessage failed with HTTP {status}")),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    /// Long texts go out as several consecutive messages. Parts are not
    /// rolled back: if a later part fails, the error says how many parts
    /// were already delivered, and a retry of the same text sends them again.
    async fn notify(&self, text: &str) -> Result<(), ChannelError> {
        let chunks = split_message(text, MAX_MESSAGE_CHARS);
        let total = chunks.len();
        for (sent, chunk) in chunks.iter().enumerate() {
            if let Err(err) = self.send_chunk(chunk).await {
                return Err(partial_delivery(err, sent, total));
            }
        }
        tracing::debug!(chat_id = %self.chat_id, "Telegram message sent");
        Ok(())
    }
}

fn delivery_failed(reason: String) -> ChannelError {
    ChannelError::DeliveryFailed {
        channel: "telegram".to_string(),
        reason,
    }
}

/// Mark a failure that happened after `sent` of `total` parts went out.
fn partial_delivery(err: ChannelError, sent: usize, total: usize) -> ChannelError {
    if sent == 0 {
        return err;
    }
    let ChannelError::DeliveryFailed { channel, reason } = err;
    ChannelError::DeliveryFailed {
        channel,
        reason: format!("partial delivery, {sent} of {total} parts sent: {reason}"),
    }
}

/// Split `text` into pieces of at most `max_chars` characters.
fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
