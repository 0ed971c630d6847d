//! Notification channels.
//!
//! A channel delivers one text message to a fixed destination. The poller
//! does not retry failed deliveries; it only reports them.

mod telegram;

pub use telegram::TelegramNotifier;

use async_trait::async_trait;

use crate::error::ChannelError;

/// Delivery capability for notification text.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name, used in logs and errors.
    fn name(&self) -> &str;

    /// Deliver `text` to the configured destination.
    async fn notify(&self, text: &str) -> Result<(), ChannelError>;
}
