//! Homework review notifier.
//!
//! Polls a homework status endpoint on a fixed interval and reports status
//! changes, and its own failures, to a Telegram chat. Identical consecutive
//! notifications are suppressed.

pub mod channels;
pub mod config;
pub mod error;
pub mod poller;
pub mod remote;
