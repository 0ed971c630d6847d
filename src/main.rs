use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use review_notifier::channels::TelegramNotifier;
use review_notifier::config::{Cli, Config};
use review_notifier::poller::{Poller, PollerConfig, SystemClock};
use review_notifier::remote::HttpFetcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the variables may come from the environment.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting review notifier");

    let config = Config::from_cli(cli)?;
    let credentials = config.credentials;

    let fetcher = Arc::new(HttpFetcher::new()?);
    let notifier = Arc::new(TelegramNotifier::new(
        config.telegram_api_url,
        credentials.telegram_token,
        credentials.telegram_chat_id,
    )?);

    let mut poller = Poller::new(
        PollerConfig {
            endpoint: config.endpoint,
            token: credentials.practicum_token,
            retry_period: config.retry_period,
            dedup_policy: config.dedup_policy,
        },
        fetcher,
        notifier,
        Arc::new(SystemClock),
    );

    poller.run().await;
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("review_notifier=info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
