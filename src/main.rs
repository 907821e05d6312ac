use tracing_subscriber::EnvFilter;

mod app;
mod game;
mod protocol;
mod runtime;
mod shared;
mod transport;

use app::config::PeerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = PeerConfig::from_env()?;
  tracing::info!(
    peer_id = %config.peer_id,
    advertise_url = %config.advertise_url,
    bootstrap = config.bootstrap_urls.len(),
    mode = ?config.start_mode,
    "starting peer"
  );

  runtime::run_peer(config).await
}
