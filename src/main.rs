//! Catalog Server - app registry with versioned multi-platform releases
//!
//! Architecture:
//! - Flat JSON registry behind a swappable repository
//! - Axum for the HTTP API, uploads served statically
//! - Plugins supervised on the Tokio runtime

mod entity;
mod error;
mod plugins;
mod prelude;
mod state;
mod store;
mod sv;
mod utils;

use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{
  plugins::{App, janitor::Janitor, server},
  prelude::*,
  state::{AppState, Config},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "catalog=debug,tower_http=debug,axum=info".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::from_env()?;

  info!("Starting Catalog Server v{}", env!("CARGO_PKG_VERSION"));
  info!(
    "Uploads in {}, public at {}/uploads",
    config.uploads_directory.display(),
    config.public_url
  );

  let app = Arc::new(AppState::new(config).await?);

  App::new().register(server::Plugin).register(Janitor).run(app);

  tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
  info!("Shutting down");

  Ok(())
}
