mod commands;
mod config;
mod error;
mod gateway;
mod link;
mod reply;
mod spotify;
mod state;
mod types;

#[cfg(test)]
mod testing;

use anyhow::Context;
use std::sync::Arc;

use crate::commands::Dispatcher;
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    log::info!("Starting spotcord");

    match dotenvy::dotenv() {
        Ok(path) => log::info!("Loaded .env from {}", path.display()),
        Err(e) => log::debug!("No .env file loaded: {}", e),
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return Err(e).context("Invalid configuration");
        }
    };

    // Created empty; the device id is filled in once Spotify is reachable
    let state = state::create_state();
    let dispatcher = Arc::new(Dispatcher::new(state));

    gateway::run(config, dispatcher).await
}
