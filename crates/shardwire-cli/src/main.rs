//! Demo binary: loads a [`config::ProxyConfig`], wires up tracing, and runs
//! the [`listener`] long enough to prove the protocol crate frames real
//! traffic. The consistent-hashing router and multi-shard fan-out this
//! binary would eventually drive stay out of scope.

mod config;
mod listener;

use std::env;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use config::ProxyConfig;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = env::args().nth(1).unwrap_or_else(|| "shardwire.toml".to_string());

    let config = match ProxyConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(%e, path = %config_path, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!(%e, "invalid configuration");
        return ExitCode::FAILURE;
    }

    if let Err(e) = listener::serve(config).await {
        tracing::error!(%e, "listener exited with an error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
