use anyhow::Result;
use battery_cost::{config::Config, server};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

/// Execute the serve command
///
/// Blocks until a shutdown signal is received.
pub async fn execute(cfg: Config, config_path: PathBuf) -> Result<()> {
    println!(
        "{} {}:{}",
        "Starting battery cost service on".green(),
        cfg.server.host,
        cfg.server.port
    );
    info!(config = %config_path.display(), "Starting battery cost service");

    server::start_server(cfg, config_path).await
}
