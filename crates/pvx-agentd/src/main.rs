mod app;
mod cli;
mod config;

use clap::Parser;
use tracing::{debug, info};

use pvx_observe::init_logger;

use crate::{app::App, cli::Cli, config::AgentConfig};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1) config + logger
    let cfg = AgentConfig::load(cli.config.as_deref())?;
    init_logger(&cfg.logger)?;
    info!(command = ?cli.command, "pvx-agentd starting");
    debug!(?cfg, "configuration resolved");

    // 2) runtime, lease store, metrics
    let app = App::build(cfg).await?;

    // 3) command
    let result = app.run(cli.command).await;

    if cli.metrics {
        print!("{}", app.metrics_text()?);
    }
    result
}
