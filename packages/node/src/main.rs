mod builder;
mod transport;

use anyhow::Result;
use clap::Parser;
use rt_runtime::{init_tracing_subscriber, Cli, TermSignal};

use builder::NodeBuilder;

/// §6 "CLI surface": parses `--config`/`--app-id`/`--runtime-apps`, boots
/// the node, and blocks until a termination signal arrives. Exit code 0
/// on a graceful stop; a returned `Err` prints its chain and exits
/// non-zero.
#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	let config = cli.load_config()?;

	init_tracing_subscriber();
	tracing::info!(app_id = %config.app_id, runtime_apps = ?config.runtime_apps, "starting node");

	let node = NodeBuilder::new(config).build();
	tracing::info!(app_id = %node.app_id(), "node ready");

	let mut term_signal = TermSignal::new().await;
	let force_close = term_signal.recv().await;
	if force_close {
		tracing::warn!("shutdown forced before graceful drain completed");
		return Ok(());
	}

	tracing::info!("shutting down gracefully");
	node.shutdown().await;
	tracing::debug!(metric_lines = rt_metrics::gather().lines().count(), "final metrics snapshot");

	Ok(())
}
