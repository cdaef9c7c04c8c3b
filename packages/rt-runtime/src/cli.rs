use anyhow::{Context, Result};
use clap::Parser;
use rt_config::Config;

/// §6 "CLI surface (minimal)".
#[derive(Debug, Parser)]
#[command(name = "darlean-node", about = "Darlean actor runtime node")]
pub struct Cli {
	/// Path to a JSON config document.
	#[arg(long, env = "DARLEAN_CONFIG")]
	pub config: Option<String>,

	/// Overrides `config.app_id`.
	#[arg(long = "app-id", env = "DARLEAN_APP_ID")]
	pub app_id: Option<String>,

	/// Comma-separated bootstrap runtime peers; overrides
	/// `config.runtime_apps`.
	#[arg(long = "runtime-apps", value_delimiter = ',')]
	pub runtime_apps: Option<Vec<String>>,
}

impl Cli {
	/// Loads config from `--config` (or defaults), then applies `--app-id`
	/// / `--runtime-apps` overrides on top — CLI flags always win over
	/// environment and file config.
	pub fn load_config(&self) -> Result<Config> {
		let mut config = match &self.config {
			Some(path) => Config::load(path).with_context(|| format!("loading config from {path}"))?,
			None => Config::default(),
		};

		if let Some(app_id) = &self.app_id {
			config.app_id = app_id.clone();
		} else if let Some(app_id) = rt_env::app_id() {
			config.app_id = app_id.to_string();
		}

		if let Some(runtime_apps) = &self.runtime_apps {
			config.runtime_apps = runtime_apps.clone();
		}

		Ok(config)
	}
}
