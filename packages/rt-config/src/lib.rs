//! Typed, schema-validated process configuration (§4.0b / §6). One
//! `#[serde(deny_unknown_fields)]`, `JsonSchema`-derived struct per
//! concern, composed into a single root `Config`.

pub mod config;

pub use config::Config;

use anyhow::{Context, Result};
use std::path::Path;

impl Config {
	/// Loads a config document (JSON) from disk and merges it over
	/// [`Config::default`]. Unknown fields are a hard error — a typo in a
	/// config file should fail startup, not silently no-op.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let raw = std::fs::read_to_string(path)
			.with_context(|| format!("failed reading config file at {}", path.display()))?;
		Self::parse(&raw)
	}

	pub fn parse(raw: &str) -> Result<Self> {
		serde_json::from_str(raw).context("failed parsing config document")
	}

	pub fn to_json_schema() -> schemars::schema::RootSchema {
		schemars::schema_for!(Config)
	}
}
