use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// §4.5.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ActorRegistryConfig {
	#[serde(default = "default_true")]
	pub enabled: bool,

	/// Application ids eligible to host the registry actor itself. Empty
	/// means "this node".
	#[serde(default)]
	pub apps: Vec<String>,
}

impl Default for ActorRegistryConfig {
	fn default() -> Self {
		ActorRegistryConfig {
			enabled: true,
			apps: Vec::new(),
		}
	}
}

fn default_true() -> bool {
	true
}
