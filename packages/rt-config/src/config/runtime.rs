use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ActorLockConfig, ActorRegistryConfig, PersistenceConfig};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
	#[serde(default = "default_true")]
	pub enabled: bool,

	#[serde(default)]
	pub actor_lock: ActorLockConfig,

	#[serde(default)]
	pub actor_registry: ActorRegistryConfig,

	#[serde(default)]
	pub persistence: PersistenceConfig,
}

impl Default for RuntimeConfig {
	fn default() -> Self {
		RuntimeConfig {
			enabled: true,
			actor_lock: ActorLockConfig::default(),
			actor_registry: ActorRegistryConfig::default(),
			persistence: PersistenceConfig::default(),
		}
	}
}

fn default_true() -> bool {
	true
}
