mod actor_lock;
mod actor_registry;
mod messaging;
mod persistence;
mod runtime;

pub use actor_lock::ActorLockConfig;
pub use actor_registry::ActorRegistryConfig;
pub use messaging::MessagingConfig;
pub use persistence::{CompartmentRoute, HandlerRoute, PersistenceConfig};
pub use runtime::RuntimeConfig;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Root configuration document (§6 "Config schema"). One of these per
/// process; loaded once at startup via [`crate::Config::load`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Config {
	/// This node's stable application id. Defaults to the `DARLEAN_APP_ID`
	/// environment variable via `rt-env` when the CLI doesn't override it.
	pub app_id: String,

	/// Bootstrap peers used to join the cluster and discover the registry.
	#[serde(default)]
	pub runtime_apps: Vec<String>,

	#[serde(default)]
	pub runtime: RuntimeConfig,

	#[serde(default)]
	pub messaging: MessagingConfig,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			app_id: "local".to_string(),
			runtime_apps: Vec::new(),
			runtime: RuntimeConfig::default(),
			messaging: MessagingConfig::default(),
		}
	}
}
