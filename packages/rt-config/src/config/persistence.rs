use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// §4.7 routing tables. `specifier`/`compartment` are globs matched in
/// declaration order, first match wins; `compartment` may reference the
/// glob's wildcard captures as `${*}`/`${**}` (see `persistence::routing`
/// for the matcher).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CompartmentRoute {
	pub specifier: String,
	pub compartment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct HandlerRoute {
	pub compartment: String,
	pub actor_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PersistenceConfig {
	#[serde(default = "default_true")]
	pub enabled: bool,

	#[serde(default)]
	pub specifiers: Vec<CompartmentRoute>,

	#[serde(default)]
	pub handlers: Vec<HandlerRoute>,
}

impl Default for PersistenceConfig {
	fn default() -> Self {
		PersistenceConfig {
			enabled: true,
			specifiers: Vec::new(),
			handlers: Vec::new(),
		}
	}
}

fn default_true() -> bool {
	true
}
