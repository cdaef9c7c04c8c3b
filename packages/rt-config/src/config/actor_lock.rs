use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// §4.4. `redundancy` is the subset size contacted per acquire/release;
/// quorum replica counts should be odd so a quorum is unambiguous — kept
/// as a runtime assertion rather than a type-level constraint.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ActorLockConfig {
	#[serde(default = "default_true")]
	pub enabled: bool,

	/// Application ids hosting a lock-replica actor.
	#[serde(default)]
	pub apps: Vec<String>,

	/// Number of replicas contacted per acquire/release. Should be odd.
	#[serde(default = "default_redundancy")]
	pub redundancy: usize,
}

impl Default for ActorLockConfig {
	fn default() -> Self {
		ActorLockConfig {
			enabled: true,
			apps: Vec::new(),
			redundancy: default_redundancy(),
		}
	}
}

fn default_true() -> bool {
	true
}

fn default_redundancy() -> usize {
	3
}
