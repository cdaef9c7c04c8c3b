use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The transport's wire format is out of scope (§1); this config only
/// names which provider(s) are active so a node can be built against a
/// concrete `Transport` implementation at startup.
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MessagingConfig {
	#[serde(default)]
	pub providers: Vec<String>,
}
