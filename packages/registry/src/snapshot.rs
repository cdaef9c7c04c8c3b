use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::placement::Placement;

/// Per-type entry: which applications currently host it, and the
/// placement rule governing how callers should pick among them (§3
/// "Registry snapshot").
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ActorInfo {
	pub applications: Vec<String>,
	pub placement: Placement,
}

impl ActorInfo {
	pub fn hosts(&self, application: &str) -> bool {
		self.applications.iter().any(|a| a == application)
	}
}

/// `{nonce, actorInfo: type -> {applications, placement}}` (§3). The
/// nonce increments on every content-changing push so `obtain` callers
/// can tell a stale snapshot from a current one without comparing the
/// whole map.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegistrySnapshot {
	pub nonce: u64,
	pub actor_info: HashMap<String, ActorInfo>,
}

impl RegistrySnapshot {
	/// Restricted to the requested types, preserving the snapshot's
	/// nonce (the nonce describes the whole registry, not the filtered
	/// view returned to one caller).
	pub fn filtered(&self, actor_types: Option<&[String]>) -> RegistrySnapshot {
		match actor_types {
			None => self.clone(),
			Some(types) => {
				let actor_info = self
					.actor_info
					.iter()
					.filter(|(k, _)| types.iter().any(|t| t == *k))
					.map(|(k, v)| (k.clone(), v.clone()))
					.collect();
				RegistrySnapshot {
					nonce: self.nonce,
					actor_info,
				}
			}
		}
	}
}
