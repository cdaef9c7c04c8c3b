use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::placement::Placement;
use crate::snapshot::{ActorInfo, RegistrySnapshot};

/// Upper bound on how long `obtain` holds a request open waiting for the
/// snapshot to change before replying with the (unchanged) current one
/// (§4.5 "bounded time").
const LONG_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// The distributed `type -> {hostingApps, placement}` map (§4.5), held
/// here as the single process-local source of truth a node's registry
/// client pushes into and polls from. Real multi-node fan-out is a
/// transport concern layered on top, the same way [`crate::placement`]
/// stays agnostic of how a push physically reached this node.
pub struct Registry {
	tx: watch::Sender<Arc<RegistrySnapshot>>,
}

impl Default for Registry {
	fn default() -> Self {
		Registry::new()
	}
}

impl Registry {
	pub fn new() -> Self {
		let (tx, _) = watch::channel(Arc::new(RegistrySnapshot::default()));
		Registry { tx }
	}

	pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
		self.tx.borrow().clone()
	}

	/// Records that `application` hosts `actor_type`, applying the §4.5
	/// version rule: a placement whose `version` is not lexicographically
	/// greater than the one on file is ignored (fields included), while
	/// the application is still added to the hosting set for any
	/// placement that isn't actively stale.
	pub fn push(&self, application: &str, actor_type: &str, placement: Placement) {
		self.tx.send_if_modified(|current| {
			let mut next = (**current).clone();
			let entry = next.actor_info.entry(actor_type.to_string()).or_default();

			let mut changed = false;
			if !entry.hosts(application) {
				entry.applications.push(application.to_string());
				changed = true;
			}
			if placement.supersedes(&entry.placement) {
				entry.placement = placement;
				changed = true;
			}

			if changed {
				next.nonce += 1;
				*current = Arc::new(next);
			}
			changed
		});
	}

	/// Drops `application` from every type's hosting set (e.g. on a
	/// graceful node shutdown), bumping the nonce if anything actually
	/// changed.
	pub fn withdraw(&self, application: &str) {
		self.tx.send_if_modified(|current| {
			let mut next = (**current).clone();
			let mut changed = false;
			for info in next.actor_info.values_mut() {
				let before = info.applications.len();
				info.applications.retain(|a| a != application);
				if info.applications.len() != before {
					changed = true;
				}
			}
			if changed {
				next.nonce += 1;
				*current = Arc::new(next);
			}
			changed
		});
	}

	/// Long-polls: if `nonce` already matches the current snapshot's
	/// nonce, waits (up to [`LONG_POLL_TIMEOUT`]) for a change before
	/// replying, so a client holding a current view doesn't spin. `None`
	/// nonce always returns immediately.
	pub async fn obtain(&self, actor_types: Option<&[String]>, nonce: Option<u64>) -> Arc<RegistrySnapshot> {
		let mut rx = self.tx.subscribe();
		if let Some(nonce) = nonce {
			if rx.borrow().nonce == nonce {
				let _ = tokio::time::timeout(LONG_POLL_TIMEOUT, rx.changed()).await;
			}
		}
		let current = rx.borrow().clone();
		match actor_types {
			None => current,
			Some(types) => Arc::new(current.filtered(Some(types))),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn placement(version: &str) -> Placement {
		Placement {
			version: version.to_string(),
			bind_idx: None,
			sticky: false,
		}
	}

	#[tokio::test]
	async fn push_then_obtain_sees_hosting_app() {
		let registry = Registry::new();
		registry.push("app-1", "Counter", placement("0001"));

		let snapshot = registry.obtain(None, None).await;
		let info = snapshot.actor_info.get("Counter").unwrap();
		assert_eq!(info.applications, vec!["app-1".to_string()]);
	}

	#[tokio::test]
	async fn stale_version_push_does_not_replace_placement() {
		let registry = Registry::new();
		registry.push("app-1", "Counter", placement("0005"));
		registry.push("app-1", "Counter", placement("0001"));

		let snapshot = registry.obtain(None, None).await;
		assert_eq!(snapshot.actor_info.get("Counter").unwrap().placement.version, "0005");
	}

	#[tokio::test]
	async fn obtain_with_current_nonce_blocks_until_change_or_timeout() {
		let registry = Arc::new(Registry::new());
		registry.push("app-1", "Counter", placement("0001"));
		let nonce = registry.snapshot().nonce;

		let registry2 = registry.clone();
		let waiter = tokio::spawn(async move { registry2.obtain(None, Some(nonce)).await });

		tokio::time::sleep(Duration::from_millis(10)).await;
		registry.push("app-2", "Counter", placement("0001"));

		let snapshot = waiter.await.unwrap();
		assert_eq!(snapshot.nonce, nonce + 1);
	}

	#[tokio::test]
	async fn withdraw_removes_application_from_hosting_set() {
		let registry = Registry::new();
		registry.push("app-1", "Counter", placement("0001"));
		registry.withdraw("app-1");

		let snapshot = registry.obtain(None, None).await;
		assert!(snapshot.actor_info.get("Counter").unwrap().applications.is_empty());
	}

	#[tokio::test]
	async fn filtered_snapshot_keeps_only_requested_types() {
		let registry = Registry::new();
		registry.push("app-1", "Counter", placement("0001"));
		registry.push("app-1", "Widget", placement("0001"));

		let snapshot = registry.obtain(Some(&["Counter".to_string()]), None).await;
		assert!(snapshot.actor_info.contains_key("Counter"));
		assert!(!snapshot.actor_info.contains_key("Widget"));
	}
}
