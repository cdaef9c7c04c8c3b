use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

/// `{id, holder, acquireId, expiresAt}` (§3 "Lock lease").
#[derive(Debug, Clone)]
struct Lease {
	holder: String,
	acquire_id: String,
	expires_at: Instant,
}

impl Lease {
	fn is_live(&self) -> bool {
		Instant::now() < self.expires_at
	}
}

/// Outcome of an `acquire` call against one replica (§4.4 step 3).
#[derive(Debug, Clone)]
pub enum AcquireReply {
	Granted { ttl: Duration },
	Denied { holder: String },
}

/// A single lock-replica application's state: an in-memory lease map `id
/// -> lease` (§4.4). Every client addresses replicas directly through
/// this trait; the real transport hop (if the replica lives on a
/// different node) is someone else's concern — a `LockReplica`
/// implementation that proxies over the network is just as valid as this
/// in-memory one.
#[async_trait]
pub trait LockReplica: Send + Sync {
	async fn acquire(&self, id: &[String], requester: &str, ttl: Duration, acquire_id: &str) -> AcquireReply;
	async fn release(&self, id: &[String], requester: &str, acquire_id: Option<&str>);
	async fn get_holders(&self, id: &[String]) -> Vec<String>;
}

/// Reference [`LockReplica`] implementation: a process-local lease map
/// guarded by a mutex, matching the "in-memory lease map" the
/// specification describes as the replica's entire state. The map is
/// `Arc`-wrapped so a granted lease can schedule its own cleanup task
/// (§4.4 step 3) without the replica itself needing to be `Arc`-held.
#[derive(Default)]
pub struct InMemoryLockReplica {
	leases: Arc<Mutex<HashMap<String, Lease>>>,
}

fn key_of(id: &[String]) -> String {
	id.join("\u{0}")
}

impl InMemoryLockReplica {
	pub fn new() -> Self {
		InMemoryLockReplica::default()
	}

	/// §4.4 step 3: "Granting sets `expiresAt = now + ttl` and schedules a
	/// local cleanup at `2*ttl`." Bounds the lease map's size against
	/// holders that never refresh or release; only removes the entry if it
	/// still belongs to this `acquire_id`, so a lease that was refreshed or
	/// re-granted in the meantime is left alone.
	fn schedule_cleanup(&self, key: String, acquire_id: String, ttl: Duration) {
		let leases = self.leases.clone();
		tokio::spawn(async move {
			tokio::time::sleep(ttl * 2).await;
			let mut leases = leases.lock().unwrap();
			if let Some(existing) = leases.get(&key) {
				if existing.acquire_id == acquire_id {
					leases.remove(&key);
				}
			}
		});
	}

	#[cfg(test)]
	fn lease_count(&self) -> usize {
		self.leases.lock().unwrap().len()
	}
}

#[async_trait]
impl LockReplica for InMemoryLockReplica {
	async fn acquire(&self, id: &[String], requester: &str, ttl: Duration, acquire_id: &str) -> AcquireReply {
		let key = key_of(id);
		let mut leases = self.leases.lock().unwrap();

		let grant = match leases.get(&key) {
			None => true,
			Some(existing) if !existing.is_live() => true,
			Some(existing) if existing.holder == requester => true,
			Some(existing) => {
				return AcquireReply::Denied {
					holder: existing.holder.clone(),
				};
			}
		};

		if grant {
			leases.insert(
				key.clone(),
				Lease {
					holder: requester.to_string(),
					acquire_id: acquire_id.to_string(),
					expires_at: Instant::now() + ttl,
				},
			);
			drop(leases);
			self.schedule_cleanup(key, acquire_id.to_string(), ttl);
		}
		AcquireReply::Granted { ttl }
	}

	async fn release(&self, id: &[String], requester: &str, acquire_id: Option<&str>) {
		let key = key_of(id);
		let mut leases = self.leases.lock().unwrap();
		if let Some(existing) = leases.get(&key) {
			let acquire_matches = match acquire_id {
				Some(a) => a == existing.acquire_id,
				None => true,
			};
			if existing.holder == requester && acquire_matches {
				leases.remove(&key);
			}
		}
	}

	async fn get_holders(&self, id: &[String]) -> Vec<String> {
		let key = key_of(id);
		let leases = self.leases.lock().unwrap();
		match leases.get(&key) {
			Some(lease) if lease.is_live() => vec![lease.holder.clone()],
			_ => Vec::new(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn grants_when_absent_then_denies_other_holder() {
		let replica = InMemoryLockReplica::new();
		let id = vec!["Counter".to_string(), "1".to_string()];

		let first = replica.acquire(&id, "node-a", Duration::from_secs(10), "acq-1").await;
		assert!(matches!(first, AcquireReply::Granted { .. }));

		let second = replica.acquire(&id, "node-b", Duration::from_secs(10), "acq-2").await;
		assert!(matches!(second, AcquireReply::Denied { holder } if holder == "node-a"));
	}

	#[tokio::test]
	async fn same_holder_reacquires() {
		let replica = InMemoryLockReplica::new();
		let id = vec!["Counter".to_string(), "1".to_string()];
		replica.acquire(&id, "node-a", Duration::from_secs(10), "acq-1").await;
		let reacquire = replica.acquire(&id, "node-a", Duration::from_secs(10), "acq-2").await;
		assert!(matches!(reacquire, AcquireReply::Granted { .. }));
	}

	#[tokio::test]
	async fn mismatched_release_is_noop() {
		let replica = InMemoryLockReplica::new();
		let id = vec!["Counter".to_string(), "1".to_string()];
		replica.acquire(&id, "node-a", Duration::from_secs(10), "acq-1").await;

		replica.release(&id, "node-a", Some("wrong-acquire-id")).await;
		assert_eq!(replica.get_holders(&id).await, vec!["node-a".to_string()]);

		replica.release(&id, "node-a", Some("acq-1")).await;
		assert!(replica.get_holders(&id).await.is_empty());
	}

	#[tokio::test(start_paused = true)]
	async fn expired_lease_is_reacquirable_by_anyone() {
		let replica = InMemoryLockReplica::new();
		let id = vec!["Counter".to_string(), "1".to_string()];
		replica.acquire(&id, "node-a", Duration::from_millis(10), "acq-1").await;

		tokio::time::advance(Duration::from_millis(20)).await;

		let reacquire = replica.acquire(&id, "node-b", Duration::from_secs(10), "acq-2").await;
		assert!(matches!(reacquire, AcquireReply::Granted { .. }));
	}

	#[tokio::test(start_paused = true)]
	async fn unrefreshed_lease_is_swept_from_the_map_after_two_ttls() {
		let replica = InMemoryLockReplica::new();
		let id = vec!["Counter".to_string(), "1".to_string()];
		replica.acquire(&id, "node-a", Duration::from_millis(10), "acq-1").await;
		assert_eq!(replica.lease_count(), 1);

		tokio::time::advance(Duration::from_millis(21)).await;
		for _ in 0..3 {
			tokio::task::yield_now().await;
		}

		assert_eq!(replica.lease_count(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn reacquired_lease_survives_the_earlier_acquires_cleanup() {
		let replica = InMemoryLockReplica::new();
		let id = vec!["Counter".to_string(), "1".to_string()];
		replica.acquire(&id, "node-a", Duration::from_millis(10), "acq-1").await;

		// A fresh acquire_id supersedes the first grant before its cleanup
		// fires; that cleanup must not remove the still-live lease.
		tokio::time::advance(Duration::from_millis(5)).await;
		replica.acquire(&id, "node-a", Duration::from_millis(10), "acq-2").await;

		tokio::time::advance(Duration::from_millis(16)).await;
		for _ in 0..3 {
			tokio::task::yield_now().await;
		}

		assert_eq!(replica.lease_count(), 1);
	}
}
