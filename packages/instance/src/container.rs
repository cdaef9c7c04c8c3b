use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use rt_error::{ActionError, FrameworkError};
use tokio::sync::Mutex;

use crate::actor::ActorTypeDescriptor;
use crate::metrics;
use crate::wrapper::InstanceWrapper;

struct Entry {
	wrapper: Arc<InstanceWrapper>,
	created_at: Instant,
	last_used_at: Instant,
	evicting: bool,
}

/// Per-type map `id -> wrapper` with optional capacity-LRU and max-age
/// eviction (§4.2). `id` is joined with `/` as the map key — actor ids are
/// short sequences of string parts and this keeps the container free of a
/// second codec dependency.
pub struct InstanceContainer {
	descriptor: ActorTypeDescriptor,
	capacity: Option<usize>,
	max_age: Option<Duration>,
	entries: Mutex<HashMap<String, Entry>>,
}

fn key_of(id: &[String]) -> String {
	id.join("/")
}

impl InstanceContainer {
	pub fn new(descriptor: ActorTypeDescriptor) -> Self {
		InstanceContainer {
			descriptor,
			capacity: None,
			max_age: None,
			entries: Mutex::new(HashMap::new()),
		}
	}

	pub fn with_capacity(mut self, capacity: usize) -> Self {
		self.capacity = Some(capacity);
		self
	}

	pub fn with_max_age(mut self, max_age: Duration) -> Self {
		self.max_age = Some(max_age);
		self
	}

	pub fn type_name(&self) -> &str {
		&self.descriptor.type_name
	}

	/// Returns the wrapper for `id`, creating it lazily unless `lazy` is
	/// set, in which case an absent id fails with `UNKNOWN_INSTANCE`. A
	/// second `obtain` racing an in-progress eviction waits for the evict
	/// to finish and then creates a fresh wrapper (§4.2 "Concurrency").
	pub async fn obtain(&self, id: &[String], lazy: bool) -> Result<Arc<InstanceWrapper>, ActionError> {
		loop {
			let wait_for = {
				let mut entries = self.entries.lock().await;
				let key = key_of(id);
				match entries.get_mut(&key) {
					Some(entry) if entry.evicting => Some(entry.wrapper.clone()),
					Some(entry) => {
						entry.last_used_at = Instant::now();
						return Ok(entry.wrapper.clone());
					}
					None => {
						if lazy {
							return Err(FrameworkError::UnknownInstance {
								actor_type: self.descriptor.type_name.clone(),
								id: key,
							}
							.into_action_error());
						}
						let wrapper = InstanceWrapper::new(self.descriptor.clone(), id.to_vec());
						let now = Instant::now();
						entries.insert(
							key,
							Entry {
								wrapper: wrapper.clone(),
								created_at: now,
								last_used_at: now,
								evicting: false,
							},
						);
						metrics::CONTAINER_SIZE
							.with_label_values(&[&self.descriptor.type_name])
							.set(entries.len() as i64);
						return Ok(wrapper);
					}
				}
			};

			if let Some(dying) = wait_for {
				dying.wait_deactivated().await;
			}
		}
	}

	/// Lets an actor request its own eviction, e.g. to commit state and
	/// exit (§4.2 "Explicit performFinalization").
	pub async fn perform_finalization(&self, id: &[String]) {
		let key = key_of(id);
		let wrapper = {
			let mut entries = self.entries.lock().await;
			match entries.get_mut(&key) {
				Some(entry) if !entry.evicting => {
					entry.evicting = true;
					Some(entry.wrapper.clone())
				}
				_ => None,
			}
		};
		if let Some(wrapper) = wrapper {
			wrapper.deactivate().await;
			let mut entries = self.entries.lock().await;
			entries.remove(&key);
			metrics::EVICTIONS_TOTAL.with_label_values(&[&self.descriptor.type_name, "finalize"]).inc();
			metrics::CONTAINER_SIZE.with_label_values(&[&self.descriptor.type_name]).set(entries.len() as i64);
		}
	}

	/// Evicts least-recently-used active entries until `size <=
	/// capacity`. Safe to call periodically; a no-op when under capacity
	/// or no capacity configured (§4.2 "Capacity LRU").
	pub async fn enforce_capacity(&self) {
		let Some(capacity) = self.capacity else {
			return;
		};

		let to_evict: Vec<(String, Arc<InstanceWrapper>)> = {
			let mut entries = self.entries.lock().await;
			if entries.len() <= capacity {
				return;
			}
			let mut candidates: Vec<(String, Instant)> = entries
				.iter()
				.filter(|(_, e)| !e.evicting && !e.wrapper.is_dead())
				.map(|(k, e)| (k.clone(), e.last_used_at))
				.collect();
			candidates.sort_by_key(|(_, last_used)| *last_used);

			let overflow = entries.len() - capacity;
			let victims: Vec<String> = candidates.into_iter().take(overflow).map(|(k, _)| k).collect();
			victims
				.into_iter()
				.filter_map(|key| {
					entries.get_mut(&key).map(|entry| {
						entry.evicting = true;
						(key, entry.wrapper.clone())
					})
				})
				.collect()
		};

		let evicted = to_evict.len();
		for (key, wrapper) in to_evict {
			let entries = &self.entries;
			wrapper.deactivate().await;
			entries.lock().await.remove(&key);
		}
		if evicted > 0 {
			metrics::EVICTIONS_TOTAL
				.with_label_values(&[&self.descriptor.type_name, "capacity"])
				.inc_by(evicted as u64);
			let size = self.entries.lock().await.len() as i64;
			metrics::CONTAINER_SIZE.with_label_values(&[&self.descriptor.type_name]).set(size);
		}
	}

	/// Deactivates every entry whose `createdAt` predates `maxAgeSeconds`
	/// ago, independent of LRU pressure (§4.2 "Max-age").
	pub async fn sweep_max_age(&self) {
		let Some(max_age) = self.max_age else {
			return;
		};
		let now = Instant::now();

		let expired: Vec<(String, Arc<InstanceWrapper>)> = {
			let mut entries = self.entries.lock().await;
			let victims: Vec<String> = entries
				.iter()
				.filter(|(_, e)| !e.evicting && now.duration_since(e.created_at) >= max_age)
				.map(|(k, _)| k.clone())
				.collect();
			victims
				.into_iter()
				.filter_map(|key| {
					entries.get_mut(&key).map(|entry| {
						entry.evicting = true;
						(key, entry.wrapper.clone())
					})
				})
				.collect()
		};

		let evicted = expired.len();
		for (key, wrapper) in expired {
			wrapper.deactivate().await;
			self.entries.lock().await.remove(&key);
		}
		if evicted > 0 {
			metrics::EVICTIONS_TOTAL
				.with_label_values(&[&self.descriptor.type_name, "max_age"])
				.inc_by(evicted as u64);
			let size = self.entries.lock().await.len() as i64;
			metrics::CONTAINER_SIZE.with_label_values(&[&self.descriptor.type_name]).set(size);
		}
	}

	/// Drains every live wrapper in parallel and waits for all to reach
	/// `Dead` (§4.2 "finalize()").
	pub async fn finalize(&self) {
		let wrappers: Vec<Arc<InstanceWrapper>> = {
			let entries = self.entries.lock().await;
			entries.values().map(|e| e.wrapper.clone()).collect()
		};
		join_all(wrappers.iter().map(|w| w.deactivate())).await;
		self.entries.lock().await.clear();
	}

	pub async fn len(&self) -> usize {
		self.entries.lock().await.len()
	}
}
