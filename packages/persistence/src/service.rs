use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rt_error::{ActionError, FrameworkError};
use tokio::sync::oneshot;

use crate::backend::{PersistenceQuery, StorageBackend};
use crate::record::{PersistenceKey, PersistenceRecord};
use crate::routing::{resolve_compartment, resolve_handler, CompartmentRule, HandlerRule};

/// Batches no larger than this are handed to a backend's `store_batch` in
/// one call (§4.7, "≈500 kB total payload").
const MAX_BATCH_BYTES: usize = 500_000;

struct PendingStore {
	compartment: String,
	record: PersistenceRecord,
	reply: oneshot::Sender<Result<(), ActionError>>,
}

/// The routing + batch-coalescing layer of §4.7: resolves a `specifier`
/// to a compartment and then a handler, and coalesces individually
/// issued `store` calls into size-bounded `storeBatch` calls against the
/// handler's backend.
pub struct PersistenceService {
	compartments: Vec<CompartmentRule>,
	handlers: Vec<HandlerRule>,
	backends: HashMap<String, Arc<dyn StorageBackend>>,
	queue: Mutex<Vec<PendingStore>>,
}

impl PersistenceService {
	pub fn new(compartments: Vec<CompartmentRule>, handlers: Vec<HandlerRule>, backends: HashMap<String, Arc<dyn StorageBackend>>) -> Arc<Self> {
		Arc::new(PersistenceService {
			compartments,
			handlers,
			backends,
			queue: Mutex::new(Vec::new()),
		})
	}

	fn resolve(&self, specifier: &str) -> Result<(String, Arc<dyn StorageBackend>), ActionError> {
		let compartment = resolve_compartment(&self.compartments, specifier)?;
		let actor_type = resolve_handler(&self.handlers, &compartment)?;
		let backend = self.backends.get(&actor_type).cloned().ok_or_else(|| {
			FrameworkError::NoHandler {
				compartment: compartment.clone(),
			}
			.into_action_error()
		})?;
		Ok((compartment, backend))
	}

	/// Enqueues one record for the next micro-task flush and resolves
	/// once that flush reports this record's own outcome (§4.7).
	pub async fn store(self: &Arc<Self>, specifier: &str, record: PersistenceRecord) -> Result<(), ActionError> {
		let compartment = resolve_compartment(&self.compartments, specifier)?;
		let (tx, rx) = oneshot::channel();

		let should_schedule = {
			let mut queue = self.queue.lock().unwrap();
			queue.push(PendingStore {
				compartment,
				record,
				reply: tx,
			});
			queue.len() == 1
		};

		if should_schedule {
			let service = self.clone();
			tokio::spawn(async move { service.flush().await });
		}

		rx.await.unwrap_or_else(|_| {
			Err(FrameworkError::UnexpectedError {
				message: "persistence flush task dropped the reply channel".to_string(),
			}
			.into_action_error())
		})
	}

	/// Directly delegates to the resolved handler's backend, bypassing
	/// the coalescing queue (§4.7, "storeBatch... forward... unchanged").
	pub async fn store_batch(&self, specifier: &str, records: Vec<PersistenceRecord>) -> Result<Vec<Result<(), ActionError>>, ActionError> {
		let (compartment, backend) = self.resolve(specifier)?;
		Ok(backend.store_batch(&compartment, records).await)
	}

	pub async fn load(&self, specifier: &str, key: &PersistenceKey) -> Result<Option<PersistenceRecord>, ActionError> {
		let (compartment, backend) = self.resolve(specifier)?;
		backend.load(&compartment, key).await
	}

	pub async fn query(&self, specifier: &str, query: PersistenceQuery) -> Result<sortkey::QueryChunk<PersistenceRecord>, ActionError> {
		let (compartment, backend) = self.resolve(specifier)?;
		backend.query(&compartment, query).await
	}

	async fn flush(self: Arc<Self>) {
		let pending = {
			let mut queue = self.queue.lock().unwrap();
			std::mem::take(&mut *queue)
		};

		let mut by_compartment: HashMap<String, Vec<PendingStore>> = HashMap::new();
		for item in pending {
			by_compartment.entry(item.compartment.clone()).or_default().push(item);
		}

		for (compartment, items) in by_compartment {
			let actor_type = match resolve_handler(&self.handlers, &compartment) {
				Ok(actor_type) => actor_type,
				Err(err) => {
					for item in items {
						let _ = item.reply.send(Err(err.clone()));
					}
					continue;
				}
			};
			let backend = match self.backends.get(&actor_type).cloned() {
				Some(backend) => backend,
				None => {
					let err = FrameworkError::NoHandler {
						compartment: compartment.clone(),
					}
					.into_action_error();
					for item in items {
						let _ = item.reply.send(Err(err.clone()));
					}
					continue;
				}
			};

			for batch in subdivide(items) {
				let (records, replies): (Vec<_>, Vec<_>) = batch.into_iter().map(|item| (item.record, item.reply)).unzip();
				let results = backend.store_batch(&compartment, records).await;
				for (reply, result) in replies.into_iter().zip(results) {
					let _ = reply.send(result);
				}
			}
		}
	}
}

/// Splits `items` into groups whose total approximate size stays under
/// [`MAX_BATCH_BYTES`], without reordering.
fn subdivide(items: Vec<PendingStore>) -> Vec<Vec<PendingStore>> {
	let mut batches: Vec<Vec<PendingStore>> = Vec::new();
	let mut current: Vec<PendingStore> = Vec::new();
	let mut current_size = 0usize;

	for item in items {
		let size = item.record.approximate_size();
		if !current.is_empty() && current_size + size > MAX_BATCH_BYTES {
			batches.push(std::mem::take(&mut current));
			current_size = 0;
		}
		current_size += size;
		current.push(item);
	}
	if !current.is_empty() {
		batches.push(current);
	}
	batches
}
