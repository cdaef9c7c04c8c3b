use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use keycodec::encode_parts;
use rt_error::{ActionError, FrameworkError};
use sortkey::SortKeyQuery;

use super::{PersistenceQuery, StorageBackend};
use crate::record::{PersistenceKey, PersistenceRecord};

struct StoredRow {
	value: Option<Vec<u8>>,
	version: String,
}

type Partition = std::collections::BTreeMap<Vec<u8>, StoredRow>;

/// Reference [`StorageBackend`]: an in-memory `compartment -> partition ->
/// sort-key -> row` map. Used by tests and as a runnable default; not
/// durable across restarts (§4.11).
#[derive(Default)]
pub struct InMemoryStorageBackend {
	compartments: Mutex<HashMap<String, HashMap<Vec<u8>, Partition>>>,
}

impl InMemoryStorageBackend {
	pub fn new() -> Self {
		InMemoryStorageBackend::default()
	}
}

fn to_record(pk: &[String], sk_bytes: &[u8], row: &StoredRow) -> Result<PersistenceRecord, ActionError> {
	let sort_key = keycodec::decode_parts(sk_bytes).map_err(|e| {
		FrameworkError::UnexpectedError {
			message: format!("corrupt stored sort key: {e}"),
		}
		.into_action_error()
	})?;
	Ok(PersistenceRecord {
		key: PersistenceKey {
			partition_key: pk.to_vec(),
			sort_key,
		},
		value: row.value.clone(),
		version: row.version.clone(),
	})
}

#[async_trait]
impl StorageBackend for InMemoryStorageBackend {
	async fn store_batch(&self, compartment: &str, records: Vec<PersistenceRecord>) -> Vec<Result<(), ActionError>> {
		let mut compartments = self.compartments.lock().unwrap();
		let partitions = compartments.entry(compartment.to_string()).or_default();

		records
			.into_iter()
			.map(|record| {
				let pk = encode_parts(&record.key.partition_key);
				let sk = encode_parts(&record.key.sort_key);
				let partition = partitions.entry(pk).or_default();

				match partition.get(&sk) {
					Some(existing) if existing.version >= record.version => Err(FrameworkError::VersionConflict {
						provided: record.version.clone(),
						stored: existing.version.clone(),
					}
					.into_action_error()),
					_ => {
						partition.insert(
							sk,
							StoredRow {
								value: record.value,
								version: record.version,
							},
						);
						Ok(())
					}
				}
			})
			.collect()
	}

	async fn load(&self, compartment: &str, key: &PersistenceKey) -> Result<Option<PersistenceRecord>, ActionError> {
		let compartments = self.compartments.lock().unwrap();
		let pk = encode_parts(&key.partition_key);
		let sk = encode_parts(&key.sort_key);
		let row = compartments
			.get(compartment)
			.and_then(|partitions| partitions.get(&pk))
			.and_then(|partition| partition.get(&sk));
		match row {
			None => Ok(None),
			Some(row) => to_record(&key.partition_key, &sk, row).map(Some),
		}
	}

	async fn query(
		&self,
		compartment: &str,
		query: PersistenceQuery,
	) -> Result<sortkey::QueryChunk<PersistenceRecord>, ActionError> {
		let compartments = self.compartments.lock().unwrap();
		let pk = encode_parts(&query.partition_key);
		let empty = Partition::default();
		let partition = compartments
			.get(compartment)
			.and_then(|partitions| partitions.get(&pk))
			.unwrap_or(&empty);

		let candidates: Vec<(Vec<u8>, PersistenceRecord)> = partition
			.iter()
			.filter_map(|(sk, row)| to_record(&query.partition_key, sk, row).ok().map(|record| (sk.clone(), record)))
			.collect();

		let sort_query = SortKeyQuery {
			bound: query.bound,
			order: query.order,
			max_items: query.max_items,
			continuation_token: query.continuation_token,
		};
		let mut chunk = sort_query.run(&candidates).map_err(|e| {
			FrameworkError::UnexpectedError {
				message: format!("invalid continuation token: {e}"),
			}
			.into_action_error()
		})?;

		if let Some(filter) = &query.filter {
			chunk.items.retain(|record| match &record.value {
				Some(bytes) => match serde_json::from_slice::<serde_json::Value>(bytes) {
					Ok(value) => {
						let ctx = filterexpr::EvalContext::new(&value, &record.key.partition_key, &record.key.sort_key);
						filterexpr::eval(filter, &ctx).map(|v| v == serde_json::Value::Bool(true)).unwrap_or(false)
					}
					Err(_) => false,
				},
				None => false,
			});
		}

		Ok(chunk)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn key(pk: &[&str], sk: &[&str]) -> PersistenceKey {
		PersistenceKey {
			partition_key: pk.iter().map(|s| s.to_string()).collect(),
			sort_key: sk.iter().map(|s| s.to_string()).collect(),
		}
	}

	#[tokio::test]
	async fn store_then_load_round_trips() {
		let backend = InMemoryStorageBackend::new();
		let record = PersistenceRecord {
			key: key(&["tenant-1"], &["profile"]),
			value: Some(b"hello".to_vec()),
			version: "0001".to_string(),
		};
		let results = backend.store_batch("profiles", vec![record.clone()]).await;
		assert!(results[0].is_ok());

		let loaded = backend.load("profiles", &record.key).await.unwrap().unwrap();
		assert_eq!(loaded.value, Some(b"hello".to_vec()));
	}

	#[tokio::test]
	async fn stale_version_is_rejected() {
		let backend = InMemoryStorageBackend::new();
		let k = key(&["tenant-1"], &["profile"]);
		backend
			.store_batch(
				"profiles",
				vec![PersistenceRecord {
					key: k.clone(),
					value: Some(b"v2".to_vec()),
					version: "0002".to_string(),
				}],
			)
			.await;

		let results = backend
			.store_batch(
				"profiles",
				vec![PersistenceRecord {
					key: k,
					value: Some(b"v1".to_vec()),
					version: "0001".to_string(),
				}],
			)
			.await;
		let err = results[0].as_ref().unwrap_err();
		assert_eq!(err.code, "VERSION_CONFLICT");
	}

	#[tokio::test]
	async fn query_ranges_over_sort_key_within_partition() {
		let backend = InMemoryStorageBackend::new();
		for sk in ["a", "b", "c"] {
			backend
				.store_batch(
					"logs",
					vec![PersistenceRecord {
						key: key(&["tenant-1"], &[sk]),
						value: Some(sk.as_bytes().to_vec()),
						version: "0001".to_string(),
					}],
				)
				.await;
		}

		let query = PersistenceQuery {
			partition_key: vec!["tenant-1".to_string()],
			bound: sortkey::SortKeyBound {
				from: Some(vec!["b".to_string()]),
				to: None,
			},
			order: sortkey::SortKeyOrder::Ascending,
			max_items: None,
			continuation_token: None,
			filter: None,
		};
		let chunk = backend.query("logs", query).await.unwrap();
		assert_eq!(chunk.items.len(), 2);
	}
}
