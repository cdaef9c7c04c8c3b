use std::sync::Arc;

use filterexpr::Expr;
use persistence::{PersistenceKey, PersistenceQuery, PersistenceRecord, StorageBackend};
use rt_error::{ActionError, FrameworkError};
use uuid::Uuid;

use crate::request::{GetResult, PutRequest, PutResult, SearchHit, TableSearchRequest};
use crate::row::{IndexRow, IndexSpec, StoredRow};
use crate::translate::translate_keys;

const PRIMARY_PARTITION: &str = "t";
const INDEX_PARTITION: &str = "i";

fn decode_error(err: serde_json::Error) -> ActionError {
	FrameworkError::UnexpectedError {
		message: format!("corrupt stored row: {err}"),
	}
	.into_action_error()
}

fn primary_key(id: &[String]) -> PersistenceKey {
	PersistenceKey {
		partition_key: vec![PRIMARY_PARTITION.to_string()],
		sort_key: id.to_vec(),
	}
}

fn index_key(index_name: &str, index_keys: &[String], id: &[String]) -> PersistenceKey {
	let mut sort_key = index_keys.to_vec();
	sort_key.extend_from_slice(id);
	PersistenceKey {
		partition_key: vec![INDEX_PARTITION.to_string(), index_name.to_string()],
		sort_key,
	}
}

/// The table service (§4.9): a primary row per `id` plus zero or more
/// secondary index rows, all stored through one [`StorageBackend`]
/// compartment, with atomic multi-row puts and a search path that
/// translates key constraints into a §4.8 sort-key query.
pub struct TableService {
	backend: Arc<dyn StorageBackend>,
	default_specifier: String,
}

impl TableService {
	pub fn new(backend: Arc<dyn StorageBackend>, default_specifier: impl Into<String>) -> Self {
		TableService {
			backend,
			default_specifier: default_specifier.into(),
		}
	}

	fn compartment<'a>(&'a self, specifier: &'a Option<String>) -> &'a str {
		specifier.as_deref().unwrap_or(&self.default_specifier)
	}

	async fn load_row(&self, compartment: &str, id: &[String]) -> Result<Option<StoredRow>, ActionError> {
		let record = self.backend.load(compartment, &primary_key(id)).await?;
		match record.and_then(|r| r.value) {
			None => Ok(None),
			Some(bytes) => Ok(Some(serde_json::from_slice(&bytes).map_err(decode_error)?)),
		}
	}

	pub async fn put(&self, request: PutRequest) -> Result<PutResult, ActionError> {
		let compartment = self.compartment(&request.specifier).to_string();
		let existing = self.load_row(&compartment, &request.id).await?;

		// §4.9 step 2: a row already exists, so the caller must name its
		// exact current baseline, including the case where the caller passes
		// no baseline at all (`None`) -- that only matches when no row exists
		// yet (§8 scenario 3: a *second* `baseline=null` put against an
		// existing row must fail `BASELINE_MISMATCH`).
		if let Some(row) = &existing {
			if request.baseline.as_deref() != Some(row.baseline.as_str()) {
				return Err(FrameworkError::BaselineMismatch {
					provided: request.baseline.clone().unwrap_or_default(),
					stored: row.baseline.clone(),
				}
				.into_action_error());
			}
		}
		if let Some(row) = &existing {
			if row.version >= request.version {
				return Err(FrameworkError::VersionConflict {
					provided: request.version.clone(),
					stored: row.version.clone(),
				}
				.into_action_error());
			}
		}

		let baseline = Uuid::new_v4().to_string();
		let mut records = Vec::new();

		if let Some(row) = &existing {
			for old_index in &row.indexes {
				let still_current = request.indexes.iter().any(|idx| idx == old_index);
				if !still_current {
					records.push(PersistenceRecord {
						key: index_key(&old_index.name, &old_index.keys, &request.id),
						value: None,
						version: request.version.clone(),
					});
				}
			}
		}

		for index in &request.indexes {
			let value = serde_json::to_vec(&IndexRow { id: request.id.clone() }).map_err(decode_error)?;
			records.push(PersistenceRecord {
				key: index_key(&index.name, &index.keys, &request.id),
				value: Some(value),
				version: request.version.clone(),
			});
		}

		let stored = StoredRow {
			data: request.data,
			version: request.version.clone(),
			baseline: baseline.clone(),
			indexes: request.indexes,
		};
		records.push(PersistenceRecord {
			key: primary_key(&request.id),
			value: Some(serde_json::to_vec(&stored).map_err(decode_error)?),
			version: request.version.clone(),
		});

		for result in self.backend.store_batch(&compartment, records).await {
			result?;
		}

		Ok(PutResult {
			version: request.version,
			baseline,
		})
	}

	pub async fn get(&self, id: &[String], specifier: Option<&str>) -> Result<Option<GetResult>, ActionError> {
		let compartment = specifier.unwrap_or(&self.default_specifier);
		match self.load_row(compartment, id).await? {
			None => Ok(None),
			Some(row) => Ok(Some(GetResult {
				data: row.data,
				version: row.version,
				baseline: row.baseline,
			})),
		}
	}

	pub async fn search(&self, request: TableSearchRequest) -> Result<sortkey::QueryChunk<SearchHit>, ActionError> {
		let compartment = self.compartment(&request.specifier).to_string();
		let partition_key = match &request.index {
			Some(name) => vec![INDEX_PARTITION.to_string(), name.clone()],
			None => vec![PRIMARY_PARTITION.to_string()],
		};

		let (bound, residual) = translate_keys(&request.keys)?;
		let filter = combine_filters(residual, request.filter.clone());

		let query = PersistenceQuery {
			partition_key,
			bound,
			order: request.keys_order,
			max_items: request.max_items,
			continuation_token: request.continuation_token.clone(),
			filter,
		};
		let chunk = self.backend.query(&compartment, query).await?;

		let mut hits = Vec::with_capacity(chunk.items.len());
		for record in chunk.items {
			let hit = match &request.index {
				None => {
					let row: StoredRow = serde_json::from_slice(record.value.as_deref().unwrap_or(b"null")).map_err(decode_error)?;
					SearchHit {
						id: record.key.sort_key.clone(),
						data: apply_projection(row.data, &request.table_projection),
						version: Some(row.version),
						baseline: Some(row.baseline),
					}
				}
				Some(_) => {
					// Index rows carry no data of their own (only the id they
					// point at), so `indexProjection` has nothing to select
					// from; any requested projection comes from the joined
					// primary row instead.
					let index_row: IndexRow = serde_json::from_slice(record.value.as_deref().unwrap_or(b"null")).map_err(decode_error)?;
					let data = if request.table_projection.is_some() {
						let primary = self.load_row(&compartment, &index_row.id).await?;
						apply_projection(primary.and_then(|row| row.data), &request.table_projection)
					} else {
						None
					};
					SearchHit {
						id: index_row.id,
						data,
						version: None,
						baseline: None,
					}
				}
			};
			hits.push(hit);
		}

		Ok(sortkey::QueryChunk {
			items: hits,
			continuation_token: chunk.continuation_token,
		})
	}
}

fn combine_filters(residual: Option<Expr>, requested: Option<Expr>) -> Option<Expr> {
	match (residual, requested) {
		(None, None) => None,
		(Some(a), None) => Some(a),
		(None, Some(b)) => Some(b),
		(Some(a), Some(b)) => Some(Expr::And(vec![a, b])),
	}
}

fn apply_projection(data: Option<serde_json::Value>, entries: &Option<Vec<filterexpr::ProjectionEntry>>) -> Option<serde_json::Value> {
	match (data, entries) {
		(Some(value), Some(entries)) => Some(filterexpr::project(&value, entries)),
		(data, _) => data,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::constraint::KeyConstraint;
	use persistence::InMemoryStorageBackend;
	use serde_json::json;
	use sortkey::SortKeyOrder;

	fn service() -> TableService {
		TableService::new(Arc::new(InMemoryStorageBackend::new()), "widgets")
	}

	fn id(s: &str) -> Vec<String> {
		vec![s.to_string()]
	}

	#[tokio::test]
	async fn put_then_get_round_trips() {
		let service = service();
		let result = service
			.put(PutRequest {
				id: id("widget-1"),
				baseline: None,
				version: "0001".to_string(),
				data: Some(json!({"name": "Widget"})),
				indexes: vec![],
				specifier: None,
			})
			.await
			.unwrap();

		let fetched = service.get(&id("widget-1"), None).await.unwrap().unwrap();
		assert_eq!(fetched.data, Some(json!({"name": "Widget"})));
		assert_eq!(fetched.baseline, result.baseline);
	}

	#[tokio::test]
	async fn baseline_mismatch_is_rejected() {
		let service = service();
		service
			.put(PutRequest {
				id: id("widget-1"),
				baseline: None,
				version: "0001".to_string(),
				data: None,
				indexes: vec![],
				specifier: None,
			})
			.await
			.unwrap();

		let err = service
			.put(PutRequest {
				id: id("widget-1"),
				baseline: Some("wrong-baseline".to_string()),
				version: "0002".to_string(),
				data: None,
				indexes: vec![],
				specifier: None,
			})
			.await
			.unwrap_err();
		assert_eq!(err.code, "BASELINE_MISMATCH");
	}

	#[tokio::test]
	async fn second_null_baseline_put_against_existing_row_is_rejected() {
		let service = service();
		service
			.put(PutRequest {
				id: id("widget-1"),
				baseline: None,
				version: "0001".to_string(),
				data: None,
				indexes: vec![],
				specifier: None,
			})
			.await
			.unwrap();

		// The row now exists with a real baseline; a second put that omits
		// the baseline (as if the row were still absent) must fail rather
		// than silently overwrite it (§8 scenario 3).
		let err = service
			.put(PutRequest {
				id: id("widget-1"),
				baseline: None,
				version: "0002".to_string(),
				data: None,
				indexes: vec![],
				specifier: None,
			})
			.await
			.unwrap_err();
		assert_eq!(err.code, "BASELINE_MISMATCH");
	}

	#[tokio::test]
	async fn stale_version_is_rejected() {
		let service = service();
		let first = service
			.put(PutRequest {
				id: id("widget-1"),
				baseline: None,
				version: "0002".to_string(),
				data: None,
				indexes: vec![],
				specifier: None,
			})
			.await
			.unwrap();

		let err = service
			.put(PutRequest {
				id: id("widget-1"),
				baseline: Some(first.baseline),
				version: "0001".to_string(),
				data: None,
				indexes: vec![],
				specifier: None,
			})
			.await
			.unwrap_err();
		assert_eq!(err.code, "VERSION_CONFLICT");
	}

	#[tokio::test]
	async fn search_by_index_finds_rows_and_joins_primary_data() {
		let service = service();
		service
			.put(PutRequest {
				id: id("widget-1"),
				baseline: None,
				version: "0001".to_string(),
				data: Some(json!({"color": "red"})),
				indexes: vec![IndexSpec {
					name: "by-color".to_string(),
					keys: vec!["red".to_string()],
				}],
				specifier: None,
			})
			.await
			.unwrap();

		let chunk = service
			.search(TableSearchRequest {
				index: Some("by-color".to_string()),
				keys: vec![KeyConstraint::Eq("red".to_string())],
				keys_order: SortKeyOrder::Ascending,
				filter: None,
				table_projection: Some(vec![]),
				index_projection: None,
				specifier: None,
				max_items: None,
				continuation_token: None,
			})
			.await
			.unwrap();

		assert_eq!(chunk.items.len(), 1);
		assert_eq!(chunk.items[0].id, id("widget-1"));
		assert_eq!(chunk.items[0].data, Some(json!({"color": "red"})));
	}

	#[tokio::test]
	async fn reput_without_matching_index_tombstones_old_index_row() {
		let service = service();
		service
			.put(PutRequest {
				id: id("widget-1"),
				baseline: None,
				version: "0001".to_string(),
				data: Some(json!({"color": "red"})),
				indexes: vec![IndexSpec {
					name: "by-color".to_string(),
					keys: vec!["red".to_string()],
				}],
				specifier: None,
			})
			.await
			.unwrap();
		let first = service.get(&id("widget-1"), None).await.unwrap().unwrap();

		service
			.put(PutRequest {
				id: id("widget-1"),
				baseline: Some(first.baseline),
				version: "0002".to_string(),
				data: Some(json!({"color": "blue"})),
				indexes: vec![IndexSpec {
					name: "by-color".to_string(),
					keys: vec!["blue".to_string()],
				}],
				specifier: None,
			})
			.await
			.unwrap();

		let stale = service
			.search(TableSearchRequest {
				index: Some("by-color".to_string()),
				keys: vec![KeyConstraint::Eq("red".to_string())],
				keys_order: SortKeyOrder::Ascending,
				filter: None,
				table_projection: None,
				index_projection: None,
				specifier: None,
				max_items: None,
				continuation_token: None,
			})
			.await
			.unwrap();
		assert_eq!(stale.items.len(), 0);

		let fresh = service
			.search(TableSearchRequest {
				index: Some("by-color".to_string()),
				keys: vec![KeyConstraint::Eq("blue".to_string())],
				keys_order: SortKeyOrder::Ascending,
				filter: None,
				table_projection: None,
				index_projection: None,
				specifier: None,
				max_items: None,
				continuation_token: None,
			})
			.await
			.unwrap();
		assert_eq!(fresh.items.len(), 1);
	}
}
