use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One named index as supplied with a `put` (§4.9). Recomputed and
/// compared against the previously stored list on every write so stale
/// rows under a removed or changed index can be tombstoned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
	pub name: String,
	pub keys: Vec<String>,
}

/// The value stored at the primary row location, `(pk=[specifier,'t'],
/// sk=id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRow {
	pub data: Option<Value>,
	pub version: String,
	pub baseline: String,
	pub indexes: Vec<IndexSpec>,
}

/// The value stored at a secondary index row location, `(pk=[specifier,
/// 'i', indexName], sk=[...indexKeys, ...id])`. Index rows never carry the
/// primary data themselves — a search against `tableProjection` always
/// joins back to [`StoredRow`] for that (§4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRow {
	pub id: Vec<String>,
}
