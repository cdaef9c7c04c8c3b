use filterexpr::{Expr, ProjectionEntry};
use serde_json::Value;
use sortkey::{ContinuationToken, SortKeyOrder};

use crate::constraint::KeyConstraint;
use crate::row::IndexSpec;

/// A `put{id, baseline?, version, data?, indexes[], specifier?}` request
/// (§4.9).
#[derive(Debug, Clone)]
pub struct PutRequest {
	pub id: Vec<String>,
	pub baseline: Option<String>,
	pub version: String,
	pub data: Option<Value>,
	pub indexes: Vec<IndexSpec>,
	pub specifier: Option<String>,
}

/// The outcome of a successful put: the version that is now current and
/// the fresh baseline token a subsequent put must supply to avoid
/// `BASELINE_MISMATCH`.
#[derive(Debug, Clone)]
pub struct PutResult {
	pub version: String,
	pub baseline: String,
}

/// The outcome of a `get` (§4.9).
#[derive(Debug, Clone)]
pub struct GetResult {
	pub data: Option<Value>,
	pub version: String,
	pub baseline: String,
}

/// An `ITableSearchRequest` (§4.9).
#[derive(Debug, Clone)]
pub struct TableSearchRequest {
	pub index: Option<String>,
	pub keys: Vec<KeyConstraint>,
	pub keys_order: SortKeyOrder,
	pub filter: Option<Expr>,
	pub table_projection: Option<Vec<ProjectionEntry>>,
	pub index_projection: Option<Vec<ProjectionEntry>>,
	pub specifier: Option<String>,
	pub max_items: Option<usize>,
	pub continuation_token: Option<ContinuationToken>,
}

/// One row returned by `search`: the matched id plus whatever projection
/// of the data survived (§4.9). `version`/`baseline` are only populated
/// for a primary-table search (`index: None`) — index rows don't carry
/// them without a join.
#[derive(Debug, Clone)]
pub struct SearchHit {
	pub id: Vec<String>,
	pub data: Option<Value>,
	pub version: Option<String>,
	pub baseline: Option<String>,
}
