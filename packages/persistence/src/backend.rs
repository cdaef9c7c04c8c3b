use async_trait::async_trait;
use rt_error::ActionError;
use sortkey::{QueryChunk, SortKeyBound, SortKeyOrder};

use crate::record::{PersistenceKey, PersistenceRecord};

/// A `sortKeyFrom`/`sortKeyTo`/`sortKeyOrder`/`maxItems`/`continuationToken`
/// request scoped to one partition (§4.7 "Query... forward to the handler
/// actor unchanged").
pub struct PersistenceQuery {
	pub partition_key: Vec<String>,
	pub bound: SortKeyBound,
	pub order: SortKeyOrder,
	pub max_items: Option<usize>,
	pub continuation_token: Option<sortkey::ContinuationToken>,
	pub filter: Option<filterexpr::Expr>,
}

/// The pluggable storage seam (§4.11), grounded in the teacher's
/// driver-behind-a-trait pattern (`universaldb`'s `Database`/driver
/// handle). The core ships exactly one implementation,
/// [`InMemoryStorageBackend`]; real on-disk drivers are an injection
/// point left for embedding applications.
#[async_trait]
pub trait StorageBackend: Send + Sync {
	async fn store_batch(&self, compartment: &str, records: Vec<PersistenceRecord>) -> Vec<Result<(), ActionError>>;
	async fn load(&self, compartment: &str, key: &PersistenceKey) -> Result<Option<PersistenceRecord>, ActionError>;
	async fn query(&self, compartment: &str, query: PersistenceQuery) -> Result<QueryChunk<PersistenceRecord>, ActionError>;
}

mod in_memory;
pub use in_memory::InMemoryStorageBackend;
