//! The persistence service (§4.7): routes a caller-supplied `specifier`
//! through a compartment template to a handler actor type, coalesces
//! concurrent `store` calls into size-bounded batches, and otherwise
//! forwards `load`/`query` straight through to the resolved
//! [`StorageBackend`].

mod backend;
mod record;
mod routing;
mod service;

pub use backend::{InMemoryStorageBackend, PersistenceQuery, StorageBackend};
pub use record::{PersistenceKey, PersistenceRecord};
pub use routing::{resolve_compartment, resolve_handler, CompartmentRule, HandlerRule};
pub use service::PersistenceService;
