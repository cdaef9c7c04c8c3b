//! The tables service (§4.9): a primary row plus secondary indexes layered
//! on the same [`persistence::StorageBackend`] seam, with atomic
//! baseline-checked puts and search translated into a §4.8 sort-key
//! query.

mod constraint;
mod request;
mod row;
mod service;
mod translate;

pub use constraint::KeyConstraint;
pub use request::{GetResult, PutRequest, PutResult, SearchHit, TableSearchRequest};
pub use row::IndexSpec;
pub use service::TableService;
pub use translate::{is_translatable, translate_keys};
