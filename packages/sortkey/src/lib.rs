//! Sort-key functional representation, range bounds, and paginated
//! queries (§4.8): layered on [`keycodec`]'s byte encoding with the
//! `sortKeyFrom`/`sortKeyTo` (strict/loose) inclusion rules, ordering,
//! and continuation tokens a caller works with.

mod bound;
mod query;
mod range;
mod token;

pub use bound::{SortKeyBound, SortKeyOrder, ToMatch};
pub use query::{QueryChunk, SortKeyQuery};
pub use range::EncodedBound;
pub use token::{ContinuationToken, ContinuationTokenError};
