use crate::bound::{SortKeyBound, SortKeyOrder};
use crate::range::EncodedBound;
use crate::token::{ContinuationToken, ContinuationTokenError};

/// `{items, continuationToken?}` (§3 "Query result chunk"), generic over
/// whatever payload a caller pairs with each encoded sort key.
pub struct QueryChunk<T> {
	pub items: Vec<T>,
	pub continuation_token: Option<ContinuationToken>,
}

/// A `sortKeyFrom`/`sortKeyTo`/`sortKeyOrder`/`maxItems`/`continuationToken`
/// request (§4.8), applied against a candidate set already encoded via
/// [`keycodec::encode_parts`].
pub struct SortKeyQuery {
	pub bound: SortKeyBound,
	pub order: SortKeyOrder,
	pub max_items: Option<usize>,
	pub continuation_token: Option<ContinuationToken>,
}

impl SortKeyQuery {
	/// Filters, orders, and pages `candidates` (encoded sort key, payload
	/// pairs — not required to already be sorted). Resuming with the
	/// chunk's `continuation_token` against an unchanged or
	/// monotonically-growing candidate set reproduces the same ordering.
	pub fn run<T: Clone>(&self, candidates: &[(Vec<u8>, T)]) -> Result<QueryChunk<T>, ContinuationTokenError> {
		let encoded_bound = EncodedBound::new(&self.bound);
		let mut matching: Vec<&(Vec<u8>, T)> = candidates.iter().filter(|(key, _)| encoded_bound.includes(key)).collect();
		matching.sort_by(|a, b| a.0.cmp(&b.0));
		if self.order == SortKeyOrder::Descending {
			matching.reverse();
		}

		let start = match &self.continuation_token {
			None => 0,
			Some(token) => {
				let cursor = token.decode()?;
				let past_cursor = |key: &[u8]| match self.order {
					SortKeyOrder::Ascending => key > cursor.as_slice(),
					SortKeyOrder::Descending => key < cursor.as_slice(),
				};
				matching.iter().position(|(key, _)| past_cursor(key)).unwrap_or(matching.len())
			}
		};

		let remaining = &matching[start..];
		let take = self.max_items.unwrap_or(remaining.len()).min(remaining.len());
		let page = &remaining[..take];

		let continuation_token = if take < remaining.len() {
			page.last().map(|(key, _)| ContinuationToken::encode(key))
		} else {
			None
		};

		Ok(QueryChunk {
			items: page.iter().map(|(_, value)| value.clone()).collect(),
			continuation_token,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use keycodec::encode_parts;

	fn candidates() -> Vec<(Vec<u8>, String)> {
		["A", "B", "C", "D", "E"]
			.iter()
			.map(|s| (encode_parts(&[s.to_string()]), s.to_string()))
			.collect()
	}

	#[test]
	fn ascending_paginates_in_order() {
		let query = SortKeyQuery {
			bound: SortKeyBound::default(),
			order: SortKeyOrder::Ascending,
			max_items: Some(2),
			continuation_token: None,
		};
		let chunk = query.run(&candidates()).unwrap();
		assert_eq!(chunk.items, vec!["A", "B"]);
		assert!(chunk.continuation_token.is_some());

		let query2 = SortKeyQuery {
			bound: SortKeyBound::default(),
			order: SortKeyOrder::Ascending,
			max_items: Some(2),
			continuation_token: chunk.continuation_token,
		};
		let chunk2 = query2.run(&candidates()).unwrap();
		assert_eq!(chunk2.items, vec!["C", "D"]);
	}

	#[test]
	fn descending_reverses_order_and_pagination_direction() {
		let query = SortKeyQuery {
			bound: SortKeyBound::default(),
			order: SortKeyOrder::Descending,
			max_items: Some(2),
			continuation_token: None,
		};
		let chunk = query.run(&candidates()).unwrap();
		assert_eq!(chunk.items, vec!["E", "D"]);

		let query2 = SortKeyQuery {
			bound: SortKeyBound::default(),
			order: SortKeyOrder::Descending,
			max_items: Some(2),
			continuation_token: chunk.continuation_token,
		};
		let chunk2 = query2.run(&candidates()).unwrap();
		assert_eq!(chunk2.items, vec!["C", "B"]);
	}

	#[test]
	fn final_chunk_has_no_continuation_token() {
		let query = SortKeyQuery {
			bound: SortKeyBound::default(),
			order: SortKeyOrder::Ascending,
			max_items: Some(100),
			continuation_token: None,
		};
		let chunk = query.run(&candidates()).unwrap();
		assert_eq!(chunk.items.len(), 5);
		assert!(chunk.continuation_token.is_none());
	}
}
