/// How the last element of a `sortKeyTo` bound matches against a
/// candidate's corresponding element (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToMatch {
	/// The last element must equal the candidate's element exactly.
	Strict,
	/// The last element prefix-matches the candidate's element.
	Loose,
}

/// `sortKeyFrom`/`sortKeyTo` as given by a caller, before being turned
/// into functional-representation byte bounds by [`crate::range`].
#[derive(Debug, Clone, Default)]
pub struct SortKeyBound {
	pub from: Option<Vec<String>>,
	pub to: Option<(Vec<String>, ToMatch)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKeyOrder {
	Ascending,
	Descending,
}

impl Default for SortKeyOrder {
	fn default() -> Self {
		SortKeyOrder::Ascending
	}
}
