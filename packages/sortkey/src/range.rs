use keycodec::{encode_parts, encode_prefix, is_child_of};

use crate::bound::{SortKeyBound, ToMatch};

/// Byte-level bounds derived from a [`SortKeyBound`], against which a
/// candidate's encoded sort key is tested directly — no decoding needed
/// (§4.8).
pub struct EncodedBound {
	from: Option<Vec<u8>>,
	to: Option<EncodedTo>,
}

enum EncodedTo {
	Strict(Vec<u8>),
	/// Any candidate whose encoding shares this prefix is included
	/// regardless of how it compares to the bound lexicographically —
	/// prefix-sharing already implies "matched node or a descendant".
	Loose(Vec<u8>),
}

impl EncodedBound {
	pub fn new(bound: &SortKeyBound) -> Self {
		let from = bound.from.as_ref().map(|parts| encode_parts(parts));
		let to = bound.to.as_ref().map(|(parts, matching)| match matching {
			ToMatch::Strict => EncodedTo::Strict(encode_parts(parts)),
			ToMatch::Loose => match parts.split_last() {
				Some((last, head)) => EncodedTo::Loose(encode_prefix(head, last)),
				None => EncodedTo::Loose(Vec::new()),
			},
		});
		EncodedBound { from, to }
	}

	/// Whether `candidate`'s encoded sort key falls within this bound.
	pub fn includes(&self, candidate: &[u8]) -> bool {
		if let Some(from) = &self.from {
			if candidate < from.as_slice() {
				return false;
			}
		}
		match &self.to {
			None => true,
			Some(EncodedTo::Strict(to)) => candidate <= to.as_slice() || is_child_of(to, candidate),
			Some(EncodedTo::Loose(prefix)) => candidate < prefix.as_slice() || candidate.starts_with(prefix.as_slice()),
		}
	}
}
