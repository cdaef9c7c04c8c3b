//! Composite key encoding for the persistence layer (§2 "Key codec", §4.8).
//!
//! Parts of a partition or sort key are joined into a single byte string
//! using a separator that collates strictly less than any content byte, so
//! that comparing encoded keys lexicographically reproduces the ordering
//! rules in §4.8 (in particular the "children sort after their parent"
//! tree property). The scheme mirrors the escaped-null tuple packing used
//! by FoundationDB-style tuple layers: a literal 0x00 byte in content is
//! escaped as `0x00 0xFF`, and each part is terminated by an unescaped
//! 0x00.
//!
//! Because the terminator byte (0x00) is strictly less than the first byte
//! of any escape sequence (0xFF) or any other content byte, `encode(["A"])`
//! is always a proper prefix of `encode(["A", "B"])`, which is exactly the
//! "from is a prefix of its children" relationship the sort-key semantics
//! need.

mod number;

pub use number::{decode_u64, encode_u64};

use thiserror::Error;

const SEP: u8 = 0x00;
const ESCAPE: u8 = 0xFF;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyCodecError {
	#[error("truncated key: expected escape or separator after 0x00")]
	Truncated,
	#[error("invalid escape sequence after 0x00")]
	InvalidEscape,
	#[error("decoded part is not valid UTF-8: {0}")]
	InvalidUtf8(String),
	#[error("invalid fixed-width number: {0}")]
	InvalidNumber(String),
}

/// Encodes a sequence of key parts into its functional representation.
pub fn encode_parts<S: AsRef<str>>(parts: &[S]) -> Vec<u8> {
	let mut out = Vec::new();
	for part in parts {
		encode_part_into(part.as_ref(), &mut out);
	}
	out
}

fn encode_part_into(part: &str, out: &mut Vec<u8>) {
	for &byte in part.as_bytes() {
		if byte == SEP {
			out.push(SEP);
			out.push(ESCAPE);
		} else {
			out.push(byte);
		}
	}
	out.push(SEP);
}

/// Decodes a functional representation back into its constituent parts.
/// The inverse of [`encode_parts`]; used by storage drivers that must
/// recover the original sort key from a stored row key.
pub fn decode_parts(mut bytes: &[u8]) -> Result<Vec<String>, KeyCodecError> {
	let mut parts = Vec::new();
	while !bytes.is_empty() {
		let mut raw = Vec::new();
		loop {
			match bytes.first() {
				None => return Err(KeyCodecError::Truncated),
				Some(&SEP) => {
					match bytes.get(1) {
						Some(&ESCAPE) => {
							raw.push(SEP);
							bytes = &bytes[2..];
						}
						None | Some(_) => {
							// Bare separator (or separator followed by anything
							// other than the escape marker) ends the part.
							bytes = &bytes[1..];
							break;
						}
					}
				}
				Some(&byte) => {
					raw.push(byte);
					bytes = &bytes[1..];
				}
			}
		}
		let part = String::from_utf8(raw).map_err(|e| KeyCodecError::InvalidUtf8(e.to_string()))?;
		parts.push(part);
	}
	Ok(parts)
}

/// Encodes `head` as full parts (each terminated, as in [`encode_parts`])
/// followed by `last` escaped but **not** terminated. The result is a byte
/// prefix shared by every key whose corresponding element starts with
/// `last` — used by loose `sortKeyTo` matching (§4.8), where the final
/// element is a prefix rather than an exact match.
pub fn encode_prefix<S: AsRef<str>>(head: &[S], last: &str) -> Vec<u8> {
	let mut out = encode_parts(head);
	for &byte in last.as_bytes() {
		if byte == SEP {
			out.push(SEP);
			out.push(ESCAPE);
		} else {
			out.push(byte);
		}
	}
	out
}

/// True when `child` is `parent` extended with at least one more part, per
/// the §4.8 tree-child inclusion rule (`to=[A]` includes `[A,B]`).
pub fn is_child_of(parent: &[u8], candidate: &[u8]) -> bool {
	candidate.len() > parent.len() && candidate.starts_with(parent)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_parts() {
		let parts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
		let encoded = encode_parts(&parts);
		assert_eq!(decode_parts(&encoded).unwrap(), parts);
	}

	#[test]
	fn round_trips_embedded_nul() {
		let parts = vec!["a\0b".to_string(), "".to_string()];
		let encoded = encode_parts(&parts);
		assert_eq!(decode_parts(&encoded).unwrap(), parts);
	}

	#[test]
	fn empty_parts_round_trip() {
		let empty: Vec<String> = vec![];
		assert_eq!(encode_parts::<String>(&empty), Vec::<u8>::new());
		assert_eq!(decode_parts(&[]).unwrap(), empty);
	}

	#[test]
	fn ordering_matches_tree_property() {
		let a = encode_parts(&["A"]);
		let ab = encode_parts(&["A", "B"]);
		let aa_b = encode_parts(&["AA", "B"]);
		let b = encode_parts(&["B"]);

		assert!(a < ab, "[A] must sort before [A,B]");
		assert!(ab < aa_b, "[A,B] must sort before [AA,B]");
		assert!(aa_b < b, "[AA,B] must sort before [B]");
		assert!(is_child_of(&a, &ab));
		assert!(!is_child_of(&a, &aa_b));
	}

	#[test]
	fn child_of_requires_strictly_longer() {
		let a = encode_parts(&["A"]);
		assert!(!is_child_of(&a, &a));
	}

	#[test]
	fn prefix_is_shared_by_extensions_of_last_element() {
		let prefix = encode_prefix(&["A"], "B");
		let exact = encode_parts(&["A", "B"]);
		let extended = encode_parts(&["A", "Bcd"]);
		let child = encode_parts(&["A", "B", "C"]);
		let unrelated = encode_parts(&["A", "C"]);

		assert!(exact.starts_with(&prefix));
		assert!(extended.starts_with(&prefix));
		assert!(child.starts_with(&prefix));
		assert!(!unrelated.starts_with(&prefix));
	}
}
