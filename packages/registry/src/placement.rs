use serde::{Deserialize, Serialize};

/// `{version, bindIdx, sticky}` (§3 "Placement record"). `version` is a
/// lexicographically-comparable opaque string; a push carrying a
/// lex-greater version always supersedes older placement info for the
/// same type, even when the other fields happen to match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
	pub version: String,
	pub bind_idx: Option<i64>,
	pub sticky: bool,
}

impl Default for Placement {
	fn default() -> Self {
		Placement {
			version: String::new(),
			bind_idx: None,
			sticky: false,
		}
	}
}

impl Placement {
	pub fn supersedes(&self, other: &Placement) -> bool {
		self.version > other.version
	}

	/// Resolves `bind_idx` against an actor id's parts, honoring negative
	/// (from-the-end) indices. Returns `None` if the index is out of
	/// range for this id.
	pub fn bound_application<'a>(&self, actor_id: &'a [String]) -> Option<&'a str> {
		let idx = self.bind_idx?;
		let len = actor_id.len() as i64;
		let resolved = if idx < 0 { len + idx } else { idx };
		if resolved < 0 || resolved >= len {
			return None;
		}
		Some(actor_id[resolved as usize].as_str())
	}
}
