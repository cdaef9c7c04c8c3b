use filterexpr::Expr;
use rt_error::{ActionError, FrameworkError};
use sortkey::{SortKeyBound, ToMatch};

use crate::constraint::KeyConstraint;

/// Translates a `keys` constraint list into a sort-key range plus, for the
/// two substring operators that a byte-ordered range can't express, a
/// residual [`Expr`] to post-filter the matched rows (§4.9, "translate
/// `eq` on prefix positions plus a range on the last position into a
/// §4.8 sort-key query").
pub fn translate_keys(keys: &[KeyConstraint]) -> Result<(SortKeyBound, Option<Expr>), ActionError> {
	let Some((last, head)) = keys.split_last() else {
		return Ok((SortKeyBound::default(), None));
	};

	let mut prefix = Vec::with_capacity(head.len());
	for constraint in head {
		match constraint {
			KeyConstraint::Eq(value) => prefix.push(value.clone()),
			_ => {
				return Err(FrameworkError::UnexpectedError {
					message: "only the last key constraint may be a non-eq operator".to_string(),
				}
				.into_action_error())
			}
		}
	}

	let prefix_to = |values: &[String]| -> (Vec<String>, ToMatch) {
		let mut v = prefix.clone();
		v.extend_from_slice(values);
		(v, ToMatch::Loose)
	};

	let (bound, residual) = match last {
		KeyConstraint::Eq(value) => {
			let mut node = prefix.clone();
			node.push(value.clone());
			(
				SortKeyBound {
					from: Some(node.clone()),
					to: Some((node, ToMatch::Strict)),
				},
				None,
			)
		}
		KeyConstraint::Lte(value) => (
			SortKeyBound {
				from: if prefix.is_empty() { None } else { Some(prefix.clone()) },
				to: Some(prefix_to(std::slice::from_ref(value))),
			},
			None,
		),
		KeyConstraint::Gte(value) => {
			let mut node = prefix.clone();
			node.push(value.clone());
			(
				SortKeyBound {
					from: Some(node),
					to: if prefix.is_empty() { None } else { Some((prefix.clone(), ToMatch::Loose)) },
				},
				None,
			)
		}
		KeyConstraint::Prefix(value) => {
			let mut node = prefix.clone();
			node.push(value.clone());
			(
				SortKeyBound {
					from: Some(node.clone()),
					to: Some((node, ToMatch::Loose)),
				},
				None,
			)
		}
		KeyConstraint::Between(from_value, to_value) => {
			let mut from_node = prefix.clone();
			from_node.push(from_value.clone());
			(
				SortKeyBound {
					from: Some(from_node),
					to: Some(prefix_to(std::slice::from_ref(to_value))),
				},
				None,
			)
		}
		KeyConstraint::Contains(needle) => {
			let bound = subtree_bound(&prefix);
			// No sort-key offset is applied when the backend evaluates this
			// filter, so the index must be absolute: the constrained field
			// sits right after the `prefix.len()` leading eq segments.
			let residual = Expr::Contains(Box::new(Expr::Sk(prefix.len() as i64)), Box::new(Expr::Literal(needle.as_str().into())));
			(bound, Some(residual))
		}
		KeyConstraint::ContainsNi(needle) => {
			let bound = subtree_bound(&prefix);
			let residual = Expr::ContainsNi(Box::new(Expr::Sk(prefix.len() as i64)), Box::new(Expr::Literal(needle.as_str().into())));
			(bound, Some(residual))
		}
	};

	Ok((bound, residual))
}

fn subtree_bound(prefix: &[String]) -> SortKeyBound {
	if prefix.is_empty() {
		SortKeyBound::default()
	} else {
		SortKeyBound {
			from: Some(prefix.to_vec()),
			to: Some((prefix.to_vec(), ToMatch::Loose)),
		}
	}
}

/// Whether every constraint but the last is `Eq` — the shape §4.9
/// requires for a translatable key list.
pub fn is_translatable(keys: &[KeyConstraint]) -> bool {
	match keys.split_last() {
		None => true,
		Some((_, head)) => head.iter().all(KeyConstraint::is_eq),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use keycodec::encode_parts;
	use sortkey::EncodedBound;

	fn parts(strs: &[&str]) -> Vec<String> {
		strs.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn eq_prefix_plus_between_scopes_to_that_prefix() {
		let keys = vec![KeyConstraint::Eq("US".to_string()), KeyConstraint::Between("100".to_string(), "200".to_string())];
		let (bound, residual) = translate_keys(&keys).unwrap();
		assert!(residual.is_none());
		let encoded = EncodedBound::new(&bound);
		assert!(!encoded.includes(&encode_parts(&parts(&["FR", "999"]))));
		assert!(encoded.includes(&encode_parts(&parts(&["US", "150"]))));
		assert!(!encoded.includes(&encode_parts(&parts(&["US", "999"]))));
	}

	#[test]
	fn gte_caps_at_prefix_subtree() {
		let keys = vec![KeyConstraint::Eq("US".to_string()), KeyConstraint::Gte("100".to_string())];
		let (bound, _) = translate_keys(&keys).unwrap();
		let encoded = EncodedBound::new(&bound);
		assert!(encoded.includes(&encode_parts(&parts(&["US", "999"]))));
		assert!(!encoded.includes(&encode_parts(&parts(&["FR", "999"]))));
	}

	#[test]
	fn non_eq_before_last_position_is_rejected() {
		let keys = vec![KeyConstraint::Gte("a".to_string()), KeyConstraint::Eq("b".to_string())];
		assert!(translate_keys(&keys).is_err());
		assert!(!is_translatable(&keys));
	}

	#[test]
	fn contains_falls_back_to_subtree_scan_with_residual_filter() {
		let keys = vec![KeyConstraint::Eq("US".to_string()), KeyConstraint::ContainsNi("coffee".to_string())];
		let (bound, residual) = translate_keys(&keys).unwrap();
		assert!(residual.is_some());
		let encoded = EncodedBound::new(&bound);
		assert!(encoded.includes(&encode_parts(&parts(&["US", "Coffee Society"]))));
	}
}
