use serde_json::{Map, Value};

/// One `+field`/`-field` entry in a `projectionFilter` (§4.8). `Include`
/// entries switch the projection into allow-list mode; any `Exclude`
/// then subtracts from whatever survived.
#[derive(Debug, Clone)]
pub enum ProjectionEntry {
	Include(String),
	Exclude(String),
}

/// Applies a `projectionFilter` to a structured value. Opaque (non-object)
/// values bypass projection entirely, per §4.8.
pub fn project(value: &Value, entries: &[ProjectionEntry]) -> Value {
	let Value::Object(fields) = value else {
		return value.clone();
	};

	let includes: Vec<&str> = entries
		.iter()
		.filter_map(|e| match e {
			ProjectionEntry::Include(name) => Some(name.as_str()),
			ProjectionEntry::Exclude(_) => None,
		})
		.collect();

	let mut kept: Map<String, Value> = if includes.is_empty() {
		fields.clone()
	} else {
		fields
			.iter()
			.filter(|(key, _)| includes.contains(&key.as_str()))
			.map(|(k, v)| (k.clone(), v.clone()))
			.collect()
	};

	for entry in entries {
		if let ProjectionEntry::Exclude(name) = entry {
			kept.remove(name);
		}
	}

	Value::Object(kept)
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn include_only_switches_to_allow_list() {
		let value = json!({"a": 1, "b": 2, "c": 3});
		let entries = vec![ProjectionEntry::Include("a".to_string()), ProjectionEntry::Include("b".to_string())];
		let projected = project(&value, &entries);
		assert_eq!(projected, json!({"a": 1, "b": 2}));
	}

	#[test]
	fn exclude_subtracts_after_include() {
		let value = json!({"a": 1, "b": 2, "c": 3});
		let entries = vec![
			ProjectionEntry::Include("a".to_string()),
			ProjectionEntry::Include("b".to_string()),
			ProjectionEntry::Exclude("b".to_string()),
		];
		let projected = project(&value, &entries);
		assert_eq!(projected, json!({"a": 1}));
	}

	#[test]
	fn exclude_only_removes_from_full_set() {
		let value = json!({"a": 1, "b": 2});
		let entries = vec![ProjectionEntry::Exclude("b".to_string())];
		let projected = project(&value, &entries);
		assert_eq!(projected, json!({"a": 1}));
	}

	#[test]
	fn non_object_values_bypass_projection() {
		let value = json!("opaque-buffer");
		let entries = vec![ProjectionEntry::Include("a".to_string())];
		assert_eq!(project(&value, &entries), value);
	}
}
