use rt_error::{ActionError, FrameworkError};

/// One `{specifier-glob, compartment-template}` entry (§4.7). The glob's
/// `*` segments capture one path segment each, `**` captures all
/// remaining segments as one joined string; the template consumes
/// captures in order via `${*}`/`${**}` placeholders.
#[derive(Debug, Clone)]
pub struct CompartmentRule {
	pub specifier_glob: String,
	pub compartment_template: String,
}

/// One `{compartment-glob, actorType}` entry (§4.7).
#[derive(Debug, Clone)]
pub struct HandlerRule {
	pub compartment_glob: String,
	pub actor_type: String,
}

/// First-match glob over `/`-separated segments. `**` is only supported
/// as the final pattern segment, where it greedily captures everything
/// left in the subject — the one shape §4.7's routing tables actually
/// need (compartment templates put their catch-all at the end).
fn capture(pattern: &str, subject: &str) -> Option<Vec<String>> {
	let pattern_segments: Vec<&str> = pattern.split('/').collect();
	let subject_segments: Vec<&str> = subject.split('/').collect();

	let mut captures = Vec::new();
	for (i, pat) in pattern_segments.iter().enumerate() {
		if *pat == "**" {
			if i != pattern_segments.len() - 1 {
				return None;
			}
			if i > subject_segments.len() {
				return None;
			}
			captures.push(subject_segments[i..].join("/"));
			return Some(captures);
		}

		let subject_seg = subject_segments.get(i)?;
		if *pat == "*" {
			captures.push((*subject_seg).to_string());
		} else if pat != subject_seg {
			return None;
		}
	}

	if pattern_segments.len() != subject_segments.len() {
		return None;
	}
	Some(captures)
}

fn render(template: &str, captures: &[String]) -> String {
	let mut out = String::with_capacity(template.len());
	let mut rest = template;
	let mut next_capture = captures.iter();
	loop {
		match rest.find("${*}").map(|i| (i, 4)).or_else(|| rest.find("${**}").map(|i| (i, 5))) {
			None => {
				out.push_str(rest);
				break;
			}
			Some((idx, len)) => {
				out.push_str(&rest[..idx]);
				if let Some(value) = next_capture.next() {
					out.push_str(value);
				}
				rest = &rest[idx + len..];
			}
		}
	}
	out
}

pub fn resolve_compartment(rules: &[CompartmentRule], specifier: &str) -> Result<String, ActionError> {
	for rule in rules {
		if let Some(captures) = capture(&rule.specifier_glob, specifier) {
			return Ok(render(&rule.compartment_template, &captures));
		}
	}
	Err(FrameworkError::NoCompartment {
		specifier: specifier.to_string(),
	}
	.into_action_error())
}

pub fn resolve_handler(rules: &[HandlerRule], compartment: &str) -> Result<String, ActionError> {
	for rule in rules {
		if capture(&rule.compartment_glob, compartment).is_some() {
			return Ok(rule.actor_type.clone());
		}
	}
	Err(FrameworkError::NoHandler {
		compartment: compartment.to_string(),
	}
	.into_action_error())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn single_star_captures_one_segment() {
		let rules = vec![CompartmentRule {
			specifier_glob: "tenants/*/profile".to_string(),
			compartment_template: "tenant-${*}-profiles".to_string(),
		}];
		assert_eq!(resolve_compartment(&rules, "tenants/acme/profile").unwrap(), "tenant-acme-profiles");
	}

	#[test]
	fn double_star_captures_remaining_path() {
		let rules = vec![CompartmentRule {
			specifier_glob: "logs/**".to_string(),
			compartment_template: "logs-${**}".to_string(),
		}];
		assert_eq!(resolve_compartment(&rules, "logs/2026/07/26").unwrap(), "logs-2026/07/26");
	}

	#[test]
	fn first_match_wins() {
		let rules = vec![
			CompartmentRule {
				specifier_glob: "tenants/acme/*".to_string(),
				compartment_template: "acme-special".to_string(),
			},
			CompartmentRule {
				specifier_glob: "tenants/*/*".to_string(),
				compartment_template: "generic-${*}".to_string(),
			},
		];
		assert_eq!(resolve_compartment(&rules, "tenants/acme/profile").unwrap(), "acme-special");
	}

	#[test]
	fn unresolved_specifier_fails() {
		let rules = vec![CompartmentRule {
			specifier_glob: "tenants/*/profile".to_string(),
			compartment_template: "tenant-${*}".to_string(),
		}];
		let err = resolve_compartment(&rules, "other/path").unwrap_err();
		assert_eq!(err.code, "NO_COMPARTMENT");
	}

	#[test]
	fn unresolved_compartment_fails() {
		let rules: Vec<HandlerRule> = vec![];
		let err = resolve_handler(&rules, "tenant-acme-profiles").unwrap_err();
		assert_eq!(err.code, "NO_HANDLER");
	}
}
