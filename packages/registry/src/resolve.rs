use rt_error::{ActionError, FrameworkError};

use crate::snapshot::ActorInfo;

/// Picks the destination application for one call, applying the §4.5
/// placement rules in order: a `bindIdx` pin is mandatory (wrong/absent
/// application fails fast rather than falling back), otherwise the
/// sticky hint is tried once before falling back to any hosting
/// application.
pub fn resolve_destination(
	actor_type: &str,
	info: Option<&ActorInfo>,
	actor_id: &[String],
	sticky_hint: Option<&str>,
) -> Result<String, ActionError> {
	let no_receivers = || {
		FrameworkError::NoReceiversAvailable {
			actor_type: actor_type.to_string(),
		}
		.into_action_error()
	};

	let info = info.ok_or_else(no_receivers)?;

	if let Some(bound) = info.placement.bound_application(actor_id) {
		return if info.hosts(bound) {
			Ok(bound.to_string())
		} else {
			Err(no_receivers())
		};
	}

	if info.placement.sticky {
		if let Some(hint) = sticky_hint {
			if info.hosts(hint) {
				return Ok(hint.to_string());
			}
		}
	}

	info.applications.first().cloned().ok_or_else(no_receivers)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::placement::Placement;

	fn info(applications: &[&str], placement: Placement) -> ActorInfo {
		ActorInfo {
			applications: applications.iter().map(|s| s.to_string()).collect(),
			placement,
		}
	}

	#[test]
	fn bind_idx_pins_and_requires_hosting() {
		let placement = Placement {
			version: "1".to_string(),
			bind_idx: Some(-1),
			sticky: false,
		};
		let hosted = info(&["shard-7"], placement.clone());
		let id = vec!["Counter".to_string(), "shard-7".to_string()];
		assert_eq!(resolve_destination("Counter", Some(&hosted), &id, None).unwrap(), "shard-7");

		let not_hosted = info(&["shard-9"], placement);
		let err = resolve_destination("Counter", Some(&not_hosted), &id, None).unwrap_err();
		assert_eq!(err.code, "NO_RECEIVERS_AVAILABLE");
	}

	#[test]
	fn sticky_hint_is_preferred_when_hosted() {
		let placement = Placement {
			version: "1".to_string(),
			bind_idx: None,
			sticky: true,
		};
		let hosting = info(&["app-1", "app-2"], placement);
		let id = vec!["Counter".to_string(), "1".to_string()];
		assert_eq!(
			resolve_destination("Counter", Some(&hosting), &id, Some("app-2")).unwrap(),
			"app-2"
		);
	}

	#[test]
	fn sticky_hint_not_hosted_falls_back_to_any_host() {
		let placement = Placement {
			version: "1".to_string(),
			bind_idx: None,
			sticky: true,
		};
		let hosting = info(&["app-1"], placement);
		let id = vec!["Counter".to_string(), "1".to_string()];
		assert_eq!(
			resolve_destination("Counter", Some(&hosting), &id, Some("app-9")).unwrap(),
			"app-1"
		);
	}

	#[test]
	fn no_hosting_application_fails() {
		let placement = Placement {
			version: "1".to_string(),
			bind_idx: None,
			sticky: false,
		};
		let empty = info(&[], placement);
		let id = vec!["Counter".to_string(), "1".to_string()];
		let err = resolve_destination("Counter", Some(&empty), &id, None).unwrap_err();
		assert_eq!(err.code, "NO_RECEIVERS_AVAILABLE");
	}

	#[test]
	fn unknown_type_fails() {
		let id = vec!["Counter".to_string(), "1".to_string()];
		let err = resolve_destination("Counter", None, &id, None).unwrap_err();
		assert_eq!(err.code, "NO_RECEIVERS_AVAILABLE");
	}
}
