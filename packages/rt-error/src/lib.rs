//! The structured error taxonomy shared by every subsystem (§7 of the
//! specification): a tagged `kind` (framework vs. application), a stable
//! `code`, a human `template` with `[Name]` placeholders, the substitution
//! `parameters`, and an optional `nested` chain so hop-by-hop context
//! survives a round trip over the transport.

// Lets the `#[derive(ActionError)]` macro refer to `rt_error::ActionErrorInfo`
// uniformly whether it's invoked from this crate (for `FrameworkError`
// itself) or from a downstream crate.
extern crate self as rt_error;

use std::collections::BTreeMap;
use std::fmt;

pub use rt_error_macros::ActionError as DeriveActionError;

/// Implemented by the `#[derive(ActionError)]` macro for a group-of-errors
/// enum. `code()` is the stable wire code; `template()` is the raw,
/// unsubstituted human message; `parameters()` reflects the variant's named
/// fields as strings for substitution and for wire transport.
pub trait ActionErrorInfo {
	fn code(&self) -> String;
	fn template(&self) -> &'static str;
	fn parameters(&self) -> BTreeMap<String, String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
	Framework,
	Application,
}

/// The wire shape described in §6: `{kind, code, message, template,
/// parameters, nested, stack}`. `message` is `template` with every
/// `[Name]` placeholder substituted from `parameters`; `template` is kept
/// alongside so a caller in a different locale/version can re-render it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ActionError {
	pub kind: ErrorKind,
	pub code: String,
	pub message: String,
	pub template: String,
	pub parameters: BTreeMap<String, String>,
	pub nested: Vec<ActionError>,
	pub stack: Option<String>,
}

impl ActionError {
	pub fn from_info(kind: ErrorKind, info: &impl ActionErrorInfo) -> Self {
		let template = info.template().to_string();
		let parameters = info.parameters();
		let message = render_template(&template, &parameters);
		ActionError {
			kind,
			code: info.code(),
			message,
			template,
			parameters,
			nested: Vec::new(),
			stack: None,
		}
	}

	pub fn framework(info: &impl ActionErrorInfo) -> Self {
		Self::from_info(ErrorKind::Framework, info)
	}

	pub fn application(info: &impl ActionErrorInfo) -> Self {
		Self::from_info(ErrorKind::Application, info)
	}

	/// Wraps an arbitrary application panic/error that doesn't implement
	/// `ActionErrorInfo` — used by the instance wrapper when catching a
	/// synchronous panic from inner application code (§7, "local
	/// recovery").
	pub fn opaque_application(code: impl Into<String>, message: impl Into<String>) -> Self {
		let message = message.into();
		ActionError {
			kind: ErrorKind::Application,
			code: code.into(),
			template: message.clone(),
			message,
			parameters: BTreeMap::new(),
			nested: Vec::new(),
			stack: None,
		}
	}

	pub fn with_nested(mut self, nested: ActionError) -> Self {
		self.nested.push(nested);
		self
	}

	pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
		self.stack = Some(stack.into());
		self
	}

	pub fn is_framework(&self) -> bool {
		matches!(self.kind, ErrorKind::Framework)
	}

	/// Whether a caller should retry this error per §7's retry policy.
	/// Only meaningful for framework errors carrying one of the known
	/// framework codes; application errors and unrecognized codes are
	/// never retried. `FRAMEWORK_ERROR` is the fourth class §7/§4.6 call
	/// out alongside `FINALIZING`/`ACTOR_LOCK_FAILED`/`UNKNOWN_ACTOR_TYPE`:
	/// a generic transport-level failure rather than a specific named one.
	pub fn is_retryable(&self) -> bool {
		if !self.is_framework() {
			return false;
		}
		matches!(
			self.code.as_str(),
			"FINALIZING" | "ACTOR_LOCK_FAILED" | "UNKNOWN_ACTOR_TYPE" | "FRAMEWORK_ERROR"
		)
	}

	pub fn is_redirect(&self) -> bool {
		self.code == "REDIRECT_DESTINATION"
	}

	pub fn redirect_destination(&self) -> Option<&str> {
		if self.is_redirect() {
			self.parameters.get("destination").map(|s| s.as_str())
		} else {
			None
		}
	}
}

impl fmt::Display for ActionError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}] {}", self.code, self.message)
	}
}

impl std::error::Error for ActionError {}

/// Replaces every `[Name]` occurrence in `template` with
/// `parameters["Name"]` (case-sensitive, matching the field name exactly).
/// Unknown placeholders are left verbatim rather than panicking — a
/// mismatched template/parameters pair should degrade to a slightly ugly
/// message, not crash the caller.
pub fn render_template(template: &str, parameters: &BTreeMap<String, String>) -> String {
	let mut out = String::with_capacity(template.len());
	let mut chars = template.char_indices().peekable();
	let bytes = template.as_bytes();
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] == b'[' {
			if let Some(end) = template[i + 1..].find(']') {
				let name = &template[i + 1..i + 1 + end];
				if let Some(value) = parameters.get(name) {
					out.push_str(value);
					i = i + 1 + end + 1;
					continue;
				}
			}
		}
		let ch = template[i..].chars().next().unwrap();
		out.push(ch);
		i += ch.len_utf8();
	}
	let _ = &mut chars;
	out
}

/// Framework error codes, exhaustive per §6 plus the two internal variants
/// referenced in §4.1/§4.2 (`LOCK_FAILED`, `UNKNOWN_INSTANCE`) that never
/// cross the wire as a *request* outcome by themselves but are folded into
/// `FRAMEWORK_ERROR`/`UNKNOWN_ACTION`-shaped responses at the proxy boundary.
#[derive(DeriveActionError, Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum FrameworkError {
	#[error("FRAMEWORK_ERROR", "Framework error.")]
	FrameworkError,

	#[error("UNEXPECTED_ERROR", "Unexpected error: [message]")]
	UnexpectedError { message: String },

	#[error("NO_RECEIVERS_AVAILABLE", "No application currently hosts actor type [actor_type].")]
	NoReceiversAvailable { actor_type: String },

	#[error("INVOKE_ERROR", "Invocation did not complete within the deadline after [attempts] attempts.")]
	InvokeError { attempts: String },

	#[error("UNKNOWN_ACTION", "Actor type [actor_type] has no action named [action_name].")]
	UnknownAction {
		actor_type: String,
		action_name: String,
	},

	#[error("UNKNOWN_ACTOR_TYPE", "No actor type named [actor_type] is registered here.")]
	UnknownActorType { actor_type: String },

	#[error("ACTOR_LOCK_FAILED", "Failed to acquire the distributed lock for actor [actor_id]; current holder is [holder].")]
	ActorLockFailed { actor_id: String, holder: String },

	#[error("FINALIZING", "Actor [actor_id] is finalizing and cannot accept new calls.")]
	Finalizing { actor_id: String },

	#[error("ACTIVATION_FAILED", "Activation of actor [actor_id] failed: [reason]")]
	ActivationFailed { actor_id: String, reason: String },

	#[error("DEACTIVATED", "Actor [actor_id] has been deactivated.")]
	Deactivated { actor_id: String },

	#[error("REDIRECT_DESTINATION", "Redirect to [destination]")]
	RedirectDestination { destination: String },

	#[error("NO_COMPARTMENT", "No compartment configured for specifier [specifier].")]
	NoCompartment { specifier: String },

	#[error("NO_HANDLER", "No handler configured for compartment [compartment].")]
	NoHandler { compartment: String },

	#[error("BASELINE_MISMATCH", "Baseline [provided] does not match stored baseline [stored].")]
	BaselineMismatch { provided: String, stored: String },

	#[error("VERSION_CONFLICT", "Version [provided] is not greater than stored version [stored].")]
	VersionConflict { provided: String, stored: String },

	#[error("LOCK_FAILED", "Could not acquire the instance lock for [actor_id] within the internal deadline.")]
	LockFailed { actor_id: String },

	#[error("UNKNOWN_INSTANCE", "No instance [id] exists for actor type [actor_type].")]
	UnknownInstance { actor_type: String, id: String },
}

impl FrameworkError {
	pub fn into_action_error(self) -> ActionError {
		ActionError::framework(&self)
	}
}

impl From<FrameworkError> for ActionError {
	fn from(err: FrameworkError) -> Self {
		err.into_action_error()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn renders_placeholders() {
		let mut params = BTreeMap::new();
		params.insert("actor_type".to_string(), "Counter".to_string());
		let err = FrameworkError::UnknownActorType {
			actor_type: "Counter".to_string(),
		};
		let action_err: ActionError = err.into();
		assert_eq!(action_err.code, "UNKNOWN_ACTOR_TYPE");
		assert_eq!(
			action_err.message,
			"No actor type named Counter is registered here."
		);
		let _ = params;
	}

	#[test]
	fn retry_classification() {
		let retry: ActionError = FrameworkError::Finalizing {
			actor_id: "a".into(),
		}
		.into();
		assert!(retry.is_retryable());

		let no_retry: ActionError = FrameworkError::BaselineMismatch {
			provided: "1".into(),
			stored: "2".into(),
		}
		.into();
		assert!(!no_retry.is_retryable());

		let transport_error: ActionError = FrameworkError::FrameworkError.into();
		assert!(transport_error.is_retryable());

		let redirect: ActionError = FrameworkError::RedirectDestination {
			destination: "node-2".into(),
		}
		.into();
		assert!(redirect.is_redirect());
		assert_eq!(redirect.redirect_destination(), Some("node-2"));
	}

	#[test]
	fn unknown_placeholder_left_verbatim() {
		let mut params = BTreeMap::new();
		params.insert("known".to_string(), "x".to_string());
		let rendered = render_template("has [known] and [missing]", &params);
		assert_eq!(rendered, "has x and [missing]");
	}
}
