use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use backoff::{BackOffSession, ExponentialBackOff};
use futures_util::FutureExt;
use moka::future::Cache;
use registry::{resolve_destination, Registry};
use rt_error::{ActionError, FrameworkError};
use serde_json::Value;
use tokio::time::Instant;

use crate::aborter::Aborter;
use crate::attempt::{render_attempts, Attempt};
use crate::metrics;
use crate::proxy::Proxy;
use crate::request::ActorCallRequest;
use crate::transport::Transport;

const DEFAULT_PER_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_OVERALL_DEADLINE: Duration = Duration::from_secs(60);
const REDIRECT_HOP_CAP: usize = 3;
const STICKY_CACHE_TTL: Duration = Duration::from_secs(600);

/// §4.6 step 3 / §7: retry on `FINALIZING`, `ACTOR_LOCK_FAILED`,
/// `UNKNOWN_ACTOR_TYPE` (transient registry lag), and generic
/// transport-level failures, which surface as `FRAMEWORK_ERROR` (see
/// [`Portal::call_transport`]).
fn is_transient(err: &ActionError) -> bool {
	err.is_framework()
		&& matches!(
			err.code.as_str(),
			"FINALIZING" | "ACTOR_LOCK_FAILED" | "UNKNOWN_ACTOR_TYPE" | "FRAMEWORK_ERROR"
		)
}

/// Drives the invocation protocol of §4.6: resolve a destination,
/// transport the call with a per-attempt timeout and abort handle, retry
/// transient errors with backoff up to an overall deadline, follow
/// redirects up to a hop cap, and surface application errors unchanged.
pub struct Portal {
	registry: Arc<Registry>,
	transport: Arc<dyn Transport>,
	per_attempt_timeout: Duration,
	overall_deadline: Duration,
	backoff_policy: ExponentialBackOff,
	sticky_destinations: Cache<String, String>,
}

impl Portal {
	pub fn new(registry: Arc<Registry>, transport: Arc<dyn Transport>) -> Arc<Self> {
		Self::with_timeouts(registry, transport, DEFAULT_PER_ATTEMPT_TIMEOUT, DEFAULT_OVERALL_DEADLINE)
	}

	pub fn with_timeouts(
		registry: Arc<Registry>,
		transport: Arc<dyn Transport>,
		per_attempt_timeout: Duration,
		overall_deadline: Duration,
	) -> Arc<Self> {
		Arc::new(Portal {
			registry,
			transport,
			per_attempt_timeout,
			overall_deadline,
			backoff_policy: ExponentialBackOff::default(),
			sticky_destinations: Cache::builder().time_to_live(STICKY_CACHE_TTL).max_capacity(100_000).build(),
		})
	}

	/// `retrieve(type, id)` — §4.6.
	pub fn retrieve(self: &Arc<Self>, actor_type: impl Into<String>, actor_id: Vec<String>) -> Proxy {
		Proxy::new(self.clone(), actor_type.into(), actor_id)
	}

	/// `typed(type)` sub-view — defers the actor id to each retrieve call.
	pub fn typed(self: &Arc<Self>, actor_type: impl Into<String>) -> TypedPortal {
		TypedPortal {
			portal: self.clone(),
			actor_type: actor_type.into(),
		}
	}

	/// `prefix(prefix)` sub-view — every retrieve call appends its
	/// suffix onto a fixed leading id prefix (e.g. sharding by a known
	/// partition part).
	pub fn prefix(self: &Arc<Self>, actor_type: impl Into<String>, prefix: Vec<String>) -> PrefixPortal {
		PrefixPortal {
			portal: self.clone(),
			actor_type: actor_type.into(),
			prefix,
		}
	}

	fn sticky_key(actor_type: &str, actor_id: &[String]) -> String {
		format!("{actor_type}/{}", actor_id.join("/"))
	}

	pub(crate) async fn invoke(
		&self,
		actor_type: &str,
		actor_id: &[String],
		action_name: &str,
		arguments: Vec<Value>,
		aborter: Option<Aborter>,
	) -> Result<Value, ActionError> {
		let invoke_start = Instant::now();
		let deadline = Instant::now() + self.overall_deadline;
		let cancel = aborter.as_ref().map(|a| a.token());
		let mut backoff = BackOffSession::new(self.backoff_policy, deadline);
		if let Some(token) = cancel.clone() {
			backoff = backoff.with_aborter(token);
		}

		let sticky_key = Self::sticky_key(actor_type, actor_id);
		let mut destination = self.resolve(actor_type, actor_id, &sticky_key).await?;
		let mut redirects = 0usize;
		let mut attempts: Vec<Attempt> = Vec::new();

		loop {
			if Instant::now() >= deadline {
				metrics::INVOKE_TOTAL.with_label_values(&["deadline_exceeded"]).inc();
				metrics::INVOKE_DURATION.observe(invoke_start.elapsed().as_secs_f64());
				return Err(self.invoke_error(attempts));
			}

			let request = ActorCallRequest {
				actor_type: actor_type.to_string(),
				actor_id: actor_id.to_vec(),
				action_name: action_name.to_string(),
				arguments: arguments.clone(),
			};

			let attempt_start = Instant::now();
			let call = self.call_transport(&destination, &request);
			let outcome = match &cancel {
				Some(token) => {
					tokio::select! {
						result = tokio::time::timeout(self.per_attempt_timeout, call) => result,
						_ = token.cancelled() => {
							attempts.push(Attempt { destination: destination.clone(), outcome: "aborted".to_string(), elapsed: attempt_start.elapsed() });
							metrics::INVOKE_ATTEMPTS.with_label_values(&["aborted"]).inc();
							metrics::INVOKE_TOTAL.with_label_values(&["aborted"]).inc();
							metrics::INVOKE_DURATION.observe(invoke_start.elapsed().as_secs_f64());
							return Err(self.invoke_error(attempts));
						}
					}
				}
				None => tokio::time::timeout(self.per_attempt_timeout, call).await,
			};

			let elapsed = attempt_start.elapsed();

			match outcome {
				Err(_elapsed_timeout) => {
					attempts.push(Attempt {
						destination: destination.clone(),
						outcome: "timeout".to_string(),
						elapsed,
					});
					metrics::INVOKE_ATTEMPTS.with_label_values(&["timeout"]).inc();
					if !backoff.wait().await {
						metrics::INVOKE_TOTAL.with_label_values(&["backoff_exhausted"]).inc();
						metrics::INVOKE_DURATION.observe(invoke_start.elapsed().as_secs_f64());
						return Err(self.invoke_error(attempts));
					}
				}
				Ok(Ok(value)) => {
					self.sticky_destinations.insert(sticky_key, destination).await;
					metrics::INVOKE_ATTEMPTS.with_label_values(&["success"]).inc();
					metrics::INVOKE_TOTAL.with_label_values(&["success"]).inc();
					metrics::INVOKE_DURATION.observe(invoke_start.elapsed().as_secs_f64());
					return Ok(value);
				}
				Ok(Err(err)) if err.is_redirect() => {
					let next = err.redirect_destination().unwrap_or_default().to_string();
					attempts.push(Attempt {
						destination: destination.clone(),
						outcome: format!("redirect:{next}"),
						elapsed,
					});
					metrics::INVOKE_ATTEMPTS.with_label_values(&["redirect"]).inc();
					redirects += 1;
					if redirects > REDIRECT_HOP_CAP {
						metrics::INVOKE_TOTAL.with_label_values(&["redirect_cap_exceeded"]).inc();
						metrics::INVOKE_DURATION.observe(invoke_start.elapsed().as_secs_f64());
						return Err(self.invoke_error(attempts));
					}
					destination = next;
				}
				Ok(Err(err)) if is_transient(&err) => {
					attempts.push(Attempt {
						destination: destination.clone(),
						outcome: err.code.clone(),
						elapsed,
					});
					metrics::INVOKE_ATTEMPTS.with_label_values(&["transient"]).inc();
					if !backoff.wait().await {
						metrics::INVOKE_TOTAL.with_label_values(&["backoff_exhausted"]).inc();
						metrics::INVOKE_DURATION.observe(invoke_start.elapsed().as_secs_f64());
						return Err(self.invoke_error(attempts));
					}
				}
				Ok(Err(err)) => {
					metrics::INVOKE_ATTEMPTS.with_label_values(&["application_error"]).inc();
					metrics::INVOKE_TOTAL.with_label_values(&["application_error"]).inc();
					metrics::INVOKE_DURATION.observe(invoke_start.elapsed().as_secs_f64());
					return Err(err);
				}
			}
		}
	}

	/// Delivers one attempt through the injected [`Transport`], catching a
	/// panic from the transport implementation and converting it into the
	/// generic `FRAMEWORK_ERROR` code rather than letting it unwind past
	/// the portal — this is the "transport-level error" class §4.6 step 3
	/// and §7 list alongside the named framework codes.
	async fn call_transport(&self, destination: &str, request: &ActorCallRequest) -> Result<Value, ActionError> {
		match AssertUnwindSafe(self.transport.invoke(destination, request)).catch_unwind().await {
			Ok(result) => result,
			Err(_panic) => Err(FrameworkError::FrameworkError.into_action_error()),
		}
	}

	async fn resolve(&self, actor_type: &str, actor_id: &[String], sticky_key: &str) -> Result<String, ActionError> {
		let snapshot = self.registry.snapshot();
		let hint = self.sticky_destinations.get(sticky_key).await;
		resolve_destination(actor_type, snapshot.actor_info.get(actor_type), actor_id, hint.as_deref())
	}

	fn invoke_error(&self, attempts: Vec<Attempt>) -> ActionError {
		FrameworkError::InvokeError {
			attempts: render_attempts(&attempts),
		}
		.into_action_error()
	}
}

/// `typed(type)` view: binds the actor type, leaves the id per call.
pub struct TypedPortal {
	portal: Arc<Portal>,
	actor_type: String,
}

impl TypedPortal {
	pub fn retrieve(&self, actor_id: Vec<String>) -> Proxy {
		self.portal.retrieve(self.actor_type.clone(), actor_id)
	}
}

/// `prefix(prefix)` view: binds the actor type and a leading id prefix,
/// appends the suffix given to each retrieve call.
pub struct PrefixPortal {
	portal: Arc<Portal>,
	actor_type: String,
	prefix: Vec<String>,
}

impl PrefixPortal {
	pub fn retrieve(&self, suffix: Vec<String>) -> Proxy {
		let mut id = self.prefix.clone();
		id.extend(suffix);
		self.portal.retrieve(self.actor_type.clone(), id)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Mutex;

	use async_trait::async_trait;
	use registry::Placement;

	use super::*;

	struct ScriptedTransport {
		replies: Mutex<Vec<Result<Value, ActionError>>>,
		calls: AtomicUsize,
	}

	impl ScriptedTransport {
		fn new(replies: Vec<Result<Value, ActionError>>) -> Self {
			ScriptedTransport {
				replies: Mutex::new(replies),
				calls: AtomicUsize::new(0),
			}
		}
	}

	#[async_trait]
	impl Transport for ScriptedTransport {
		async fn invoke(&self, _destination: &str, _request: &ActorCallRequest) -> Result<Value, ActionError> {
			// Forces at least one extra poll so a concurrently-racing
			// abort signal is observed instead of winning select! on
			// tie-breaking alone.
			tokio::task::yield_now().await;
			self.calls.fetch_add(1, Ordering::SeqCst);
			let mut replies = self.replies.lock().unwrap();
			if replies.is_empty() {
				panic!("transport called more times than scripted");
			}
			replies.remove(0)
		}
	}

	fn placement() -> Placement {
		Placement {
			version: "1".to_string(),
			bind_idx: None,
			sticky: false,
		}
	}

	#[tokio::test]
	async fn no_receivers_fails_without_retry() {
		let registry = Arc::new(Registry::new());
		let transport = Arc::new(ScriptedTransport::new(vec![]));
		let portal = Portal::new(registry, transport.clone());

		let proxy = portal.retrieve("Counter", vec!["1".to_string()]);
		let err = proxy.call("increment", vec![]).await.unwrap_err();
		assert_eq!(err.code, "NO_RECEIVERS_AVAILABLE");
		assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn transient_error_retries_until_success() {
		let registry = Arc::new(Registry::new());
		registry.push("app-1", "Counter", placement());
		let transport = Arc::new(ScriptedTransport::new(vec![
			Err(FrameworkError::ActorLockFailed {
				actor_id: "Counter/1".to_string(),
				holder: "someone-else".to_string(),
			}
			.into_action_error()),
			Ok(Value::from(42)),
		]));
		let portal = Portal::new(registry, transport.clone());

		let proxy = portal.retrieve("Counter", vec!["1".to_string()]);
		let result = proxy.call("increment", vec![]).await.unwrap();
		assert_eq!(result, Value::from(42));
		assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn application_error_surfaces_without_retry() {
		let registry = Arc::new(Registry::new());
		registry.push("app-1", "Counter", placement());
		let transport = Arc::new(ScriptedTransport::new(vec![Err(ActionError::opaque_application(
			"BAD_INPUT",
			"bad input",
		))]));
		let portal = Portal::new(registry, transport.clone());

		let proxy = portal.retrieve("Counter", vec!["1".to_string()]);
		let err = proxy.call("increment", vec![]).await.unwrap_err();
		assert_eq!(err.code, "BAD_INPUT");
		assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn redirect_switches_destination_then_succeeds() {
		let registry = Arc::new(Registry::new());
		registry.push("app-1", "Counter", placement());
		let transport = Arc::new(ScriptedTransport::new(vec![
			Err(FrameworkError::RedirectDestination {
				destination: "app-2".to_string(),
			}
			.into_action_error()),
			Ok(Value::from(7)),
		]));
		let portal = Portal::new(registry, transport.clone());

		let proxy = portal.retrieve("Counter", vec!["1".to_string()]);
		let result = proxy.call("increment", vec![]).await.unwrap();
		assert_eq!(result, Value::from(7));
	}

	#[tokio::test(start_paused = true)]
	async fn redirect_loop_past_cap_fails() {
		let registry = Arc::new(Registry::new());
		registry.push("app-1", "Counter", placement());
		let redirect = || {
			Err(FrameworkError::RedirectDestination {
				destination: "app-1".to_string(),
			}
			.into_action_error())
		};
		let transport = Arc::new(ScriptedTransport::new(vec![redirect(), redirect(), redirect(), redirect(), redirect()]));
		let portal = Portal::new(registry, transport.clone());

		let proxy = portal.retrieve("Counter", vec!["1".to_string()]);
		let err = proxy.call("increment", vec![]).await.unwrap_err();
		assert_eq!(err.code, "INVOKE_ERROR");
	}

	#[tokio::test]
	async fn abort_stops_retrying_immediately() {
		let registry = Arc::new(Registry::new());
		registry.push("app-1", "Counter", placement());
		let transport = Arc::new(ScriptedTransport::new(vec![Err(FrameworkError::ActorLockFailed {
			actor_id: "Counter/1".to_string(),
			holder: "someone-else".to_string(),
		}
		.into_action_error())]));
		let portal = Portal::new(registry, transport.clone());

		let proxy = portal.retrieve("Counter", vec!["1".to_string()]);
		let aborter = proxy.abortable();
		aborter.abort();

		let err = proxy.call("increment", vec![]).await.unwrap_err();
		assert_eq!(err.code, "INVOKE_ERROR");
	}

	struct PanicOnceTransport {
		calls: AtomicUsize,
	}

	#[async_trait]
	impl Transport for PanicOnceTransport {
		async fn invoke(&self, _destination: &str, _request: &ActorCallRequest) -> Result<Value, ActionError> {
			tokio::task::yield_now().await;
			if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
				panic!("simulated transport-level failure");
			}
			Ok(Value::from(9))
		}
	}

	#[tokio::test(start_paused = true)]
	async fn transport_level_failure_is_retried_as_framework_error() {
		let registry = Arc::new(Registry::new());
		registry.push("app-1", "Counter", placement());
		let transport = Arc::new(PanicOnceTransport { calls: AtomicUsize::new(0) });
		let portal = Portal::new(registry, transport.clone());

		let proxy = portal.retrieve("Counter", vec!["1".to_string()]);
		let result = proxy.call("increment", vec![]).await.unwrap();
		assert_eq!(result, Value::from(9));
		assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
	}
}
