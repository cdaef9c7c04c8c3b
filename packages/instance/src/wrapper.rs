use std::sync::Arc;
use std::time::Duration;

use rt_error::{ActionError, FrameworkError};
use serde_json::Value;
use tokio::sync::{watch, RwLock};

use crate::action::{ActionKind, LockMode};
use crate::actor::ActorTypeDescriptor;
use crate::call_frame::{CallFrame, WrapperId};

/// How long a call may wait to acquire the per-wrapper lock before the
/// wrapper gives up with `LOCK_FAILED` (§4.1 "Errors").
const LOCK_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// `{id, wrapper, createdAt, lastUsedAt, activationState}` minus the
/// container-owned bookkeeping fields, which live in [`crate::container`]
/// (§3 "Instance record").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
	New,
	Activating,
	Active,
	Deactivating,
	Dead,
}

fn actor_id_string(parts: &[String]) -> String {
	parts.join("/")
}

/// Per-instance envelope enforcing the activation protocol and per-action
/// locking described in §4.1. Owns the raw [`Actor`](crate::actor::Actor)
/// object; containers own wrappers (§9 "parent-owns-child ownership") and
/// hold only a weak `(type, id)` reference back, never a strong pointer.
pub struct InstanceWrapper {
	id: WrapperId,
	actor_type: String,
	actor_id: Vec<String>,
	descriptor: ActorTypeDescriptor,
	actor: Arc<dyn crate::actor::Actor>,

	/// `exclusive` = write guard, `shared` = read guard, `none` = bypassed
	/// entirely. `tokio::sync::RwLock` already queues waiters FIFO and
	/// does not let a late reader jump a queued writer, which is exactly
	/// the fairness rule §4.1 asks for ("pending shared calls must not
	/// overtake a pending exclusive").
	lock: RwLock<()>,

	state_tx: watch::Sender<ActivationState>,

	/// §4.10: timers scoped to this wrapper's lifetime, cancelled in bulk
	/// on deactivation.
	timers: timers::TimerSet,
}

impl InstanceWrapper {
	pub fn new(descriptor: ActorTypeDescriptor, actor_id: Vec<String>) -> Arc<Self> {
		let actor = (descriptor.factory)(&actor_id);
		let (state_tx, _) = watch::channel(ActivationState::New);
		Arc::new(InstanceWrapper {
			id: WrapperId::next(),
			actor_type: descriptor.type_name.clone(),
			actor_id,
			descriptor,
			actor,
			lock: RwLock::new(()),
			state_tx,
			timers: timers::TimerSet::new(),
		})
	}

	/// Per-instance volatile timers (§4.10), scoped to this wrapper.
	pub fn timers(&self) -> &timers::TimerSet {
		&self.timers
	}

	pub fn actor_type(&self) -> &str {
		&self.actor_type
	}

	pub fn actor_id(&self) -> &[String] {
		&self.actor_id
	}

	pub fn state(&self) -> ActivationState {
		*self.state_tx.borrow()
	}

	fn id_string(&self) -> String {
		actor_id_string(&self.actor_id)
	}

	/// Invokes `action_name` with `args` under the wrapper's protocol:
	/// activation-on-first-use, per-action locking, reentrancy bypass.
	pub async fn invoke(
		&self,
		action_name: &str,
		args: Vec<Value>,
		frame: &CallFrame,
	) -> Result<Value, ActionError> {
		let action = self.descriptor.action(action_name).ok_or_else(|| {
			FrameworkError::UnknownAction {
				actor_type: self.actor_type.clone(),
				action_name: action_name.to_string(),
			}
			.into_action_error()
		})?;

		if action.kind != ActionKind::Activator {
			self.ensure_activated().await?;
		}

		if frame.contains(self.id) {
			// Reentrant: the caller chain already holds this wrapper, so
			// serialization is already guaranteed by the outer call.
			return self.actor.invoke(action_name, args, frame.clone()).await;
		}

		let child_frame = frame.extend(self.id);

		match action.locking {
			LockMode::Exclusive => {
				let _guard = self.acquire_write().await?;
				self.dispatch(action_name, args, child_frame).await
			}
			LockMode::Shared => {
				let _guard = self.acquire_read().await?;
				self.dispatch(action_name, args, child_frame).await
			}
			LockMode::None => self.dispatch(action_name, args, child_frame).await,
		}
	}

	async fn dispatch(&self, action_name: &str, args: Vec<Value>, frame: CallFrame) -> Result<Value, ActionError> {
		if self.state() == ActivationState::Dead {
			return Err(FrameworkError::Deactivated {
				actor_id: self.id_string(),
			}
			.into_action_error());
		}
		self.actor.invoke(action_name, args, frame).await
	}

	async fn acquire_write(&self) -> Result<tokio::sync::RwLockWriteGuard<'_, ()>, ActionError> {
		tokio::time::timeout(LOCK_ACQUIRE_TIMEOUT, self.lock.write())
			.await
			.map_err(|_| {
				FrameworkError::LockFailed {
					actor_id: self.id_string(),
				}
				.into_action_error()
			})
	}

	async fn acquire_read(&self) -> Result<tokio::sync::RwLockReadGuard<'_, ()>, ActionError> {
		tokio::time::timeout(LOCK_ACQUIRE_TIMEOUT, self.lock.read())
			.await
			.map_err(|_| {
				FrameworkError::LockFailed {
					actor_id: self.id_string(),
				}
				.into_action_error()
			})
	}

	/// Drives `New -> Activating -> Active` (or `-> Dead` on failure) at
	/// most once, letting concurrent first-callers fall in behind the
	/// winner rather than double-activating.
	async fn ensure_activated(&self) -> Result<(), ActionError> {
		let mut rx = self.state_tx.subscribe();
		loop {
			match *rx.borrow() {
				ActivationState::Active => return Ok(()),
				ActivationState::Dead => {
					return Err(FrameworkError::Deactivated {
						actor_id: self.id_string(),
					}
					.into_action_error())
				}
				ActivationState::Deactivating => {
					return Err(FrameworkError::Finalizing {
						actor_id: self.id_string(),
					}
					.into_action_error())
				}
				ActivationState::New => {
					let claimed = self
						.state_tx
						.send_if_modified(|s| {
							if *s == ActivationState::New {
								*s = ActivationState::Activating;
								true
							} else {
								false
							}
						});
					if claimed {
						return self.run_activation().await;
					}
				}
				ActivationState::Activating => {}
			}
			let _ = rx.changed().await;
		}
	}

	async fn run_activation(&self) -> Result<(), ActionError> {
		let result = if self.descriptor.has_activator {
			let _guard = self.lock.write().await;
			self.actor.activate().await
		} else {
			Ok(())
		};

		match result {
			Ok(()) => {
				let _ = self.state_tx.send(ActivationState::Active);
				Ok(())
			}
			Err(err) => {
				let _ = self.state_tx.send(ActivationState::Dead);
				tracing::warn!(actor_type = %self.actor_type, actor_id = %self.id_string(), error = %err, "activation failed");
				Err(FrameworkError::ActivationFailed {
					actor_id: self.id_string(),
					reason: err.message,
				}
				.into_action_error())
			}
		}
	}

	/// Idempotent. Waits for in-flight calls to finish (by taking the
	/// exclusive lock), runs the deactivator if present, then flips to
	/// `Dead` and wakes every `on_deactivated` listener.
	pub async fn deactivate(&self) {
		let claimed = self.state_tx.send_if_modified(|s| match s {
			ActivationState::Dead | ActivationState::Deactivating => false,
			_ => {
				*s = ActivationState::Deactivating;
				true
			}
		});
		if !claimed {
			self.wait_deactivated().await;
			return;
		}

		let _guard = self.lock.write().await;
		self.timers.cancel_all();
		if self.descriptor.has_deactivator {
			self.actor.deactivate().await;
		}
		let _ = self.state_tx.send(ActivationState::Dead);
	}

	/// Resolves once the wrapper has reached `Dead` (§4.1 "on(deactivated,
	/// listener)").
	pub async fn wait_deactivated(&self) {
		let mut rx = self.state_tx.subscribe();
		while *rx.borrow() != ActivationState::Dead {
			if rx.changed().await.is_err() {
				break;
			}
		}
	}

	pub fn is_dead(&self) -> bool {
		self.state() == ActivationState::Dead
	}
}

/// A stable handle forwarding each call to [`InstanceWrapper::invoke`]
/// with a fresh caller chain — what `getProxy()` returns in §4.1. After
/// deactivation every call fails with `DEACTIVATED`.
#[derive(Clone)]
pub struct InstanceProxy {
	wrapper: Arc<InstanceWrapper>,
}

impl InstanceProxy {
	pub fn new(wrapper: Arc<InstanceWrapper>) -> Self {
		InstanceProxy { wrapper }
	}

	pub async fn call(&self, action_name: &str, args: Vec<Value>) -> Result<Value, ActionError> {
		self.wrapper.invoke(action_name, args, &CallFrame::new()).await
	}
}
