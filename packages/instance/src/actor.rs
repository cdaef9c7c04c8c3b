use std::sync::Arc;

use async_trait::async_trait;
use rt_error::ActionError;
use serde_json::Value;

use crate::action::ActionDescriptor;
use crate::call_frame::CallFrame;

/// Uniqueness mode for an actor type (§3 "Actor kind").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
	Singular,
	Multiplar,
}

/// The raw object a wrapper envelopes. Application code implements this
/// directly (no decorator/reflection wiring — §9 "Decorator-annotated
/// classes for actor wiring"); `invoke` dispatches by normalized action
/// name, `activate`/`deactivate` are optional capabilities whose presence
/// is tracked out-of-band by [`ActorTypeDescriptor::has_activator`] /
/// `has_deactivator`, not by inspecting the trait object (§9
/// "Duck-typed optional capabilities"). `invoke` receives the caller
/// chain so it can forward it to a portal when making a same-process
/// call back into its own wrapper (§5 "Reentrancy").
#[async_trait]
pub trait Actor: Send + Sync {
	async fn invoke(&self, action_name: &str, args: Vec<Value>, frame: CallFrame) -> Result<Value, ActionError>;

	async fn activate(&self) -> Result<(), ActionError> {
		Ok(())
	}

	async fn deactivate(&self) {}
}

/// Constructs a fresh actor instance for one `id`. Stored alongside the
/// registration table so the container can create wrappers lazily.
pub type ActorFactory = Arc<dyn Fn(&[String]) -> Arc<dyn Actor> + Send + Sync>;

/// Everything the runtime needs to know about an actor type, built once at
/// startup (§9: "an explicit registration table: for each actor type, a
/// constructor function plus a list of action descriptors").
#[derive(Clone)]
pub struct ActorTypeDescriptor {
	pub type_name: String,
	pub kind: ActorKind,
	pub actions: Vec<ActionDescriptor>,
	pub has_activator: bool,
	pub has_deactivator: bool,
	pub factory: ActorFactory,
}

impl ActorTypeDescriptor {
	pub fn action(&self, name: &str) -> Option<&ActionDescriptor> {
		self.actions.iter().find(|a| a.name == name)
	}
}
