use serde_json::Value;

/// `{actorType, actorId, actionName, arguments}` synthesized by a proxy on
/// every call (§4.6). `action_name` is always the normalized lower-case
/// form by the time it reaches a [`crate::transport::Transport`].
#[derive(Debug, Clone)]
pub struct ActorCallRequest {
	pub actor_type: String,
	pub actor_id: Vec<String>,
	pub action_name: String,
	pub arguments: Vec<Value>,
}
