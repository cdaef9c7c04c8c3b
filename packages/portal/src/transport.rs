use async_trait::async_trait;
use rt_error::ActionError;
use serde_json::Value;

use crate::request::ActorCallRequest;

/// The wire hop a portal drives per attempt: deliver `request` to
/// `destination` and return either the action's result or a structured
/// [`ActionError`] (framework or application). A transport never retries
/// or times out on its own — that's the portal's job (§4.6 steps 2-6).
#[async_trait]
pub trait Transport: Send + Sync {
	async fn invoke(&self, destination: &str, request: &ActorCallRequest) -> Result<Value, ActionError>;
}
