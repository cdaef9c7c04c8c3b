use std::sync::Arc;

use async_trait::async_trait;
use instance::{CallFrame, MultiTypeContainer};
use portal::{ActorCallRequest, Transport};
use rt_error::ActionError;
use serde_json::Value;

/// Delivers a portal invocation straight into this process's own
/// [`MultiTypeContainer`], ignoring `destination` — every actor type this
/// node's registry ever advertises is hosted in-process. A deployment
/// that spans real processes swaps this for a transport that dials out
/// (§1: "the transport is an injected trait").
pub struct LocalTransport {
	container: Arc<MultiTypeContainer>,
}

impl LocalTransport {
	pub fn new(container: Arc<MultiTypeContainer>) -> Self {
		LocalTransport { container }
	}
}

#[async_trait]
impl Transport for LocalTransport {
	async fn invoke(&self, _destination: &str, request: &ActorCallRequest) -> Result<Value, ActionError> {
		let wrapper = self.container.obtain(&request.actor_type, &request.actor_id, false).await?;
		wrapper.invoke(&request.action_name, request.arguments.clone(), &CallFrame::new()).await
	}
}
