use std::sync::{Arc, Mutex};

use rt_error::ActionError;
use serde_json::Value;

use crate::aborter::Aborter;
use crate::portal::Portal;

/// A stateless handle returned by [`Portal::retrieve`] (§4.6). Cheap to
/// clone and hold onto; all state for routing/retry lives in the
/// [`Portal`] it was retrieved from.
#[derive(Clone)]
pub struct Proxy {
	portal: Arc<Portal>,
	actor_type: String,
	actor_id: Vec<String>,
	armed_abort: Arc<Mutex<Option<Aborter>>>,
}

impl Proxy {
	pub(crate) fn new(portal: Arc<Portal>, actor_type: String, actor_id: Vec<String>) -> Self {
		Proxy {
			portal,
			actor_type,
			actor_id,
			armed_abort: Arc::new(Mutex::new(None)),
		}
	}

	pub fn actor_type(&self) -> &str {
		&self.actor_type
	}

	pub fn actor_id(&self) -> &[String] {
		&self.actor_id
	}

	/// Arms a one-shot abort handle that applies only to the next `call`
	/// made on this proxy.
	pub fn abortable(&self) -> Aborter {
		let aborter = Aborter::new();
		*self.armed_abort.lock().unwrap() = Some(aborter.clone());
		aborter
	}

	pub async fn call(&self, action_name: &str, arguments: Vec<Value>) -> Result<Value, ActionError> {
		let aborter = self.armed_abort.lock().unwrap().take();
		self.portal
			.invoke(&self.actor_type, &self.actor_id, &action_name.to_lowercase(), arguments, aborter)
			.await
	}
}
