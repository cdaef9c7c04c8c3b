use std::collections::HashMap;
use std::sync::Arc;

use rt_error::{ActionError, FrameworkError};

use crate::actor::ActorTypeDescriptor;
use crate::container::InstanceContainer;
use crate::wrapper::InstanceWrapper;

/// Routes by actor type string to the matching per-type container (§4.3).
/// Registration order matters: [`finalize`](Self::finalize) tears types
/// down in reverse so that higher-layer actors stop before the
/// dependencies they call into during their own deactivation.
pub struct MultiTypeContainer {
	order: Vec<String>,
	containers: HashMap<String, Arc<InstanceContainer>>,
}

impl Default for MultiTypeContainer {
	fn default() -> Self {
		Self::new()
	}
}

impl MultiTypeContainer {
	pub fn new() -> Self {
		MultiTypeContainer {
			order: Vec::new(),
			containers: HashMap::new(),
		}
	}

	pub fn register(&mut self, descriptor: ActorTypeDescriptor) {
		let type_name = descriptor.type_name.clone();
		self.containers.insert(type_name.clone(), Arc::new(InstanceContainer::new(descriptor)));
		self.order.push(type_name);
	}

	pub fn container(&self, actor_type: &str) -> Option<Arc<InstanceContainer>> {
		self.containers.get(actor_type).cloned()
	}

	pub async fn obtain(
		&self,
		actor_type: &str,
		id: &[String],
		lazy: bool,
	) -> Result<Arc<InstanceWrapper>, ActionError> {
		let container = self.containers.get(actor_type).ok_or_else(|| {
			FrameworkError::UnknownActorType {
				actor_type: actor_type.to_string(),
			}
			.into_action_error()
		})?;
		container.obtain(id, lazy).await
	}

	/// Deactivates every registered type's container in reverse
	/// registration order (§4.3).
	pub async fn finalize(&self) {
		for type_name in self.order.iter().rev() {
			if let Some(container) = self.containers.get(type_name) {
				container.finalize().await;
			}
		}
	}
}
