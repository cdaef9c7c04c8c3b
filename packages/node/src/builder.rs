use std::collections::HashMap;
use std::sync::Arc;

use actor_lock::{ActorLockService, InMemoryLockReplica, LockReplica};
use instance::{ActorTypeDescriptor, MultiTypeContainer};
use persistence::{CompartmentRule, HandlerRule, InMemoryStorageBackend, PersistenceService, StorageBackend};
use portal::Portal;
use registry::{Placement, Registry};
use rt_config::Config;
use tables::TableService;

use crate::transport::LocalTransport;

/// Assembles the subsystems named in a loaded [`Config`] into one
/// process-local [`Node`] (§2 "Control flow", §4.0b). Actor types are
/// registered before [`NodeBuilder::build`] so the multi-type container
/// and the registry both carry them from the node's first tick.
pub struct NodeBuilder {
	config: Config,
	container: MultiTypeContainer,
	types: Vec<ActorTypeDescriptor>,
}

impl NodeBuilder {
	pub fn new(config: Config) -> Self {
		NodeBuilder {
			config,
			container: MultiTypeContainer::new(),
			types: Vec::new(),
		}
	}

	/// Registers one actor type with this node's container and, once
	/// built, with its registry entry so remote callers can resolve it.
	pub fn register(mut self, descriptor: ActorTypeDescriptor) -> Self {
		self.types.push(descriptor.clone());
		self.container.register(descriptor);
		self
	}

	pub fn build(self) -> Node {
		let app_id = self.config.app_id.clone();
		let container = Arc::new(self.container);

		let registry = Arc::new(Registry::new());
		if self.config.runtime.actor_registry.enabled {
			let placement = Placement {
				version: "1".to_string(),
				bind_idx: None,
				sticky: false,
			};
			for descriptor in &self.types {
				registry.push(&app_id, &descriptor.type_name, placement.clone());
			}
		}

		let lock_cfg = &self.config.runtime.actor_lock;
		let replica_count = lock_cfg.apps.len().max(1);
		let replicas: Vec<Arc<dyn LockReplica>> = (0..replica_count)
			.map(|_| Arc::new(InMemoryLockReplica::new()) as Arc<dyn LockReplica>)
			.collect();
		let actor_lock = Arc::new(ActorLockService::new(replicas, lock_cfg.redundancy));

		let transport = Arc::new(LocalTransport::new(container.clone()));
		let portal = Portal::new(registry.clone(), transport);

		let mut backends: HashMap<String, Arc<dyn StorageBackend>> = HashMap::new();
		backends.insert("default".to_string(), Arc::new(InMemoryStorageBackend::new()));

		let persistence_cfg = &self.config.runtime.persistence;
		let compartments: Vec<CompartmentRule> = persistence_cfg
			.specifiers
			.iter()
			.map(|route| CompartmentRule {
				specifier_glob: route.specifier.clone(),
				compartment_template: route.compartment.clone(),
			})
			.collect();
		let handlers: Vec<HandlerRule> = persistence_cfg
			.handlers
			.iter()
			.map(|route| HandlerRule {
				compartment_glob: route.compartment.clone(),
				actor_type: route.actor_type.clone(),
			})
			.collect();
		let persistence = PersistenceService::new(compartments, handlers, backends.clone());

		let tables = TableService::new(backends.get("default").unwrap().clone(), "default");

		Node {
			config: self.config,
			container,
			registry,
			actor_lock,
			portal,
			persistence,
			tables: Arc::new(tables),
		}
	}
}

/// The running set of subsystems one process hosts (§2 "System overview").
/// `app_id` identifies this node to the registry and distributed lock;
/// every field is the process-local entry point into its subsystem's
/// public API, wired together the way [`NodeBuilder::build`] assembles
/// them.
pub struct Node {
	config: Config,
	container: Arc<MultiTypeContainer>,
	registry: Arc<Registry>,
	actor_lock: Arc<ActorLockService>,
	portal: Arc<Portal>,
	persistence: Arc<PersistenceService>,
	tables: Arc<TableService>,
}

impl Node {
	pub fn app_id(&self) -> &str {
		&self.config.app_id
	}

	pub fn container(&self) -> &Arc<MultiTypeContainer> {
		&self.container
	}

	pub fn registry(&self) -> &Arc<Registry> {
		&self.registry
	}

	pub fn actor_lock(&self) -> &Arc<ActorLockService> {
		&self.actor_lock
	}

	pub fn portal(&self) -> &Arc<Portal> {
		&self.portal
	}

	pub fn persistence(&self) -> &Arc<PersistenceService> {
		&self.persistence
	}

	pub fn tables(&self) -> &Arc<TableService> {
		&self.tables
	}

	/// Withdraws this node from the registry and drains every live
	/// instance before the process exits (§4.3 "finalize()").
	pub async fn shutdown(&self) {
		self.registry.withdraw(&self.config.app_id);
		self.container.finalize().await;
	}
}
