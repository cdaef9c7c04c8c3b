use rt_metrics::prometheus::*;
use rt_metrics::REGISTRY;

lazy_static::lazy_static! {
	pub static ref ACQUIRE_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
		"actor_lock_acquire_total",
		"Total number of distributed actor lock acquire attempts.",
		&["result"],
		*REGISTRY
	).unwrap();

	pub static ref ACQUIRE_REPLICA_GRANTS: IntCounterVec = register_int_counter_vec_with_registry!(
		"actor_lock_replica_grants_total",
		"Total number of replica-level grant/deny responses observed during acquire.",
		&["outcome"],
		*REGISTRY
	).unwrap();
}
