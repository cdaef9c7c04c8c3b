use rt_metrics::prometheus::*;
use rt_metrics::REGISTRY;

lazy_static::lazy_static! {
	pub static ref CONTAINER_SIZE: IntGaugeVec = register_int_gauge_vec_with_registry!(
		"instance_container_size",
		"Current number of entries held by an instance container, by actor type.",
		&["actor_type"],
		*REGISTRY
	).unwrap();

	pub static ref EVICTIONS_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
		"instance_container_evictions_total",
		"Total number of instance evictions by actor type and reason.",
		&["actor_type", "reason"],
		*REGISTRY
	).unwrap();
}
