use rt_metrics::prometheus::*;
use rt_metrics::{buckets, REGISTRY};

lazy_static::lazy_static! {
	pub static ref INVOKE_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
		"portal_invoke_total",
		"Total number of completed portal invocations by outcome.",
		&["outcome"],
		*REGISTRY
	).unwrap();

	pub static ref INVOKE_ATTEMPTS: IntCounterVec = register_int_counter_vec_with_registry!(
		"portal_invoke_attempts_total",
		"Total number of per-attempt outcomes during a portal invocation (timeout, redirect, transient, success).",
		&["attempt_outcome"],
		*REGISTRY
	).unwrap();

	pub static ref INVOKE_DURATION: Histogram = register_histogram_with_registry!(
		"portal_invoke_duration_seconds",
		"Duration of a full portal invocation, including retries, in seconds.",
		buckets::LATENCY.to_vec(),
		*REGISTRY
	).unwrap();
}
