use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch. Used throughout the runtime for
/// lease expiry, instance ages, and backoff deadlines — always wall-clock,
/// never monotonic, since leases must agree across processes.
pub fn now_millis() -> i64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("system clock before unix epoch")
		.as_millis() as i64
}
