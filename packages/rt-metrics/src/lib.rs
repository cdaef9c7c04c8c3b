//! One shared `prometheus::Registry` every subsystem registers its
//! counters/histograms into. Exporting the registry over HTTP is a gateway
//! concern and out of scope here (§1); `gather()` below is what an embedder
//! calls from whatever exporter it wires up.

use lazy_static::lazy_static;
use prometheus::{Encoder, Registry, TextEncoder};

pub use prometheus;

lazy_static! {
	pub static ref REGISTRY: Registry =
		Registry::new_custom(Some("darlean".to_string()), None).unwrap();
}

/// Renders the registry in Prometheus text exposition format.
pub fn gather() -> String {
	let metric_families = REGISTRY.gather();
	let mut buffer = Vec::new();
	let encoder = TextEncoder::new();
	encoder.encode(&metric_families, &mut buffer).unwrap();
	String::from_utf8(buffer).unwrap()
}

pub mod buckets {
	/// General-purpose latency buckets (seconds) for RPC-shaped latencies.
	pub const LATENCY: &[f64] = &[
		0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
	];
}
