use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a logfmt subscriber driven by `RUST_LOG`. OpenTelemetry/Sentry
/// export layers are a separate observability backend and out of scope
/// here (§1); structured `tracing` emission is the ambient concern this
/// crate carries.
pub fn init_tracing_subscriber() {
	let filter = EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_logfmt::layer())
		.try_init()
		.ok();
}
