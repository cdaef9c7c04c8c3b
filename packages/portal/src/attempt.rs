use std::time::Duration;

/// One entry in the ordered attempt list an `INVOKE_ERROR` carries when
/// the overall deadline is exceeded (§4.6 step 6).
#[derive(Debug, Clone)]
pub struct Attempt {
	pub destination: String,
	pub outcome: String,
	pub elapsed: Duration,
}

/// Renders the attempt list into the single `[attempts]` template
/// parameter `INVOKE_ERROR` substitutes (§7 wire shape keeps parameters
/// as plain strings, not nested structures).
pub fn render_attempts(attempts: &[Attempt]) -> String {
	attempts
		.iter()
		.map(|a| format!("{} -> {} ({}ms)", a.destination, a.outcome, a.elapsed.as_millis()))
		.collect::<Vec<_>>()
		.join("; ")
}
