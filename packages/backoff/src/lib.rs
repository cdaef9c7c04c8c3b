//! Stateful retry-delay generator (§2 "Backoff", §4.6, §5 "Timeouts").
//!
//! Exponential base doubling with a jitter fraction, wrapped in a
//! session object that knows its own deadline and an optional
//! cancellation signal, so callers never have to juggle "how much time
//! is left" by hand.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Parameters for an [`ExponentialBackOff`] — `delay = base * factor^attempt`,
/// capped at `max`, plus up to `jitter_fraction * delay` of random jitter.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackOff {
	pub base: Duration,
	pub factor: f64,
	pub max: Duration,
	pub jitter_fraction: f64,
}

impl Default for ExponentialBackOff {
	fn default() -> Self {
		ExponentialBackOff {
			base: Duration::from_millis(10),
			factor: 2.0,
			max: Duration::from_secs(5),
			jitter_fraction: 0.1,
		}
	}
}

impl ExponentialBackOff {
	/// Delay for the given zero-based attempt, before deadline clipping.
	fn delay_for(&self, attempt: u32) -> Duration {
		let base_ms = self.base.as_millis() as f64;
		let uncapped = base_ms * self.factor.powi(attempt as i32);
		let capped_ms = uncapped.min(self.max.as_millis() as f64);
		let jitter_ms = capped_ms * self.jitter_fraction * rand::random::<f64>();
		Duration::from_millis((capped_ms + jitter_ms) as u64)
	}
}

/// One retry attempt's worth of bookkeeping, scoped to a single operation's
/// overall deadline (§4.6 step 3: "consult a BackOff session for a delay
/// and retry up to the overall deadline").
pub struct BackOffSession {
	policy: ExponentialBackOff,
	deadline: Instant,
	attempt: u32,
	aborter: Option<CancellationToken>,
}

impl BackOffSession {
	pub fn new(policy: ExponentialBackOff, deadline: Instant) -> Self {
		BackOffSession {
			policy,
			deadline,
			attempt: 0,
			aborter: None,
		}
	}

	pub fn with_aborter(mut self, aborter: CancellationToken) -> Self {
		self.aborter = Some(aborter);
		self
	}

	/// Sleeps for the next delay, clipped to the remaining deadline.
	/// Returns `true` if the caller should retry, `false` if the deadline
	/// has already passed or an aborter fired — the session refuses
	/// further delays past the deadline (§4.6).
	pub async fn wait(&mut self) -> bool {
		let now = Instant::now();
		if now >= self.deadline {
			return false;
		}

		let remaining = self.deadline - now;
		let delay = self.policy.delay_for(self.attempt).min(remaining);
		self.attempt += 1;

		tracing::trace!(attempt = self.attempt, delay_ms = delay.as_millis() as u64, "backoff wait");

		match &self.aborter {
			Some(aborter) => {
				tokio::select! {
					_ = tokio::time::sleep(delay) => true,
					_ = aborter.cancelled() => false,
				}
			}
			None => {
				tokio::time::sleep(delay).await;
				true
			}
		}
	}

	pub fn attempt(&self) -> u32 {
		self.attempt
	}

	pub fn deadline_exceeded(&self) -> bool {
		Instant::now() >= self.deadline
	}
}
