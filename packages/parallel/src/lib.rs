//! Bounded-concurrency task runner (§2 "Parallel runner", §5
//! "Backpressure: [...] admits at most N in-flight tasks and exposes a
//! completion event so upstream generators can throttle").
//!
//! Futures are collected into a `FuturesUnordered` and drained as they
//! complete, bounded by an explicit concurrency cap rather than running
//! every task at once, plus deadline and cancellation support shared
//! with [`backoff`].

use std::future::Future;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Outcome for one task submitted to [`run`].
#[derive(Debug)]
pub enum TaskOutcome<T> {
	Completed(T),
	/// The runner's deadline elapsed, or its aborter fired, before this
	/// task could be started.
	Skipped,
}

impl<T> TaskOutcome<T> {
	pub fn completed(self) -> Option<T> {
		match self {
			TaskOutcome::Completed(value) => Some(value),
			TaskOutcome::Skipped => None,
		}
	}
}

/// Runs `tasks` with at most `concurrency` in flight at once, preserving
/// input order in the returned vector. Tasks not yet started once the
/// deadline elapses or `aborter` fires are reported as
/// [`TaskOutcome::Skipped`] rather than run late — cancellation here is
/// advisory for in-flight tasks (§5 "Cancellation [...] is advisory") but
/// strict for tasks that have not yet begun.
pub async fn run<I, F, Fut, T>(
	tasks: I,
	concurrency: usize,
	deadline: Option<Instant>,
	aborter: Option<CancellationToken>,
) -> Vec<TaskOutcome<T>>
where
	I: IntoIterator<Item = F>,
	F: FnOnce() -> Fut,
	Fut: Future<Output = T>,
{
	let concurrency = concurrency.max(1);
	let indexed: Vec<F> = tasks.into_iter().collect();
	let total = indexed.len();
	let mut results: Vec<Option<TaskOutcome<T>>> = (0..total).map(|_| None).collect();

	let mut pending = indexed.into_iter().enumerate();
	let mut in_flight = FuturesUnordered::new();

	for (idx, task) in pending.by_ref().take(concurrency) {
		in_flight.push(run_one(idx, task));
	}

	while let Some((idx, value)) = in_flight.next().await {
		results[idx] = Some(TaskOutcome::Completed(value));

		let cancelled = aborter.as_ref().is_some_and(|a| a.is_cancelled());
		let past_deadline = deadline.is_some_and(|d| Instant::now() >= d);

		if cancelled || past_deadline {
			tracing::debug!(remaining = pending.len(), "parallel runner stopping early");
			break;
		}

		if let Some((idx, task)) = pending.next() {
			in_flight.push(run_one(idx, task));
		}
	}

	for (idx, _) in pending {
		results[idx] = Some(TaskOutcome::Skipped);
	}
	for slot in results.iter_mut() {
		if slot.is_none() {
			*slot = Some(TaskOutcome::Skipped);
		}
	}

	results.into_iter().map(|r| r.expect("every slot filled")).collect()
}

async fn run_one<F, Fut, T>(idx: usize, task: F) -> (usize, T)
where
	F: FnOnce() -> Fut,
	Fut: Future<Output = T>,
{
	(idx, task().await)
}

/// Convenience deadline constructed from "now plus a budget", mirroring
/// how callers express `§5` overall deadlines.
pub fn deadline_from(budget: Duration) -> Instant {
	Instant::now() + budget
}
