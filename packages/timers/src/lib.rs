//! Volatile per-instance timers (§4.10): fire-and-forget scheduled
//! callbacks tied to wrapper lifetime. Not persistent — a process
//! restart or wrapper reincarnation loses every pending timer, by
//! design (§1 Non-goals: "No guaranteed delivery of volatile timers
//! across actor reincarnation").

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;

pub type TimerFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
pub type TimerHandler = Arc<dyn Fn(Vec<Value>) -> TimerFuture + Send + Sync>;

enum Control {
	Cancel,
	Pause,
	Resume(Option<Duration>),
}

/// Handle returned by [`TimerSet::once`] / [`TimerSet::repeat`].
#[derive(Clone)]
pub struct TimerHandleRef {
	id: u64,
	tx: mpsc::UnboundedSender<Control>,
}

impl TimerHandleRef {
	pub fn cancel(&self) {
		let _ = self.tx.send(Control::Cancel);
	}

	pub fn pause(&self) {
		let _ = self.tx.send(Control::Pause);
	}

	/// Resumes a paused timer. `delay` overrides the wait before the next
	/// fire; `None` resumes with whatever delay remained at pause time.
	pub fn resume(&self, delay: Option<Duration>) {
		let _ = self.tx.send(Control::Resume(delay));
	}

	pub fn id(&self) -> u64 {
		self.id
	}
}

type HandleMap = Arc<Mutex<HashMap<u64, mpsc::UnboundedSender<Control>>>>;

/// Owns every timer registered by one instance wrapper. `cancel_all` is
/// called exactly once, from the wrapper's `deactivate()`.
#[derive(Default)]
pub struct TimerSet {
	next_id: AtomicU64,
	handles: HandleMap,
}

impl TimerSet {
	pub fn new() -> Self {
		TimerSet::default()
	}

	/// Schedules `handler` to fire once after `delay`.
	pub fn once(&self, handler: TimerHandler, delay: Duration, args: Vec<Value>) -> TimerHandleRef {
		self.schedule(handler, delay, None, Some(1), args)
	}

	/// Schedules `handler` to fire every `interval`, starting after
	/// `first_delay` (defaulting to `interval`), up to `nr_repeats` times
	/// (`None` = forever).
	pub fn repeat(
		&self,
		handler: TimerHandler,
		interval: Duration,
		first_delay: Option<Duration>,
		nr_repeats: Option<u64>,
		args: Vec<Value>,
	) -> TimerHandleRef {
		self.schedule(handler, first_delay.unwrap_or(interval), Some(interval), nr_repeats, args)
	}

	fn schedule(
		&self,
		handler: TimerHandler,
		first_delay: Duration,
		interval: Option<Duration>,
		nr_repeats: Option<u64>,
		args: Vec<Value>,
	) -> TimerHandleRef {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let (tx, rx) = mpsc::unbounded_channel();
		self.handles.lock().unwrap().insert(id, tx.clone());

		tokio::spawn(run_timer(id, handler, first_delay, interval, nr_repeats, args, rx, self.handles.clone()));

		TimerHandleRef { id, tx }
	}

	/// Cancels every timer currently registered (§4.10: "All timers for
	/// an instance are cancelled when the wrapper deactivates").
	pub fn cancel_all(&self) {
		let handles = std::mem::take(&mut *self.handles.lock().unwrap());
		for (_, tx) in handles {
			let _ = tx.send(Control::Cancel);
		}
	}
}

async fn run_timer(
	id: u64,
	handler: TimerHandler,
	first_delay: Duration,
	interval: Option<Duration>,
	nr_repeats: Option<u64>,
	args: Vec<Value>,
	mut ctrl_rx: mpsc::UnboundedReceiver<Control>,
	handles: HandleMap,
) {
	let mut delay = first_delay;
	let mut fired = 0u64;

	loop {
		if let Some(limit) = nr_repeats {
			if fired >= limit {
				break;
			}
		}

		if !wait_or_pause(&mut delay, interval, &mut ctrl_rx).await {
			handles.lock().unwrap().remove(&id);
			return;
		}

		handler(args.clone()).await;
		fired += 1;

		match interval {
			Some(next) => delay = next,
			None => break,
		}
	}
	handles.lock().unwrap().remove(&id);
}

/// Sleeps for `delay`, honoring `Cancel`/`Pause`/`Resume` arriving on
/// `ctrl_rx`. Returns `false` if the timer was cancelled (including an
/// orphaned handle whose sender was dropped).
async fn wait_or_pause(delay: &mut Duration, interval: Option<Duration>, ctrl_rx: &mut mpsc::UnboundedReceiver<Control>) -> bool {
	loop {
		tokio::select! {
			_ = tokio::time::sleep(*delay) => return true,
			cmd = ctrl_rx.recv() => match cmd {
				None | Some(Control::Cancel) => return false,
				Some(Control::Pause) => {
					match ctrl_rx.recv().await {
						None | Some(Control::Cancel) => return false,
						Some(Control::Resume(override_delay)) => {
							*delay = override_delay.or(interval).unwrap_or(*delay);
						}
						Some(Control::Pause) => continue,
					}
				}
				Some(Control::Resume(_)) => continue,
			},
		}
	}
}

impl Drop for TimerSet {
	fn drop(&mut self) {
		self.cancel_all();
	}
}
