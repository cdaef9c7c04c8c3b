use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_WRAPPER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity for a wrapper, used only to detect reentrancy
/// through the caller chain — never exposed outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WrapperId(u64);

impl WrapperId {
	pub(crate) fn next() -> Self {
		WrapperId(NEXT_WRAPPER_ID.fetch_add(1, Ordering::Relaxed))
	}
}

/// The caller-chain token threaded through a call tree (§3 "Call frame",
/// §5 "Reentrancy"). Each inbound call from outside this process starts a
/// fresh, empty chain; every wrapper a call passes through appends its id
/// before recursing, so a wrapper can tell whether it is already part of
/// the in-flight chain and skip its own lock instead of deadlocking.
#[derive(Debug, Clone, Default)]
pub struct CallFrame {
	chain: Vec<WrapperId>,
}

impl CallFrame {
	/// A fresh chain for a call arriving from outside this process. A
	/// remote self-call always gets one of these — chains never cross a
	/// transport hop (§5: "a remote self-call is treated as a fresh chain
	/// and will deadlock if the outer call holds exclusive").
	pub fn new() -> Self {
		CallFrame::default()
	}

	pub(crate) fn contains(&self, id: WrapperId) -> bool {
		self.chain.contains(&id)
	}

	pub(crate) fn extend(&self, id: WrapperId) -> CallFrame {
		let mut chain = self.chain.clone();
		chain.push(id);
		CallFrame { chain }
	}
}
