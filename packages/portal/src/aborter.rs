use tokio_util::sync::CancellationToken;

/// A one-shot cancellation handle that applies to exactly the next call
/// made through the [`crate::proxy::Proxy`] that issued it (§4.6 step 2,
/// `IAbortable`). Calling [`Aborter::abort`] signals that one in-flight
/// attempt loop to stop retrying and fail fast; it has no effect on any
/// call made before or after it.
#[derive(Clone)]
pub struct Aborter {
	token: CancellationToken,
}

impl Aborter {
	pub(crate) fn new() -> Self {
		Aborter {
			token: CancellationToken::new(),
		}
	}

	pub fn abort(&self) {
		self.token.cancel();
	}

	pub(crate) fn token(&self) -> CancellationToken {
		self.token.clone()
	}
}
