//! Remote actor invocation: `retrieve(type, id)` proxies that resolve a
//! destination through the [`registry`] crate, deliver calls through a
//! pluggable [`Transport`], and retry/redirect/back off per §4.6.

mod aborter;
mod attempt;
mod metrics;
mod portal;
mod proxy;
mod request;
mod transport;

pub use aborter::Aborter;
pub use portal::{Portal, PrefixPortal, TypedPortal};
pub use proxy::Proxy;
pub use request::ActorCallRequest;
pub use transport::Transport;
