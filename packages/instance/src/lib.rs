//! The instance lifecycle stack (§4.1-§4.3): a per-actor wrapper enforcing
//! activation and locking, a per-type container with LRU/max-age eviction,
//! and a multi-type router dispatching by actor type string.

mod action;
mod actor;
mod call_frame;
mod container;
mod metrics;
mod multi;
mod wrapper;

pub use action::{ActionDescriptor, ActionKind, LockMode};
pub use actor::{Actor, ActorFactory, ActorKind, ActorTypeDescriptor};
pub use call_frame::CallFrame;
pub use container::InstanceContainer;
pub use multi::MultiTypeContainer;
pub use wrapper::{ActivationState, InstanceProxy, InstanceWrapper};
