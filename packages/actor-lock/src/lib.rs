//! Distributed mutual exclusion for singular actors via quorum voting over
//! a set of lock-replica applications (§4.4). A requester hashes the
//! actor id to a deterministic subset of replicas, asks each to grant a
//! time-bounded lease, and only treats the lock as held once a quorum of
//! replicas agree on exactly one holder.

mod metrics;
mod replica;
mod service;
mod subset;

pub use replica::{AcquireReply, InMemoryLockReplica, LockReplica};
pub use service::ActorLockService;
pub use subset::select_replicas;
