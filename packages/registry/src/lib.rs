//! The distributed actor registry (§4.5): a `type -> {hostingApps,
//! placement}` map that hosting nodes push into and clients long-poll,
//! plus the caller-side placement rules (bindIdx pinning, sticky hints,
//! version supersession) used to pick a destination for one call.

mod placement;
mod registry;
mod resolve;
mod snapshot;

pub use placement::Placement;
pub use registry::Registry;
pub use resolve::resolve_destination;
pub use snapshot::{ActorInfo, RegistrySnapshot};
