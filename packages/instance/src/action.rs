/// How a wrapper must serialize concurrent invocations of an action (§3
/// "Action descriptor", §4.1 "Locking").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
	Shared,
	Exclusive,
	None,
}

/// Kind of an action entry in an actor's registration table (§3, §9
/// "explicit registration table").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
	Action,
	Activator,
	Deactivator,
	Timer,
}

/// One entry of an actor type's explicit registration table — no
/// reflection at call time, dispatch is a lookup in this list (§9).
#[derive(Debug, Clone)]
pub struct ActionDescriptor {
	pub name: String,
	pub locking: LockMode,
	pub kind: ActionKind,
}

impl ActionDescriptor {
	pub fn new(name: impl Into<String>, locking: LockMode, kind: ActionKind) -> Self {
		ActionDescriptor {
			name: name.into(),
			locking,
			kind,
		}
	}

	/// Default locking per §3: exclusive for actions on singular actors,
	/// shared for actions on multiplar actors; activator/deactivator are
	/// always exclusive regardless of actor kind.
	pub fn default_locking(kind: ActionKind, singular: bool) -> LockMode {
		match kind {
			ActionKind::Activator | ActionKind::Deactivator => LockMode::Exclusive,
			_ => {
				if singular {
					LockMode::Exclusive
				} else {
					LockMode::Shared
				}
			}
		}
	}
}
