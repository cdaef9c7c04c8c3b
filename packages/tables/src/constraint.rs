/// One entry of an `ITableKeyConstraint` list (§4.9). Only the last
/// constraint in a `keys` list may be anything but [`KeyConstraint::Eq`];
/// every earlier position narrows to a single value so the remainder can
/// become a sort-key range.
#[derive(Debug, Clone)]
pub enum KeyConstraint {
	Eq(String),
	Lte(String),
	Gte(String),
	Prefix(String),
	Between(String, String),
	Contains(String),
	ContainsNi(String),
}

impl KeyConstraint {
	pub(crate) fn is_eq(&self) -> bool {
		matches!(self, KeyConstraint::Eq(_))
	}
}
