/// `{partitionKey, sortKey}` (§3 "Persistence key"). The partition key
/// bounds a query with equality only; the sort key is the ordered path a
/// query ranges over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceKey {
	pub partition_key: Vec<String>,
	pub sort_key: Vec<String>,
}

/// `{partitionKey, sortKey, value, version}` (§3 "Persistence record").
/// `value = None` means the key has been deleted; `version` must be
/// lexicographically greater than whatever is stored for a write to
/// succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceRecord {
	pub key: PersistenceKey,
	pub value: Option<Vec<u8>>,
	pub version: String,
}

impl PersistenceRecord {
	/// Best-effort size used for §4.7 batch subdivision; counts the
	/// stored payload plus the encoded key, not wire framing overhead.
	pub fn approximate_size(&self) -> usize {
		let key_size: usize = self.key.partition_key.iter().map(|s| s.len()).sum::<usize>()
			+ self.key.sort_key.iter().map(|s| s.len()).sum::<usize>();
		key_size + self.value.as_ref().map(|v| v.len()).unwrap_or(0) + self.version.len()
	}
}
