use serde_json::Value;

/// Everything an [`crate::eval::eval`] call needs besides the expression
/// tree itself: the stored value plus the record's keys and the three
/// index/path offsets §4.8 lets a caller configure (`filterFieldBase`,
/// `filterPartitionKeyOffset`, `filterSortKeyOffset`).
pub struct EvalContext<'a> {
	pub value: &'a Value,
	pub partition_key: &'a [String],
	pub sort_key: &'a [String],
	pub field_base: &'a [String],
	pub partition_key_offset: i64,
	pub sort_key_offset: i64,
}

impl<'a> EvalContext<'a> {
	pub fn new(value: &'a Value, partition_key: &'a [String], sort_key: &'a [String]) -> Self {
		EvalContext {
			value,
			partition_key,
			sort_key,
			field_base: &[],
			partition_key_offset: 0,
			sort_key_offset: 0,
		}
	}

	pub fn with_field_base(mut self, field_base: &'a [String]) -> Self {
		self.field_base = field_base;
		self
	}

	pub fn with_offsets(mut self, partition_key_offset: i64, sort_key_offset: i64) -> Self {
		self.partition_key_offset = partition_key_offset;
		self.sort_key_offset = sort_key_offset;
		self
	}
}
