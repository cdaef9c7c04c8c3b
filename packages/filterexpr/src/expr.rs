use serde_json::Value;

/// A filter expression tree, corresponding to the nested `[op, ...args]`
/// list form of §4.8. Parsing that list form into this tree is a
/// transport-layer concern; this crate only evaluates the tree.
#[derive(Debug, Clone)]
pub enum Expr {
	And(Vec<Expr>),
	Or(Vec<Expr>),
	Not(Box<Expr>),
	Eq(Box<Expr>, Box<Expr>),
	Lte(Box<Expr>, Box<Expr>),
	Gte(Box<Expr>, Box<Expr>),
	Prefix(Box<Expr>, Box<Expr>),
	Contains(Box<Expr>, Box<Expr>),
	ContainsNi(Box<Expr>, Box<Expr>),
	Uppercase(Box<Expr>),
	Lowercase(Box<Expr>),
	Normalize(Box<Expr>),
	/// Path rooted at `filterFieldBase` into the stored value.
	Field(Vec<String>),
	/// Index into the record's partition key, offset by
	/// `filterPartitionKeyOffset`.
	Pk(i64),
	/// Index into the record's sort key, offset by `filterSortKeyOffset`.
	Sk(i64),
	Literal(Value),
	Array(Vec<Expr>),
}
