use serde_json::Value;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::context::EvalContext;
use crate::expr::Expr;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
	#[error("field path {0:?} not found in stored value")]
	FieldNotFound(Vec<String>),
	#[error("key index {0} out of range")]
	IndexOutOfRange(i64),
	#[error("expected {0}, got a different value type")]
	TypeMismatch(&'static str),
}

/// Evaluates `expr` against `ctx`. Boolean-producing ops (`and`, `or`,
/// `not`, the comparisons) yield `Value::Bool`; everything else yields
/// whatever value it names or computes (§4.8).
pub fn eval(expr: &Expr, ctx: &EvalContext) -> Result<Value, FilterError> {
	match expr {
		Expr::And(parts) => {
			for part in parts {
				if !as_bool(&eval(part, ctx)?)? {
					return Ok(Value::Bool(false));
				}
			}
			Ok(Value::Bool(true))
		}
		Expr::Or(parts) => {
			for part in parts {
				if as_bool(&eval(part, ctx)?)? {
					return Ok(Value::Bool(true));
				}
			}
			Ok(Value::Bool(false))
		}
		Expr::Not(inner) => Ok(Value::Bool(!as_bool(&eval(inner, ctx)?)?)),
		Expr::Eq(a, b) => Ok(Value::Bool(eval(a, ctx)? == eval(b, ctx)?)),
		Expr::Lte(a, b) => Ok(Value::Bool(compare(&eval(a, ctx)?, &eval(b, ctx)?)?.is_le())),
		Expr::Gte(a, b) => Ok(Value::Bool(compare(&eval(a, ctx)?, &eval(b, ctx)?)?.is_ge())),
		Expr::Prefix(subject, prefix) => {
			let subject = as_str(&eval(subject, ctx)?)?;
			let prefix = as_str(&eval(prefix, ctx)?)?;
			Ok(Value::Bool(subject.starts_with(&prefix)))
		}
		Expr::Contains(subject, needle) => {
			let subject = as_str(&eval(subject, ctx)?)?;
			let needle = as_str(&eval(needle, ctx)?)?;
			Ok(Value::Bool(subject.contains(&needle)))
		}
		Expr::ContainsNi(subject, needle) => {
			let subject = casefold(&as_str(&eval(subject, ctx)?)?);
			let needle = casefold(&as_str(&eval(needle, ctx)?)?);
			Ok(Value::Bool(subject.contains(&needle)))
		}
		Expr::Uppercase(inner) => Ok(Value::String(as_str(&eval(inner, ctx)?)?.to_uppercase())),
		Expr::Lowercase(inner) => Ok(Value::String(as_str(&eval(inner, ctx)?)?.to_lowercase())),
		Expr::Normalize(inner) => Ok(Value::String(as_str(&eval(inner, ctx)?)?.nfkc().collect())),
		Expr::Field(path) => resolve_field(ctx, path),
		Expr::Pk(idx) => resolve_key(ctx.partition_key, *idx, ctx.partition_key_offset),
		Expr::Sk(idx) => resolve_key(ctx.sort_key, *idx, ctx.sort_key_offset),
		Expr::Literal(value) => Ok(value.clone()),
		Expr::Array(parts) => {
			let values = parts.iter().map(|p| eval(p, ctx)).collect::<Result<Vec<_>, _>>()?;
			Ok(Value::Array(values))
		}
	}
}

fn as_bool(value: &Value) -> Result<bool, FilterError> {
	value.as_bool().ok_or(FilterError::TypeMismatch("bool"))
}

fn as_str(value: &Value) -> Result<String, FilterError> {
	value.as_str().map(|s| s.to_string()).ok_or(FilterError::TypeMismatch("string"))
}

/// Unicode NFKC normalization plus simple casefold, matching the
/// `containsni` resolution recorded in the design notes.
fn casefold(s: &str) -> String {
	s.nfkc().collect::<String>().to_lowercase()
}

fn compare(a: &Value, b: &Value) -> Result<std::cmp::Ordering, FilterError> {
	match (a, b) {
		(Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
		(Value::Number(a), Value::Number(b)) => {
			let a = a.as_f64().ok_or(FilterError::TypeMismatch("number"))?;
			let b = b.as_f64().ok_or(FilterError::TypeMismatch("number"))?;
			a.partial_cmp(&b).ok_or(FilterError::TypeMismatch("comparable number"))
		}
		_ => Err(FilterError::TypeMismatch("two strings or two numbers")),
	}
}

fn resolve_field(ctx: &EvalContext, path: &[String]) -> Result<Value, FilterError> {
	let mut current = ctx.value;
	for segment in ctx.field_base.iter().chain(path.iter()) {
		current = current
			.get(segment)
			.ok_or_else(|| FilterError::FieldNotFound(path.to_vec()))?;
	}
	Ok(current.clone())
}

fn resolve_key(key: &[String], idx: i64, offset: i64) -> Result<Value, FilterError> {
	let resolved = idx + offset;
	if resolved < 0 || resolved as usize >= key.len() {
		return Err(FilterError::IndexOutOfRange(idx));
	}
	Ok(Value::String(key[resolved as usize].clone()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn ctx<'a>(value: &'a Value, pk: &'a [String], sk: &'a [String]) -> EvalContext<'a> {
		EvalContext::new(value, pk, sk)
	}

	#[test]
	fn and_short_circuits_on_first_false() {
		let value = json!({});
		let pk = vec![];
		let sk = vec![];
		let expr = Expr::And(vec![
			Expr::Literal(Value::Bool(false)),
			Expr::Field(vec!["missing".to_string()]),
		]);
		let result = eval(&expr, &ctx(&value, &pk, &sk)).unwrap();
		assert_eq!(result, Value::Bool(false));
	}

	#[test]
	fn or_short_circuits_on_first_true() {
		let value = json!({});
		let pk = vec![];
		let sk = vec![];
		let expr = Expr::Or(vec![
			Expr::Literal(Value::Bool(true)),
			Expr::Field(vec!["missing".to_string()]),
		]);
		let result = eval(&expr, &ctx(&value, &pk, &sk)).unwrap();
		assert_eq!(result, Value::Bool(true));
	}

	#[test]
	fn field_resolves_nested_path_rooted_at_field_base() {
		let value = json!({"profile": {"name": "Ada"}});
		let pk = vec![];
		let sk = vec![];
		let base = vec!["profile".to_string()];
		let context = EvalContext::new(&value, &pk, &sk).with_field_base(&base);
		let expr = Expr::Field(vec!["name".to_string()]);
		assert_eq!(eval(&expr, &context).unwrap(), Value::String("Ada".to_string()));
	}

	#[test]
	fn pk_sk_resolve_with_offset() {
		let value = json!({});
		let pk = vec!["tenant-1".to_string(), "shard-3".to_string()];
		let sk = vec![];
		let context = EvalContext::new(&value, &pk, &sk).with_offsets(1, 0);
		let expr = Expr::Pk(0);
		assert_eq!(eval(&expr, &context).unwrap(), Value::String("shard-3".to_string()));
	}

	#[test]
	fn containsni_is_case_insensitive() {
		let value = json!({});
		let pk = vec![];
		let sk = vec![];
		let expr = Expr::ContainsNi(
			Box::new(Expr::Literal(Value::String("Coffee Society".to_string()))),
			Box::new(Expr::Literal(Value::String("COFFEE".to_string()))),
		);
		assert_eq!(eval(&expr, &ctx(&value, &pk, &sk)).unwrap(), Value::Bool(true));

		let miss = Expr::ContainsNi(
			Box::new(Expr::Literal(Value::String("Coffee Society".to_string()))),
			Box::new(Expr::Literal(Value::String("TEA".to_string()))),
		);
		assert_eq!(eval(&miss, &ctx(&value, &pk, &sk)).unwrap(), Value::Bool(false));
	}

	#[test]
	fn prefix_and_lte_gte_compare_correctly() {
		let value = json!({});
		let pk = vec![];
		let sk = vec![];
		let context = ctx(&value, &pk, &sk);

		let prefix_expr = Expr::Prefix(
			Box::new(Expr::Literal(Value::String("hello-world".to_string()))),
			Box::new(Expr::Literal(Value::String("hello".to_string()))),
		);
		assert_eq!(eval(&prefix_expr, &context).unwrap(), Value::Bool(true));

		let lte_expr = Expr::Lte(
			Box::new(Expr::Literal(Value::from(3))),
			Box::new(Expr::Literal(Value::from(5))),
		);
		assert_eq!(eval(&lte_expr, &context).unwrap(), Value::Bool(true));
	}
}
