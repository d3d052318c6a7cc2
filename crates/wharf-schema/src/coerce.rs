//! # Type Coercion Engine
//!
//! Per-value decisions at row-load time: can a runtime value be rendered for
//! the column type the destination already has? Iterating rows belongs to
//! the load pipeline; this module owns only the single-value verdict.

use serde_json::Value;

use crate::types::ColumnType;

/// Generic string rendering of a runtime value, used for textual columns and
/// for the `column_value` field of discard records.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Classifies a runtime value into a column type, for callers that do not
/// carry a staged type alongside the value. Composite values and nulls have
/// no column type.
pub fn infer_column_type(value: &Value) -> Option<ColumnType> {
    match value {
        Value::Bool(_) => Some(ColumnType::Boolean),
        Value::String(_) => Some(ColumnType::String),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if i32::try_from(i).is_ok() {
                    Some(ColumnType::Int)
                } else {
                    Some(ColumnType::BigInt)
                }
            } else {
                Some(ColumnType::Float)
            }
        }
        _ => None,
    }
}

/// Decides whether `value` (of staged type `incoming`) can be loaded into a
/// column the destination records as `existing`, and produces the value to
/// load.
///
/// - Textual targets accept anything via the generic string rendering.
/// - Whole numbers are accepted under `float` columns unchanged.
/// - Floats under `int`/`bigint` columns are truncated to their integer
///   part; a value that does not read as a float loads as null. This
///   truncation is long-standing observed behavior and is preserved as-is.
/// - Every other combination fails; the caller routes the value to the
///   discard sink.
pub fn coerce_value(existing: ColumnType, incoming: ColumnType, value: &Value) -> Option<Value> {
    if existing.is_textual() {
        return Some(Value::String(render_value(value)));
    }

    if incoming.is_integral() && existing == ColumnType::Float {
        return Some(value.clone());
    }

    if incoming == ColumnType::Float && existing.is_integral() {
        return match value.as_f64() {
            Some(float_val) => Some(Value::from(float_val.trunc() as i64)),
            None => Some(Value::Null),
        };
    }

    None
}
