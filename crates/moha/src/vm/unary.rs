//! The four unary operators: `!` → `NOT`, `-` → `UNARY_NEGATIVE`,
//! `+` → `UNARY_POSITIVE`, `~` → `UNARY_INVERT`.

use crate::error::RunError;
use crate::value::Value;

fn type_error(op: &str, value: &Value) -> RunError {
    RunError::type_error(format!("unsupported operand type for unary {op}: '{}'", value.type_name()))
}

/// `!v`: logical negation of truthiness, defined for every value, never a
/// `TypeError`.
pub fn not(value: &Value) -> Value {
    Value::Bool(!value.is_truthy())
}

pub fn negative(value: Value) -> Result<Value, RunError> {
    match value {
        Value::Int(i) => Ok(Value::Int(i.wrapping_neg())),
        Value::Float(f) => Ok(Value::Float(-f)),
        other => Err(type_error("-", &other)),
    }
}

pub fn positive(value: Value) -> Result<Value, RunError> {
    match value {
        Value::Int(_) | Value::Float(_) => Ok(value),
        other => Err(type_error("+", &other)),
    }
}

pub fn invert(value: Value) -> Result<Value, RunError> {
    match value {
        Value::Int(i) => Ok(Value::Int(!i)),
        other => Err(type_error("~", &other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_flips_truthiness() {
        assert_eq!(not(&Value::Int(0)).to_display_string(), "true");
        assert_eq!(not(&Value::Int(1)).to_display_string(), "false");
    }

    #[test]
    fn negative_wraps_on_min_int() {
        assert_eq!(negative(Value::Int(i64::MIN)).unwrap().to_display_string(), i64::MIN.to_string());
    }

    #[test]
    fn invert_requires_int() {
        assert!(invert(Value::Float(1.0)).is_err());
    }
}
