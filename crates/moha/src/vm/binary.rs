//! Arithmetic, bitwise, and comparison operators over [`Value`]s.
//!
//! Arithmetic and bitwise operators require both operands to be the same
//! numeric kind — no implicit Int↔Float widening — while `String + x`
//! always succeeds by coercing `x` through its display form.

use crate::error::RunError;
use crate::value::Value;

fn type_error(op: &str, left: &Value, right: &Value) -> RunError {
    RunError::type_error(format!(
        "unsupported operand types for {op}: '{}' and '{}'",
        left.type_name(),
        right.type_name()
    ))
}

/// `+`. Strings accept any right- or left-hand operand via its string form;
/// all other combinations require matching numeric kinds.
pub fn add(left: Value, right: Value) -> Result<Value, RunError> {
    match (&left, &right) {
        (Value::Str(_), _) | (_, Value::Str(_)) => Ok(Value::str_value(format!(
            "{}{}",
            left.to_display_string(),
            right.to_display_string()
        ))),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(*b))),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
        _ => Err(type_error("+", &left, &right)),
    }
}

pub fn sub(left: Value, right: Value) -> Result<Value, RunError> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_sub(*b))),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a - b)),
        _ => Err(type_error("-", &left, &right)),
    }
}

pub fn mul(left: Value, right: Value) -> Result<Value, RunError> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_mul(*b))),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a * b)),
        _ => Err(type_error("*", &left, &right)),
    }
}

/// `/`. Integer division truncates toward zero (Rust's native `i64::/`) and
/// raises `ZeroDivisionError` rather than panicking; float division follows
/// IEEE-754 and never errors, even for `x / 0.0`.
pub fn div(left: Value, right: Value) -> Result<Value, RunError> {
    match (&left, &right) {
        (Value::Int(_), Value::Int(0)) => Err(RunError::new(
            crate::error::ExcKind::ZeroDivisionError,
            "integer division by zero",
        )),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a / b)),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a / b)),
        _ => Err(type_error("/", &left, &right)),
    }
}

pub fn modulo(left: Value, right: Value) -> Result<Value, RunError> {
    match (&left, &right) {
        (Value::Int(_), Value::Int(0)) => Err(RunError::new(
            crate::error::ExcKind::ZeroDivisionError,
            "integer modulo by zero",
        )),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a % b)),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a % b)),
        _ => Err(type_error("%", &left, &right)),
    }
}

fn shift_amount(right: &Value) -> Option<u32> {
    match right {
        Value::Int(n) if (0..64).contains(n) => Some(*n as u32),
        _ => None,
    }
}

pub fn lshift(left: Value, right: Value) -> Result<Value, RunError> {
    match (&left, shift_amount(&right)) {
        (Value::Int(a), Some(n)) => Ok(Value::Int(a.wrapping_shl(n))),
        _ => Err(type_error("<<", &left, &right)),
    }
}

pub fn rshift(left: Value, right: Value) -> Result<Value, RunError> {
    match (&left, shift_amount(&right)) {
        (Value::Int(a), Some(n)) => Ok(Value::Int(a.wrapping_shr(n))),
        _ => Err(type_error(">>", &left, &right)),
    }
}

pub fn bitand(left: Value, right: Value) -> Result<Value, RunError> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a & b)),
        _ => Err(type_error("&", &left, &right)),
    }
}

pub fn bitor(left: Value, right: Value) -> Result<Value, RunError> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a | b)),
        _ => Err(type_error("|", &left, &right)),
    }
}

pub fn bitxor(left: Value, right: Value) -> Result<Value, RunError> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a ^ b)),
        _ => Err(type_error("&^", &left, &right)),
    }
}

pub fn equal(left: &Value, right: &Value) -> Value {
    Value::Bool(left.value_eq(right))
}

pub fn not_equal(left: &Value, right: &Value) -> Value {
    Value::Bool(!left.value_eq(right))
}

/// `<`/`>`; only Int/Int and Float/Float are ordered (matches the reference
/// implementation, which defines `lt`/`gt` only on `Integer` and `Float`).
pub fn less_than(left: &Value, right: &Value) -> Result<bool, RunError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(a < b),
        (Value::Float(a), Value::Float(b)) => Ok(a < b),
        _ => Err(type_error("<", left, right)),
    }
}

pub fn greater_than(left: &Value, right: &Value) -> Result<bool, RunError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(a > b),
        (Value::Float(a), Value::Float(b)) => Ok(a > b),
        _ => Err(type_error(">", left, right)),
    }
}

/// `<=` is synthesized as `(left < right) || (left == right)`.
pub fn less_or_equal(left: &Value, right: &Value) -> Result<Value, RunError> {
    Ok(Value::Bool(less_than(left, right)? || left.value_eq(right)))
}

/// `>=` is synthesized as `(left > right) || (left == right)`.
pub fn greater_or_equal(left: &Value, right: &Value) -> Result<Value, RunError> {
    Ok(Value::Bool(greater_than(left, right)? || left.value_eq(right)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_plus_int_coerces_via_display() {
        let result = add(Value::str_value("n="), Value::Int(5)).unwrap();
        assert_eq!(result.to_display_string(), "n=5");
    }

    #[test]
    fn mixed_int_float_add_is_type_error() {
        assert!(add(Value::Int(1), Value::Float(2.0)).is_err());
    }

    #[test]
    fn int_division_truncates_toward_zero() {
        assert_eq!(div(Value::Int(-7), Value::Int(2)).unwrap().to_display_string(), "-3");
    }

    #[test]
    fn int_division_by_zero_is_zero_division_error() {
        let err = div(Value::Int(1), Value::Int(0)).unwrap_err();
        assert_eq!(err.kind, crate::error::ExcKind::ZeroDivisionError);
    }

    #[test]
    fn float_division_by_zero_is_infinity_not_error() {
        let result = div(Value::Float(1.0), Value::Float(0.0)).unwrap();
        match result {
            Value::Float(f) => assert!(f.is_infinite()),
            _ => panic!("expected float"),
        }
    }

    #[test]
    fn le_synthesized_from_lt_and_eq() {
        assert_eq!(less_or_equal(&Value::Int(2), &Value::Int(2)).unwrap().to_display_string(), "true");
        assert_eq!(less_or_equal(&Value::Int(3), &Value::Int(2)).unwrap().to_display_string(), "false");
    }
}
