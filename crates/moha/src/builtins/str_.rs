//! `str(v)`: the display/string-coercion conversion.

use crate::value::Value;

pub fn call(arg: &Value) -> Value {
    Value::str_value(arg.to_display_string())
}
