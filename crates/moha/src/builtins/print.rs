//! `print(v)`: writes `v.str()` followed by a newline, returns `null`.

use crate::error::RunError;
use crate::io::PrintWriter;
use crate::value::Value;

pub fn call(out: &mut impl PrintWriter, arg: &Value) -> Result<Value, RunError> {
    out.write_line(&arg.to_display_string());
    Ok(Value::Null)
}
