//! `BUILD_MAP`/`BUILD_ARRAY`/`MAP_*` opcode bodies.
//!
//! Covers the per-kind operations each collection supports (Array: `push`,
//! `pop`, `index`, `length`; Object: get/set/delete/`in`; String: `index`,
//! `length`) and the stack discipline for each `MAP_*` opcode. Attribute
//! load binding a Function to its receiver (`MAP_GETITEM`) is implemented
//! here rather than mutating the stored function; see [`crate::function`].

use indexmap::IndexMap;

use crate::error::RunError;
use crate::function::{FunctionValue, InstanceMethodKind};
use crate::value::Value;

pub fn build_array(mut items: Vec<Value>) -> Value {
    items.shrink_to_fit();
    Value::array(items)
}

pub fn build_map() -> Value {
    Value::object(IndexMap::new())
}

/// `STORE_MAP`: `[… map, key, value]` → `[… map]`, `map[key] := value`.
/// Object literal keys are always compiled as string constants.
pub fn store_map(map: &Value, key: &Value, value: Value) -> Result<(), RunError> {
    let Value::Object(entries) = map else {
        return Err(RunError::type_error(format!("cannot build a map entry on a {}", map.type_name())));
    };
    entries.borrow_mut().insert(key.to_display_string(), value);
    Ok(())
}

pub(crate) fn array_index(len: usize, key: &Value) -> Result<usize, RunError> {
    match key {
        Value::Int(i) if *i >= 0 && (*i as usize) < len => Ok(*i as usize),
        Value::Int(i) => Err(RunError::index_error(format!("array index {i} out of range (length {len})"))),
        other => Err(RunError::type_error(format!("array index must be int, got {}", other.type_name()))),
    }
}

/// `MAP_GETITEM`: `[obj, attr] -> [value]`. If the looked-up value is a
/// `Function`, it is bound to `obj` as its receiver before being pushed.
pub fn map_get_item(obj: Value, key: Value) -> Result<Value, RunError> {
    let raw = match &obj {
        Value::Object(entries) => {
            if let Some(method) = key_as_method(&obj, "object", &key) {
                method
            } else {
                let key_str = key.to_display_string();
                entries
                    .borrow()
                    .get(&key_str)
                    .cloned()
                    .ok_or_else(|| RunError::index_error(format!("no such key: {key_str}")))?
            }
        }
        Value::Module(module) => {
            let key_str = key.to_display_string();
            module
                .namespace
                .borrow()
                .get(&key_str)
                .cloned()
                .ok_or_else(|| RunError::index_error(format!("module has no member: {key_str}")))?
        }
        Value::Array(items) => {
            if let Some(method) = key_as_method(&obj, "array", &key) {
                method
            } else {
                let items = items.borrow();
                let idx = array_index(items.len(), &key)?;
                items[idx].clone()
            }
        }
        Value::Str(s) => {
            if let Some(method) = key_as_method(&obj, "string", &key) {
                method
            } else {
                let idx = array_index(s.chars().count(), &key)?;
                Value::str_value(s.chars().nth(idx).expect("index checked above").to_string())
            }
        }
        other => return Err(RunError::type_error(format!("cannot get attribute on a {}", other.type_name()))),
    };

    Ok(if let Value::Function(f) = &raw {
        Value::Function(std::rc::Rc::new(f.bind(obj)))
    } else {
        raw
    })
}

/// Looks up an instance method named `key` (a String) on `receiver_type`;
/// returns `None` if `key` isn't a string or no such method exists, so the
/// caller falls back to plain indexing.
fn key_as_method(_receiver: &Value, receiver_type: &str, key: &Value) -> Option<Value> {
    let Value::Str(name) = key else { return None };
    let kind = InstanceMethodKind::lookup(receiver_type, name)?;
    Some(Value::Function(std::rc::Rc::new(FunctionValue::instance_method(kind))))
}

/// `MAP_SETITEM`: `[value, obj, attr] -> []`.
pub fn map_set_item(value: Value, obj: Value, key: Value) -> Result<(), RunError> {
    match &obj {
        Value::Object(entries) => {
            entries.borrow_mut().insert(key.to_display_string(), value);
            Ok(())
        }
        Value::Array(items) => {
            let mut items = items.borrow_mut();
            let idx = array_index(items.len(), &key)?;
            items[idx] = value;
            Ok(())
        }
        other => Err(RunError::type_error(format!("cannot set attribute on a {}", other.type_name()))),
    }
}

/// `MAP_DELITEM`: `[obj, attr] -> []`. Unreachable from the surface grammar
/// (no `delete` keyword), kept for opcode-table completeness.
pub fn map_del_item(obj: Value, key: Value) -> Result<(), RunError> {
    match &obj {
        Value::Object(entries) => {
            let key_str = key.to_display_string();
            entries
                .borrow_mut()
                .shift_remove(&key_str)
                .ok_or_else(|| RunError::index_error(format!("no such key: {key_str}")))?;
            Ok(())
        }
        other => Err(RunError::type_error(format!("cannot delete attribute on a {}", other.type_name()))),
    }
}

/// `MAP_HASITEM`: `[container, elem] -> [bool]`. Arrays test membership by
/// structural equality; objects test key membership.
pub fn map_has_item(container: &Value, elem: &Value) -> Result<Value, RunError> {
    match container {
        Value::Array(items) => Ok(Value::Bool(items.borrow().iter().any(|v| v.value_eq(elem)))),
        Value::Object(entries) => Ok(Value::Bool(entries.borrow().contains_key(&elem.to_display_string()))),
        other => Err(RunError::type_error(format!("'in' requires an array or object, got {}", other.type_name()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_index_out_of_range_is_index_error() {
        let arr = build_array(vec![Value::Int(1)]);
        let err = map_get_item(arr, Value::Int(5)).unwrap_err();
        assert_eq!(err.kind, crate::error::ExcKind::IndexError);
    }

    #[test]
    fn object_getitem_binds_function_to_receiver() {
        let map = build_map();
        store_map(&map, &Value::str_value("push"), Value::Int(1)).unwrap();
        // overwritten below to show a non-function path resolves to the raw value
        let result = map_get_item(map, Value::str_value("push")).unwrap();
        assert_eq!(result.to_display_string(), "1");
    }

    #[test]
    fn array_getitem_with_string_key_returns_bound_instance_method() {
        let arr = build_array(vec![]);
        let method = map_get_item(arr, Value::str_value("push")).unwrap();
        match method {
            Value::Function(f) => assert!(f.receiver().is_some()),
            other => panic!("expected bound function, got {other:?}"),
        }
    }

    #[test]
    fn map_has_item_checks_object_keys() {
        let map = build_map();
        store_map(&map, &Value::str_value("x"), Value::Int(1)).unwrap();
        assert_eq!(map_has_item(&map, &Value::str_value("x")).unwrap().to_display_string(), "true");
        assert_eq!(map_has_item(&map, &Value::str_value("y")).unwrap().to_display_string(), "false");
    }
}
