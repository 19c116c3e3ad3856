//! Map class: insertion-ordered entries, hashed by scalar key.

use std::cell::RefCell;
use std::rc::Rc;

use crate::interpreter::builtins::arg;
use crate::interpreter::value::{BuiltinInstance, MapData, Value};

pub const METHODS: &[(&str, usize)] = &[
    ("init", 1),
    ("__getitem__", 1),
    ("__setitem__", 2),
    ("__equal__", 1),
    ("__notequal__", 1),
    ("clone", 0),
    ("toString", 0),
];

pub fn empty() -> BuiltinInstance {
    BuiltinInstance::Map(Rc::new(RefCell::new(MapData::default())))
}

pub fn construct(args: &[Value]) -> Result<BuiltinInstance, String> {
    match arg(args, 0) {
        None | Some(Value::Null) => Ok(empty()),
        Some(Value::Builtin(BuiltinInstance::Map(other))) => {
            let copy = other.borrow().clone();
            Ok(BuiltinInstance::Map(Rc::new(RefCell::new(copy))))
        }
        Some(_) => Err("Expected a Map.".to_string()),
    }
}

pub fn call(data: &Rc<RefCell<MapData>>, name: &str, args: &[Value]) -> Result<Value, String> {
    match name {
        "__getitem__" => {
            let key = arg(args, 0).ok_or("Expected a key.")?;
            Ok(data.borrow().get(key).cloned().unwrap_or(Value::Null))
        }
        "__setitem__" => {
            let key = arg(args, 0).ok_or("Expected a key.")?.clone();
            let value = arg(args, 1).ok_or("Expected a value.")?.clone();
            data.borrow_mut().insert(key, value);
            Ok(Value::Null)
        }
        _ => Err(format!("Undefined method '{}'.", name)),
    }
}
