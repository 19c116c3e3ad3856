//! String class.

use std::rc::Rc;

use crate::interpreter::builtins::arg;
use crate::interpreter::value::{BuiltinInstance, Value};

pub const METHODS: &[(&str, usize)] = &[
    ("init", 1),
    ("length", 0),
    ("toUpperCase", 0),
    ("toLowerCase", 0),
    ("concat", 1),
    ("replace", 2),
    ("__add__", 1),
    ("__equal__", 1),
    ("__notequal__", 1),
    ("clone", 0),
    ("toString", 0),
];

const EXPECTED_STRING: &str = "Expected string.";

fn string_arg(args: &[Value], index: usize) -> Result<&str, String> {
    arg(args, index)
        .and_then(Value::as_str)
        .ok_or_else(|| EXPECTED_STRING.to_string())
}

pub fn construct(args: &[Value]) -> Result<BuiltinInstance, String> {
    let s = string_arg(args, 0)?;
    Ok(BuiltinInstance::String(Rc::from(s)))
}

pub fn call(s: &str, name: &str, args: &[Value]) -> Result<Value, String> {
    let result = match name {
        "length" => Value::number(s.chars().count() as f64),
        "toUpperCase" => Value::string(s.to_uppercase()),
        "toLowerCase" => Value::string(s.to_lowercase()),
        "concat" | "__add__" => {
            let other = string_arg(args, 0)?;
            Value::string(format!("{}{}", s, other))
        }
        "replace" => {
            let search = string_arg(args, 0)?;
            let replacement = string_arg(args, 1)?;
            Value::string(s.replacen(search, replacement, 1))
        }
        _ => return Err(format!("Undefined method '{}'.", name)),
    };
    Ok(result)
}
