//! Boolean class.

use crate::interpreter::builtins::arg;
use crate::interpreter::value::{BuiltinInstance, Value};

pub const METHODS: &[(&str, usize)] = &[
    ("init", 1),
    ("__not__", 0),
    ("__equal__", 1),
    ("__notequal__", 1),
    ("clone", 0),
    ("toString", 0),
];

/// `Boolean(x)`: numbers are true unless zero, strings unless `'false'`, `'0'` or empty.
pub fn construct(args: &[Value]) -> Result<BuiltinInstance, String> {
    let value = arg(args, 0).ok_or("Expected boolean.")?;
    let b = match value {
        Value::Null => false,
        Value::Builtin(BuiltinInstance::Boolean(b)) => *b,
        Value::Builtin(BuiltinInstance::Number(n)) => *n != 0.0,
        Value::Builtin(BuiltinInstance::String(s)) => !matches!(&**s, "false" | "0" | ""),
        _ => return Err("Expected a number, string, boolean or null.".to_string()),
    };
    Ok(BuiltinInstance::Boolean(b))
}

pub fn call(b: bool, name: &str, _args: &[Value]) -> Result<Value, String> {
    match name {
        "__not__" => Ok(Value::boolean(!b)),
        _ => Err(format!("Undefined method '{}'.", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boolean(args: &[Value]) -> bool {
        match construct(args) {
            Ok(BuiltinInstance::Boolean(b)) => b,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_construct() {
        assert!(boolean(&[Value::number(2.0)]));
        assert!(!boolean(&[Value::number(0.0)]));
        assert!(!boolean(&[Value::string("false")]));
        assert!(!boolean(&[Value::string("0")]));
        assert!(boolean(&[Value::string("yes")]));
        assert!(!boolean(&[Value::Null]));
        assert_eq!(construct(&[]).unwrap_err(), "Expected boolean.");
    }

    #[test]
    fn test_not() {
        assert_eq!(call(true, "__not__", &[]).unwrap().as_bool(), Some(false));
    }
}
