//! Error class: the only values `throw` accepts.

use std::cell::RefCell;
use std::rc::Rc;

use crate::interpreter::builtins::arg;
use crate::interpreter::value::{BuiltinInstance, ErrorData, Value};

pub const METHODS: &[(&str, usize)] = &[
    ("init", 1),
    ("getMessage", 0),
    ("__equal__", 1),
    ("__notequal__", 1),
    ("clone", 0),
    ("toString", 0),
];

pub fn with_message(message: Value) -> BuiltinInstance {
    BuiltinInstance::Error(Rc::new(RefCell::new(ErrorData {
        message,
        token: None,
    })))
}

pub fn construct(args: &[Value]) -> Result<BuiltinInstance, String> {
    let message = arg(args, 0).ok_or("Expected a error message!")?;
    Ok(with_message(message.clone()))
}

pub fn call(data: &Rc<RefCell<ErrorData>>, name: &str, _args: &[Value]) -> Result<Value, String> {
    match name {
        "getMessage" => Ok(data.borrow().message.clone()),
        _ => Err(format!("Undefined method '{}'.", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message() {
        let error = construct(&[Value::string("boom")]).unwrap();
        assert_eq!(error.to_string(), "boom");
        let BuiltinInstance::Error(data) = &error else {
            panic!("Expected error")
        };
        assert_eq!(
            call(data, "getMessage", &[]).unwrap().as_str(),
            Some("boom")
        );
        assert_eq!(with_message(Value::Null).to_string(), "null");
        assert_eq!(construct(&[]).unwrap_err(), "Expected a error message!");
    }
}
