//! Built-in classes and functions for TripleS.
//!
//! Every built-in class is a Rust enum tag ([`BuiltinClass`]) plus a module with a
//! method table and a `call` dispatcher matching on the method name. Methods are
//! looked up on receivers directly for operators, and wrapped into bound
//! [`NativeFunction`]s when read as properties.

use std::rc::Rc;

use crate::interpreter::environment::Environment;
use crate::interpreter::value::{BuiltinClass, BuiltinInstance, NativeFunction, Value};
use crate::output::Output;

pub mod array;
pub mod boolean;
pub mod clock;
pub mod error;
pub mod logger;
pub mod map;
pub mod number;
pub mod string;

/// Register every built-in class and function in the shared built-ins frame.
pub fn register_builtins(env: &mut Environment) {
    for class in BuiltinClass::ALL {
        env.define_value(class.name(), Value::BuiltinClass(class));
    }
    clock::register_clock_builtins(env);
}

/// `(name, arity)` pairs a built-in class answers to.
fn methods(class: BuiltinClass) -> &'static [(&'static str, usize)] {
    match class {
        BuiltinClass::Number => number::METHODS,
        BuiltinClass::String => string::METHODS,
        BuiltinClass::Boolean => boolean::METHODS,
        BuiltinClass::Array => array::METHODS,
        BuiltinClass::Map => map::METHODS,
        BuiltinClass::Error => error::METHODS,
        BuiltinClass::Logger => logger::METHODS,
    }
}

pub fn has_method(class: BuiltinClass, name: &str) -> bool {
    methods(class).iter().any(|(method, _)| *method == name)
}

pub fn method_arity(class: BuiltinClass, name: &str) -> Option<usize> {
    methods(class)
        .iter()
        .find(|(method, _)| *method == name)
        .map(|(_, arity)| *arity)
}

/// Arity of calling the class itself.
pub fn class_arity(class: BuiltinClass) -> usize {
    method_arity(class, "init").unwrap_or(0)
}

/// Backing instance for a user class that extends `class`, before its `init` runs.
pub fn default_instance(class: BuiltinClass) -> BuiltinInstance {
    match class {
        BuiltinClass::Number => BuiltinInstance::Number(0.0),
        BuiltinClass::String => BuiltinInstance::String(Rc::from("")),
        BuiltinClass::Boolean => BuiltinInstance::Boolean(false),
        BuiltinClass::Array => array::empty(),
        BuiltinClass::Map => map::empty(),
        BuiltinClass::Error => error::with_message(Value::Null),
        BuiltinClass::Logger => BuiltinInstance::Logger,
    }
}

/// Call a built-in class: always a fresh instance.
pub fn construct(class: BuiltinClass, args: &[Value]) -> Result<BuiltinInstance, String> {
    match class {
        BuiltinClass::Number => number::construct(args),
        BuiltinClass::String => string::construct(args),
        BuiltinClass::Boolean => boolean::construct(args),
        BuiltinClass::Array => array::construct(args),
        BuiltinClass::Map => map::construct(args),
        BuiltinClass::Error => error::construct(args),
        BuiltinClass::Logger => Ok(BuiltinInstance::Logger),
    }
}

/// Invoke `name` on a built-in receiver.
pub fn call_method(
    receiver: &BuiltinInstance,
    name: &str,
    args: Vec<Value>,
    output: &Output,
) -> Result<Value, String> {
    let class = receiver.class();
    if !has_method(class, name) {
        return Err(format!("Undefined method '{}'.", name));
    }

    match name {
        "init" => construct(class, &args).map(Value::Builtin),
        "__equal__" => Ok(Value::boolean(
            args.first().is_some_and(|other| Value::Builtin(receiver.clone()).equals(other)),
        )),
        "__notequal__" => Ok(Value::boolean(
            !args.first().is_some_and(|other| Value::Builtin(receiver.clone()).equals(other)),
        )),
        "clone" => Ok(Value::Builtin(receiver.deep_clone())),
        "toString" => Ok(Value::string(receiver.to_string())),
        _ => match receiver {
            BuiltinInstance::Number(n) => number::call(*n, name, &args),
            BuiltinInstance::String(s) => string::call(s, name, &args),
            BuiltinInstance::Boolean(b) => boolean::call(*b, name, &args),
            BuiltinInstance::Array(data) => array::call(data, name, &args),
            BuiltinInstance::Map(data) => map::call(data, name, &args),
            BuiltinInstance::Error(data) => error::call(data, name, &args),
            BuiltinInstance::Logger => logger::call(name, &args, output),
        },
    }
}

/// A method of `receiver` packaged as a callable, e.g. `<Array.push function>`.
pub fn bind_method(receiver: &BuiltinInstance, name: &str, output: &Output) -> Option<Value> {
    let arity = method_arity(receiver.class(), name)?;
    let receiver = receiver.clone();
    let output = output.clone();
    let method = name.to_string();
    let display = format!("{}.{}", receiver.class().name(), name);
    Some(Value::NativeFunction(Rc::new(NativeFunction::new(
        display,
        arity,
        move |args| call_method(&receiver, &method, args, &output),
    ))))
}

/// Fields readable on built-in instances: `value` is the instance itself and
/// errors expose `message`.
pub fn field(receiver: &BuiltinInstance, name: &str) -> Option<Value> {
    match (receiver, name) {
        (BuiltinInstance::Error(data), "message") => Some(data.borrow().message.clone()),
        (BuiltinInstance::Logger, _) => None,
        (_, "value") => Some(Value::Builtin(receiver.clone())),
        _ => None,
    }
}

/// Property read on a built-in instance: fields first, then bound methods.
pub fn get_property(receiver: &BuiltinInstance, name: &str, output: &Output) -> Option<Value> {
    field(receiver, name).or_else(|| bind_method(receiver, name, output))
}

/// Argument `index`, distinguishing "not passed" (`None`) from `null`.
pub(crate) fn arg(args: &[Value], index: usize) -> Option<&Value> {
    args.get(index)
}

/// A number argument or `error`.
pub(crate) fn number_arg(args: &[Value], index: usize, error: &str) -> Result<f64, String> {
    arg(args, index)
        .and_then(Value::as_number)
        .ok_or_else(|| error.to_string())
}
