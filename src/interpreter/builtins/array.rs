//! Array class: a growable list that also works as a bounded queue or stack.

use std::cell::RefCell;
use std::rc::Rc;

use crate::interpreter::builtins::arg;
use crate::interpreter::value::{ArrayData, BuiltinInstance, Value};

pub const METHODS: &[(&str, usize)] = &[
    ("init", 1),
    ("setMaxSize", 1),
    // Queue
    ("enqueue", 1),
    ("dequeue", 0),
    ("peek", 0),
    ("front", 0),
    // Stack
    ("push", 1),
    ("pop", 0),
    ("top", 0),
    ("isFull", 0),
    ("isEmpty", 0),
    ("size", 0),
    // List
    ("add", 1),
    ("get", 1),
    ("set", 2),
    ("insertAt", 2),
    ("remove", 1),
    ("removeAt", 1),
    ("contains", 1),
    ("indexOf", 1),
    ("clear", 0),
    ("length", 0),
    ("__getitem__", 1),
    ("__setitem__", 2),
    ("__equal__", 1),
    ("__notequal__", 1),
    ("clone", 0),
    ("toString", 0),
];

pub fn empty() -> BuiltinInstance {
    BuiltinInstance::Array(Rc::new(RefCell::new(ArrayData::new(Vec::new()))))
}

/// `Array()` or `Array(other)`, copying the other array's elements.
pub fn construct(args: &[Value]) -> Result<BuiltinInstance, String> {
    match arg(args, 0) {
        None | Some(Value::Null) => Ok(empty()),
        Some(Value::Builtin(BuiltinInstance::Array(other))) => {
            let items = other.borrow().items.clone();
            Ok(BuiltinInstance::Array(Rc::new(RefCell::new(ArrayData::new(
                items,
            )))))
        }
        Some(value) if !value.is_truthy() => Ok(empty()),
        Some(_) => Err("Expected an Array.".to_string()),
    }
}

fn value_arg(args: &[Value], index: usize) -> Result<Value, String> {
    arg(args, index)
        .cloned()
        .ok_or_else(|| "Expected a value.".to_string())
}

fn index_arg(args: &[Value], index: usize) -> Result<f64, String> {
    match arg(args, index) {
        None | Some(Value::Null) => Err("Expected an index.".to_string()),
        Some(value) => value
            .as_number()
            .ok_or_else(|| "Expected an number.".to_string()),
    }
}

/// Longest array that `set` may pad out to.
pub const MAX_LENGTH: usize = 1 << 24;

/// Slot for a non-negative index, `None` when the index is negative, fractional or
/// past [`MAX_LENGTH`].
fn slot(index: f64) -> Option<usize> {
    (index >= 0.0 && index.fract() == 0.0 && index < MAX_LENGTH as f64).then_some(index as usize)
}

/// Slot for an index that may count back from the end.
fn relative_slot(index: f64, len: usize) -> Option<usize> {
    if index < 0.0 {
        slot(len as f64 + index)
    } else {
        slot(index)
    }
}

fn push(data: &mut ArrayData, value: Value) -> Result<(), String> {
    if data.is_full() {
        return Err("Array is full.".to_string());
    }
    data.items.push(value);
    Ok(())
}

/// Store at `index`, padding with nulls past the end.
fn store(data: &mut ArrayData, index: usize, value: Value) -> Result<(), String> {
    if index >= data.items.len() {
        let len = index.checked_add(1).ok_or("Index out of range.")?;
        if data.max_size.is_some_and(|max| len > max) {
            return Err("Array is full.".to_string());
        }
        data.items.resize(len, Value::Null);
    }
    data.items[index] = value;
    Ok(())
}

/// Compares against a snapshot, so the receiver may appear in `value`.
fn position(data: &RefCell<ArrayData>, value: &Value) -> Option<usize> {
    let items = data.borrow().items.clone();
    items.iter().position(|item| item.equals(value))
}

pub fn call(data: &Rc<RefCell<ArrayData>>, name: &str, args: &[Value]) -> Result<Value, String> {
    match name {
        "contains" => {
            let value = arg(args, 0).cloned().unwrap_or(Value::Null);
            return Ok(Value::boolean(position(data, &value).is_some()));
        }
        "indexOf" => {
            let value = arg(args, 0).cloned().unwrap_or(Value::Null);
            let index = position(data, &value).map(|i| i as f64).unwrap_or(-1.0);
            return Ok(Value::number(index));
        }
        "remove" => {
            let value = arg(args, 0).cloned().unwrap_or(Value::Null);
            let i = position(data, &value).ok_or("Value not found.")?;
            data.borrow_mut().items.remove(i);
            return Ok(Value::Null);
        }
        _ => {}
    }

    let mut data = data.borrow_mut();
    let result = match name {
        "setMaxSize" => {
            match arg(args, 0) {
                None => return Err("Expected a size.".to_string()),
                Some(Value::Null) => data.max_size = None,
                Some(value) => {
                    let size = value.as_number().ok_or("Expected an number.")?;
                    data.max_size = Some(size.max(0.0) as usize);
                }
            }
            Value::Null
        }
        "enqueue" | "add" | "push" => {
            let value = value_arg(args, 0)?;
            push(&mut data, value)?;
            Value::Null
        }
        "dequeue" => {
            if data.items.is_empty() {
                return Err("Array is empty.".to_string());
            }
            data.items.remove(0)
        }
        "peek" | "front" => data.items.first().cloned().unwrap_or(Value::Null),
        "pop" => data.items.pop().ok_or("Array is empty.")?,
        "top" => data.items.last().cloned().ok_or("Array is empty.")?,
        "isFull" => Value::boolean(data.is_full()),
        "isEmpty" => Value::boolean(data.items.is_empty()),
        "size" | "length" => Value::number(data.items.len() as f64),
        "get" => {
            let index = index_arg(args, 0)?;
            slot(index)
                .and_then(|i| data.items.get(i).cloned())
                .unwrap_or(Value::Null)
        }
        "set" => {
            let index = index_arg(args, 0)?;
            let value = arg(args, 1).cloned().unwrap_or(Value::Null);
            let i = slot(index).ok_or("Index out of range.")?;
            store(&mut data, i, value)?;
            Value::Null
        }
        "insertAt" => {
            let index = index_arg(args, 0)?;
            let value = value_arg(args, 1)?;
            let len = data.items.len();
            let i = relative_slot(index, len).unwrap_or(0).min(len);
            data.items.insert(i, value);
            Value::Null
        }
        "removeAt" => {
            let index = index_arg(args, 0)?;
            let len = data.items.len();
            if let Some(i) = relative_slot(index, len).filter(|i| *i < len) {
                data.items.remove(i);
            }
            Value::Null
        }
        "clear" => {
            data.items.clear();
            Value::Null
        }
        "__getitem__" => {
            let index = index_arg(args, 0)?;
            let len = data.items.len();
            relative_slot(index, len)
                .and_then(|i| data.items.get(i).cloned())
                .unwrap_or(Value::Null)
        }
        "__setitem__" => {
            let index = index_arg(args, 0)?;
            let value = arg(args, 1).cloned().unwrap_or(Value::Null);
            let len = data.items.len();
            let i = relative_slot(index, len).ok_or("Index out of range.")?;
            store(&mut data, i, value)?;
            Value::Null
        }
        _ => return Err(format!("Undefined method '{}'.", name)),
    };
    Ok(result)
}
