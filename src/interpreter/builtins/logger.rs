//! Logger class.

use crate::interpreter::builtins::arg;
use crate::interpreter::value::Value;
use crate::output::Output;

pub const METHODS: &[(&str, usize)] = &[
    ("init", 0),
    ("log", 1),
    ("__equal__", 1),
    ("__notequal__", 1),
    ("clone", 0),
    ("toString", 0),
];

pub fn call(name: &str, args: &[Value], output: &Output) -> Result<Value, String> {
    match name {
        "log" => {
            let message = arg(args, 0).cloned().unwrap_or(Value::Null);
            output.write_line(&message.to_string());
            Ok(Value::Null)
        }
        _ => Err(format!("Undefined method '{}'.", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_writes_display_string() {
        let out = Output::buffer();
        call("log", &[Value::array(vec![Value::string("a")])], &out).unwrap();
        call("log", &[], &out).unwrap();
        assert_eq!(out.lines(), vec!["['a']", "null"]);
    }
}
